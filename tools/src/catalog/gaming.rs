//! Game tools: shop and inventory, `OpenDota`, Steam statistics

use super::random_hex;
use crate::executor::executor;
use crate::stateful::{call_external_api, render_items};
use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tool_fixtures_core::{
    Args, FlatRecord, Intent, IntentPlan, Intents, Tool, ToolContext, ToolError, ToolExecutorFn,
};

/// Name of the shop purchase tool
pub const BUY_ITEM: &str = "game_shop_buy_item";

/// Name of the inventory tool
pub const GET_INVENTORY: &str = "game_shop_get_inventory";

/// Name of the hero statistics tool
pub const GET_PLAYER_HEROES: &str = "opendota_api_server_get_player_heroes";

/// Name of the recent matches tool
pub const GET_PLAYER_RECENT_MATCHES: &str = "opendota_api_server_get_player_recent_matches";

/// Name of the Steam statistics tool
pub const GET_PLAYER_STATS: &str = "steam_statistics_get_player_stats";

/// Largest quantity one purchase may request
pub const MAX_QUANTITY: i64 = 99;

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// game_shop_buy_item
// ---------------------------------------------------------------------------

/// Completed purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyItemResponse {
    /// Whether the purchase went through
    pub success: bool,
    /// Item bought
    pub item: String,
    /// Units bought
    pub quantity: i64,
    /// Price of one unit
    pub unit_price: i64,
    /// Price of the whole purchase
    pub total_price: i64,
    /// In-game currency
    pub currency: String,
    /// Transaction ID
    pub transaction_id: String,
    /// Human-readable summary
    pub message: String,
}

fn add_items(args: &Args) -> Intents {
    let Some(item) = args.text("item") else {
        return Intents::new();
    };
    let quantity = args
        .get("quantity")
        .and_then(Value::as_i64)
        .unwrap_or(1)
        .clamp(0, MAX_QUANTITY);
    (0..quantity)
        .map(|_| Intent::AddItem { item: item.to_string() })
        .collect()
}

/// Buy `quantity` units of `item`; each unit lands in the inventory
///
/// # Errors
///
/// Returns `InvalidInput` if the item is blank or the quantity is outside
/// 1..=[`MAX_QUANTITY`]
pub fn buy_item(ctx: &ToolContext, item: &str, quantity: Option<i64>) -> Result<BuyItemResponse, ToolError> {
    let item = item.trim();
    if item.is_empty() {
        return Err(ToolError::invalid_input("Item name cannot be empty"));
    }
    let quantity = quantity.unwrap_or(1);
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(ToolError::invalid_input(format!(
            "Quantity must be between 1 and {MAX_QUANTITY}"
        )));
    }

    let args = Args::new().with("item", item).with("quantity", quantity);
    let response = call_external_api(ctx, BUY_ITEM, &args, IntentPlan::Explicit(add_items), |ctx| {
        let unit_price = ctx.with_rng(|rng| rng.gen_range(10..=500_i64));
        FlatRecord::new()
            .with("success", true)
            .with("item", item)
            .with("quantity", quantity)
            .with("unit_price", unit_price)
            .with("total_price", unit_price * quantity)
            .with("currency", "gold")
            .with("transaction_id", format!("txn_{}", random_hex(ctx, 10)))
            .with("message", format!("Purchased {quantity} x {item}"))
    });

    let root = response.record.root();
    Ok(BuyItemResponse {
        success: root.boolean("success")?,
        item: root.string("item")?,
        quantity: root.int("quantity")?,
        unit_price: root.int("unit_price")?,
        total_price: root.int("total_price")?,
        currency: root.string("currency")?,
        transaction_id: root.string("transaction_id")?,
        message: root.string("message")?,
    })
}

fn run_buy_item(ctx: &ToolContext, args: &Args) -> Result<BuyItemResponse, ToolError> {
    buy_item(ctx, args.require_str("item")?, args.opt_i64("quantity")?)
}

/// Create the `game_shop_buy_item` tool
#[must_use]
pub fn buy_item_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: BUY_ITEM.to_string(),
        description: "Buy an item from the in-game shop".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "item": {
                    "type": "string",
                    "description": "Item name"
                },
                "quantity": {
                    "type": "integer",
                    "description": "Units to buy (default 1, max 99)"
                }
            },
            "required": ["item"]
        }),
    };

    (tool, executor(BUY_ITEM, ctx, run_buy_item))
}

// ---------------------------------------------------------------------------
// game_shop_get_inventory
// ---------------------------------------------------------------------------

/// Player inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryResponse {
    /// Items, in acquisition order
    pub items: Vec<String>,
    /// Number of items
    pub item_count: i64,
    /// Items as one comma-separated string
    pub content: String,
}

fn read_inventory(_args: &Args) -> Intents {
    std::iter::once(Intent::Inventory).collect()
}

/// Current inventory
///
/// With a state backend attached this is the session inventory (possibly empty);
/// without one it is a fixed starter kit.
///
/// # Errors
///
/// Returns `MissingField` if the mock record is incomplete
pub fn get_inventory(ctx: &ToolContext) -> Result<InventoryResponse, ToolError> {
    let response = call_external_api(ctx, GET_INVENTORY, &Args::new(), IntentPlan::Explicit(read_inventory), |_| {
        let starter = ["Wooden Sword".to_string(), "Health Potion".to_string()];
        FlatRecord::new()
            .with("item_0", starter[0].as_str())
            .with("item_1", starter[1].as_str())
            .with("content", render_items(&starter))
    });

    let root = response.record.root();
    let items = match response.inventory {
        Some(ref items) => items.clone(),
        None => root.strings("item")?,
    };
    Ok(InventoryResponse {
        item_count: count(items.len()),
        content: root.string("content")?,
        items,
    })
}

fn run_get_inventory(ctx: &ToolContext, _args: &Args) -> Result<InventoryResponse, ToolError> {
    get_inventory(ctx)
}

/// Create the `game_shop_get_inventory` tool
#[must_use]
pub fn get_inventory_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: GET_INVENTORY.to_string(),
        description: "List the items in the player's inventory".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    };

    (tool, executor(GET_INVENTORY, ctx, run_get_inventory))
}

// ---------------------------------------------------------------------------
// opendota_api_server_get_player_heroes
// ---------------------------------------------------------------------------

/// Per-hero statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroStats {
    /// Hero ID
    pub hero_id: i64,
    /// Last match on this hero (unix seconds)
    pub last_played: i64,
    /// Matches played
    pub games: i64,
    /// Matches won
    pub win: i64,
    /// Matches with this hero on the player's team
    pub with_games: i64,
    /// Matches against this hero
    pub against_games: i64,
}

/// Heroes a player has played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHeroesResponse {
    /// Steam32 account ID
    pub account_id: i64,
    /// Hero statistics, most played first
    pub heroes: Vec<HeroStats>,
}

fn heroes_record(ctx: &ToolContext, account_id: i64) -> FlatRecord {
    let now = ctx.now();
    FlatRecord::new()
        .with("account_id", account_id)
        .with("hero_0_hero_id", 11)
        .with("hero_0_last_played", (now - Duration::hours(3)).timestamp())
        .with("hero_0_games", 87)
        .with("hero_0_win", 49)
        .with("hero_0_with_games", 112)
        .with("hero_0_against_games", 96)
        .with("hero_1_hero_id", 25)
        .with("hero_1_last_played", (now - Duration::days(2)).timestamp())
        .with("hero_1_games", 54)
        .with("hero_1_win", 26)
        .with("hero_1_with_games", 80)
        .with("hero_1_against_games", 71)
}

/// Hero statistics for a player, capped at `limit`
///
/// # Errors
///
/// Returns `InvalidInput` if `account_id` or `limit` is not positive
pub fn get_player_heroes(
    ctx: &ToolContext,
    account_id: i64,
    limit: Option<i64>,
) -> Result<PlayerHeroesResponse, ToolError> {
    if account_id <= 0 {
        return Err(ToolError::invalid_input("account_id must be a positive integer"));
    }
    let limit = match limit {
        Some(limit) if limit <= 0 => {
            return Err(ToolError::invalid_input("limit must be a positive integer"));
        }
        Some(limit) => usize::try_from(limit).unwrap_or(usize::MAX),
        None => usize::MAX,
    };

    let record = heroes_record(ctx, account_id);
    let root = record.root();
    let heroes = root
        .indices("hero")
        .into_iter()
        .take(limit)
        .map(|index| -> Result<HeroStats, ToolError> {
            let hero = root.item("hero", index);
            Ok(HeroStats {
                hero_id: hero.int("hero_id")?,
                last_played: hero.int("last_played")?,
                games: hero.int("games")?,
                win: hero.int("win")?,
                with_games: hero.int("with_games")?,
                against_games: hero.int("against_games")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PlayerHeroesResponse {
        account_id: root.int("account_id")?,
        heroes,
    })
}

fn run_get_player_heroes(ctx: &ToolContext, args: &Args) -> Result<PlayerHeroesResponse, ToolError> {
    get_player_heroes(ctx, args.require_i64("account_id")?, args.opt_i64("limit")?)
}

/// Create the `opendota_api_server_get_player_heroes` tool
#[must_use]
pub fn get_player_heroes_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: GET_PLAYER_HEROES.to_string(),
        description: "Get hero statistics for a Dota 2 player".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "account_id": {
                    "type": "integer",
                    "description": "Steam32 account ID"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of heroes to return"
                }
            },
            "required": ["account_id"]
        }),
    };

    (tool, executor(GET_PLAYER_HEROES, ctx, run_get_player_heroes))
}

// ---------------------------------------------------------------------------
// opendota_api_server_get_player_recent_matches
// ---------------------------------------------------------------------------

/// One recent match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Match ID
    pub match_id: i64,
    /// Start time (unix seconds)
    pub date: i64,
    /// Duration in seconds
    pub duration: i64,
    /// Hero played
    pub hero_id: i64,
    /// Kills
    pub kills: i64,
    /// Deaths
    pub deaths: i64,
    /// Assists
    pub assists: i64,
    /// Gold per minute
    pub gpm: i64,
    /// Experience per minute
    pub xpm: i64,
    /// `win` or `lose`
    pub result: String,
}

/// Recent matches of a player
///
/// Failures are reported in `error_message` with an empty match list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentMatchesResponse {
    /// Matches, newest first
    pub matches: Vec<MatchSummary>,
    /// Failure reason, empty on success
    pub error_message: String,
}

impl RecentMatchesResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            matches: Vec::new(),
            error_message: message.into(),
        }
    }
}

fn matches_record(ctx: &ToolContext) -> FlatRecord {
    let now = ctx.now();
    FlatRecord::new()
        .with("match_0_match_id", 7_564_321_987_i64)
        .with("match_0_date", (now - Duration::minutes(30)).timestamp())
        .with("match_0_duration", 2340)
        .with("match_0_hero_id", 11)
        .with("match_0_kills", 8)
        .with("match_0_deaths", 5)
        .with("match_0_assists", 12)
        .with("match_0_gpm", 420)
        .with("match_0_xpm", 480)
        .with("match_0_result", "win")
        .with("match_1_match_id", 7_564_321_986_i64)
        .with("match_1_date", (now - Duration::hours(2)).timestamp())
        .with("match_1_duration", 2760)
        .with("match_1_hero_id", 25)
        .with("match_1_kills", 6)
        .with("match_1_deaths", 9)
        .with("match_1_assists", 7)
        .with("match_1_gpm", 380)
        .with("match_1_xpm", 410)
        .with("match_1_result", "lose")
        .with("error_message", "")
}

/// Recent matches of a player (default limit 5)
///
/// Invalid arguments produce an error payload rather than an error.
///
/// # Errors
///
/// Returns `MissingField` if the mock record is incomplete
pub fn get_player_recent_matches(
    ctx: &ToolContext,
    account_id: i64,
    limit: Option<i64>,
) -> Result<RecentMatchesResponse, ToolError> {
    if account_id <= 0 {
        return Ok(RecentMatchesResponse::failure(
            "Invalid account_id: must be a positive integer",
        ));
    }
    let limit = match limit {
        Some(limit) if limit <= 0 => {
            return Ok(RecentMatchesResponse::failure("Invalid limit: must be a positive integer"));
        }
        Some(limit) => usize::try_from(limit).unwrap_or(usize::MAX),
        None => 5,
    };

    let record = matches_record(ctx);
    let root = record.root();
    if let Some(message) = root.opt_string("error_message")?.filter(|m| !m.is_empty()) {
        return Ok(RecentMatchesResponse::failure(message));
    }

    let matches = root
        .indices("match")
        .into_iter()
        .take(limit)
        .map(|index| -> Result<MatchSummary, ToolError> {
            let summary = root.item("match", index);
            Ok(MatchSummary {
                match_id: summary.int("match_id")?,
                date: summary.int("date")?,
                duration: summary.int("duration")?,
                hero_id: summary.int("hero_id")?,
                kills: summary.int("kills")?,
                deaths: summary.int("deaths")?,
                assists: summary.int("assists")?,
                gpm: summary.int("gpm")?,
                xpm: summary.int("xpm")?,
                result: summary.string("result")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if matches.is_empty() {
        return Ok(RecentMatchesResponse::failure("No recent matches found for this player"));
    }
    Ok(RecentMatchesResponse {
        matches,
        error_message: String::new(),
    })
}

fn run_get_player_recent_matches(
    ctx: &ToolContext,
    args: &Args,
) -> Result<RecentMatchesResponse, ToolError> {
    // Wrongly typed arguments take the same error-payload path as non-positive ones
    let account_id = args.opt_i64("account_id").ok().flatten().unwrap_or(0);
    let limit = args.opt_i64("limit").unwrap_or(Some(0));
    get_player_recent_matches(ctx, account_id, limit)
}

/// Create the `opendota_api_server_get_player_recent_matches` tool
#[must_use]
pub fn get_player_recent_matches_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: GET_PLAYER_RECENT_MATCHES.to_string(),
        description: "Get recent matches played by a Dota 2 player".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "account_id": {
                    "type": "integer",
                    "description": "Steam32 account ID"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of matches to retrieve (default 5)"
                }
            },
            "required": ["account_id"]
        }),
    };

    (tool, executor(GET_PLAYER_RECENT_MATCHES, ctx, run_get_player_recent_matches))
}

// ---------------------------------------------------------------------------
// steam_statistics_get_player_stats
// ---------------------------------------------------------------------------

const GAME_NAMES: [&str; 8] = [
    "Counter-Strike: Global Offensive",
    "Dota 2",
    "Team Fortress 2",
    "Portal 2",
    "The Witcher 3: Wild Hunt",
    "Cyberpunk 2077",
    "Hades",
    "Stardew Valley",
];

/// Most recently played game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPlayedGame {
    /// Game title
    pub game_name: String,
    /// Steam app ID
    pub app_id: i64,
    /// Total playtime in minutes
    pub playtime_minutes: i64,
    /// Last session (unix seconds)
    pub last_played_timestamp: i64,
}

/// Public profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteamProfile {
    /// Steam ID
    pub steam_id: String,
    /// Community profile URL
    pub profile_url: String,
    /// Display name
    pub persona_name: String,
    /// Avatar image URL
    pub avatar_url: String,
}

/// Library summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Games owned
    pub total_games_owned: i64,
    /// Total playtime in minutes
    pub total_playtime: i64,
    /// Achievements unlocked
    pub achievements_unlocked: i64,
    /// Days since the last session
    pub days_since_last_play: i64,
}

/// Steam statistics of a player
///
/// Sections are `null` when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatsResponse {
    /// Most recently played game
    pub last_played_game: Option<LastPlayedGame>,
    /// Public profile
    pub steam_profile: Option<SteamProfile>,
    /// Library summary
    pub player_stats_summary: Option<StatsSummary>,
    /// Whether statistics were found
    pub success: bool,
    /// Failure reason
    pub error_message: Option<String>,
}

impl PlayerStatsResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            last_played_game: None,
            steam_profile: None,
            player_stats_summary: None,
            success: false,
            error_message: Some(message.into()),
        }
    }
}

fn player_stats_record(ctx: &ToolContext, steam_id: &str) -> FlatRecord {
    let now = ctx.now();
    ctx.with_rng(|rng| {
        let game = GAME_NAMES[rng.gen_range(0..GAME_NAMES.len())];
        let app_id = if game == GAME_NAMES[0] {
            730
        } else {
            rng.gen_range(100_000..=999_999_i64)
        };
        let last_played = now - Duration::hours(rng.gen_range(1..=72));
        FlatRecord::new()
            .with("last_played_game_game_name", game)
            .with("last_played_game_app_id", app_id)
            .with("last_played_game_playtime_minutes", rng.gen_range(100..=20_000_i64))
            .with("last_played_game_last_played_timestamp", last_played.timestamp())
            .with("steam_profile_steam_id", steam_id)
            .with(
                "steam_profile_profile_url",
                format!("https://steamcommunity.com/profiles/{steam_id}"),
            )
            .with(
                "steam_profile_persona_name",
                format!("Player{}", rng.gen_range(1000..=9999)),
            )
            .with(
                "steam_profile_avatar_url",
                format!("https://avatars.steamstatic.com/{}.jpg", rng.gen_range(1_000_000..=9_999_999)),
            )
            .with("player_stats_summary_total_games_owned", rng.gen_range(20..=500_i64))
            .with("player_stats_summary_total_playtime", rng.gen_range(5_000..=100_000_i64))
            .with("player_stats_summary_achievements_unlocked", rng.gen_range(100..=5_000_i64))
            .with("player_stats_summary_days_since_last_play", rng.gen_range(0..=30_i64))
            .with("success", true)
            .with("error_message", "")
    })
}

/// Steam statistics for `steam_id` (randomized)
///
/// A blank ID yields an error payload.
///
/// # Errors
///
/// Returns `MissingField` if the mock record is incomplete
pub fn get_player_stats(ctx: &ToolContext, steam_id: &str) -> Result<PlayerStatsResponse, ToolError> {
    let steam_id = steam_id.trim();
    if steam_id.is_empty() {
        return Ok(PlayerStatsResponse::failure("Invalid Steam ID provided"));
    }

    let record = player_stats_record(ctx, steam_id);
    let root = record.root();
    if !root.boolean("success")? {
        let message = root
            .opt_string("error_message")?
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "User profile is private or not found".to_string());
        return Ok(PlayerStatsResponse::failure(message));
    }

    let game = root.scope("last_played_game");
    let profile = root.scope("steam_profile");
    let summary = root.scope("player_stats_summary");
    Ok(PlayerStatsResponse {
        last_played_game: Some(LastPlayedGame {
            game_name: game.string("game_name")?,
            app_id: game.int("app_id")?,
            playtime_minutes: game.int("playtime_minutes")?,
            last_played_timestamp: game.int("last_played_timestamp")?,
        }),
        steam_profile: Some(SteamProfile {
            steam_id: profile.string("steam_id")?,
            profile_url: profile.string("profile_url")?,
            persona_name: profile.string("persona_name")?,
            avatar_url: profile.string("avatar_url")?,
        }),
        player_stats_summary: Some(StatsSummary {
            total_games_owned: summary.int("total_games_owned")?,
            total_playtime: summary.int("total_playtime")?,
            achievements_unlocked: summary.int("achievements_unlocked")?,
            days_since_last_play: summary.int("days_since_last_play")?,
        }),
        success: true,
        error_message: root.opt_string("error_message")?.filter(|m| !m.is_empty()),
    })
}

fn run_get_player_stats(ctx: &ToolContext, args: &Args) -> Result<PlayerStatsResponse, ToolError> {
    let steam_id = args.get("steam_id").and_then(Value::as_str).unwrap_or_default();
    get_player_stats(ctx, steam_id)
}

/// Create the `steam_statistics_get_player_stats` tool
#[must_use]
pub fn steam_player_stats_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: GET_PLAYER_STATS.to_string(),
        description: "Get a Steam user's gaming statistics".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "steam_id": {
                    "type": "string",
                    "description": "Steam ID of the user"
                }
            },
            "required": ["steam_id"]
        }),
    };

    (tool, executor(GET_PLAYER_STATS, ctx, run_get_player_stats))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use tool_fixtures_core::{StateManager, ToolErrorKind};
    use tool_fixtures_testing::{assert_keys, parse_output, stateless_context, test_context};

    #[test]
    fn test_buy_then_inventory() {
        let (ctx, store) = test_context();
        let purchase = buy_item(&ctx, "Iron Shield", Some(2)).expect("buy");
        assert_eq!(purchase.total_price, purchase.unit_price * 2);
        assert_eq!(store.get_inventory().expect("inventory"), vec!["Iron Shield", "Iron Shield"]);

        let inventory = get_inventory(&ctx).expect("inventory");
        assert_eq!(inventory.items, vec!["Iron Shield", "Iron Shield"]);
        assert_eq!(inventory.item_count, 2);
        assert_eq!(inventory.content, "Iron Shield, Iron Shield");
    }

    #[test]
    fn test_inventory_without_state_is_starter_kit() {
        let inventory = get_inventory(&stateless_context()).expect("inventory");
        assert_eq!(inventory.items, vec!["Wooden Sword", "Health Potion"]);
        assert_eq!(inventory.content, "Wooden Sword, Health Potion");
    }

    #[test]
    fn test_empty_session_inventory() {
        let (ctx, _store) = test_context();
        let inventory = get_inventory(&ctx).expect("inventory");
        assert!(inventory.items.is_empty());
        assert_eq!(inventory.content, "");
    }

    #[test]
    fn test_buy_validation() {
        let ctx = stateless_context();
        assert_eq!(
            buy_item(&ctx, " ", None).expect_err("blank").kind,
            ToolErrorKind::InvalidInput
        );
        assert!(buy_item(&ctx, "potion", Some(0)).is_err());
        assert!(buy_item(&ctx, "potion", Some(MAX_QUANTITY + 1)).is_err());
    }

    #[test]
    fn test_player_heroes_limit() {
        let ctx = stateless_context();
        let one = get_player_heroes(&ctx, 76_561_198, Some(1)).expect("heroes");
        assert_eq!(one.heroes.len(), 1);
        assert_eq!(one.heroes[0].hero_id, 11);

        let all = get_player_heroes(&ctx, 76_561_198, None).expect("heroes");
        assert_eq!(all.heroes.len(), 2);
        assert_eq!(get_player_heroes(&ctx, 76_561_198, Some(10)).expect("heroes").heroes.len(), 2);

        let err = get_player_heroes(&ctx, 76_561_198, Some(0)).expect_err("limit 0");
        assert_eq!(err.kind, ToolErrorKind::InvalidInput);
        assert!(get_player_heroes(&ctx, -1, None).is_err());
    }

    #[test]
    fn test_recent_matches() {
        let ctx = stateless_context();
        let response = get_player_recent_matches(&ctx, 1234, None).expect("matches");
        assert_eq!(response.matches.len(), 2);
        assert!(response.error_message.is_empty());
        assert_eq!(response.matches[0].date, ctx.now().timestamp() - 1800);

        let one = get_player_recent_matches(&ctx, 1234, Some(1)).expect("matches");
        assert_eq!(one.matches.len(), 1);
    }

    #[test]
    fn test_recent_matches_error_payloads() {
        let ctx = stateless_context();
        let response = get_player_recent_matches(&ctx, 0, None).expect("payload");
        assert!(response.matches.is_empty());
        assert!(response.error_message.contains("account_id"));

        let response = get_player_recent_matches(&ctx, 5, Some(-3)).expect("payload");
        assert!(response.error_message.contains("limit"));
    }

    #[tokio::test]
    async fn test_recent_matches_wrong_type_is_payload() {
        let (_, run) = get_player_recent_matches_tool(&stateless_context());
        let output = parse_output(run(json!({"account_id": "abc"}).to_string()).await);
        assert_keys(&output, &["matches", "error_message"]);
        assert_eq!(output["matches"], json!([]));
    }

    #[test]
    fn test_player_stats_seeded_runs_agree() {
        let a = get_player_stats(&stateless_context(), "76561198000000000").expect("stats");
        let b = get_player_stats(&stateless_context(), "76561198000000000").expect("stats");
        assert_eq!(a, b);
        assert!(a.success);
        assert_eq!(a.error_message, None);
        assert_eq!(
            a.steam_profile.map(|profile| profile.steam_id).as_deref(),
            Some("76561198000000000")
        );
    }

    #[tokio::test]
    async fn test_player_stats_blank_id_payload() {
        let (_, run) = steam_player_stats_tool(&stateless_context());
        let output = parse_output(run(json!({"steam_id": "  "}).to_string()).await);
        assert_keys(
            &output,
            &["last_played_game", "steam_profile", "player_stats_summary", "success", "error_message"],
        );
        assert_eq!(output["success"], false);
        assert_eq!(output["steam_profile"], Value::Null);
    }

    #[tokio::test]
    async fn test_heroes_executor_schema() {
        let (_, run) = get_player_heroes_tool(&stateless_context());
        let output = parse_output(run(json!({"account_id": 76_561_198, "limit": 1}).to_string()).await);
        assert_keys(&output, &["account_id", "heroes"]);
        assert_keys(
            &output["heroes"][0],
            &["hero_id", "last_played", "games", "win", "with_games", "against_games"],
        );
    }
}
