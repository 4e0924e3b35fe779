//! Multi-step sessions across fixture tools sharing one state store

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use proptest::prelude::*;
use serde_json::json;
use tool_fixtures::catalog::files::{count_chars, download_diagram, text_editor, DOWNLOAD_DIAGRAM, TEXT_EDITOR};
use tool_fixtures::catalog::gaming::{buy_item, get_inventory, get_player_heroes, BUY_ITEM, GET_INVENTORY};
use tool_fixtures::catalog::memory::{memory_add, memory_search};
use tool_fixtures::catalog::social::{get_contents, post_content, POST_CONTENT};
use tool_fixtures::{register_catalog, ToolRegistry, CATALOG};
use tool_fixtures_core::{Args, Domain, Intent, StateManager, ToolErrorKind};
use tool_fixtures_testing::{failing_context, parse_output, stateless_context, test_context};

#[test]
fn diagram_written_by_kroki_is_visible_to_the_editor() {
    let (ctx, store) = test_context();

    let saved = download_diagram(&ctx, "mermaid", "graph TD;A-->B;", "/diagrams/flow.txt", None)
        .expect("download");
    assert_eq!(saved.format, "txt");
    assert_eq!(store.read_file("/diagrams/flow.txt").unwrap().as_deref(), Some("graph TD;A-->B;"));

    let viewed = text_editor(&ctx, "view", "/diagrams/flow.txt", None).expect("view");
    assert_eq!(viewed.content, "graph TD;A-->B;");
}

#[test]
fn editor_write_then_character_count_uses_stored_text() {
    let (ctx, _store) = test_context();

    text_editor(&ctx, "create", "/notes/jp.txt", Some("日本語のテキスト")).expect("create");
    let counted = count_chars(&ctx, "/notes/jp.txt").expect("count");

    assert!(counted.success);
    assert_eq!(counted.character_count, 8);
    let breakdown = &counted.analysis_metadata.character_breakdown;
    assert_eq!(breakdown.kanji, 3);
    assert_eq!(breakdown.hiragana, 1);
    assert_eq!(breakdown.katakana, 4);
}

#[test]
fn diagram_format_is_inferred_from_extension() {
    let ctx = stateless_context();

    let saved = download_diagram(&ctx, "mermaid", "graph TD;A-->B;", "out.svg", None).expect("download");
    assert_eq!(saved.format, "svg");
    assert!(saved.status.contains("successfully"));

    let err = download_diagram(&ctx, "mermaid", "graph TD;A-->B;", "out", None).expect_err("no format");
    assert_eq!(err.kind, ToolErrorKind::InvalidInput);
}

#[test]
fn posted_content_appears_in_the_feed() {
    let (ctx, _store) = test_context();

    post_content(&ctx, "Hello", "First post from the session", &[]).expect("post");
    post_content(&ctx, "Again", "Second post", &["rust".to_string()]).expect("post");

    let page = get_contents(&ctx, None, None, None).expect("contents");
    let leading: Vec<&str> = page.contents.iter().take(2).map(|item| item.body.as_str()).collect();
    assert_eq!(leading, vec!["Second post", "First post from the session"]);
    assert_eq!(page.contents.len(), 4);
}

#[test]
fn purchases_show_up_in_the_inventory() {
    let (ctx, store) = test_context();

    buy_item(&ctx, "Iron Shield", None).expect("buy");
    buy_item(&ctx, "Mana Potion", Some(2)).expect("buy");

    let inventory = get_inventory(&ctx).expect("inventory");
    assert_eq!(inventory.items, vec!["Iron Shield", "Mana Potion", "Mana Potion"]);
    assert_eq!(inventory.item_count, 3);
    assert_eq!(inventory.content, "Iron Shield, Mana Potion, Mana Potion");
    assert_eq!(store.get_inventory().unwrap(), inventory.items);
}

#[test]
fn remembered_notes_are_found_by_search() {
    let (ctx, _store) = test_context();

    memory_add(&ctx, "The deploy window is Tuesday").expect("add");
    let found = memory_search(&ctx, "DEPLOY").expect("search");

    assert_eq!(found.results.len(), 1);
    assert_eq!(found.results[0].text, "The deploy window is Tuesday");
    assert_eq!(found.results[0].timestamp.as_deref(), Some("2025-01-01T00:00:00Z"));
    assert!(found.results[0].relevance < 1.0);
}

#[test]
fn editor_delete_clears_the_workspace_entry() {
    let (ctx, store) = test_context();

    text_editor(&ctx, "create", "/scratch/a.txt", Some("a")).expect("create");
    text_editor(&ctx, "create", "/scratch/b.txt", Some("b")).expect("create");
    text_editor(&ctx, "remove", "/scratch/a.txt", None).expect("remove");

    assert_eq!(store.list_files("/scratch/").unwrap(), vec!["/scratch/b.txt"]);
    let viewed = text_editor(&ctx, "view", "/scratch/a.txt", None).expect("view");
    assert_eq!(viewed.content, tool_fixtures::catalog::files::MOCK_FILE_TEXT);
}

#[test]
fn blank_diagram_format_uses_the_extension() {
    let (ctx, store) = test_context();

    let saved = download_diagram(&ctx, "graphviz", "digraph{a->b}", "/d/g.svg", Some("")).expect("download");
    assert_eq!(saved.format, "svg");
    assert!(store.read_file("/d/g.svg").unwrap().is_some_and(|svg| svg.starts_with("<svg")));
}

#[test]
fn stateful_tools_serve_mock_responses_without_a_store() {
    let ctx = stateless_context();

    let viewed = text_editor(&ctx, "view", "/missing.txt", None).expect("view");
    assert!(viewed.success);
    assert!(!viewed.content.is_empty());

    let inventory = get_inventory(&ctx).expect("inventory");
    assert_eq!(inventory.items, vec!["Wooden Sword", "Health Potion"]);

    let page = get_contents(&ctx, None, None, None).expect("contents");
    assert_eq!(page.contents.len(), 2);
}

#[test]
fn failing_store_never_breaks_the_response() {
    let ctx = failing_context();

    let bought = buy_item(&ctx, "Iron Shield", None).expect("buy");
    assert!(bought.success);

    let inventory = get_inventory(&ctx).expect("inventory");
    assert_eq!(inventory.items, vec!["Wooden Sword", "Health Potion"]);

    let posted = post_content(&ctx, "Title", "Body", &[]).expect("post");
    assert_eq!(posted.title, "Title");
}

#[test]
fn heroes_limit_is_enforced() {
    let ctx = stateless_context();

    let heroes = get_player_heroes(&ctx, 76_561_198, Some(1)).expect("heroes");
    assert_eq!(heroes.heroes.len(), 1);

    let err = get_player_heroes(&ctx, 76_561_198, Some(0)).expect_err("limit");
    assert_eq!(err.kind, ToolErrorKind::InvalidInput);
}

#[test]
fn heuristic_classification_of_file_commands() {
    let repos = Args::new().with("owner", "octocat");
    assert!(Intent::infer(Domain::Files, "list_repos", &repos).is_empty());

    let create = Args::new()
        .with("command", "create")
        .with("path", "/a.txt")
        .with("file_text", "hello");
    let intents = Intent::infer(Domain::Files, TEXT_EDITOR, &create);
    assert_eq!(
        intents.as_slice(),
        [Intent::Write {
            path: "/a.txt".to_string(),
            content: "hello".to_string()
        }]
    );

    let view = Args::new().with("command", "view").with("path", "/a.txt");
    assert_eq!(
        Intent::infer(Domain::Files, TEXT_EDITOR, &view).as_slice(),
        [Intent::Read {
            path: "/a.txt".to_string()
        }]
    );
}

#[tokio::test]
async fn registry_session_shares_one_store() {
    let (ctx, store) = test_context();
    let registry = ToolRegistry::new();
    assert_eq!(register_catalog(&registry, &ctx), 0);
    assert_eq!(registry.count(), CATALOG.len());

    registry
        .execute(BUY_ITEM, json!({"item": "Dragon Scale", "quantity": 1}).to_string())
        .await
        .expect("buy");
    registry
        .execute(POST_CONTENT, json!({"title": "Loot", "body": "Found a dragon scale"}).to_string())
        .await
        .expect("post");
    registry
        .execute(
            DOWNLOAD_DIAGRAM,
            json!({"type": "graphviz", "content": "digraph{a->b}", "outputPath": "/g.svg"}).to_string(),
        )
        .await
        .expect("diagram");

    let inventory = parse_output(registry.execute(GET_INVENTORY, "{}".to_string()).await);
    assert_eq!(inventory["items"], json!(["Dragon Scale"]));

    let snapshot = store.snapshot().expect("snapshot");
    assert_eq!(snapshot.feed, vec!["Found a dragon scale"]);
    assert!(snapshot.files.contains_key("/g.svg"));

    let missing = registry.execute("no_such_tool", "{}".to_string()).await.expect_err("unknown");
    assert_eq!(missing.kind, ToolErrorKind::NotFound);
}

#[tokio::test]
async fn registry_editor_accepts_content_argument() {
    let (ctx, store) = test_context();
    let registry = ToolRegistry::new();
    register_catalog(&registry, &ctx);

    registry
        .execute(
            TEXT_EDITOR,
            json!({"command": "create", "path": "/a.txt", "content": "hello"}).to_string(),
        )
        .await
        .expect("create");
    assert_eq!(store.read_file("/a.txt").unwrap().as_deref(), Some("hello"));

    let viewed = parse_output(
        registry
            .execute(TEXT_EDITOR, json!({"command": "view", "path": "/a.txt"}).to_string())
            .await,
    );
    assert_eq!(viewed["content"], "hello");
}

#[tokio::test]
async fn every_catalog_tool_rejects_malformed_json() {
    let registry = ToolRegistry::new();
    register_catalog(&registry, &stateless_context());

    for name in registry.list_tools() {
        let err = registry.execute(&name, "not json".to_string()).await.expect_err(&name);
        assert_eq!(err.kind, ToolErrorKind::InvalidInput, "{name}");
    }
}

proptest! {
    #[test]
    fn editor_reads_back_what_it_wrote(
        path in "/[a-z]{1,8}/[a-z]{1,8}\\.txt",
        content in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,63}",
    ) {
        let (ctx, _store) = test_context();
        text_editor(&ctx, "create", &path, Some(content.as_str())).expect("create");
        let viewed = text_editor(&ctx, "view", &path, None).expect("view");
        prop_assert_eq!(viewed.content, content);
    }
}
