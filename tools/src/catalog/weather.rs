//! US weather observations

use crate::executor::executor;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tool_fixtures_core::{Args, FlatRecord, Tool, ToolContext, ToolError, ToolExecutorFn};

/// Name of the current weather tool
pub const CURRENT_WEATHER: &str = "united_states_weather_get_current_weather";

/// Latest observation near a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherResponse {
    /// Coordinates as `lat,lng`
    pub location: String,
    /// Observation station ID
    pub station: String,
    /// Observation time in local time
    pub observed_at_local: String,
    /// Age of the observation
    pub observation_age_minutes: i64,
    /// Air temperature (°F)
    pub temperature_fahrenheit: f64,
    /// Air temperature (°C)
    pub temperature_celsius: f64,
    /// Conditions description
    pub conditions: String,
    /// Apparent temperature (°F)
    pub feels_like_fahrenheit: f64,
    /// Apparent temperature (°C)
    pub feels_like_celsius: f64,
    /// Index behind the apparent temperature
    pub feels_like_type: String,
    /// Relative humidity
    pub humidity_percent: f64,
    /// Wind speed
    pub wind_speed_mph: f64,
    /// Wind direction (degrees from north)
    pub wind_direction_degrees: i64,
    /// Pressure
    pub pressure_inhg: f64,
    /// Visibility
    pub visibility_miles: f64,
}

/// Parse `lat,lng` in decimal degrees
///
/// # Errors
///
/// Returns `InvalidInput` if the text is malformed or out of range
pub fn parse_coordinates(location: &str) -> Result<(f64, f64), ToolError> {
    if location.trim().is_empty() {
        return Err(ToolError::invalid_input("Location parameter is required"));
    }
    let malformed =
        || ToolError::invalid_input("Location must be in 'lat,lng' format with valid decimal numbers");
    let (lat, lng) = location.split_once(',').ok_or_else(malformed)?;
    let lat: f64 = lat.trim().parse().map_err(|_| malformed())?;
    let lng: f64 = lng.trim().parse().map_err(|_| malformed())?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(ToolError::invalid_input("Latitude must be between -90 and 90 degrees"));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(ToolError::invalid_input("Longitude must be between -180 and 180 degrees"));
    }
    Ok((lat, lng))
}

fn weather_record(lat: f64, lng: f64) -> FlatRecord {
    FlatRecord::new()
        .with("location", format!("{lat:.4},{lng:.4}"))
        .with("station", "KOKC")
        .with("observed_at_local", "3/15/2024, 2:30 PM")
        .with("observation_age_minutes", 15)
        .with("temperature_fahrenheit", 72.5)
        .with("temperature_celsius", 22.5)
        .with("conditions", "Clear")
        .with("feels_like_fahrenheit", 75.0)
        .with("feels_like_celsius", 23.9)
        .with("feels_like_type", "heat index")
        .with("humidity_percent", 65.0)
        .with("wind_speed_mph", 8.5)
        .with("wind_direction_degrees", 180)
        .with("pressure_inhg", 29.92)
        .with("visibility_miles", 10.0)
}

/// Current conditions at `location` (`lat,lng`)
///
/// # Errors
///
/// Returns `InvalidInput` if the coordinates are malformed or out of range
pub fn get_current_weather(_ctx: &ToolContext, location: &str) -> Result<CurrentWeatherResponse, ToolError> {
    let (lat, lng) = parse_coordinates(location)?;
    let record = weather_record(lat, lng);
    let root = record.root();

    Ok(CurrentWeatherResponse {
        location: root.string("location")?,
        station: root.string("station")?,
        observed_at_local: root.string("observed_at_local")?,
        observation_age_minutes: root.int("observation_age_minutes")?,
        temperature_fahrenheit: root.float("temperature_fahrenheit")?,
        temperature_celsius: root.float("temperature_celsius")?,
        conditions: root.string("conditions")?,
        feels_like_fahrenheit: root.float("feels_like_fahrenheit")?,
        feels_like_celsius: root.float("feels_like_celsius")?,
        feels_like_type: root.string("feels_like_type")?,
        humidity_percent: root.float("humidity_percent")?,
        wind_speed_mph: root.float("wind_speed_mph")?,
        wind_direction_degrees: root.int("wind_direction_degrees")?,
        pressure_inhg: root.float("pressure_inhg")?,
        visibility_miles: root.float("visibility_miles")?,
    })
}

fn run_current_weather(ctx: &ToolContext, args: &Args) -> Result<CurrentWeatherResponse, ToolError> {
    get_current_weather(ctx, args.require_str("location")?)
}

/// Create the `united_states_weather_get_current_weather` tool
#[must_use]
pub fn current_weather_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: CURRENT_WEATHER.to_string(),
        description: "Get current weather conditions for a location in the United States".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Coordinates as 'lat,lng' in decimal degrees, e.g. '40.7128,-74.0060'"
                }
            },
            "required": ["location"]
        }),
    };

    (tool, executor(CURRENT_WEATHER, ctx, run_current_weather))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use tool_fixtures_core::ToolErrorKind;
    use tool_fixtures_testing::{keys, parse_output, stateless_context};

    #[test]
    fn test_parse_coordinates() {
        let (lat, lng) = parse_coordinates(" 40.7128 , -74.0060 ").expect("coordinates");
        assert!((lat - 40.7128).abs() < 1e-9);
        assert!((lng + 74.006).abs() < 1e-9);

        for bad in ["", "40.7", "north,west", "1,2,3", "91,0", "0,-181"] {
            let err = parse_coordinates(bad).expect_err(bad);
            assert_eq!(err.kind, ToolErrorKind::InvalidInput, "{bad}");
        }
    }

    #[test]
    fn test_weather_echoes_location_and_is_idempotent() {
        let ctx = stateless_context();
        let first = get_current_weather(&ctx, "40.7128,-74.0060").expect("weather");
        assert_eq!(first.location, "40.7128,-74.0060");
        assert_eq!(first, get_current_weather(&ctx, "40.7128,-74.0060").expect("weather"));
    }

    #[tokio::test]
    async fn test_executor_schema() {
        let (_, run) = current_weather_tool(&stateless_context());
        let output = parse_output(run(json!({"location": "61.2181,-149.9003"}).to_string()).await);
        assert_eq!(keys(&output).len(), 15);
        assert_eq!(output["conditions"], "Clear");
    }
}
