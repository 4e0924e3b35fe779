//! Download speed measurement

use crate::executor::executor;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tool_fixtures_core::{Args, FlatRecord, Tool, ToolContext, ToolError, ToolExecutorFn};

/// Name of the download speed tool
pub const DOWNLOAD_SPEED: &str = "internet_speed_test_measure_download_speed";

/// Test file sizes, smallest first, with their size in bytes
pub const SIZE_LIMITS: [(&str, i64); 8] = [
    ("128KB", 128 * 1024),
    ("512KB", 512 * 1024),
    ("1MB", 1024 * 1024),
    ("2MB", 2 * 1024 * 1024),
    ("5MB", 5 * 1024 * 1024),
    ("10MB", 10 * 1024 * 1024),
    ("50MB", 50 * 1024 * 1024),
    ("100MB", 100 * 1024 * 1024),
];

const DEFAULT_SIZE_LIMIT: &str = "100MB";

/// CDN edge that served the test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// CDN provider
    pub cdn_provider: String,
    /// Point of presence code
    pub pop_code: String,
    /// Point of presence location
    pub pop_location: String,
    /// Serving host
    pub served_by: String,
    /// `Via` header
    pub via_header: String,
    /// Cache status
    pub cache_status: String,
    /// Server address
    pub server_ip_info: String,
    /// `X-Cache` header
    pub x_cache: String,
}

/// One incremental download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedSample {
    /// File size label
    pub size: String,
    /// Measured speed (Mbps)
    pub speed: f64,
    /// Download time in seconds
    pub elapsed_time: f64,
}

/// Download speed result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSpeedResponse {
    /// Final measured speed
    pub download_speed: f64,
    /// Speed unit
    pub unit: String,
    /// Time of the final download in seconds
    pub elapsed_time: f64,
    /// Bytes in the final download
    pub data_size: i64,
    /// Size label of the final download
    pub size_used: String,
    /// Serving edge
    pub server_info: ServerInfo,
    /// Incremental downloads below the final size
    pub all_tests: Vec<SpeedSample>,
}

/// Byte size of a size label, if supported
#[must_use]
pub fn size_in_bytes(label: &str) -> Option<i64> {
    SIZE_LIMITS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(label))
        .map(|(_, bytes)| *bytes)
}

fn speed_record(size_used: &str, data_size: i64) -> FlatRecord {
    FlatRecord::new()
        .with("download_speed", 94.5)
        .with("unit", "Mbps")
        .with("elapsed_time", 8.43)
        .with("data_size", data_size)
        .with("size_used", size_used)
        .with("server_info_cdn_provider", "Cloudflare")
        .with("server_info_pop_code", "SFO")
        .with("server_info_pop_location", "San Francisco, CA")
        .with("server_info_served_by", "origin-server-23")
        .with("server_info_via_header", "1.1 google, 1.1 cdn")
        .with("server_info_cache_status", "HIT")
        .with("server_info_server_ip_info", "104.16.249.249")
        .with("server_info_x_cache", "HIT from CDN")
        .with("all_tests_0_size", "10MB")
        .with("all_tests_0_speed", 87.2)
        .with("all_tests_0_elapsed_time", 0.92)
        .with("all_tests_1_size", "50MB")
        .with("all_tests_1_speed", 91.8)
        .with("all_tests_1_elapsed_time", 4.37)
}

/// Measure download speed with files up to `size_limit` (default `100MB`)
///
/// # Errors
///
/// Returns `InvalidInput` if `size_limit` is not one of [`SIZE_LIMITS`]
pub fn measure_download_speed(
    _ctx: &ToolContext,
    size_limit: Option<&str>,
) -> Result<DownloadSpeedResponse, ToolError> {
    let label = size_limit.unwrap_or(DEFAULT_SIZE_LIMIT).trim();
    let data_size = size_in_bytes(label).ok_or_else(|| {
        let supported: Vec<&str> = SIZE_LIMITS.iter().map(|(name, _)| *name).collect();
        ToolError::invalid_input(format!(
            "Unsupported size_limit '{label}'. Must be one of: {}",
            supported.join(", ")
        ))
    })?;

    let record = speed_record(&label.to_uppercase(), data_size);
    let root = record.root();
    let server = root.scope("server_info");

    let all_tests = root
        .indices("all_tests")
        .into_iter()
        .map(|index| -> Result<SpeedSample, ToolError> {
            let sample = root.item("all_tests", index);
            Ok(SpeedSample {
                size: sample.string("size")?,
                speed: sample.float("speed")?,
                elapsed_time: sample.float("elapsed_time")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DownloadSpeedResponse {
        download_speed: root.float("download_speed")?,
        unit: root.string("unit")?,
        elapsed_time: root.float("elapsed_time")?,
        data_size: root.int("data_size")?,
        size_used: root.string("size_used")?,
        server_info: ServerInfo {
            cdn_provider: server.string("cdn_provider")?,
            pop_code: server.string("pop_code")?,
            pop_location: server.string("pop_location")?,
            served_by: server.string("served_by")?,
            via_header: server.string("via_header")?,
            cache_status: server.string("cache_status")?,
            server_ip_info: server.string("server_ip_info")?,
            x_cache: server.string("x_cache")?,
        },
        all_tests,
    })
}

fn run_download_speed(ctx: &ToolContext, args: &Args) -> Result<DownloadSpeedResponse, ToolError> {
    measure_download_speed(ctx, args.opt_str("size_limit")?)
}

/// Create the `internet_speed_test_measure_download_speed` tool
#[must_use]
pub fn download_speed_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let sizes: Vec<&str> = SIZE_LIMITS.iter().map(|(name, _)| *name).collect();
    let tool = Tool {
        name: DOWNLOAD_SPEED.to_string(),
        description: "Measure download speed using incremental file sizes".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "size_limit": {
                    "type": "string",
                    "enum": sizes,
                    "description": "Maximum file size to test (default 100MB)"
                }
            }
        }),
    };

    (tool, executor(DOWNLOAD_SPEED, ctx, run_download_speed))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use tool_fixtures_core::ToolErrorKind;
    use tool_fixtures_testing::{assert_keys, parse_output, stateless_context};

    #[test]
    fn test_default_size_limit() {
        let response = measure_download_speed(&stateless_context(), None).expect("speed");
        assert_eq!(response.size_used, "100MB");
        assert_eq!(response.data_size, 100 * 1024 * 1024);
        assert_eq!(response.all_tests.len(), 2);
    }

    #[test]
    fn test_size_limit_is_case_insensitive() {
        let response = measure_download_speed(&stateless_context(), Some("10mb")).expect("speed");
        assert_eq!(response.size_used, "10MB");
        assert_eq!(response.data_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_unknown_size_limit() {
        let err = measure_download_speed(&stateless_context(), Some("3GB")).expect_err("unknown");
        assert_eq!(err.kind, ToolErrorKind::InvalidInput);
        assert!(err.message.contains("128KB"));
    }

    #[tokio::test]
    async fn test_executor_schema() {
        let (_, run) = download_speed_tool(&stateless_context());
        let output = parse_output(run("{}".to_string()).await);
        assert_keys(
            &output,
            &["download_speed", "unit", "elapsed_time", "data_size", "size_used", "server_info", "all_tests"],
        );
        assert_keys(&output["all_tests"][1], &["size", "speed", "elapsed_time"]);

        let err = run(json!({"size_limit": 5}).to_string()).await.expect_err("not a string");
        assert_eq!(err.kind, ToolErrorKind::InvalidInput);
    }
}
