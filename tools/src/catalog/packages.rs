//! npm registry lookups

use crate::executor::executor;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tool_fixtures_core::{Args, FlatRecord, Scope, Tool, ToolContext, ToolError, ToolExecutorFn};

/// Name of the latest-version tool
pub const NPM_LATEST: &str = "npm_sentinel_mcp_npm_latest";

/// Longest package name the registry accepts
pub const MAX_PACKAGE_NAME_LEN: usize = 214;

/// Package names that resolve to "not found"
const UNKNOWN_PREFIX: &str = "nonexistent";

/// Registry signature of a tarball
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistSignature {
    /// Signature
    pub sig: String,
    /// Signing key ID
    pub keyid: String,
}

/// Distribution details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistInfo {
    /// SHA-1 of the tarball
    pub shasum: String,
    /// Tarball URL
    pub tarball: String,
    /// Files in the tarball
    pub file_count: i64,
    /// Subresource integrity string
    pub integrity: String,
    /// Unpacked size in bytes
    pub unpacked_size: i64,
    /// PGP signature
    #[serde(rename = "npm-signature")]
    pub npm_signature: String,
    /// Registry signatures
    pub signatures: Vec<DistSignature>,
}

/// Manifest summary of the latest version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageData {
    /// Package name
    pub name: String,
    /// Latest version
    pub version: String,
    /// Description
    pub description: String,
    /// Author
    pub author: String,
    /// License
    pub license: String,
    /// Homepage
    pub homepage: String,
    /// Repository URL
    pub repository_url: String,
    /// Issue tracker URL
    pub bugs_url: String,
    /// Runtime dependency count
    pub dependencies_count: i64,
    /// Development dependency count
    pub dev_dependencies_count: i64,
    /// Peer dependency count
    pub peer_dependencies_count: i64,
    /// Type definitions package, if any
    pub types: Option<String>,
    /// Distribution details
    pub dist: DistInfo,
}

/// Lookup result for one requested package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageResult {
    /// Name as requested
    pub package_input: String,
    /// Resolved package name
    pub package_name: String,
    /// Version tag queried
    pub version_queried: String,
    /// `success` or `error`
    pub status: String,
    /// Error, if the lookup failed
    pub error: Option<String>,
    /// Human-readable summary
    pub message: String,
    /// Manifest summary
    pub data: PackageData,
}

/// Latest versions of the requested packages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpmLatestResponse {
    /// One result per requested package, in request order
    pub results: Vec<PackageResult>,
}

fn validate_package_name(name: &str) -> Result<(), ToolError> {
    if name.trim().is_empty() {
        return Err(ToolError::invalid_input("Package names cannot be empty"));
    }
    if name.len() > MAX_PACKAGE_NAME_LEN {
        return Err(ToolError::invalid_input(format!(
            "Package name exceeds {MAX_PACKAGE_NAME_LEN} characters: {name}"
        )));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_ascii_uppercase()) {
        return Err(ToolError::invalid_input(format!("Invalid package name: {name}")));
    }
    Ok(())
}

fn insert_found(record: &mut FlatRecord, prefix: &str, name: &str) {
    let key = |field: &str| format!("{prefix}_{field}");
    record.insert(key("status"), "success");
    record.insert(key("error"), None::<String>);
    record.insert(key("message"), "Successfully retrieved latest version");
    record.insert(key("data_name"), name);
    record.insert(key("data_version"), "4.18.2");
    record.insert(key("data_description"), "Fast, unopinionated, minimalist web framework");
    record.insert(key("data_author"), "TJ Holowaychuk <tj@vision-media.ca>");
    record.insert(key("data_license"), "MIT");
    record.insert(key("data_homepage"), format!("https://www.npmjs.com/package/{name}"));
    record.insert(key("data_repositoryUrl"), format!("https://github.com/{name}/{name}"));
    record.insert(key("data_bugsUrl"), format!("https://github.com/{name}/{name}/issues"));
    record.insert(key("data_dependenciesCount"), 9);
    record.insert(key("data_devDependenciesCount"), 27);
    record.insert(key("data_peerDependenciesCount"), 0);
    record.insert(key("data_types"), format!("@types/{name}"));
    record.insert(key("data_dist_shasum"), "e5c7a846028baa5156366d7b40f54e6b5d58e3c2");
    record.insert(
        key("data_dist_tarball"),
        format!("https://registry.npmjs.org/{name}/-/{name}-4.18.2.tgz"),
    );
    record.insert(key("data_dist_fileCount"), 128);
    record.insert(
        key("data_dist_integrity"),
        "sha512-312lKT+I4mWYXl1RZk+Ug7ZLhCgDvLZ2dOqR1kMQ6lX3GYDzjJw4DlPmUWBM2cJZzChBxKC6uKCBR2iD13qQ==",
    );
    record.insert(key("data_dist_unpackedSize"), 1_857_624);
    record.insert(key("data_dist_npm_signature"), "-----BEGIN PGP SIGNATURE-----...");
    record.insert(key("data_dist_signatures_0_sig"), "MEUCIQD...AB");
    record.insert(key("data_dist_signatures_0_keyid"), "ABC123DEF456");
    record.insert(key("data_dist_signatures_1_sig"), "MEUCIQD...CD");
    record.insert(key("data_dist_signatures_1_keyid"), "GHI789JKL012");
}

fn insert_missing(record: &mut FlatRecord, prefix: &str, name: &str) {
    let key = |field: &str| format!("{prefix}_{field}");
    record.insert(key("status"), "error");
    record.insert(key("error"), "Package not found");
    record.insert(key("message"), "Failed to retrieve package: not found in registry");
    record.insert(key("data_name"), name);
    for field in [
        "version",
        "description",
        "author",
        "license",
        "homepage",
        "repositoryUrl",
        "bugsUrl",
        "dist_shasum",
        "dist_tarball",
        "dist_integrity",
        "dist_npm_signature",
    ] {
        record.insert(key(&format!("data_{field}")), "");
    }
    for field in [
        "dependenciesCount",
        "devDependenciesCount",
        "peerDependenciesCount",
        "dist_fileCount",
        "dist_unpackedSize",
    ] {
        record.insert(key(&format!("data_{field}")), 0);
    }
    record.insert(key("data_types"), None::<String>);
}

fn latest_record(packages: &[String]) -> FlatRecord {
    let mut record = FlatRecord::new();
    for (index, name) in packages.iter().enumerate() {
        let prefix = format!("result_{index}");
        record.insert(format!("{prefix}_packageInput"), name.as_str());
        record.insert(format!("{prefix}_packageName"), name.as_str());
        record.insert(format!("{prefix}_versionQueried"), "latest");
        if name.starts_with(UNKNOWN_PREFIX) {
            insert_missing(&mut record, &prefix, name);
        } else {
            insert_found(&mut record, &prefix, name);
        }
    }
    record
}

fn reshape_result(result: &Scope<'_>) -> Result<PackageResult, ToolError> {
    let data = result.scope("data");
    let dist = data.scope("dist");
    let signatures = dist
        .indices("signatures")
        .into_iter()
        .map(|index| -> Result<DistSignature, ToolError> {
            let signature = dist.item("signatures", index);
            Ok(DistSignature {
                sig: signature.string("sig")?,
                keyid: signature.string("keyid")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PackageResult {
        package_input: result.string("packageInput")?,
        package_name: result.string("packageName")?,
        version_queried: result.string("versionQueried")?,
        status: result.string("status")?,
        error: result.opt_string("error")?,
        message: result.string("message")?,
        data: PackageData {
            name: data.string("name")?,
            version: data.string("version")?,
            description: data.string("description")?,
            author: data.string("author")?,
            license: data.string("license")?,
            homepage: data.string("homepage")?,
            repository_url: data.string("repositoryUrl")?,
            bugs_url: data.string("bugsUrl")?,
            dependencies_count: data.int("dependenciesCount")?,
            dev_dependencies_count: data.int("devDependenciesCount")?,
            peer_dependencies_count: data.int("peerDependenciesCount")?,
            types: data.opt_string("types")?,
            dist: DistInfo {
                shasum: dist.string("shasum")?,
                tarball: dist.string("tarball")?,
                file_count: dist.int("fileCount")?,
                integrity: dist.string("integrity")?,
                unpacked_size: dist.int("unpackedSize")?,
                npm_signature: dist.string("npm_signature")?,
                signatures,
            },
        },
    })
}

/// Latest published version of each package
///
/// Names starting with `nonexistent` resolve to a per-package error entry.
///
/// # Errors
///
/// Returns `InvalidInput` if the list is empty or a name is not a valid npm
/// package name
pub fn npm_latest(_ctx: &ToolContext, packages: &[String]) -> Result<NpmLatestResponse, ToolError> {
    if packages.is_empty() {
        return Err(ToolError::invalid_input("At least one package name is required"));
    }
    for name in packages {
        validate_package_name(name)?;
    }

    let record = latest_record(packages);
    let root = record.root();
    let results = root
        .indices("result")
        .into_iter()
        .map(|index| reshape_result(&root.item("result", index)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NpmLatestResponse { results })
}

fn run_npm_latest(ctx: &ToolContext, args: &Args) -> Result<NpmLatestResponse, ToolError> {
    npm_latest(ctx, &args.require_str_list("packages")?)
}

/// Create the `npm_sentinel_mcp_npm_latest` tool
#[must_use]
pub fn npm_latest_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: NPM_LATEST.to_string(),
        description: "Get the latest version and manifest summary of npm packages".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "packages": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Package names"
                }
            },
            "required": ["packages"]
        }),
    };

    (tool, executor(NPM_LATEST, ctx, run_npm_latest))
}
