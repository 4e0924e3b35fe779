//! File-domain tools
//!
//! These tools share the virtual file table: a diagram downloaded by
//! `kroki_server_download_diagram` can be viewed with `text_editor` or counted by
//! `japanese_text_analyzer_count_chars`.

use crate::executor::executor;
use crate::stateful::{ApiResponse, call_external_api};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use tool_fixtures_core::intent::CONTENT_KEYS;
use tool_fixtures_core::{
    Args, Domain, FlatRecord, Intent, IntentPlan, Intents, Tool, ToolContext, ToolError,
    ToolExecutorFn,
};

/// Name of the text editor tool
pub const TEXT_EDITOR: &str = "text_editor";

/// Name of the Kroki download tool
pub const DOWNLOAD_DIAGRAM: &str = "kroki_server_download_diagram";

/// Name of the Japanese character counter
pub const COUNT_CHARS: &str = "japanese_text_analyzer_count_chars";

/// Body served for files the workspace does not hold
pub const MOCK_FILE_TEXT: &str = "Hello from the mock workspace.\n";

// ---------------------------------------------------------------------------
// text_editor
// ---------------------------------------------------------------------------

/// Result of one editor command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEditorResponse {
    /// Command that ran
    pub command: String,
    /// Target path
    pub path: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// File content after the command
    pub content: String,
}

/// Run an editor command (`view`, `create`, `update`, `delete`, ...)
///
/// The command string is classified by keyword, so `create` and `save` store
/// `file_text` at `path`, `delete` removes it, and `view` and `read` return what
/// is stored there.
///
/// # Errors
///
/// Returns `InvalidInput` if `command` or `path` is blank
pub fn text_editor(
    ctx: &ToolContext,
    command: &str,
    path: &str,
    file_text: Option<&str>,
) -> Result<TextEditorResponse, ToolError> {
    let mut args = Args::new().with("command", command).with("path", path);
    if let Some(text) = file_text {
        args = args.with("file_text", text);
    }
    edit(ctx, &args)
}

/// Run an editor command from raw tool arguments
///
/// The file body may arrive as `content`, `file_text` or `text`. The arguments
/// reach the state layer untouched.
///
/// # Errors
///
/// Returns `InvalidInput` if `command` or `path` is missing, blank, or not a string
pub fn edit(ctx: &ToolContext, args: &Args) -> Result<TextEditorResponse, ToolError> {
    let command = args.require_str("command")?;
    if command.trim().is_empty() {
        return Err(ToolError::invalid_input("command is required"));
    }
    let path = args.require_str("path")?;
    if path.trim().is_empty() {
        return Err(ToolError::invalid_input("path is required"));
    }
    let body = args.first_text(&CONTENT_KEYS);

    let response = call_external_api(ctx, TEXT_EDITOR, args, IntentPlan::Heuristic(Domain::Files), |_| {
        FlatRecord::new()
            .with("command", command)
            .with("path", path)
            .with("success", true)
            .with("message", format!("Executed '{command}' on {path}"))
            .with("content", body.unwrap_or(MOCK_FILE_TEXT))
    });

    let root = response.record.root();
    Ok(TextEditorResponse {
        command: root.string("command")?,
        path: root.string("path")?,
        success: root.boolean("success")?,
        message: root.string("message")?,
        content: root.string("content")?,
    })
}

/// Create the `text_editor` tool
///
/// Returns JSON:
/// ```json
/// {
///   "command": "view",
///   "path": "/notes/todo.txt",
///   "success": true,
///   "message": "Executed 'view' on /notes/todo.txt",
///   "content": "..."
/// }
/// ```
#[must_use]
pub fn text_editor_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: TEXT_EDITOR.to_string(),
        description: "View, create or update files in the workspace".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Editor command (view, create, update, delete)"
                },
                "path": {
                    "type": "string",
                    "description": "File path"
                },
                "file_text": {
                    "type": "string",
                    "description": "File content for create/update"
                },
                "content": {
                    "type": "string",
                    "description": "Alias for file_text"
                }
            },
            "required": ["command", "path"]
        }),
    };

    (tool, executor(TEXT_EDITOR, ctx, edit))
}

// ---------------------------------------------------------------------------
// kroki_server_download_diagram
// ---------------------------------------------------------------------------

/// Diagram languages Kroki renders
pub const DIAGRAM_TYPES: &[&str] = &[
    "actdiag",
    "blockdiag",
    "bpmn",
    "bytefield",
    "c4plantuml",
    "d2",
    "dbml",
    "ditaa",
    "erd",
    "excalidraw",
    "graphviz",
    "mermaid",
    "nomnoml",
    "nwdiag",
    "packetdiag",
    "pikchr",
    "plantuml",
    "rackdiag",
    "seqdiag",
    "structurizr",
    "svgbob",
    "symbolator",
    "tikz",
    "umlet",
    "vega",
    "vegalite",
    "wavedrom",
    "wireviz",
];

/// Output format of a rendered diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    /// Scalable vector graphics
    Svg,
    /// PNG image
    Png,
    /// PDF document
    Pdf,
    /// JPEG image
    Jpeg,
    /// Plain text (ASCII art)
    Txt,
}

impl DiagramFormat {
    /// Format name as Kroki spells it
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
            Self::Jpeg => "jpeg",
            Self::Txt => "txt",
        }
    }

    /// Parse a format name (`jpg` is accepted for JPEG)
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "pdf" => Some(Self::Pdf),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Infer the format from a file extension
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    /// Whether the rendered output is binary (stored base64-encoded)
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(self, Self::Png | Self::Pdf | Self::Jpeg)
    }

    const fn magic(self) -> &'static [u8] {
        match self {
            Self::Png => b"\x89PNG\r\n\x1a\n",
            Self::Pdf => b"%PDF-1.7\n",
            Self::Jpeg => b"\xff\xd8\xff\xe0",
            Self::Svg | Self::Txt => b"",
        }
    }
}

/// Placeholder rendering of a diagram
///
/// SVG output embeds the escaped source, text output is the source itself, and
/// binary formats are a format header followed by the source, base64-encoded.
#[must_use]
pub fn render_diagram(diagram_type: &str, source: &str, format: DiagramFormat) -> String {
    match format {
        DiagramFormat::Svg => {
            let escaped = source
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" data-diagram-type="{diagram_type}"><desc>{escaped}</desc></svg>"#
            )
        }
        DiagramFormat::Txt => source.to_string(),
        DiagramFormat::Png | DiagramFormat::Pdf | DiagramFormat::Jpeg => {
            let mut bytes = format.magic().to_vec();
            bytes.extend_from_slice(source.as_bytes());
            STANDARD.encode(bytes)
        }
    }
}

/// Result of a diagram download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDownloadResponse {
    /// Success message
    pub status: String,
    /// Where the diagram was written
    pub output_path: String,
    /// Format that was rendered
    pub format: String,
    /// Diagram language
    #[serde(rename = "type")]
    pub diagram_type: String,
    /// Size of the stored rendering
    pub size_bytes: i64,
}

fn diagram_write(args: &Args) -> Intents {
    let format = args.text("outputFormat").and_then(DiagramFormat::parse);
    match (args.text("outputPath"), args.text("type"), args.text("content"), format) {
        (Some(path), Some(diagram_type), Some(source), Some(format)) => std::iter::once(Intent::Write {
            path: path.to_string(),
            content: render_diagram(diagram_type, source, format),
        })
        .collect(),
        _ => Intents::new(),
    }
}

/// Render a diagram and save it to `output_path`
///
/// The format comes from `output_format` when given and non-blank, otherwise
/// from the extension of `output_path`.
///
/// # Errors
///
/// Returns `InvalidInput` if the content is blank, the diagram type is unknown,
/// the path is blank, or no supported format can be determined
pub fn download_diagram(
    ctx: &ToolContext,
    diagram_type: &str,
    content: &str,
    output_path: &str,
    output_format: Option<&str>,
) -> Result<DiagramDownloadResponse, ToolError> {
    if content.trim().is_empty() {
        return Err(ToolError::invalid_input("Diagram content cannot be empty"));
    }
    let diagram_type = diagram_type.to_lowercase();
    if !DIAGRAM_TYPES.contains(&diagram_type.as_str()) {
        return Err(ToolError::invalid_input(format!(
            "Unsupported diagram type: {diagram_type}"
        )));
    }
    if output_path.trim().is_empty() {
        return Err(ToolError::invalid_input("outputPath is required"));
    }
    let format = match output_format.filter(|name| !name.trim().is_empty()) {
        Some(name) => DiagramFormat::parse(name)
            .ok_or_else(|| ToolError::invalid_input(format!("Unsupported output format: {name}")))?,
        None => DiagramFormat::from_path(output_path).ok_or_else(|| {
            ToolError::invalid_input(format!(
                "Cannot infer output format from '{output_path}'; pass outputFormat (svg, png, pdf, jpeg, txt)"
            ))
        })?,
    };

    let args = Args::new()
        .with("type", diagram_type.as_str())
        .with("content", content)
        .with("outputPath", output_path)
        .with("outputFormat", format.as_str());

    let response = call_external_api(ctx, DOWNLOAD_DIAGRAM, &args, IntentPlan::Explicit(diagram_write), |_| {
        let size = render_diagram(&diagram_type, content, format).len();
        FlatRecord::new()
            .with(
                "status",
                format!("Diagram successfully downloaded to {output_path} as {}", format.as_str()),
            )
            .with("outputPath", output_path)
            .with("format", format.as_str())
            .with("type", diagram_type.as_str())
            .with("sizeBytes", i64::try_from(size).unwrap_or(i64::MAX))
    });

    let root = response.record.root();
    Ok(DiagramDownloadResponse {
        status: root.string("status")?,
        output_path: root.string("outputPath")?,
        format: root.string("format")?,
        diagram_type: root.string("type")?,
        size_bytes: root.int("sizeBytes")?,
    })
}

fn run_download_diagram(ctx: &ToolContext, args: &Args) -> Result<DiagramDownloadResponse, ToolError> {
    download_diagram(
        ctx,
        args.require_str("type")?,
        args.require_str("content")?,
        args.require_str("outputPath")?,
        args.opt_str("outputFormat")?.filter(|name| !name.is_empty()),
    )
}

/// Create the `kroki_server_download_diagram` tool
#[must_use]
pub fn download_diagram_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: DOWNLOAD_DIAGRAM.to_string(),
        description: "Render a diagram with Kroki and save it to a file".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "enum": DIAGRAM_TYPES,
                    "description": "Diagram language"
                },
                "content": {
                    "type": "string",
                    "description": "Diagram source"
                },
                "outputPath": {
                    "type": "string",
                    "description": "Destination file path"
                },
                "outputFormat": {
                    "type": "string",
                    "enum": ["svg", "png", "pdf", "jpeg", "txt"],
                    "description": "Output format (inferred from outputPath when omitted)"
                }
            },
            "required": ["type", "content", "outputPath"]
        }),
    };

    (tool, executor(DOWNLOAD_DIAGRAM, ctx, run_download_diagram))
}

// ---------------------------------------------------------------------------
// japanese_text_analyzer_count_chars
// ---------------------------------------------------------------------------

/// Character counts by script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterBreakdown {
    /// CJK ideographs
    pub kanji: i64,
    /// Hiragana
    pub hiragana: i64,
    /// Katakana
    pub katakana: i64,
    /// Everything else except whitespace
    pub other: i64,
}

impl CharacterBreakdown {
    /// Count the non-whitespace characters of `text` by script
    #[must_use]
    pub fn of(text: &str) -> Self {
        let mut breakdown = Self::default();
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            match c {
                '\u{3040}'..='\u{309F}' => breakdown.hiragana += 1,
                '\u{30A0}'..='\u{30FF}' => breakdown.katakana += 1,
                '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' => breakdown.kanji += 1,
                _ => breakdown.other += 1,
            }
        }
        breakdown
    }

    /// Sum of every category
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.kanji + self.hiragana + self.katakana + self.other
    }
}

/// Analysis details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// Detected encoding
    pub encoding: String,
    /// Time spent analysing
    pub processing_time_ms: f64,
    /// Counts by script
    pub character_breakdown: CharacterBreakdown,
}

/// Character count of one file
///
/// Failures are reported in the payload (`success: false`), never as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountCharsResponse {
    /// Meaningful characters (whitespace excluded)
    pub character_count: i64,
    /// Normalized path
    pub file_path: String,
    /// Analysis details
    pub analysis_metadata: AnalysisMetadata,
    /// Whether the analysis succeeded
    pub success: bool,
    /// Failure reason, empty on success
    pub error_message: String,
}

impl CountCharsResponse {
    fn failure(file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            character_count: 0,
            file_path: file_path.into(),
            analysis_metadata: AnalysisMetadata {
                encoding: String::new(),
                processing_time_ms: 0.0,
                character_breakdown: CharacterBreakdown::default(),
            },
            success: false,
            error_message: message.into(),
        }
    }
}

/// Convert Windows paths to the WSL form (`C:\Users\x` becomes `/c/Users/x`)
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if !trimmed.contains('\\') {
        return trimmed.to_string();
    }
    let slashed = trimmed.replace('\\', "/");
    let bytes = slashed.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        format!("/{}{}", char::from(bytes[0].to_ascii_lowercase()), &slashed[2..])
    } else {
        slashed
    }
}

fn read_file_path(args: &Args) -> Intents {
    args.text("filePath")
        .map(|path| Intent::Read { path: path.to_string() })
        .into_iter()
        .collect()
}

fn count_record(file_path: &str) -> FlatRecord {
    FlatRecord::new()
        .with("characterCount", 1247)
        .with("filePath", file_path)
        .with("analysisMetadata_encoding", "utf-8")
        .with("analysisMetadata_processingTimeMs", 45.2)
        .with("analysisMetadata_kanjiCount", 342)
        .with("analysisMetadata_hiraganaCount", 512)
        .with("analysisMetadata_katakanaCount", 89)
        .with("analysisMetadata_otherCount", 304)
        .with("success", true)
        .with("errorMessage", "")
}

fn reshape_count(response: &ApiResponse) -> Result<CountCharsResponse, ToolError> {
    let root = response.record.root();
    let file_path = root.string("filePath")?;
    if !root.boolean("success")? {
        let message = root.opt_string("errorMessage")?.unwrap_or_default();
        return Ok(CountCharsResponse::failure(file_path, message));
    }

    let meta = root.scope("analysisMetadata");
    // Stored text is counted for real; otherwise the mock counts stand
    let breakdown = match response.content() {
        Some(text) => CharacterBreakdown::of(text),
        None => CharacterBreakdown {
            kanji: meta.int("kanjiCount")?,
            hiragana: meta.int("hiraganaCount")?,
            katakana: meta.int("katakanaCount")?,
            other: meta.int("otherCount")?,
        },
    };
    let character_count = if response.content().is_some() {
        breakdown.total()
    } else {
        root.int("characterCount")?
    };

    Ok(CountCharsResponse {
        character_count,
        file_path,
        analysis_metadata: AnalysisMetadata {
            encoding: meta.string("encoding")?,
            processing_time_ms: meta.float("processingTimeMs")?,
            character_breakdown: breakdown,
        },
        success: true,
        error_message: String::new(),
    })
}

/// Count the meaningful characters of a file
///
/// A blank path yields an error payload. When the workspace holds the file its
/// text is counted; otherwise the mock analysis is returned.
///
/// # Errors
///
/// Returns `MissingField` if the mock record is incomplete
pub fn count_chars(ctx: &ToolContext, file_path: &str) -> Result<CountCharsResponse, ToolError> {
    if file_path.trim().is_empty() {
        return Ok(CountCharsResponse::failure("", "File path is required"));
    }

    let normalized = normalize_path(file_path);
    let args = Args::new().with("filePath", normalized.as_str());
    let response = call_external_api(ctx, COUNT_CHARS, &args, IntentPlan::Explicit(read_file_path), |_| {
        count_record(&normalized)
    });
    reshape_count(&response)
}

fn run_count_chars(ctx: &ToolContext, args: &Args) -> Result<CountCharsResponse, ToolError> {
    count_chars(ctx, args.opt_str("filePath")?.unwrap_or_default())
}

/// Create the `japanese_text_analyzer_count_chars` tool
#[must_use]
pub fn count_chars_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: COUNT_CHARS.to_string(),
        description: "Count meaningful characters (excluding whitespace) in a text file".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Absolute path (Windows C:\\... or WSL /c/... form)"
                }
            },
            "required": ["filePath"]
        }),
    };

    (tool, executor(COUNT_CHARS, ctx, run_count_chars))
}
