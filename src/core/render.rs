//! Renderer module
//!
//! Renders a ResultSet to jsonl, json, md or raw output.

use crate::core::model::{Kind, ResultItem, ResultSet};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for result sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a result set to a string
    pub fn render(&self, result_set: &ResultSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result_set),
            OutputFormat::Json => self.render_json(result_set),
            OutputFormat::Markdown => self.render_markdown(result_set),
            OutputFormat::Raw => self.render_raw(result_set),
        }
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, result_set: &ResultSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown
    fn render_markdown(&self, result_set: &ResultSet) -> String {
        let mut out = String::from("# Results\n\n");
        for item in &result_set.items {
            out.push_str(&self.markdown_line(item));
            out.push('\n');
        }
        out
    }

    fn markdown_line(&self, item: &ResultItem) -> String {
        let path = item.path.as_deref().unwrap_or("<none>");
        match item.kind {
            Kind::Item => {
                let size = item
                    .meta
                    .size
                    .map(|s| format!(" ({} bytes)", s))
                    .unwrap_or_default();
                let checksum = item
                    .meta
                    .checksum
                    .as_deref()
                    .map(|c| format!(" `{}`", c))
                    .unwrap_or_default();
                let conflict = if item.meta.conflict { " **conflict**" } else { "" };
                format!("- **{}**{}{}{}", path, size, checksum, conflict)
            }
            Kind::Path => format!("- {}", path),
            Kind::Region => {
                let range = item
                    .range
                    .map(|r| format!("{}..{}", r.start, r.end))
                    .unwrap_or_default();
                format!("- region {}", range)
            }
            Kind::Error => {
                let message = item
                    .errors
                    .first()
                    .map(|e| e.message.as_str())
                    .unwrap_or("unknown error");
                format!("- error: {}", message)
            }
        }
    }

    /// Render paths only, one per line
    fn render_raw(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| item.path.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
