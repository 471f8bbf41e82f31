pub mod markup;

use serde::Serialize;

use crate::report::{self, AnalysisReportCard};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

// machine-readable counterpart of one report block
#[derive(Clone, Debug, Serialize)]
pub struct CardSummary {
    pub file_name: String,
    pub total: String,
    pub valid: String,
    pub invalid: String,
    pub success_rate: String,
    pub groups: Vec<GroupSummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GroupSummary {
    pub title: String,
    pub entries: Vec<EntrySummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EntrySummary {
    pub label: String,
    pub reason: String,
    pub examples: Vec<String>,
}

pub fn build_summaries(cards: &[AnalysisReportCard]) -> Vec<CardSummary> {
    cards
        .iter()
        .map(|c| {
            let shown = |v: &Option<String>| {
                v.as_deref()
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|| "-".to_string())
            };
            let total = shown(&c.total);
            let valid = shown(&c.valid);
            let groups = c
                .inconsistencies
                .iter()
                .flatten()
                .map(|g| GroupSummary {
                    title: g.title.as_deref().unwrap_or_default().trim().to_string(),
                    entries: g
                        .entries
                        .iter()
                        .map(|e| EntrySummary {
                            label: e.label.as_deref().unwrap_or_default().trim().to_string(),
                            reason: report::reason_text(e),
                            examples: e
                                .examples
                                .iter()
                                .flatten()
                                .map(|x| x.trim().to_string())
                                .collect(),
                        })
                        .collect(),
                })
                .collect();
            CardSummary {
                file_name: c
                    .file_name
                    .clone()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "-".to_string()),
                success_rate: report::success_rate(&valid, &total),
                total,
                valid,
                invalid: shown(&c.invalid),
                groups,
            }
        })
        .collect()
}

pub fn render_text(cards: &[AnalysisReportCard]) -> Vec<u8> {
    report::synthesize(cards).into_bytes()
}

pub fn render_json(cards: &[AnalysisReportCard]) -> Vec<u8> {
    let mut out =
        serde_json::to_vec_pretty(&build_summaries(cards)).unwrap_or_else(|_| b"[]".to_vec());
    out.push(b'\n');
    out
}

pub(crate) fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
