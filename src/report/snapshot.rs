use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One analyzed file as rendered on the results page.
///
/// Counts are kept as the text the page displays; they are only parsed to
/// compute the success rate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReportCard {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub valid: Option<String>,
    #[serde(default)]
    pub invalid: Option<String>,
    /// `None` when the card has no inconsistency section at all.
    #[serde(default)]
    pub inconsistencies: Option<Vec<InconsistencyGroup>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InconsistencyGroup {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Vec<InconsistencyEntry>,
}

/// A field/reason line. `text` is the whole displayed line, label included
/// (e.g. `"CNPJ — invalid check digit"`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InconsistencyEntry {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub text: String,
    /// Example list rendered right after the entry, if any.
    #[serde(default)]
    pub examples: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot {path}: {message}")]
    Parse { path: String, message: String },
}

/// Parses a list of cards. YAML is a superset of JSON, so `.json` files go
/// through serde_json for sharper error messages and everything else through
/// serde_yaml.
pub fn parse_cards(contents: &str, json: bool) -> Result<Vec<AnalysisReportCard>, String> {
    if json {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    }
}

pub fn load_cards(path: &Path) -> Result<Vec<AnalysisReportCard>, SnapshotError> {
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: display.clone(),
        source,
    })?;
    let json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    parse_cards(&contents, json).map_err(|message| SnapshotError::Parse {
        path: display,
        message,
    })
}
