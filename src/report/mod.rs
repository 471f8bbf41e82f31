//! Plain-text analysis report built from rendered result cards.
//!
//! The text layout is consumed by people pasting it into e-mails, so every
//! banner, bullet and indent is fixed.

pub mod snapshot;

use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

pub use snapshot::{AnalysisReportCard, InconsistencyEntry, InconsistencyGroup};

pub const REPORT_BANNER: &str = "=== RELATÓRIO DE ANÁLISE - CADASTRO DE MERCADORIAS ===";
pub const REPORT_FOOTER: &str = "=== FIM DO RELATÓRIO ===";
pub const NO_INCONSISTENCIES: &str = "Nenhuma inconsistência encontrada.";
const MISSING: &str = "-";

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Renders every card in order. No cards gives an empty string.
pub fn synthesize(cards: &[AnalysisReportCard]) -> String {
    let mut out = String::new();
    for card in cards {
        out.push_str(&render_card(card));
        out.push('\n');
    }
    out
}

fn render_card(card: &AnalysisReportCard) -> String {
    let file_name = card
        .file_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(MISSING);
    let total = displayed(&card.total);
    let valid = displayed(&card.valid);
    let invalid = displayed(&card.invalid);

    let mut text = String::new();
    let _ = writeln!(text, "{REPORT_BANNER}");
    let _ = writeln!(text, "ARQUIVO ANALISADO: {file_name}");
    text.push('\n');
    text.push_str("RESUMO GERAL:\n");
    let _ = writeln!(text, "• Total de registros processados: {total}");
    let _ = writeln!(text, "• Registros válidos: {valid}");
    let _ = writeln!(text, "• Registros com erro: {invalid}");
    let _ = writeln!(text, "• Taxa de sucesso: {}%", success_rate(valid, total));

    match card.inconsistencies.as_deref() {
        Some(groups) => {
            text.push_str("\nINCONSISTÊNCIAS ENCONTRADAS:\n");
            for group in groups {
                render_group(&mut text, group);
            }
        }
        None => {
            let _ = writeln!(text, "\n{NO_INCONSISTENCIES}");
        }
    }

    let _ = writeln!(text, "{REPORT_FOOTER}");
    text
}

fn render_group(text: &mut String, group: &InconsistencyGroup) {
    if let Some(title) = group.title.as_deref() {
        let _ = write!(text, "\n{}:\n\n", title.trim().to_uppercase());
    }
    for entry in group.entries.iter() {
        let label = entry.label.as_deref().map(str::trim).unwrap_or_default();
        let _ = write!(text, "   - {label}*: {}", reason_text(entry));
        for example in entry.examples.iter().flatten() {
            let _ = write!(text, "\n      - {}", example.trim());
        }
        text.push_str("\n\n");
    }
}

fn displayed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or(MISSING)
}

/// The reason part of an entry line: the label and the first dash are cut
/// out, whitespace runs become one space.
pub fn reason_text(entry: &InconsistencyEntry) -> String {
    let label = entry.label.as_deref().map(str::trim).unwrap_or_default();
    let without_label = entry.text.replacen(label, "", 1);
    let without_dash = without_label.replacen('—', "", 1);
    whitespace_run()
        .replace_all(without_dash.trim(), " ")
        .trim()
        .to_string()
}

/// Share of valid rows, rounded to the nearest percent (halves round up).
/// Anything that doesn't read as a number, or a zero total, gives `0`.
pub fn success_rate(valid: &str, total: &str) -> String {
    let (Some(valid), Some(total)) = (display_number(valid), display_number(total)) else {
        return "0".to_string();
    };
    if total <= 0.0 {
        return "0".to_string();
    }
    let percent = (valid / total * 100.0 + 0.5).floor();
    if percent.is_nan() {
        "0".to_string()
    } else if percent.is_infinite() {
        let sign = if percent > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else {
        format!("{}", percent as i64)
    }
}

/// Reads a displayed counter the way a browser's `Number()` would: blank
/// text is zero, hex/octal/binary prefixes are accepted, `inf`/`nan`
/// spellings are not.
fn display_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = text.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }
    let lower = text.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return None;
    }
    text.parse::<f64>().ok()
}
