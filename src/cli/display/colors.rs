//! Risk and framework color mapping for CLI output.
//!
//! All coloring respects `NO_COLOR` env var automatically via the `colored` crate.

use colored::Colorize;

use crate::domain::models::RiskLevel;

/// Returns a colored string for an agent's risk level.
///
/// Low = green, Medium = yellow, High = red bold.
pub fn colorize_risk(risk: RiskLevel) -> colored::ColoredString {
    let text = risk.as_str();
    match risk {
        RiskLevel::Low => text.green(),
        RiskLevel::Medium => text.yellow(),
        RiskLevel::High => text.red().bold(),
    }
}

/// Returns a colored string for an optional risk, "-" when unassessed.
pub fn colorize_risk_opt(risk: Option<RiskLevel>) -> String {
    risk.map_or_else(|| "-".dimmed().to_string(), |r| colorize_risk(r).to_string())
}

/// Returns a colored string for an agent framework name.
///
/// Langchain = blue, Custom = dim, anything else = white.
pub fn colorize_framework(framework: &str) -> colored::ColoredString {
    match framework.to_lowercase().as_str() {
        "langchain" => framework.blue(),
        "custom" => framework.dimmed(),
        _ => framework.white(),
    }
}

/// Styled label for detail views (bold + dimmed colon).
pub fn label(name: &str) -> String {
    format!("{}{}", name.bold(), ":".dimmed())
}

/// Section header with underline.
pub fn section_header(title: &str) -> String {
    format!("\n{}", title.bold().underline())
}
