//! Table output formatting for CLI commands
//!
//! Persona and assessment tables using comfy-table, color-coded by risk
//! when the terminal supports it.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{PersonaSummary, RiskLevel};
use crate::services::PersonaRegistry;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Registered personas and their analyzers
    pub fn format_personas(&self, registry: &PersonaRegistry) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["ID", "Name", "Analyzer", "Weight", "Focus"]));

        for registered in registry.all() {
            let persona = &registered.persona;
            table.add_row(vec![
                Cell::new(&persona.id),
                Cell::new(&persona.name),
                Cell::new(registered.analyzer.kind()),
                Cell::new(persona.weight.map_or_else(|| "-".to_string(), |w| format!("{w:.2}"))),
                Cell::new(persona.focus_areas.join(", ")),
            ]);
        }

        table.to_string()
    }

    /// Per-persona results of one run
    pub fn format_summaries(&self, summaries: &[PersonaSummary]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&[
            "Persona", "Score", "Risk", "Analyzed", "Skipped", "Findings",
        ]));

        for summary in summaries {
            let score = summary
                .mean_score
                .map_or_else(|| "n/a".to_string(), |s| format!("{s:.1}"));
            let risk = summary.risk_level.map_or("-", |r| r.as_str());
            let risk_cell = match summary.risk_level {
                Some(level) if self.use_colors => Cell::new(risk).fg(risk_color(level)),
                _ => Cell::new(risk),
            };

            table.add_row(vec![
                Cell::new(&summary.persona_name),
                Cell::new(score),
                risk_cell,
                Cell::new(summary.analyzed_count),
                Cell::new(summary.skipped_count),
                Cell::new(summary.findings.len()),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
        .collect()
}

const fn risk_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::Low => Color::Green,
        RiskLevel::Medium => Color::Yellow,
        RiskLevel::High => Color::Magenta,
        RiskLevel::Critical => Color::Red,
    }
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Config;

    #[test]
    fn test_format_personas() {
        let registry = PersonaRegistry::from_config(&Config::default().personas).unwrap();
        let table = TableFormatter::with_config(false, Some(120)).format_personas(&registry);
        assert!(table.contains("security"));
        assert!(table.contains("structure"));
    }

    #[test]
    fn test_format_summaries_without_score() {
        let summary = PersonaSummary {
            persona_id: "p".into(),
            persona_name: "Persona".into(),
            weight: None,
            mean_score: None,
            risk_level: None,
            analyzed_count: 0,
            skipped_count: 2,
            skipped: vec![],
            findings: vec![],
            recommendations: vec![],
        };
        let table = TableFormatter::with_config(false, None).format_summaries(&[summary]);
        assert!(table.contains("n/a"));
        assert!(table.contains("Persona"));
    }
}
