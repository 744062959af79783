//! `conclave personas`

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::cli::table::TableFormatter;
use crate::domain::models::Config;
use crate::services::PersonaRegistry;

#[derive(Debug, Serialize)]
pub struct PersonaRow {
    pub id: String,
    pub name: String,
    pub analyzer: String,
    pub weight: Option<f64>,
    pub focus_areas: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonaListOutput {
    pub personas: Vec<PersonaRow>,
    #[serde(skip)]
    table: String,
}

impl CommandOutput for PersonaListOutput {
    fn to_human(&self) -> String {
        if self.personas.is_empty() {
            return "No personas configured.".to_string();
        }
        format!("{} persona(s):\n{}", self.personas.len(), self.table)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let registry =
        PersonaRegistry::from_config(&config.personas).context("Invalid persona configuration")?;

    let personas = registry
        .all()
        .iter()
        .map(|r| PersonaRow {
            id: r.persona.id.clone(),
            name: r.persona.name.clone(),
            analyzer: r.analyzer.kind().to_string(),
            weight: r.persona.weight,
            focus_areas: r.persona.focus_areas.clone(),
        })
        .collect();

    let result = PersonaListOutput {
        personas,
        table: TableFormatter::new().format_personas(&registry),
    };
    output(&result, json_mode);
    Ok(())
}
