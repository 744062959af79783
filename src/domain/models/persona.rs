//! Persona domain model.
//!
//! A persona is a named analytical viewpoint ("security", "performance")
//! with weighted focus areas. Personas are static configuration, loaded once
//! per run and never modified afterwards.

use serde::{Deserialize, Serialize};

/// An expert viewpoint that owns exactly one analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Areas this persona looks at
    #[serde(default)]
    pub focus_areas: Vec<String>,
    /// Weight used when the overall score is a weighted mean
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Persona {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            focus_areas: Vec::new(),
            weight: None,
        }
    }

    pub fn with_focus_area(mut self, area: impl Into<String>) -> Self {
        self.focus_areas.push(area.into());
        self
    }

    pub fn with_focus_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.focus_areas.extend(areas.into_iter().map(Into::into));
        self
    }

    pub const fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}
