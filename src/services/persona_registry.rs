//! Persona registry.
//!
//! The [`PersonaRegistry`] pairs every persona with its analyzer and keeps
//! registration order, which is the order the runner evaluates personas and
//! the tie-break order for prioritized recommendations. A registry is built
//! once at startup and then shared behind an `Arc`; nothing mutates it while
//! a run is in progress.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::errors::{AssessmentError, AssessmentResult};
use crate::domain::models::{AnalyzerConfig, Persona, PersonaConfig};
use crate::domain::ports::Analyzer;
use crate::infrastructure::analyzers::{PatternAnalyzer, StructureAnalyzer};

/// A persona together with the analyzer that speaks for it.
#[derive(Clone)]
pub struct RegisteredPersona {
    pub persona: Arc<Persona>,
    pub analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for RegisteredPersona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredPersona")
            .field("persona", &self.persona.id)
            .field("analyzer", &self.analyzer.kind())
            .finish()
    }
}

/// Ordered registry of personas and their analyzers.
#[derive(Debug, Default, Clone)]
pub struct PersonaRegistry {
    entries: Vec<RegisteredPersona>,
    index: HashMap<String, usize>,
}

impl PersonaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a persona. Fails with `DuplicatePersona` if the id is taken.
    pub fn register(
        &mut self,
        persona: Persona,
        analyzer: impl Analyzer + 'static,
    ) -> AssessmentResult<()> {
        self.register_shared(persona, Arc::new(analyzer))
    }

    /// Register a persona with an analyzer that is already shared.
    pub fn register_shared(
        &mut self,
        persona: Persona,
        analyzer: Arc<dyn Analyzer>,
    ) -> AssessmentResult<()> {
        if persona.id.trim().is_empty() {
            return Err(AssessmentError::InvalidConfig(
                "persona id cannot be empty".to_string(),
            ));
        }
        if self.index.contains_key(&persona.id) {
            return Err(AssessmentError::DuplicatePersona(persona.id));
        }

        debug!(persona_id = %persona.id, analyzer = analyzer.kind(), "Registering persona");
        self.index.insert(persona.id.clone(), self.entries.len());
        self.entries.push(RegisteredPersona {
            persona: Arc::new(persona),
            analyzer,
        });
        Ok(())
    }

    /// Build a registry from configuration, compiling each built-in analyzer.
    pub fn from_config(personas: &[PersonaConfig]) -> AssessmentResult<Self> {
        let mut registry = Self::new();

        for config in personas {
            let persona = Persona {
                id: config.id.clone(),
                name: config.name.clone(),
                focus_areas: config.focus_areas.clone(),
                weight: config.weight,
            };

            let analyzer: Arc<dyn Analyzer> = match &config.analyzer {
                AnalyzerConfig::Patterns { rules } => {
                    Arc::new(PatternAnalyzer::compile(&config.id, rules)?)
                }
                AnalyzerConfig::Structure(limits) => {
                    Arc::new(StructureAnalyzer::compile(&config.id, limits)?)
                }
            };

            registry.register_shared(persona, analyzer)?;
        }

        info!(personas = registry.len(), "Persona registry built");
        Ok(registry)
    }

    /// All personas with their analyzers, in registration order.
    pub fn all(&self) -> &[RegisteredPersona] {
        &self.entries
    }

    pub fn personas(&self) -> impl Iterator<Item = &Persona> {
        self.entries.iter().map(|e| e.persona.as_ref())
    }

    pub fn get(&self, persona_id: &str) -> Option<&RegisteredPersona> {
        self.index.get(persona_id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, persona_id: &str) -> bool {
        self.index.contains_key(persona_id)
    }

    /// Registration position of `persona_id`.
    pub fn position(&self, persona_id: &str) -> Option<usize> {
        self.index.get(persona_id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
