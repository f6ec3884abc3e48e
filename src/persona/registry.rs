//! Persona registry: immutable id → persona mapping with a guaranteed default.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};

use super::types::{PersonaRecord, PersonaTable};

const BUNDLED_TABLE: &str = include_str!("../../config/personas.toml");

/// Read-only registry of pet personas.
///
/// Construction validates the table, so every registry holds at least one
/// persona and its default id always resolves.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    /// Personas in table order.
    personas: Vec<PersonaRecord>,

    /// Normalized id → position in `personas`.
    index: HashMap<String, usize>,

    /// Position of the default persona.
    default_idx: usize,
}

impl PersonaRegistry {
    /// Registry built from the persona table shipped with the binary.
    pub fn bundled() -> Result<Self> {
        let table = PersonaTable::from_toml_str("bundled personas", BUNDLED_TABLE)?;
        Self::from_table(table)
    }

    /// Load a registry from a TOML persona table on disk.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading persona table");
        let text = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table = PersonaTable::from_toml_str(&path.display().to_string(), &text)?;
        let registry = Self::from_table(table)?;
        info!(
            path = %path.display(),
            personas = registry.len(),
            default = %registry.default_persona().id,
            "Persona table loaded"
        );
        Ok(registry)
    }

    /// Validate a parsed table and build the registry from it.
    pub fn from_table(table: PersonaTable) -> Result<Self> {
        if table.personas.is_empty() {
            return Err(Error::persona_invalid("table defines no personas"));
        }

        let mut personas = Vec::with_capacity(table.personas.len());
        let mut index = HashMap::with_capacity(table.personas.len());

        for mut record in table.personas {
            record.id = normalize_id(&record.id);
            if record.id.is_empty() {
                return Err(Error::persona_invalid("persona id cannot be empty"));
            }
            if record.display_name.trim().is_empty() {
                return Err(Error::persona_invalid(format!(
                    "persona '{}' has an empty display_name",
                    record.id
                )));
            }
            if index.contains_key(&record.id) {
                return Err(Error::persona_invalid(format!(
                    "duplicate persona id '{}'",
                    record.id
                )));
            }
            index.insert(record.id.clone(), personas.len());
            personas.push(record);
        }

        let default_id = normalize_id(&table.default);
        let default_idx = *index.get(&default_id).ok_or_else(|| {
            Error::persona_invalid(format!(
                "default persona '{}' is not defined in the table",
                table.default
            ))
        })?;

        Ok(Self {
            personas,
            index,
            default_idx,
        })
    }

    /// Resolve an id to a persona, falling back to the default.
    ///
    /// Matching is exact after lowercasing; unknown and empty ids resolve to
    /// the default persona.
    pub fn lookup(&self, id: &str) -> &PersonaRecord {
        self.get(id).unwrap_or_else(|| self.default_persona())
    }

    /// Resolve an id without falling back.
    pub fn get(&self, id: &str) -> Option<&PersonaRecord> {
        self.index
            .get(&normalize_id(id))
            .map(|&idx| &self.personas[idx])
    }

    /// The persona used when lookup finds no match.
    pub fn default_persona(&self) -> &PersonaRecord {
        &self.personas[self.default_idx]
    }

    /// All personas in table order.
    pub fn iter(&self) -> impl Iterator<Item = &PersonaRecord> {
        self.personas.iter()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

fn normalize_id(id: &str) -> String {
    id.to_lowercase()
}
