//! Core types for the persona system.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single pet the assistant can consult about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaRecord {
    /// Lookup key, lowercase and unique within a table.
    pub id: String,

    /// Name substituted throughout the generated prompt.
    pub display_name: String,

    /// One-line characterization (species, age, condition).
    pub description: String,

    /// Short guidance strings, rendered as a bullet list.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// On-disk shape of a persona table.
///
/// ```toml
/// default = "mungchi"
///
/// [[persona]]
/// id = "mungchi"
/// display_name = "뭉치"
/// description = "피부염이 있는 4세 남자 시츄"
/// notes = ["주요 고민: 피부염/가려움/피부 컨디션"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaTable {
    /// Id of the persona used when lookup finds no match.
    pub default: String,

    #[serde(rename = "persona", default)]
    pub personas: Vec<PersonaRecord>,
}

impl PersonaTable {
    /// Parse a table from TOML text. `origin` names the source in errors.
    pub fn from_toml_str(origin: &str, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::PersonaTableParse {
            origin: origin.to_string(),
            message: e.to_string(),
        })
    }
}
