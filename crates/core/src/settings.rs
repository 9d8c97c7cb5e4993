//! Built-in mappings and JSON import/export of mapping documents.
//!
//! Documents carry export metadata that is informational only: importing
//! reads the `mappings` list and ignores everything else.

use crate::models::{ConditionKind, MappingEntry, MappingsDocument, MappingsMetadata};
use crate::table::MappingTable;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Document format version written on export
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid mappings document: {0}")]
    JsonError(#[from] serde_json::Error),
}

const GREEK_LETTERS: &[(&str, &str)] = &[
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("zeta", "ζ"),
    ("eta", "η"),
    ("theta", "θ"),
    ("iota", "ι"),
    ("kappa", "κ"),
    ("mu", "μ"),
    ("nu", "ν"),
    ("xi", "ξ"),
    ("omicron", "ο"),
    ("pi", "π"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("upsilon", "υ"),
    ("phi", "φ"),
    ("chi", "χ"),
    ("psi", "ψ"),
    ("omega", "ω"),
];

/// The built-in mapping set
pub fn default_entries() -> Vec<MappingEntry> {
    let mut entries = vec![
        MappingEntry::new(">=", "≥", "Comparison"),
        MappingEntry::new("<=", "≤", "Comparison"),
        MappingEntry::new("!=", "≠", "Comparison"),
        MappingEntry::new("->", "➔", "Arrow"),
        MappingEntry::new("lambda", "λ", "Keyword"),
        MappingEntry::new("**", "^", "Operator")
            .with_condition(ConditionKind::ParentIsBinaryExpression),
    ];
    entries.extend(
        GREEK_LETTERS
            .iter()
            .map(|(name, glyph)| MappingEntry::new(*name, *glyph, "Greek Letters")),
    );
    entries
}

/// Table equals the built-in set, ignoring order
pub fn is_default(table: &MappingTable) -> bool {
    let mut current: Vec<&MappingEntry> = table.all();
    let mut defaults = default_entries();
    if current.len() != defaults.len() {
        return false;
    }
    current.sort_by(|a, b| a.source.cmp(&b.source));
    defaults.sort_by(|a, b| a.source.cmp(&b.source));
    current.iter().zip(&defaults).all(|(a, b)| *a == b)
}

impl MappingsDocument {
    /// Snapshot a table for export
    pub fn export(table: &MappingTable, plugin_version: &str, ide_version: &str) -> Self {
        Self::export_at(table, plugin_version, ide_version, Utc::now())
    }

    pub fn export_at(
        table: &MappingTable,
        plugin_version: &str,
        ide_version: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let mappings: Vec<MappingEntry> = table.all().into_iter().cloned().collect();
        Self {
            metadata: MappingsMetadata {
                version: DOCUMENT_VERSION,
                export_date: now.to_rfc3339(),
                plugin_version: plugin_version.to_string(),
                ide_version: ide_version.to_string(),
                mappings_count: mappings.len(),
                comment: String::new(),
            },
            categories: table.categories().into_iter().map(str::to_string).collect(),
            mappings,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a table from the document's mappings (later duplicates win)
    pub fn to_table(&self) -> MappingTable {
        if self.metadata.mappings_count != 0 && self.metadata.mappings_count != self.mappings.len() {
            tracing::warn!(
                declared = self.metadata.mappings_count,
                actual = self.mappings.len(),
                "mappingsCount does not match mappings"
            );
        }
        MappingTable::from_entries(self.mappings.iter().cloned())
    }
}

/// Read a mappings document from disk
pub fn import_file(path: &Path) -> Result<MappingsDocument, SettingsError> {
    let json = fs::read_to_string(path)?;
    let document = MappingsDocument::from_json(&json)?;
    tracing::info!(
        path = %path.display(),
        mappings = document.mappings.len(),
        "imported mappings"
    );
    Ok(document)
}

/// Write a mappings document to disk as pretty JSON
pub fn export_file(path: &Path, document: &MappingsDocument) -> Result<(), SettingsError> {
    fs::write(path, document.to_json()?)?;
    tracing::info!(
        path = %path.display(),
        mappings = document.mappings.len(),
        "exported mappings"
    );
    Ok(())
}

/// Default file name for an export taken at `now`
pub fn default_export_file_name(now: DateTime<Utc>) -> String {
    format!("prettify_python_mappings_{}.json", now.format("%Y%m%d_%H%M%S"))
}
