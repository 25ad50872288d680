//! Stylesheet system for color aliases
//!
//! Markup colors are normally one of the sixteen console color names. A
//! stylesheet adds semantic aliases on top of them (`<color fg="error">`),
//! so the same templates can be restyled without editing them.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::terminal::Color;

/// Errors that can occur when loading or parsing stylesheets
#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("Failed to read stylesheet file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse stylesheet TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Alias '{alias}' maps to unknown console color '{value}'")]
    UnknownColor { alias: String, value: String },
}

/// A stylesheet mapping alias names to console colors
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    /// Optional name for the stylesheet
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Alias mappings, keyed by lowercase alias name
    pub colors: HashMap<String, Color>,
}

/// TOML structure for deserializing stylesheets
#[derive(Deserialize)]
struct TomlStylesheet {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

/// Semantic aliases shipped with the CLI
const DEFAULT_ALIASES: &str = r##"
[metadata]
name = "default"
description = "Semantic aliases for common message kinds"

[colors]
error = "Red"
warning = "Yellow"
success = "Green"
info = "Cyan"
muted = "DarkGray"
accent = "Magenta"
"##;

impl Stylesheet {
    /// An empty stylesheet: only console color names resolve
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in semantic aliases
    pub fn builtin() -> Self {
        DEFAULT_ALIASES
            .parse()
            .expect("Built-in aliases should be valid TOML")
    }

    /// Load stylesheet from TOML file
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Add or replace an alias
    pub fn with_alias(mut self, alias: &str, color: Color) -> Self {
        self.colors.insert(alias.to_ascii_lowercase(), color);
        self
    }

    /// Resolve an alias (case-insensitive) to a console color
    ///
    /// Returns None if the alias is not defined in this stylesheet.
    pub fn resolve(&self, alias: &str) -> Option<Color> {
        self.colors.get(&alias.trim().to_ascii_lowercase()).copied()
    }

    /// Resolve a markup color value: console color names first, then aliases
    pub fn resolve_color(&self, value: &str) -> Option<Color> {
        Color::from_name(value).or_else(|| self.resolve(value))
    }
}

impl FromStr for Stylesheet {
    type Err = StylesheetError;

    /// Load stylesheet from TOML string
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let parsed: TomlStylesheet = toml::from_str(content)?;

        let mut colors = HashMap::with_capacity(parsed.colors.len());
        for (alias, value) in parsed.colors {
            let color = Color::from_name(&value).ok_or_else(|| StylesheetError::UnknownColor {
                alias: alias.clone(),
                value: value.clone(),
            })?;
            colors.insert(alias.to_ascii_lowercase(), color);
        }

        Ok(Stylesheet {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            colors,
        })
    }
}
