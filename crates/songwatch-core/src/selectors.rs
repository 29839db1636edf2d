use serde::{Deserialize, Serialize};

use crate::error::SongwatchError;

/// Embedded selector table for the player page.
const EMBEDDED_TABLE: &str = include_str!("../data/selectors.toml");

/// Where each now-playing field lives on the page, plus the marker that
/// identifies the insertion carrying the rendered track text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorTable {
    /// Element whose subtree is observed for insertions.
    pub container: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Image element whose `src` is the artwork URL.
    pub artwork: String,
    pub duration: String,
    /// Id or class name of the inserted node that triggers extraction.
    pub marker: String,
}

/// Partial table, as found in user config. Missing entries keep their
/// current value on merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

impl SelectorOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl SelectorTable {
    /// Load the embedded selector table.
    pub fn embedded() -> Self {
        toml::from_str(EMBEDDED_TABLE).expect("embedded selectors.toml should be valid")
    }

    /// The embedded table as TOML source.
    pub fn embedded_source() -> &'static str {
        EMBEDDED_TABLE
    }

    /// Load a complete selector table from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, SongwatchError> {
        let table: SelectorTable =
            toml::from_str(toml_str).map_err(|e| SongwatchError::Selector(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    /// Serialize the table back to TOML.
    pub fn to_toml(&self) -> Result<String, SongwatchError> {
        toml::to_string_pretty(self).map_err(|e| SongwatchError::Selector(e.to_string()))
    }

    /// Apply user overrides. Entries present in `overrides` replace ours.
    pub fn merge(&mut self, overrides: &SelectorOverrides) {
        let fields = [
            (&mut self.container, &overrides.container),
            (&mut self.title, &overrides.title),
            (&mut self.artist, &overrides.artist),
            (&mut self.album, &overrides.album),
            (&mut self.artwork, &overrides.artwork),
            (&mut self.duration, &overrides.duration),
            (&mut self.marker, &overrides.marker),
        ];
        for (current, replacement) in fields {
            if let Some(value) = replacement {
                *current = value.clone();
            }
        }
    }

    /// Check every entry is usable.
    ///
    /// Selectors must be a single simple selector: `#id`, `.class` or a bare
    /// tag name. The marker is compared against ids and class names verbatim
    /// and only needs to be non-empty.
    pub fn validate(&self) -> Result<(), SongwatchError> {
        let selectors = [
            ("container", &self.container),
            ("title", &self.title),
            ("artist", &self.artist),
            ("album", &self.album),
            ("artwork", &self.artwork),
            ("duration", &self.duration),
        ];
        for (name, selector) in selectors {
            if !is_simple_selector(selector) {
                return Err(SongwatchError::Selector(format!(
                    "{name} selector {selector:?} is not a simple #id, .class or tag selector"
                )));
            }
        }
        if self.marker.trim().is_empty() {
            return Err(SongwatchError::Selector("marker must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self::embedded()
    }
}

fn is_simple_selector(selector: &str) -> bool {
    let body = selector
        .strip_prefix('#')
        .or_else(|| selector.strip_prefix('.'))
        .unwrap_or(selector);
    !body.is_empty() && !body.chars().any(|c| c.is_whitespace() || matches!(c, '#' | '.' | '>' | ','))
}
