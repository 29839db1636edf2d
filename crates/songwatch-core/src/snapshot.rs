use serde::{Deserialize, Serialize};

use crate::dom::{Document, Node};
use crate::selectors::SelectorTable;

/// Placeholder for a text field whose element is missing.
pub const UNKNOWN: &str = "Unknown";

/// Track fields read from the page at one qualifying insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSnapshot {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Artwork URL; protocol-relative URLs are already rewritten to https.
    pub art_url: Option<String>,
    pub duration: String,
}

impl TrackSnapshot {
    /// The fields that decide whether this is a new track.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.title, &self.artist, &self.album)
    }
}

/// Read every field from the page.
///
/// Each lookup is independent. A missing text element yields [`UNKNOWN`],
/// missing artwork yields `None`.
pub fn extract<D: Document>(document: &D, selectors: &SelectorTable) -> TrackSnapshot {
    TrackSnapshot {
        title: text_or_unknown(document, &selectors.title),
        artist: text_or_unknown(document, &selectors.artist),
        album: text_or_unknown(document, &selectors.album),
        art_url: document
            .query_selector(&selectors.artwork)
            .and_then(|art| art.src())
            .map(normalize_art_url),
        duration: text_or_unknown(document, &selectors.duration),
    }
}

fn text_or_unknown<D: Document>(document: &D, selector: &str) -> String {
    document
        .query_selector(selector)
        .map(|el| el.text())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Give protocol-relative artwork URLs an explicit https scheme.
pub fn normalize_art_url(url: String) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url
    }
}
