//! Raw facts produced by the extractor

use crate::field::{FieldName, FieldValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of document a fact was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceType {
    /// Web page
    #[serde(rename = "HTML", alias = "html")]
    Html,
    /// PDF document (fee schedules are often published this way)
    #[serde(rename = "PDF", alias = "pdf")]
    Pdf,
}

impl SourceType {
    /// Get the source type as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Html => "HTML",
            SourceType::Pdf => "PDF",
        }
    }

    /// Parse a source type (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "HTML" => Some(SourceType::Html),
            "PDF" => Some(SourceType::Pdf),
            _ => None,
        }
    }

    /// Infer the source type from a URL path
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.to_lowercase().ends_with(".pdf") {
            SourceType::Pdf
        } else {
            SourceType::Html
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate field value pulled from a document
///
/// Created by the extractor per match and consumed once by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFact {
    /// Municipality name as seen on the source
    pub municipality: String,

    /// Which of the three facts this is
    pub field_name: FieldName,

    /// Raw value
    pub value: FieldValue,

    /// Extraction confidence [0.0, 1.0]
    pub confidence: f64,

    /// Page or document the value came from
    pub source_url: String,

    /// Document kind
    pub source_type: SourceType,
}

impl RawFact {
    /// Create a new raw fact
    pub fn new(
        municipality: impl Into<String>,
        field_name: FieldName,
        value: impl Into<FieldValue>,
        confidence: f64,
        source_url: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            municipality: municipality.into(),
            field_name,
            value: value.into(),
            confidence,
            source_url: source_url.into(),
            source_type,
        }
    }
}
