//! Taxa Extractor
//!
//! Turns the plain text of a municipal web page or PDF into raw facts for
//! the three target fields.
//!
//! # Architecture
//!
//! ```text
//! Document → clean → pattern tables → RawFact → Gatekeeper
//! ```
//!
//! Each rate field has an ordered list of case-insensitive patterns. The
//! first match whose amount is plausible and whose surrounding text names
//! the topic wins. Billing patterns are checked förskott first.
//!
//! # Example Usage
//!
//! ```
//! use taxa_extractor::{Document, ExtractorConfig, FactExtractor};
//!
//! let extractor = FactExtractor::new(ExtractorConfig::default()).unwrap();
//! let doc = Document::new(
//!     "Ale kommun",
//!     "Timtaxa för livsmedelskontroll är 1 350 kr per timme.",
//!     "https://www.ale.se/taxa",
//! );
//!
//! let facts = extractor.extract(&doc);
//! assert_eq!(facts.len(), 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod patterns;
mod text;


pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::{Document, FactExtractor};
