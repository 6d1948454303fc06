//! Powerball Ticket Vision Library
//!
//! Extracts the printed plays from a photographed Powerball ticket using
//! OpenCV: inverted-Otsu binarization, QR-anchored perspective
//! normalization, plays-region isolation, and digit/marker template
//! matching. The textual salvage path and the play domain types live in
//! `playscan-core`.

pub mod binarize;
pub mod detection;
pub mod hits;
pub mod normalize;
pub mod region;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use detection::{extract_plays, Extraction, ExtractionConfig, PlayExtractor};
pub use hits::{DigitHit, MarkerHit};
pub use normalize::{NormalizedTicket, QrAnchor};
pub use template::{TemplateLoader, TemplateMatcher, TemplateSet};

// Error handling
pub type Result<T> = anyhow::Result<T>;
