//! Textual salvage path.
//!
//! When the image pipeline finds no QR anchor (or matches no digits), the
//! only remaining signal is a noisy general-OCR transcript of the ticket.
//! This module repairs the transcript's known miscognitions and pulls play
//! candidates out of it, line by line. It is deliberately conservative:
//! fewer plays, but each one has passed the same validation as the primary
//! path.

pub mod extract;
pub mod substitutions;

pub use extract::extract_plays;
pub use substitutions::repair;
