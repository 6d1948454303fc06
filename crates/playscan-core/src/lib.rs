//! Powerball play domain library.
//!
//! Holds everything about a play that does not require pixels: the `Play`
//! type itself, range/distinctness validation, and the textual repair path
//! used when image analysis cannot anchor on the ticket's QR code.

pub mod play;
pub mod textual;
pub mod validate;

pub use play::{Play, PlayList};
pub use validate::validate;
