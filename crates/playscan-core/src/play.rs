//! The play type emitted by every extraction path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One ticket row: five white balls plus the powerball.
///
/// A `Play` is only ever constructed through [`crate::validate`], so holding
/// one implies the whites are sorted ascending, pairwise distinct and in
/// 1..=69, and the powerball is in 1..=26. The powerball may repeat a white
/// ball value; the two are drawn from separate pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub white: [u8; 5],
    pub powerball: u8,
}

/// Plays in ticket order, top to bottom. Empty means no validated play was
/// recovered; it is never an error.
pub type PlayList = Vec<Play>;

impl fmt::Display for Play {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02} {:02} {:02} {:02} {:02} PB {:02}",
            self.white[0], self.white[1], self.white[2], self.white[3], self.white[4], self.powerball
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_zero_pads() {
        let play = Play {
            white: [2, 9, 34, 56, 68],
            powerball: 4,
        };
        assert_eq!(play.to_string(), "02 09 34 56 68 PB 04");
    }
}
