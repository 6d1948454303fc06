//! Line-oriented play extraction from a repaired transcript.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::substitutions::repair;
use crate::play::PlayList;
use crate::validate::validate;

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"\d+").unwrap();
    static ref POWERBALL: Regex = Regex::new(r"\bPB\s*(\d{1,2})\b").unwrap();
}

/// Minimum line length worth scanning; shorter lines are header fragments.
const MIN_LINE_LEN: usize = 10;

/// A line must carry at least this many in-range numbers to be a play
/// candidate (five whites plus the powerball).
const MIN_VALID_NUMBERS: usize = 6;

/// Pull validated plays out of a raw recognized-text transcript.
///
/// An empty or unusable transcript yields an empty list; this path never
/// fails.
pub fn extract_plays(text: &str) -> PlayList {
    let repaired = repair(text);
    let mut plays = PlayList::new();

    for line in repaired.lines() {
        if line.chars().count() < MIN_LINE_LEN {
            continue;
        }
        if let Some(play) = extract_line(line) {
            debug!(%play, "textual line accepted");
            plays.push(play);
        }
    }

    plays
}

/// In-range number with its byte offset, used to pin the marker position.
struct Token {
    value: u8,
    start: usize,
}

fn extract_line(line: &str) -> Option<crate::Play> {
    let tokens: Vec<Token> = INTEGER
        .find_iter(line)
        .filter_map(|m| {
            let value: u8 = m.as_str().parse().ok()?;
            (1..=69).contains(&value).then(|| Token {
                value,
                start: m.start(),
            })
        })
        .collect();

    if tokens.len() < MIN_VALID_NUMBERS {
        return None;
    }

    // "PB N" with N in powerball range pins both the powerball and the
    // pivot; otherwise the last in-range number is taken as the powerball.
    let pinned = POWERBALL.captures(line).and_then(|caps| {
        let value: u8 = caps[1].parse().ok()?;
        if !(1..=26).contains(&value) {
            return None;
        }
        let start = caps.get(1)?.start();
        let pivot = tokens.iter().position(|t| t.start == start)?;
        Some((pivot, value))
    });

    let (pivot, powerball) = match pinned {
        Some(found) => found,
        None => (tokens.len() - 1, tokens.last()?.value),
    };

    if pivot < 5 {
        return None;
    }
    let white: Vec<u8> = tokens[pivot - 5..pivot].iter().map(|t| t.value).collect();

    validate(&white, powerball)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Play;

    #[test]
    fn test_clean_transcript_two_plays() {
        let text = "07 14 22 45 61 PB 09\n03 18 27 44 60 PB 12";
        let plays = extract_plays(text);
        assert_eq!(
            plays,
            vec![
                Play {
                    white: [7, 14, 22, 45, 61],
                    powerball: 9
                },
                Play {
                    white: [3, 18, 27, 44, 60],
                    powerball: 12
                },
            ]
        );
    }

    #[test]
    fn test_empty_transcript() {
        assert!(extract_plays("").is_empty());
    }

    #[test]
    fn test_marker_misread_repaired() {
        let plays = extract_plays("07 14 22 45 61 MB 09");
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].white, [7, 14, 22, 45, 61]);
        assert_eq!(plays[0].powerball, 9);
    }

    #[test]
    fn test_run_together_line() {
        let plays = extract_plays("0714224561PB09");
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].white, [7, 14, 22, 45, 61]);
        assert_eq!(plays[0].powerball, 9);
    }

    #[test]
    fn test_powerball_out_of_range_skipped() {
        assert!(extract_plays("07 14 22 45 61 PB 33").is_empty());
    }

    #[test]
    fn test_no_marker_uses_last_number() {
        let plays = extract_plays("07 14 22 45 61 09 extra");
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].powerball, 9);
    }

    #[test]
    fn test_short_lines_discarded() {
        assert!(extract_plays("1 2 3 4\n5 6").is_empty());
    }

    #[test]
    fn test_too_few_numbers() {
        assert!(extract_plays("header text 14 22 45").is_empty());
    }
}
