//! Fixed repairs for known OCR miscognitions on ticket transcripts.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // "PB" read as another two-letter pair
    static ref MARKER_MISREAD: Regex = Regex::new(r"\b(?:MB|KB)\b").unwrap();

    // a smeared marker collapsing into one or more "m"s before the powerball
    static ref M_RUN: Regex = Regex::new(r"m+\s?(\d)").unwrap();

    // marker with the "P" lost
    static ref BARE_B: Regex = Regex::new(r"\bB(\d{1,2})").unwrap();

    // stray "B" glued onto the end of a number
    static ref TRAILING_B: Regex = Regex::new(r"(\d+)B\b").unwrap();

    // number glued onto the marker
    static ref GLUED_PB: Regex = Regex::new(r"(\d)PB").unwrap();

    // "04" read as letter pairs
    static ref BA_OA: Regex = Regex::new(r"Ba|Oa").unwrap();

    // letter "O" standing in for a leading zero
    static ref O_DIGIT: Regex = Regex::new(r"O(\d)").unwrap();

    // run-together ticket columns
    static ref DIGIT_RUN: Regex = Regex::new(r"\d{4,}").unwrap();
}

/// Apply the substitution table in order. The repairs are global over the
/// whole transcript; line splitting happens afterwards.
pub fn repair(text: &str) -> String {
    let text = MARKER_MISREAD.replace_all(text, "PB");
    let text = M_RUN.replace_all(&text, "PB $1");
    let text = BARE_B.replace_all(&text, "PB $1");
    let text = TRAILING_B.replace_all(&text, "$1");
    let text = GLUED_PB.replace_all(&text, "$1 PB");
    let text = BA_OA.replace_all(&text, "04");
    let text = O_DIGIT.replace_all(&text, "0$1");
    DIGIT_RUN
        .replace_all(&text, |caps: &Captures| split_digit_run(&caps[0]))
        .into_owned()
}

/// Split a run of four or more digits into two-digit chunks, keeping a lone
/// trailing digit when the count is odd.
fn split_digit_run(run: &str) -> String {
    run.as_bytes()
        .chunks(2)
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect::<Vec<_>>()
        .join(" ")
}
