// tests/core_tests.rs
use playscan_core::{textual, validate};

#[test]
fn test_validator_sorts_and_bounds() {
    let play = validate(&[61, 7, 22, 45, 14], 9).expect("play should validate");
    assert_eq!(play.white, [7, 14, 22, 45, 61]);
    assert_eq!(play.powerball, 9);

    assert!(validate(&[7, 14, 22, 45, 61], 33).is_none());
}

#[test]
fn test_textual_fallback_transcript() {
    let plays = textual::extract_plays("07 14 22 45 61 MB 09\n0310182744 60 PB 12");
    assert_eq!(plays.len(), 2);
    assert_eq!(plays[0].white, [7, 14, 22, 45, 61]);
    assert_eq!(plays[1].powerball, 12);
}
