//! Row grouping and play reconstruction.

use super::config::ExtractionConfig;
use crate::hits::{DigitHit, MarkerHit};
use playscan_core::{validate, Play};
use tracing::debug;

/// Cluster classified digits into ticket rows by vertical position: a new
/// row starts whenever a hit's y differs from the current row's first hit
/// by more than `row_gap`.
pub fn group_rows(mut hits: Vec<DigitHit>, row_gap: i32) -> Vec<Vec<DigitHit>> {
    hits.sort_by_key(|hit| hit.y);

    let mut rows: Vec<Vec<DigitHit>> = Vec::new();
    for hit in hits {
        match rows.last_mut() {
            Some(row) if (hit.y - row[0].y).abs() <= row_gap => row.push(hit),
            _ => rows.push(vec![hit]),
        }
    }
    rows
}

/// Turn one row of digit hits into a play, or `None` when the row is
/// incomplete or fails validation. Rows without an assignable marker are
/// dropped; a marker from a neighboring row does not qualify.
pub fn reconstruct_row(
    row: &mut [DigitHit],
    markers: &[MarkerHit],
    config: &ExtractionConfig,
) -> Option<Play> {
    row.sort_by_key(|hit| hit.x);
    let mean_y = row.iter().map(|hit| hit.y as f64).sum::<f64>() / row.len() as f64;

    let marker = nearest_marker(markers, mean_y, config.marker_row_tolerance)?;

    let before: Vec<&DigitHit> = row.iter().filter(|hit| hit.x < marker.x).collect();
    let after: Vec<&DigitHit> = row.iter().filter(|hit| hit.x > marker.right()).collect();

    // Digits left of the white balls are the printed play label; keep only
    // the rightmost ten. Past the marker only the powerball's two digits
    // matter.
    let white_digits = &before[before.len().saturating_sub(config.max_white_digits)..];
    let after_end = after.len().min(config.max_powerball_digits);
    let powerball_digits = &after[..after_end];

    let white = pair_digits(white_digits, config.pair_gap);
    let powerball = pair_digits(powerball_digits, config.pair_gap)
        .first()
        .copied()?;

    let play = validate(&white, powerball);
    if play.is_none() {
        debug!(?white, powerball, "row failed validation");
    }
    play
}

/// The marker whose vertical center is closest to the row's mean y, as long
/// as it is within `tolerance`. Ties resolve to the smaller y because the
/// input is sorted top to bottom.
fn nearest_marker<'a>(
    markers: &'a [MarkerHit],
    mean_y: f64,
    tolerance: i32,
) -> Option<&'a MarkerHit> {
    markers
        .iter()
        .min_by(|a, b| {
            let da = (a.center_y() as f64 - mean_y).abs();
            let db = (b.center_y() as f64 - mean_y).abs();
            da.total_cmp(&db)
        })
        .filter(|marker| (marker.center_y() as f64 - mean_y).abs() <= tolerance as f64)
}

/// Pair adjacent digits into two-digit numbers: a hit and its successor
/// within `pair_gap` pixels combine as d1*10 + d2; an isolated hit stands
/// alone.
fn pair_digits(hits: &[&DigitHit], pair_gap: i32) -> Vec<u8> {
    let mut numbers = Vec::new();
    let mut i = 0;

    while i < hits.len() {
        if i + 1 < hits.len() && hits[i + 1].x - hits[i].x < pair_gap {
            numbers.push(hits[i].digit * 10 + hits[i + 1].digit);
            i += 2;
        } else {
            numbers.push(hits[i].digit);
            i += 1;
        }
    }

    numbers
}
