//! IELTS band arithmetic.
//!
//! Everything here is pure and uses `Decimal` so that means landing exactly on `.25` or
//! `.75` are classified without binary floating-point drift.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Inclusive lower bounds on correct answers, highest first, with the band in tenths.
const CORRECT_COUNT_BANDS: [(i32, i64); 11] = [
    (39, 90),
    (37, 85),
    (35, 80),
    (32, 75),
    (30, 70),
    (26, 65),
    (23, 60),
    (18, 55),
    (16, 50),
    (13, 45),
    (10, 40),
];

const FLOOR_BAND_TENTHS: i64 = 35;
const MAX_BAND_TENTHS: i64 = 90;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum BandInputError {
    #[error("{section} correct answers must be between 0 and {max}, got {count}")]
    CountOutOfRange { section: &'static str, count: i32, max: i32 },
    #[error("{section} score must be between 0.0 and 9.0, got {score}")]
    ScoreOutOfRange { section: &'static str, score: Decimal },
    #[error("{section} score must have at most one decimal digit, got {score}")]
    ScoreTooPrecise { section: &'static str, score: Decimal },
}

/// Raw performance of one attempt, as entered by an examiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawScores {
    pub(crate) reading_correct: i32,
    pub(crate) listening_correct: i32,
    pub(crate) speaking_score: Decimal,
    pub(crate) writing_score: Decimal,
}

/// Per-skill bands plus the rounded overall band, all at one-decimal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BandBreakdown {
    pub(crate) reading: Decimal,
    pub(crate) listening: Decimal,
    pub(crate) speaking: Decimal,
    pub(crate) writing: Decimal,
    pub(crate) overall: Decimal,
}

fn tenths(value: i64) -> Decimal {
    Decimal::new(value, 1)
}

fn at_band_scale(mut value: Decimal) -> Decimal {
    value.rescale(1);
    value
}

/// Maps a reading or listening correct-answer count to its band.
///
/// No bounds check: anything under 10, negatives included, yields 3.5. Callers that accept
/// user input go through [`checked_band_from_correct_count`].
pub(crate) fn band_from_correct_count(count: i32) -> Decimal {
    CORRECT_COUNT_BANDS
        .iter()
        .find(|(min_correct, _)| count >= *min_correct)
        .map(|(_, band)| tenths(*band))
        .unwrap_or_else(|| tenths(FLOOR_BAND_TENTHS))
}

pub(crate) fn checked_band_from_correct_count(
    section: &'static str,
    count: i32,
    max_correct: i32,
) -> Result<Decimal, BandInputError> {
    if !(0..=max_correct).contains(&count) {
        return Err(BandInputError::CountOutOfRange { section, count, max: max_correct });
    }
    Ok(band_from_correct_count(count))
}

/// Rounds a raw average to a reportable band.
///
/// Fraction below .25 rounds down, from .25 up to (not including) .75 goes to the half,
/// .75 and above rounds up to the next whole band.
pub(crate) fn round_to_band(raw_average: Decimal) -> Decimal {
    let whole = raw_average.floor();
    let fraction = raw_average - whole;

    let rounded = if fraction < Decimal::new(25, 2) {
        whole
    } else if fraction < Decimal::new(75, 2) {
        (raw_average * Decimal::TWO).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            / Decimal::TWO
    } else {
        whole + Decimal::ONE
    };

    at_band_scale(rounded)
}

pub(crate) fn compute_overall_band(
    reading: Decimal,
    listening: Decimal,
    speaking: Decimal,
    writing: Decimal,
) -> Decimal {
    let mean = (reading + listening + speaking + writing) / Decimal::from(4);
    round_to_band(mean)
}

/// Derives every band of an attempt. Reading and listening go through the count table,
/// speaking and writing are taken verbatim.
pub(crate) fn compute_bands(raw: &RawScores) -> BandBreakdown {
    let reading = band_from_correct_count(raw.reading_correct);
    let listening = band_from_correct_count(raw.listening_correct);
    let speaking = at_band_scale(raw.speaking_score);
    let writing = at_band_scale(raw.writing_score);

    BandBreakdown {
        reading,
        listening,
        speaking,
        writing,
        overall: compute_overall_band(reading, listening, speaking, writing),
    }
}

/// Rejects raw scores the band table was never meant to see.
pub(crate) fn validate_raw_scores(raw: &RawScores, max_correct: i32) -> Result<(), BandInputError> {
    checked_band_from_correct_count("reading", raw.reading_correct, max_correct)?;
    checked_band_from_correct_count("listening", raw.listening_correct, max_correct)?;
    validate_examiner_score("speaking", raw.speaking_score)?;
    validate_examiner_score("writing", raw.writing_score)?;
    Ok(())
}

fn validate_examiner_score(section: &'static str, score: Decimal) -> Result<(), BandInputError> {
    if score < Decimal::ZERO || score > tenths(MAX_BAND_TENTHS) {
        return Err(BandInputError::ScoreOutOfRange { section, score });
    }
    if score.normalize().scale() > 1 {
        return Err(BandInputError::ScoreTooPrecise { section, score });
    }
    Ok(())
}
