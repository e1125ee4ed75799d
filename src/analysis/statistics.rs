//! Descriptive statistics over hole fields

use crate::types::{BlastSummary, FieldSummary, HoleField, HoleRecord};

/// Hole count above which burden and spacing are summarized on separate threads.
const PARALLEL_FIELD_THRESHOLD: usize = 4_096;

/// Summarize one field over the holes that measured it.
///
/// Returns `None` when no hole carries a usable value, so "no data" can never
/// be mistaken for a blast where every value is zero. Negative and non-finite
/// values are skipped (see [`HoleRecord::measured`]).
pub fn compute_summary(holes: &[HoleRecord], field: HoleField) -> Option<FieldSummary> {
    summarize_values(holes.iter().filter_map(|h| h.measured(field)))
}

/// Min/max/mean of a set of values, independent of their order.
///
/// Values are summed in ascending order so that any permutation of the input
/// produces a bit-identical mean. NaN and infinite values are skipped.
pub fn summarize_values(values: impl IntoIterator<Item = f64>) -> Option<FieldSummary> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let min = sorted[0];
    let max = sorted[count - 1];
    let sum: f64 = sorted.iter().sum();

    // Rounding can push the mean an ulp past the extrema
    let avg = (sum / count as f64).clamp(min, max);

    Some(FieldSummary { min, max, avg, count })
}

/// Burden and spacing summaries plus the total hole count.
pub fn summarize_blast(holes: &[HoleRecord]) -> BlastSummary {
    let (burden, spacing) = if holes.len() >= PARALLEL_FIELD_THRESHOLD {
        rayon::join(
            || compute_summary(holes, HoleField::Burden),
            || compute_summary(holes, HoleField::Spacing),
        )
    } else {
        (
            compute_summary(holes, HoleField::Burden),
            compute_summary(holes, HoleField::Spacing),
        )
    };

    BlastSummary {
        burden,
        spacing,
        holes: holes.len(),
    }
}
