use serde::{Deserialize, Serialize};

use crate::parser::seconds_to_display_timecode;

/// A half-open time range `[start, end)` in seconds to keep in the
/// output timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub start: f64,
    pub end: f64,
}

impl Cut {
    pub fn new(start: f64, end: f64) -> Self {
        Cut { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Loose cut shape as loaded from a structured document. Either field
/// may be absent; extra fields in the source record are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutRecord {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl CutRecord {
    /// Resolve to a `Cut` when both fields are present.
    pub fn as_cut(&self) -> Option<Cut> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(Cut { start, end }),
            _ => None,
        }
    }
}

impl From<Cut> for CutRecord {
    fn from(cut: Cut) -> Self {
        CutRecord {
            start: Some(cut.start),
            end: Some(cut.end),
        }
    }
}

/// Swap a cut with its predecessor. Returns false (and leaves the
/// sequence untouched) when the index is 0 or out of range.
pub fn move_up(cuts: &mut [Cut], index: usize) -> bool {
    if index == 0 || index >= cuts.len() {
        return false;
    }
    cuts.swap(index, index - 1);
    true
}

/// Swap a cut with its successor. Returns false when the index is the
/// last position or out of range.
pub fn move_down(cuts: &mut [Cut], index: usize) -> bool {
    if cuts.len() < 2 || index >= cuts.len() - 1 {
        return false;
    }
    cuts.swap(index, index + 1);
    true
}

/// Rearrange cuts into the given order of 0-based indices, returning a
/// new sequence. Returns None unless `order` is a permutation of
/// `0..cuts.len()`.
pub fn reorder(cuts: &[Cut], order: &[usize]) -> Option<Vec<Cut>> {
    if order.len() != cuts.len() {
        return None;
    }
    let mut used = vec![false; cuts.len()];
    for &i in order {
        if i >= cuts.len() || used[i] {
            return None;
        }
        used[i] = true;
    }
    Some(order.iter().map(|&i| cuts[i]).collect())
}

/// Total duration across cuts, counting only those with `end > start`.
pub fn total_duration(cuts: &[Cut]) -> f64 {
    cuts.iter()
        .map(Cut::duration)
        .filter(|d| *d > 0.0)
        .sum()
}

/// Human-readable listing of the cut sequence with display timecodes.
pub fn format_cuts_summary(cuts: &[Cut]) -> String {
    if cuts.is_empty() {
        return "No cuts found".to_string();
    }

    let mut summary = format!(
        "Found {} cuts, total duration: {:.1}s\n\n",
        cuts.len(),
        total_duration(cuts)
    );

    for (i, cut) in cuts.iter().enumerate() {
        summary.push_str(&format!(
            "Cut {:2}: {} - {} ({:.1}s)\n",
            i + 1,
            seconds_to_display_timecode(cut.start),
            seconds_to_display_timecode(cut.end),
            cut.duration()
        ));
    }

    summary
}
