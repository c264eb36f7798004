/*!
 * Silence budget tracking.
 *
 * Natural pauses on the source timeline are split in two parts:
 * - up to `cap` seconds become credit the next sentence may borrow to fit
 *   an overlong synthesized clip
 * - anything beyond the cap is emitted immediately as literal silence
 *
 * Nothing is discarded: every second of every gap ends up either in the
 * credit handed to the next sentence or in the silence returned now.
 */

use serde::Serialize;

/// Default cap on borrowable silence, in seconds.
pub const DEFAULT_SILENCE_CAP_SECS: f64 = 0.8;

/// How a single natural pause is divided.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GapSplit {
    /// Credit carried into the next sentence, within `[0, cap]`
    pub credit: f64,
    /// Silence to emit right away
    pub literal: f64,
}

impl GapSplit {
    /// Split a gap. Negative gaps (overlapping sentences) count as zero.
    pub fn of(gap: f64, cap: f64) -> Self {
        let gap = if gap.is_finite() { gap.max(0.0) } else { 0.0 };
        if gap >= cap {
            Self {
                credit: cap,
                literal: gap - cap,
            }
        } else {
            Self {
                credit: gap,
                literal: 0.0,
            }
        }
    }
}

/// Carried silence credit threaded through the reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SilenceBudget {
    pending: f64,
    cap: f64,
}

impl SilenceBudget {
    /// Start the budget from the pause before the first sentence.
    ///
    /// Returns the budget and the leading silence to emit before any speech.
    pub fn from_leading_gap(first_start: f64, cap: f64) -> (Self, f64) {
        let split = GapSplit::of(first_start, cap);
        (
            Self {
                pending: split.credit,
                cap,
            },
            split.literal,
        )
    }

    /// Credit available to the sentence being processed.
    pub fn pending(&self) -> f64 {
        self.pending
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    /// Move past the current sentence.
    ///
    /// `next_start` is `None` after the last sentence. Returns the literal
    /// silence to append after the current sentence; the credit for the next
    /// sentence becomes the new `pending()`.
    pub fn advance(&mut self, this_end: f64, next_start: Option<f64>) -> f64 {
        match next_start {
            Some(next_start) => {
                let split = GapSplit::of(next_start - this_end, self.cap);
                self.pending = split.credit;
                split.literal
            }
            None => {
                self.pending = 0.0;
                0.0
            }
        }
    }
}
