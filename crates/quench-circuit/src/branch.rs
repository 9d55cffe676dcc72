//! Categorical branch selection for stochastic operations.
//!
//! This is the only place a branch decision is made. Expansion and execution
//! both call [`select_branch`], so for equally seeded streams they consume the
//! same draws and take the same branches.

use rand::Rng;

use crate::circuit::Outcome;

/// Draw once from `stream` and pick an outcome.
///
/// Exactly one uniform sample `r ∈ [0, 1)` is drawn, even if the result is
/// "do nothing". Outcomes are walked in order with a running sum and the first
/// one with `r < cumulative` is returned. `None` means the draw fell into the
/// unallocated probability mass.
pub fn select_branch<'a, R: Rng + ?Sized>(
    stream: &mut R,
    outcomes: &'a [Outcome],
) -> Option<&'a Outcome> {
    let r: f64 = stream.r#gen();
    let mut cumulative = 0.0;
    for outcome in outcomes {
        cumulative += outcome.probability;
        if r < cumulative {
            return Some(outcome);
        }
    }
    None
}
