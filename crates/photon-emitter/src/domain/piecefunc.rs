//! Fixed-point progress metric and piecewise-linear transform.
//!
//! Everything that feeds cross-validator-comparable logic stays in
//! integer fixed-point arithmetic so every node computes the same value.
//! Floating point is confined to purely local emission-timing heuristics
//! (see the low-power interval interpolation in the admission module),
//! which affect only this validator's own liveness, never agreement.

use crate::error::{EmitterError, Result};

/// Scale constant for fixed-point decimals in (0, 1].
pub const DECIMAL_UNIT: u64 = 1_000_000;

/// Consensus-advancement estimate, a fixed-point decimal scaled by
/// [`DECIMAL_UNIT`].
pub type Metric = u64;

/// A single interpolation node of a piecewise-linear function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dot {
    /// Input coordinate (scaled by [`DECIMAL_UNIT`])
    pub x: u64,
    /// Output coordinate (scaled by [`DECIMAL_UNIT`])
    pub y: u64,
}

/// Monotone non-decreasing piecewise-linear function over fixed-point
/// values. The dot tables are versioned protocol parameters; this type
/// only interpolates them with integer arithmetic.
#[derive(Clone, Debug)]
pub struct PieceFunc {
    dots: Vec<Dot>,
}

impl PieceFunc {
    /// Build a function from its dot table, rejecting tables that are not
    /// strictly increasing in `x` or not non-decreasing in `y`.
    pub fn new(dots: Vec<Dot>) -> Result<Self> {
        if dots.len() < 2 {
            return Err(EmitterError::InvalidPieceFunc(
                "at least two dots required".into(),
            ));
        }
        for pair in dots.windows(2) {
            if pair[1].x <= pair[0].x {
                return Err(EmitterError::InvalidPieceFunc(format!(
                    "x coordinates must strictly increase, got {} then {}",
                    pair[0].x, pair[1].x
                )));
            }
            if pair[1].y < pair[0].y {
                return Err(EmitterError::InvalidPieceFunc(format!(
                    "y coordinates must not decrease, got {} then {}",
                    pair[0].y, pair[1].y
                )));
            }
        }
        Ok(Self { dots })
    }

    /// Internal constructor for the built-in protocol tables, which are
    /// known monotone.
    fn from_table(table: &[(u64, u64)]) -> Self {
        let dots = table.iter().map(|&(x, y)| Dot { x, y }).collect();
        let f = Self { dots };
        debug_assert!(PieceFunc::new(f.dots.clone()).is_ok());
        f
    }

    /// Evaluate the function at `x`, clamping outside the table's domain.
    pub fn get(&self, x: u64) -> u64 {
        let first = self.dots[0];
        let last = self.dots[self.dots.len() - 1];
        if x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }
        // Index of the last dot with dot.x <= x
        let i = match self.dots.binary_search_by(|dot| dot.x.cmp(&x)) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let (a, b) = (self.dots[i], self.dots[i + 1]);
        // Integer linear interpolation; widen to u128 as
        // (x - a.x) * (b.y - a.y) may exceed u64.
        let num = (x - a.x) as u128 * (b.y - a.y) as u128;
        let den = (b.x - a.x) as u128;
        a.y + (num / den) as u64
    }

    /// Protocol table mapping a scaled sequence-distance (number of newly
    /// observed events) into a progress share. The first observed event
    /// gives a major diff, further events saturate towards 1.0.
    pub fn scalar_update_default() -> Self {
        Self::from_table(&[
            (0, 0),
            (DECIMAL_UNIT, 660_000),
            (2 * DECIMAL_UNIT, 800_000),
            (8 * DECIMAL_UNIT, 990_000),
            (100 * DECIMAL_UNIT, 999_000),
            (u32::MAX as u64 * DECIMAL_UNIT, DECIMAL_UNIT),
        ])
    }

    /// Protocol table reshaping a raw aggregate metric into the final
    /// event metric. Below ~0.2 the output stays tiny, so a validator
    /// defers unless it has waited long; ~0.3-0.5 is the optimal range.
    pub fn event_metric_default() -> Self {
        Self::from_table(&[
            (0, 5_000),
            (DECIMAL_UNIT / 100, 30_000),
            (DECIMAL_UNIT / 5, 50_000),
            (3 * DECIMAL_UNIT / 10, 220_000),
            (2 * DECIMAL_UNIT / 5, 450_000),
            (DECIMAL_UNIT, DECIMAL_UNIT),
        ])
    }
}
