//! Scoring module - line clear points, levels and gravity timing
//!
//! All numeric tables live in [`Rules`] so embedders can swap rulesets.
//! Defaults:
//! - Line clear points follow the classic table `[0, 40, 100, 300, 1200]`,
//!   multiplied by the current level (levels start at 1).
//! - The level increases every 10 cumulative cleared rows.
//! - Gravity starts at 500ms per row and speeds up by 40ms per level, with a
//!   50ms floor.

use crate::pieces::KickSet;
use crate::types::{
    BASE_GRAVITY_MS, FAST_DROP_MS, GRAVITY_STEP_MS, HARD_DROP_POINTS, LINES_PER_LEVEL,
    LINE_SCORES, MIN_GRAVITY_MS, SOFT_DROP_POINTS,
};

/// Configurable rule constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Points indexed by simultaneous clear count (0..=4)
    pub line_scores: [u32; 5],
    pub lines_per_level: u32,
    pub base_gravity_ms: u32,
    pub gravity_step_ms: u32,
    pub min_gravity_ms: u32,
    pub fast_drop_ms: u32,
    pub soft_drop_points: u32,
    pub hard_drop_points: u32,
    pub kicks: KickSet,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            line_scores: LINE_SCORES,
            lines_per_level: LINES_PER_LEVEL,
            base_gravity_ms: BASE_GRAVITY_MS,
            gravity_step_ms: GRAVITY_STEP_MS,
            min_gravity_ms: MIN_GRAVITY_MS,
            fast_drop_ms: FAST_DROP_MS,
            soft_drop_points: SOFT_DROP_POINTS,
            hard_drop_points: HARD_DROP_POINTS,
            kicks: KickSet::Srs,
        }
    }
}

impl Rules {
    /// Points for clearing `lines` rows at once at `level`.
    ///
    /// More than four simultaneous rows cannot happen with four-cell pieces and
    /// scores as four.
    pub fn line_clear_points(&self, lines: usize, level: u32) -> u32 {
        let base = self.line_scores[lines.min(4)];
        base.saturating_mul(level)
    }

    /// Level reached after `total_lines` cumulative cleared rows
    pub fn level_for_lines(&self, total_lines: u32) -> u32 {
        1 + total_lines / self.lines_per_level.max(1)
    }

    /// Gravity interval for a level, clamped so it never reaches zero
    pub fn gravity_interval_ms(&self, level: u32) -> u32 {
        let floor = self.min_gravity_ms.max(1);
        let speedup = self
            .gravity_step_ms
            .saturating_mul(level.saturating_sub(1));
        self.base_gravity_ms.saturating_sub(speedup).max(floor)
    }

    /// Points for a drop of `rows` rows
    pub fn drop_points(&self, rows: u32, is_hard_drop: bool) -> u32 {
        let per_row = if is_hard_drop {
            self.hard_drop_points
        } else {
            self.soft_drop_points
        };
        rows.saturating_mul(per_row)
    }
}
