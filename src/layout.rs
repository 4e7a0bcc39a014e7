use chrono::NaiveDate;
use serde::Serialize;

use crate::grid::DAYS_IN_WEEK;
use crate::models::GridCell;

pub const MAX_VOXEL_HEIGHT: f64 = 8.0;
const BASE_VOXEL_HEIGHT: f64 = 0.1;
const EMPTY_VOXEL_HEIGHT: f64 = 0.05;

/// One position on the week-by-weekday grid. Trailing slots past the end of
/// the cell sequence have no date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoxelSlot {
    pub week: usize,
    pub day: usize,
    pub date: Option<NaiveDate>,
    pub count: u32,
    pub normalized: f64,
    pub height: f64,
}

fn voxel_height(count: u32, normalized: f64) -> f64 {
    if count == 0 {
        EMPTY_VOXEL_HEIGHT
    } else {
        BASE_VOXEL_HEIGHT + normalized * MAX_VOXEL_HEIGHT
    }
}

impl VoxelSlot {
    /// Intensity bucket 0..=4; any non-zero count is at least 1.
    pub fn level(&self) -> u8 {
        if self.count == 0 {
            return 0;
        }
        match self.normalized {
            n if n > 0.75 => 4,
            n if n > 0.5 => 3,
            n if n > 0.25 => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoxelLayout {
    slots: Vec<VoxelSlot>,
    max_count: u32,
}

impl VoxelLayout {
    /// Maps cell `i` to week `i / 7`, weekday `i % 7`, rounding the grid up to
    /// whole weeks.
    pub fn from_cells(cells: &[GridCell]) -> Self {
        let max_count = cells.iter().map(|cell| cell.count).max().unwrap_or(0);
        let divisor = f64::from(max_count.max(1));
        let padded_len = cells.len().div_ceil(DAYS_IN_WEEK) * DAYS_IN_WEEK;

        let slots = (0..padded_len)
            .map(|index| {
                let cell = cells.get(index);
                let count = cell.map_or(0, |cell| cell.count);
                let normalized = f64::from(count) / divisor;
                VoxelSlot {
                    week: index / DAYS_IN_WEEK,
                    day: index % DAYS_IN_WEEK,
                    date: cell.map(|cell| cell.date),
                    count,
                    normalized,
                    height: voxel_height(count, normalized),
                }
            })
            .collect();

        Self { slots, max_count }
    }

    pub fn slots(&self) -> &[VoxelSlot] {
        &self.slots
    }

    pub fn slot(&self, week: usize, day: usize) -> Option<&VoxelSlot> {
        if day >= DAYS_IN_WEEK {
            return None;
        }
        self.slots.get(week * DAYS_IN_WEEK + day)
    }

    pub fn week_count(&self) -> usize {
        self.slots.len() / DAYS_IN_WEEK
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn total(&self) -> u64 {
        self.slots.iter().map(|slot| u64::from(slot.count)).sum()
    }
}
