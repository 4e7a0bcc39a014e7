use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use rand::Rng;
use thiserror::Error;

use crate::models::{ContributionRecord, GridCell};

pub const DAYS_IN_WEEK: usize = 7;
pub const WEEKS: usize = 53;
pub const DEFAULT_WINDOW_DAYS: usize = WEEKS * DAYS_IN_WEEK;
/// Longest accepted rolling window, roughly a century.
pub const MAX_WINDOW_DAYS: usize = 5_200 * DAYS_IN_WEEK;

pub const PLACEHOLDER_ZERO_PROBABILITY: f64 = 0.25;
/// Exclusive upper bound for placeholder counts.
pub const PLACEHOLDER_MAX_COUNT: u32 = 35;

/// ISO date string to contribution count.
pub type ContributionMap = BTreeMap<String, u32>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("window length {0} is not a positive multiple of 7 up to 36400")]
    InvalidWindow(usize),
    #[error("year {0:?} is not a four-digit number")]
    InvalidYear(String),
}

/// Later duplicates win.
pub fn contribution_map(records: &[ContributionRecord]) -> ContributionMap {
    records
        .iter()
        .map(|record| (record.date.clone(), record.count))
        .collect()
}

pub fn filter_year(records: &ContributionMap, year: &str) -> ContributionMap {
    records
        .iter()
        .filter(|(date, _)| date.starts_with(year))
        .map(|(date, count)| (date.clone(), *count))
        .collect()
}

pub fn validate_window_days(total_days: usize) -> Result<usize, GridError> {
    if total_days == 0 || total_days % DAYS_IN_WEEK != 0 || total_days > MAX_WINDOW_DAYS {
        return Err(GridError::InvalidWindow(total_days));
    }
    Ok(total_days)
}

pub fn parse_year(text: &str) -> Result<i32, GridError> {
    let trimmed = text.trim();
    if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GridError::InvalidYear(text.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| GridError::InvalidYear(text.to_string()))
}

/// Cells for the `total_days` days ending on `window_end`, inclusive.
///
/// `total_days` is not checked here; see [`validate_window_days`]. A window
/// reaching before the earliest representable date yields no cells.
pub fn build_fixed_window_grid(
    records: &ContributionMap,
    window_end: NaiveDate,
    total_days: usize,
) -> Vec<GridCell> {
    let Some(start) = total_days
        .checked_sub(1)
        .and_then(|back| u64::try_from(back).ok())
        .and_then(|back| window_end.checked_sub_days(Days::new(back)))
    else {
        return Vec::new();
    };

    start
        .iter_days()
        .take(total_days)
        .map(|date| GridCell {
            date,
            count: records.get(&date.to_string()).copied().unwrap_or(0),
        })
        .collect()
}

/// Cells from the Sunday on or before Jan 1 of `year` through Dec 31, or
/// through `today` when `year` is the current year.
///
/// Leading days from the previous year always carry a zero count. The tail
/// is not padded to a full week; [`crate::layout::VoxelLayout`] does that.
pub fn build_calendar_year_grid(
    records: &ContributionMap,
    year: i32,
    today: NaiveDate,
) -> Vec<GridCell> {
    let (Some(jan_first), Some(dec_last)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return Vec::new();
    };

    let leading = Days::new(u64::from(jan_first.weekday().num_days_from_sunday()));
    let Some(grid_start) = jan_first.checked_sub_days(leading) else {
        return Vec::new();
    };
    let grid_end = if today.year() == year { today } else { dec_last };

    grid_start
        .iter_days()
        .take_while(|date| *date <= grid_end)
        .map(|date| {
            let count = if date.year() == year {
                records.get(&date.to_string()).copied().unwrap_or(0)
            } else {
                0
            };
            GridCell { date, count }
        })
        .collect()
}

pub fn generate_placeholder_window(total_days: usize, today: NaiveDate) -> Vec<GridCell> {
    generate_placeholder_window_with(
        &mut rand::thread_rng(),
        total_days,
        today,
        PLACEHOLDER_ZERO_PROBABILITY,
    )
}

/// Synthetic cells shaped like [`build_fixed_window_grid`] output. Each day
/// is zero with probability `zero_probability`, otherwise uniform in
/// `0..PLACEHOLDER_MAX_COUNT`.
pub fn generate_placeholder_window_with<R: Rng + ?Sized>(
    rng: &mut R,
    total_days: usize,
    today: NaiveDate,
    zero_probability: f64,
) -> Vec<GridCell> {
    let zero_probability = zero_probability.clamp(0.0, 1.0);
    let mut cells = build_fixed_window_grid(&ContributionMap::new(), today, total_days);
    for cell in &mut cells {
        cell.count = if rng.gen_bool(zero_probability) {
            0
        } else {
            rng.gen_range(0..PLACEHOLDER_MAX_COUNT)
        };
    }
    cells
}
