use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use tracing::{info, warn};

use crate::api::FetchError;
use crate::grid::{self, ContributionMap, DEFAULT_WINDOW_DAYS};
use crate::models::{ContributionsResponse, GridCell, YearTotal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Style {
    #[default]
    Clay,
    Jelly,
    Hologram,
}

impl Style {
    pub fn forced_theme(self) -> Option<Theme> {
        match self {
            Style::Hologram => Some(Theme::Dark),
            Style::Clay | Style::Jelly => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

/// A fetched response, indexed for year navigation.
#[derive(Debug, Clone)]
pub struct Dataset {
    years: Vec<YearTotal>,
    records: ContributionMap,
}

impl Dataset {
    /// Year keys that are not four-digit numbers are dropped. Without any
    /// usable totals, years and totals come from the record dates instead.
    pub fn from_response(response: ContributionsResponse) -> Self {
        let records = grid::contribution_map(&response.contributions);
        let mut totals: BTreeMap<i32, u64> = response
            .total
            .iter()
            .filter_map(|(year, total)| grid::parse_year(year).ok().map(|year| (year, *total)))
            .collect();

        if totals.is_empty() {
            for (date, count) in &records {
                let Some(year) = date.get(..4).and_then(|prefix| grid::parse_year(prefix).ok())
                else {
                    continue;
                };
                *totals.entry(year).or_insert(0) += u64::from(*count);
            }
        }

        let years = totals
            .into_iter()
            .rev()
            .map(|(year, total)| YearTotal { year, total })
            .collect();

        Self { years, records }
    }

    /// Newest first.
    pub fn years(&self) -> &[YearTotal] {
        &self.years
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.years.iter().any(|entry| entry.year == year)
    }

    pub fn records(&self) -> &ContributionMap {
        &self.records
    }

    pub fn year_records(&self, year: i32) -> ContributionMap {
        grid::filter_year(&self.records, &format!("{year:04}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridSource {
    Year(i32),
    Window { end: NaiveDate, days: usize },
    Placeholder { days: usize },
}

impl fmt::Display for GridSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridSource::Year(year) => write!(f, "calendar year {year}"),
            GridSource::Window { end, days } => write!(f, "{days} days ending {end}"),
            GridSource::Placeholder { days } => write!(f, "placeholder ({days} days)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedGrid {
    pub source: GridSource,
    pub cells: Vec<GridCell>,
}

/// Owns everything the view needs between interactions: style, preferred
/// theme, the last fetched dataset and the selected year.
#[derive(Debug, Default)]
pub struct Visualizer {
    style: Style,
    theme: Theme,
    dataset: Option<Dataset>,
    selected_year: Option<i32>,
}

impl Visualizer {
    pub fn new(style: Style, theme: Theme) -> Self {
        Self {
            style,
            theme,
            ..Self::default()
        }
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// The preference is kept even while a style overrides it.
    pub fn displayed_theme(&self) -> Theme {
        self.style.forced_theme().unwrap_or(self.theme)
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn selected_year(&self) -> Option<i32> {
        self.selected_year
    }

    /// Replaces the cached dataset and selects `initial_year` when present,
    /// otherwise the newest year.
    pub fn load(&mut self, dataset: Dataset, initial_year: Option<i32>) -> Option<i32> {
        let year = initial_year
            .filter(|year| dataset.has_year(*year))
            .or_else(|| dataset.years().first().map(|entry| entry.year));
        if let (Some(requested), Some(chosen)) = (initial_year, year) {
            if requested != chosen {
                warn!("year {requested} not available, showing {chosen}");
            }
        }
        self.dataset = Some(dataset);
        self.selected_year = year;
        year
    }

    pub fn clear(&mut self) {
        self.dataset = None;
        self.selected_year = None;
    }

    pub fn select_year(&mut self, year: i32) -> anyhow::Result<()> {
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no contribution data loaded"))?;
        anyhow::ensure!(dataset.has_year(year), "year {year} is not available");
        self.selected_year = Some(year);
        Ok(())
    }

    /// Calendar-year grid for the selection, or a placeholder window when
    /// nothing is loaded.
    pub fn current_grid(&self, today: NaiveDate) -> ResolvedGrid {
        match (&self.dataset, self.selected_year) {
            (Some(dataset), Some(year)) => ResolvedGrid {
                source: GridSource::Year(year),
                cells: grid::build_calendar_year_grid(&dataset.year_records(year), year, today),
            },
            _ => placeholder(DEFAULT_WINDOW_DAYS, today),
        }
    }

    /// Rolling window over the cached dataset, or a placeholder window when
    /// nothing is loaded.
    pub fn window_grid(&self, end: NaiveDate, days: usize) -> ResolvedGrid {
        match &self.dataset {
            Some(dataset) => ResolvedGrid {
                source: GridSource::Window { end, days },
                cells: grid::build_fixed_window_grid(dataset.records(), end, days),
            },
            None => placeholder(days, end),
        }
    }

    /// Loads a fetch result, or drops back to placeholder mode when the fetch
    /// failed so there is always something to draw.
    pub fn apply_fetch(
        &mut self,
        result: Result<ContributionsResponse, FetchError>,
        initial_year: Option<i32>,
    ) -> Option<FetchError> {
        match result {
            Ok(response) => {
                let dataset = Dataset::from_response(response);
                info!(
                    "loaded {} days across {} years",
                    dataset.records().len(),
                    dataset.years().len()
                );
                self.load(dataset, initial_year);
                None
            }
            Err(e) => {
                warn!("falling back to placeholder grid: {e}");
                self.clear();
                Some(e)
            }
        }
    }
}

fn placeholder(days: usize, today: NaiveDate) -> ResolvedGrid {
    ResolvedGrid {
        source: GridSource::Placeholder { days },
        cells: grid::generate_placeholder_window(days, today),
    }
}
