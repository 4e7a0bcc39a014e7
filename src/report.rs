use std::fmt::Write;

use crate::app::{Dataset, ResolvedGrid, Style, Theme};
use crate::grid::DAYS_IN_WEEK;
use crate::layout::VoxelLayout;
use crate::models::{GridCell, GridSummary};

const DAY_LABELS: [&str; DAYS_IN_WEEK] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const LEVEL_GLYPHS: [char; 5] = ['·', '░', '▒', '▓', '█'];

pub fn summarize(cells: &[GridCell]) -> GridSummary {
    let mut busiest: Option<&GridCell> = None;
    let mut active_days = 0usize;
    let mut streak = 0usize;
    let mut longest_streak = 0usize;

    for cell in cells {
        if cell.count > 0 {
            active_days += 1;
            streak += 1;
            longest_streak = longest_streak.max(streak);
        } else {
            streak = 0;
        }
        // Earliest date wins ties.
        if busiest.map_or(true, |best| cell.count > best.count) {
            busiest = Some(cell);
        }
    }

    let busiest = busiest.filter(|cell| cell.count > 0);
    GridSummary {
        max_count: busiest.map_or(0, |cell| cell.count),
        busiest_day: busiest.map(|cell| cell.date),
        active_days,
        longest_streak,
    }
}

/// One row per weekday, one column per week.
pub fn render_heatmap(layout: &VoxelLayout) -> String {
    let mut output = String::new();
    for (day, label) in DAY_LABELS.iter().enumerate() {
        let _ = write!(output, "{label} ");
        for week in 0..layout.week_count() {
            let glyph = match layout.slot(week, day) {
                Some(slot) if slot.date.is_some() => LEVEL_GLYPHS[usize::from(slot.level())],
                _ => ' ',
            };
            output.push(glyph);
        }
        let _ = writeln!(output);
    }
    output
}

pub fn build_report(
    user: Option<&str>,
    grid: &ResolvedGrid,
    style: Style,
    theme: Theme,
) -> String {
    let summary = summarize(&grid.cells);
    let layout = VoxelLayout::from_cells(&grid.cells);

    let mut output = String::new();
    let user_label = user.unwrap_or("demo data");

    let _ = writeln!(output, "# Contribution Grid");
    let _ = writeln!(output, "Generated for {} ({})", user_label, grid.source);
    let _ = writeln!(output, "Style {style:?}, {theme} theme");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");

    match (grid.cells.first(), grid.cells.last()) {
        (Some(first), Some(last)) => {
            let open_days = layout
                .slots()
                .iter()
                .filter(|slot| slot.date.is_none())
                .count();
            let _ = writeln!(
                output,
                "- {} to {} ({} weeks, {} open days)",
                first.date,
                last.date,
                layout.week_count(),
                open_days
            );
        }
        _ => {
            let _ = writeln!(output, "No days in this grid.");
        }
    }
    let _ = writeln!(output, "- {} contributions", layout.total());
    let _ = writeln!(output, "- {} active days", summary.active_days);
    let _ = writeln!(output, "- longest streak {} days", summary.longest_streak);
    match summary.busiest_day {
        Some(day) => {
            let _ = writeln!(output, "- busiest day {} with {}", day, summary.max_count);
        }
        None => {
            let _ = writeln!(output, "- no activity recorded");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Heatmap (peak {} per day)", layout.max_count());
    let _ = writeln!(output, "```");
    output.push_str(&render_heatmap(&layout));
    let _ = writeln!(output, "```");

    output
}

pub fn build_year_list(user: &str, dataset: &Dataset) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Years with data for {user}:");
    if dataset.years().is_empty() {
        let _ = writeln!(output, "No years recorded.");
    }
    for entry in dataset.years() {
        let _ = writeln!(output, "- {}: {} contributions", entry.year, entry.total);
    }
    output
}

pub fn to_json(grid: &ResolvedGrid) -> anyhow::Result<String> {
    let layout = VoxelLayout::from_cells(&grid.cells);
    Ok(serde_json::to_string_pretty(&layout)?)
}

pub fn to_csv(grid: &ResolvedGrid) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for cell in &grid.cells {
        writer.serialize(cell)?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::GridSource;
    use chrono::NaiveDate;

    fn cells(counts: &[u32]) -> Vec<GridCell> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        start
            .iter_days()
            .zip(counts)
            .map(|(date, count)| GridCell { date, count: *count })
            .collect()
    }

    fn grid(counts: &[u32]) -> ResolvedGrid {
        ResolvedGrid {
            source: GridSource::Year(2024),
            cells: cells(counts),
        }
    }

    #[test]
    fn summary_tracks_streaks_and_busiest_day() {
        let summary = summarize(&cells(&[1, 2, 0, 4, 4, 1, 0, 0, 3]));
        assert_eq!(summary.active_days, 6);
        assert_eq!(summary.longest_streak, 3);
        assert_eq!(summary.max_count, 4);
        assert_eq!(summary.busiest_day, NaiveDate::from_ymd_opt(2024, 1, 10));
    }

    #[test]
    fn empty_activity_has_no_busiest_day() {
        let summary = summarize(&cells(&[0, 0, 0]));
        assert_eq!(summary.busiest_day, None);
        assert_eq!(summary.max_count, 0);
    }

    #[test]
    fn heatmap_has_a_row_per_weekday() {
        let layout = VoxelLayout::from_cells(&cells(&[0, 8, 0, 0, 0, 0, 0, 2, 0, 0]));
        let heatmap = render_heatmap(&layout);
        let rows: Vec<&str> = heatmap.lines().collect();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0], "Sun ·░");
        assert_eq!(rows[1], "Mon █·");
        assert_eq!(rows[6], "Sat · ");
    }

    #[test]
    fn report_mentions_source_and_totals() {
        let report = build_report(Some("octocat"), &grid(&[0, 3, 5]), Style::Hologram, Theme::Dark);
        assert!(report.contains("Generated for octocat (calendar year 2024)"));
        assert!(report.contains("- 2024-01-07 to 2024-01-09 (1 weeks, 4 open days)"));
        assert!(report.contains("- 8 contributions"));
        assert!(report.contains("## Heatmap (peak 5 per day)"));
        assert!(report.contains("busiest day 2024-01-09 with 5"));
        assert!(report.contains("Style Hologram, dark theme"));
    }

    #[test]
    fn year_list_is_newest_first() {
        let raw = r#"{
            "total": {"2022": 0, "2024": 12},
            "contributions": [{"date": "2024-05-01", "count": 12, "level": 4}]
        }"#;
        let dataset = Dataset::from_response(serde_json::from_str(raw).unwrap());
        assert_eq!(
            build_year_list("octocat", &dataset),
            "Years with data for octocat:\n- 2024: 12 contributions\n- 2022: 0 contributions\n"
        );
    }

    #[test]
    fn year_list_derives_years_from_records_without_totals() {
        let raw = r#"{"contributions": [{"date": "2021-02-03", "count": 4}]}"#;
        let dataset = Dataset::from_response(serde_json::from_str(raw).unwrap());
        assert_eq!(
            build_year_list("octocat", &dataset),
            "Years with data for octocat:\n- 2021: 4 contributions\n"
        );
    }

    #[test]
    fn csv_export_has_header_and_iso_dates() {
        let csv = to_csv(&grid(&[2, 0])).unwrap();
        assert_eq!(csv, "date,count\n2024-01-07,2\n2024-01-08,0\n");
    }

    #[test]
    fn json_export_lists_padded_slots() {
        let json = to_json(&grid(&[1, 2, 3])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["slots"].as_array().unwrap().len(), 7);
        assert_eq!(value["max_count"], 3);
        assert!(value["slots"][6]["date"].is_null());
    }
}
