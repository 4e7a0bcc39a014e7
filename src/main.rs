use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

mod api;
mod app;
mod config;
mod grid;
mod layout;
mod models;
mod report;

use crate::api::ContributionsClient;
use crate::app::{Dataset, ResolvedGrid, Style, Theme, Visualizer};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "contrib-grid")]
#[command(about = "Calendar-aligned contribution grids for 3D voxel renderers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,
    /// Write output here instead of stdout
    #[arg(long, global = true)]
    out: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Style::Clay, global = true)]
    style: Style,
    #[arg(long, value_enum, default_value_t = Theme::Light, global = true)]
    theme: Theme,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Rolling window of whole weeks ending on a given day
    Window {
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = grid::DEFAULT_WINDOW_DAYS)]
        days: usize,
        /// Last day of the window, defaults to today
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Sunday-aligned grid for one calendar year
    Year {
        #[arg(long)]
        user: String,
        /// Defaults to the most recent year with data
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// List the years available for a user
    Years {
        #[arg(long)]
        user: String,
    },
    /// Random demo data shaped like a real window
    Placeholder {
        #[arg(long, default_value_t = grid::DEFAULT_WINDOW_DAYS)]
        days: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("invalid environment configuration")?;
    let client = ContributionsClient::new(&config).context("failed to build HTTP client")?;
    let mut visualizer = Visualizer::new(cli.style, cli.theme);
    let today = Local::now().date_naive();

    info!("using contributions API at {}", config.api_url);

    let (user, resolved) = match cli.command {
        Commands::Window { user, days, end } => {
            let days = grid::validate_window_days(days)?;
            let result = client.fetch_all(&user).await;
            report_fallback(visualizer.apply_fetch(result, None));
            (Some(user), visualizer.window_grid(end.unwrap_or(today), days))
        }
        Commands::Year { user, year, today: as_of } => {
            let year = year.as_deref().map(grid::parse_year).transpose()?;
            let result = client.fetch_all(&user).await;
            report_fallback(visualizer.apply_fetch(result, None));
            if let Some(year) = year.filter(|_| visualizer.dataset().is_some()) {
                visualizer.select_year(year)?;
            }
            if let Some(year) = visualizer.selected_year() {
                info!("rendering {year} for {user}");
            }
            (Some(user), visualizer.current_grid(as_of.unwrap_or(today)))
        }
        Commands::Years { user } => {
            // A year list has no placeholder equivalent, so failures are fatal.
            let dataset = Dataset::from_response(client.fetch_all(&user).await?);
            return write_output(cli.out.as_ref(), &report::build_year_list(&user, &dataset));
        }
        Commands::Placeholder { days } => {
            let days = grid::validate_window_days(days)?;
            (None, visualizer.window_grid(today, days))
        }
    };

    let output = render(cli.format, user.as_deref(), &resolved, &visualizer)?;
    write_output(cli.out.as_ref(), &output)
}

fn report_fallback(error: Option<api::FetchError>) {
    if let Some(e) = error {
        eprintln!("Could not load contributions ({e}); showing placeholder data.");
    }
}

fn render(
    format: Format,
    user: Option<&str>,
    grid: &ResolvedGrid,
    visualizer: &Visualizer,
) -> anyhow::Result<String> {
    match format {
        Format::Text => Ok(report::build_report(
            user,
            grid,
            visualizer.style(),
            visualizer.displayed_theme(),
        )),
        Format::Json => report::to_json(grid),
        Format::Csv => report::to_csv(grid),
    }
}

fn write_output(out: Option<&PathBuf>, output: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Output written to {}.", path.display());
        }
        None => print!("{output}"),
    }
    Ok(())
}
