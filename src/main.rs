use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use plays::config::ReportConfig;
use plays::event::Event;
use plays::stats::Report;
use plays::timefmt::{day_label, LocalOffset};
use plays::window::{Window, WindowKind};
use plays::{days, loader, logging, renderer, stats_builder};

// Help text constants
const HELP_MAIN: &str = "\
plays - listening history recap (year, month, week, day, since, life)

Commands:
    (default)            Build a report from a scrobbles export.
    list                 List the exports found in the data directory.
    track                Show the listening days of one track.

Usage:
    plays [--file <path>] [--window <window>] [--render md,json] [--output <dir>]

More help:
    plays --help report
    plays --help window";

const HELP_REPORT: &str = "\
Build a report (md,json)

Usage:
    plays [--file <path> | --data-dir <dir>] [options]

Options:
    --file <path>         Export to read. Defaults to the only scrobbles-*.json in --data-dir.
    --data-dir <dir>      Directory holding scrobbles-*.json exports (default: data).
    --window <window>     Period to cover (default: life). See: plays --help window
    --items <n>           Tracks, artists and albums per ranking, 5-100 (default: 20).
    --days <n>            Days per day ranking and streak table, 3-20 (default: 5).
    --peak-plays <n>      Tracks in the single-day peak ranking, 3-20 (default: --days).
    --utc-offset <off>    Local offset such as +02:00 (default: system offset).
    --render [formats]    Comma-separated formats (md,json). Empty renders md.
    --output <dir>        Output directory (default: current dir).
    --json-stats <path>   Render a saved JSON report instead of reading an export.
    --log-dir <dir>       Also write logs to <dir>/plays.log. Level comes from RUST_LOG.

Examples:
  plays --window 2025 --render md,json --output reports
  plays --file data/scrobbles-alice.json --window 01/03/2025 --days 10";

const HELP_WINDOW: &str = "\
Windows

    life          Everything (default)
    2025          A calendar year
    2025-03       A month
    2025-W12      An ISO week
    2025-03-15    A single day
    15/03/2025    Everything since that day (also: 2025-03-15..)

A bare 2025-03-15 covers that day only. To start a report on a date and keep
everything after it, use 15/03/2025 or 2025-03-15..

Bounds are local days, using --utc-offset or the system offset.";

#[derive(Parser)]
#[command(name = "plays", disable_help_flag = true)]
#[command(about = "Listening history recap tool", long_about = None)]
struct Cli {
    /// Scrobbles export to analyze
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Directory searched for scrobbles-*.json exports
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Window to report on (life, 2025, 2025-03, 2025-W12, 2025-03-15, 15/03/2025)
    #[arg(long, default_value = "life")]
    window: String,

    /// Entries per track, artist and album ranking
    #[arg(long)]
    items: Option<usize>,

    /// Entries per day ranking and streak table
    #[arg(long)]
    days: Option<usize>,

    /// Entries in the single-day peak ranking
    #[arg(long)]
    peak_plays: Option<usize>,

    /// Local UTC offset, e.g. +02:00
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset: Option<String>,

    /// Render formats (comma-separated: md,json)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    render: Option<String>,

    /// Output directory (defaults to current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render a previously saved JSON report instead of reading an export
    #[arg(long)]
    json_stats: Option<PathBuf>,

    /// Directory for the log file
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Show help (global or per topic). Example: plays --help window
    #[arg(long, value_name = "TOPIC", num_args = 0..=1, default_missing_value = "")]
    help: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the scrobbles exports in the data directory
    List,
    /// Show every listening day of one track
    Track {
        /// Artist name, exactly as in the export
        #[arg(long)]
        artist: String,
        /// Track title, exactly as in the export
        #[arg(long)]
        track: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref help_topic) = cli.help {
        let topic = help_topic.trim();
        if topic.is_empty() {
            println!("{}", HELP_MAIN);
        } else if topic.eq_ignore_ascii_case("report") {
            println!("{}", HELP_REPORT);
        } else if topic.eq_ignore_ascii_case("window") {
            println!("{}", HELP_WINDOW);
        } else {
            println!("Unknown help topic: {}", topic);
        }
        return Ok(());
    }

    logging::init_logging(cli.log_dir.as_deref())?;

    match cli.command {
        Some(Commands::List) => list_exports(&cli.data_dir),
        Some(Commands::Track {
            ref artist,
            ref track,
        }) => {
            let offset = match cli.utc_offset.as_deref() {
                Some(text) => LocalOffset::parse(text)?,
                None => LocalOffset::system(),
            };
            let events = load_events(&cli)?;
            show_track(&events, offset, artist, track)
        }
        None => run_report(&cli),
    }
}

fn list_exports(data_dir: &Path) -> Result<()> {
    let files = loader::list_files(data_dir)?;
    if files.is_empty() {
        println!("No scrobbles-*.json files in {}", data_dir.display());
        return Ok(());
    }

    for (i, file) in files.iter().enumerate() {
        let size = std::fs::metadata(file)
            .with_context(|| format!("Failed to read metadata: {}", file.display()))?
            .len();
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{}. {} ({:.2} MB)", i + 1, name, size as f64 / (1024.0 * 1024.0));
    }
    Ok(())
}

/// Resolve the export to read: `--file`, or the only export in `--data-dir`.
fn resolve_file(cli: &Cli) -> Result<PathBuf> {
    if let Some(ref file) = cli.file {
        return Ok(file.clone());
    }

    let mut files = loader::list_files(&cli.data_dir)?;
    match files.len() {
        0 => bail!(
            "No scrobbles-*.json files in {}. Use --file or --data-dir.",
            cli.data_dir.display()
        ),
        1 => Ok(files.remove(0)),
        n => bail!(
            "Found {} exports in {}. Pick one with --file (see: plays list).",
            n,
            cli.data_dir.display()
        ),
    }
}

fn load_events(cli: &Cli) -> Result<Vec<Event>> {
    let path = resolve_file(cli)?;
    let events = loader::load_file(&path)?;
    if events.is_empty() {
        bail!("No scrobbles loaded from {}", path.display());
    }
    Ok(events)
}

fn run_report(cli: &Cli) -> Result<()> {
    let config = ReportConfig::from_args(
        cli.items,
        cli.days,
        cli.peak_plays,
        cli.utc_offset.as_deref(),
    )?;
    let window = Window::parse(&cli.window)?;

    let (report, stem) = match cli.json_stats {
        Some(ref path) => {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "report".to_string());
            (Report::load_from_file(path)?, stem)
        }
        None => {
            let events = window.retain(load_events(cli)?, config.offset);
            if events.is_empty() {
                bail!("No scrobbles in {}", window.phrase());
            }
            let report = stats_builder::build_report(&events, &window, &config)?;
            (report, default_stem(&window))
        }
    };

    // Determine output directory
    let output_dir = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    // Parse formats
    let render_arg = cli.render.as_deref().unwrap_or("");
    let formats: Vec<&str> = if render_arg.is_empty() {
        vec!["md"]
    } else {
        render_arg.split(',').map(|s| s.trim()).collect()
    };

    for format in formats {
        match format {
            "md" => {
                let markdown = renderer::md::render(&report)?;
                let output_path = output_dir.join(format!("{}.md", stem));
                std::fs::write(&output_path, markdown).with_context(|| {
                    format!("Failed to write report: {}", output_path.display())
                })?;
                eprintln!("Markdown report written to: {}", output_path.display());
            }
            "json" => {
                let output_path = output_dir.join(format!("{}.json", stem));
                report.save_to_file(&output_path)?;
                eprintln!("JSON report written to: {}", output_path.display());
            }
            _ => {
                eprintln!("Warning: Unknown format '{}', skipping", format);
            }
        }
    }

    Ok(())
}

fn show_track(events: &[Event], offset: LocalOffset, artist: &str, track: &str) -> Result<()> {
    let Some(peak) = days::peak_day_for_track(events, offset, artist, track) else {
        bail!("No dated plays of '{}' by '{}'", track, artist);
    };

    println!("{} - {}", artist, track);
    println!(
        "Peak: {} with {} of {} plays",
        day_label(&peak.day),
        peak.plays,
        peak.total
    );

    let all_days = days::all_days_for_track(events, offset, artist, track).unwrap_or_default();
    for bucket in all_days {
        println!("  {}  {}", bucket.label(), bucket.value);
    }
    Ok(())
}

/// Output file stem for a window, e.g. `plays-2025` or `plays-since-2025-03-15`.
fn default_stem(window: &Window) -> String {
    let key = match window.kind {
        WindowKind::Since => match window.from {
            Some(from) => format!("since-{}", from.format("%Y-%m-%d")),
            None => "since".to_string(),
        },
        WindowKind::Life => "life".to_string(),
        _ => window.key.clone(),
    };
    format!("plays-{}", key)
}

