use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use log::info;

use trip_segmenter::{
    annotate_segments, load_track_points, render, report, segment_track, write_history_gpx,
    PoiConfig, Segment, SegmentConfig, TrackPoint,
};

#[derive(Parser)]
#[command(
    name = "trip-segmenter",
    version,
    about = "Segment a recorded GPS track into resting stops and travel legs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Rolling analysis window in seconds
    #[arg(long, default_value_t = 45.0, global = true)]
    window_secs: f64,

    /// Consecutive disagreeing points required to confirm a state change
    #[arg(long, default_value_t = 1, global = true)]
    debounce: u32,

    /// Look up points of interest near resting stops via the Overpass API
    #[arg(long, global = true)]
    poi: bool,

    /// Enable verbose diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print a textual travel summary to stdout
    Report {
        /// GPX track file
        track: PathBuf,
    },
    /// Render the track's segments to an interactive HTML map
    Map {
        /// GPX track file
        track: PathBuf,

        /// Output HTML file
        #[arg(short, long, default_value = "track-map.html")]
        output: PathBuf,

        /// Mark every point of active travel legs
        #[arg(long)]
        trace: bool,

        /// Mark every point of resting clusters
        #[arg(long)]
        cluster: bool,
    },
    /// Export resting stops as a GPX waypoint history
    Export {
        /// GPX track file
        track: PathBuf,

        /// Output GPX file
        #[arg(short, long, default_value = "history.gpx")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = SegmentConfig {
        analysis_window_secs: cli.window_secs,
        transition_debounce_points: cli.debounce,
        ..SegmentConfig::default()
    };

    match cli.command {
        Command::Report { track } => {
            let (_, segments) = load_and_segment(&track, &config, cli.poi)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            report::write_report(&mut out, &segments)?;
            out.flush()?;
        }
        Command::Map {
            track,
            output,
            trace,
            cluster,
        } => {
            let (points, segments) = load_and_segment(&track, &config, cli.poi)?;
            let view = (points[0].latitude, points[0].longitude);
            let options = render::RenderOptions { trace, cluster };
            render::render_map(&segments, view, options, &output)?;
            println!("Wrote {}", output.display());
        }
        Command::Export { track, output } => {
            let (_, segments) = load_and_segment(&track, &config, cli.poi)?;
            write_history_gpx(&segments, &output)?;
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}

/// Load a track, run the segmentation engine over it, and optionally annotate
/// resting segments with nearby amenities.
fn load_and_segment(
    path: &Path,
    config: &SegmentConfig,
    poi: bool,
) -> Result<(Vec<TrackPoint>, Vec<Segment>), Box<dyn Error>> {
    let points = load_track_points(path)?;
    info!("loaded {} points from {}", points.len(), path.display());

    let mut segments: Vec<Segment> = segment_track(&points, config).collect();
    info!("confirmed {} segments", segments.len());

    if poi {
        annotate_segments(&mut segments, &PoiConfig::default());
    }

    Ok((points, segments))
}
