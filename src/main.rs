use clap::Parser;
use keyreduce::export::{channel_path, svg_document};
use keyreduce::store::MemoryStore;
use keyreduce::{FrameSource, ReductionConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keyreduce", about = "Reduce sampled animation curves to a few optimal keyframes")]
struct Cli {
    /// Input JSON document ({"channels": [{"name", "keys": [{"frame", "value"}]}]})
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON path (defaults to overwriting the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of keys to keep, first and last included
    #[arg(short = 'k', long, default_value = "10")]
    keys: usize,

    /// Handle candidates per value in the tweak search (even)
    #[arg(long, default_value = "40")]
    steps: usize,

    /// Place keys using only the roughest channel
    #[arg(long)]
    roughest: bool,

    /// Skip handle fitting; keep linear segments
    #[arg(long)]
    no_tweak: bool,

    /// Run on a single thread
    #[arg(long)]
    sequential: bool,

    /// Also write the reduced curves as an SVG
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ReductionConfig {
        n_stops: cli.keys,
        tweak_steps: cli.steps,
        tweak_handles: !cli.no_tweak,
        parallel: !cli.sequential,
        frame_source: if cli.roughest {
            FrameSource::RoughestCurve
        } else {
            FrameSource::AllCurves
        },
    };

    let mut store = MemoryStore::load(&cli.input)?;
    let n_frames = store.channels.first().map_or(0, |c| c.keys.len());

    // Header
    eprintln!();
    eprintln!(
        "  keyreduce \u{00b7} {} channels \u{00b7} {} frames \u{2192} {} keys",
        store.channels.len(),
        n_frames,
        config.n_stops,
    );
    eprintln!();

    let result = keyreduce::reduce(&mut store, &config, None)?;
    eprintln!(
        "  Placement   {:?}  (max chord error {:.4})",
        result.reduction.indices, result.reduction.cost,
    );
    for report in &result.channels {
        match report.max_error {
            Some(err) => eprintln!(
                "  Channel     {}  {} \u{2192} {} keys \u{00b7} cubic error {:.4}",
                report.name,
                report.original_keys,
                report.keys.len(),
                err,
            ),
            None => eprintln!(
                "  Channel     {}  {} \u{2192} {} keys",
                report.name,
                report.original_keys,
                report.keys.len(),
            ),
        }
    }

    let output = cli.output.as_ref().unwrap_or(&cli.input);
    store.save(output)?;

    // Footer
    eprintln!();
    eprintln!("  \u{2713} {}", output.display());

    if let Some(svg_path) = &cli.svg {
        let paths: Vec<_> = result
            .channels
            .iter()
            .map(|r| (r.name.clone(), channel_path(&r.keys, &r.fits)))
            .collect();
        std::fs::write(svg_path, svg_document(&paths))?;
        eprintln!("  SVG         {}", svg_path.display());
    }

    eprintln!();

    Ok(())
}
