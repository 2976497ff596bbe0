use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use tracksort::io::{discover_sequences, group_by_frame, load_detections, write_output};
use tracksort::Tracker;

/// Online multi-object IoU tracker: runs the SORT pipeline over a directory
/// of MOTChallenge-style detection files, one fresh tracker per sequence.
#[derive(Parser, Debug)]
#[command(name = "tracksort", version, about)]
struct Cli {
    /// Render each frame as tracking proceeds (requires a `mot_benchmark`
    /// image-sequence symlink next to the binary; rendering itself is out of
    /// scope, this flag only validates the symlink's presence).
    #[arg(long)]
    display: bool,

    /// Root directory containing `<phase>/<sequence>/det/det.txt` files.
    #[arg(long = "seq_path", default_value = "data")]
    seq_path: String,

    /// Benchmark phase subdirectory to read sequences from.
    #[arg(long, default_value = "train")]
    phase: String,

    /// Frames a track may go unmatched before it is removed.
    #[arg(long = "max_age", default_value_t = 1)]
    max_age: u32,

    /// Consecutive matched frames required before steady-state emission.
    #[arg(long = "min_hits", default_value_t = 3)]
    min_hits: u32,

    /// Floor on IoU for an association to count as a match.
    #[arg(long = "iou_threshold", default_value_t = 0.3)]
    iou_threshold: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if cli.display && !Path::new("mot_benchmark").exists() {
        error!("--display was set but no mot_benchmark image-sequence directory is present");
        anyhow::bail!("missing mot_benchmark directory required by --display");
    }

    let sequences = discover_sequences(&cli.seq_path, &cli.phase)
        .with_context(|| format!("discovering sequences under {}/{}", cli.seq_path, cli.phase))?;

    if sequences.is_empty() {
        warn!(seq_path = cli.seq_path, phase = cli.phase, "no sequences found");
    }

    let mut total_frames = 0u64;
    let overall_start = Instant::now();

    for seq in &sequences {
        let seq_start = Instant::now();
        let raw = load_detections(&seq.det_file)
            .with_context(|| format!("loading detections for sequence {}", seq.name))?;
        let by_frame = group_by_frame(&raw);

        let mut tracker = Tracker::new(cli.max_age, cli.min_hits, cli.iou_threshold);
        let mut rows = Vec::new();

        for (&frame, detections) in &by_frame {
            let emitted = tracker.step(detections);
            for obj in emitted {
                rows.push((frame, obj));
            }
        }

        let out_path = Path::new("output").join(format!("{}.txt", seq.name));
        write_output(&out_path, &rows)
            .with_context(|| format!("writing output for sequence {}", seq.name))?;

        let frames = by_frame.len() as u64;
        total_frames += frames;
        let elapsed = seq_start.elapsed().as_secs_f64();
        info!(
            sequence = seq.name,
            frames,
            seconds = elapsed,
            fps = if elapsed > 0.0 { frames as f64 / elapsed } else { 0.0 },
            "sequence complete"
        );
    }

    let total_elapsed = overall_start.elapsed().as_secs_f64();
    info!(
        sequences = sequences.len(),
        total_frames,
        seconds = total_elapsed,
        fps = if total_elapsed > 0.0 { total_frames as f64 / total_elapsed } else { 0.0 },
        "all sequences complete"
    );

    Ok(())
}
