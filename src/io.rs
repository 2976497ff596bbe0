//! MOTChallenge-style detection I/O: sequence discovery, CSV parsing, and
//! tracker-output writing. This is the "benchmark I/O harness" spec.md
//! treats as an external collaborator; it lives in the library so the
//! `tracksort` binary stays a thin driver, but it is a separate boundary
//! from the core tracking algorithm — nothing in `tracker`/`kalman`/
//! `associate` depends on this module.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, info};

use crate::bbox::BBox;
use crate::tracker::{Detection, TrackedObject};

/// One detection line from a `det.txt` file, still tagged with its frame
/// number (the core only ever sees one frame's detections at a time).
#[derive(Debug, Clone, Copy)]
pub struct RawDetection {
    pub frame: u64,
    pub detection: Detection,
}

/// A discovered sequence: its name (the directory component under
/// `<phase>/`) and the path to its `det/det.txt` file.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub name: String,
    pub det_file: PathBuf,
}

/// Finds every `<seq_path>/<phase>/*/det/det.txt` file, sorted by sequence
/// name for deterministic processing order.
pub fn discover_sequences(seq_path: &str, phase: &str) -> Result<Vec<Sequence>> {
    let pattern = format!("{seq_path}/{phase}/*/det/det.txt");
    let mut sequences = Vec::new();

    for entry in glob::glob(&pattern).with_context(|| format!("invalid glob pattern {pattern}"))? {
        let det_file = entry.with_context(|| format!("failed to read glob entry under {pattern}"))?;
        let name = det_file
            .parent() // det/
            .and_then(Path::parent) // <seq-name>/
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("could not derive sequence name from {}", det_file.display()))?;
        sequences.push(Sequence { name, det_file });
    }

    sequences.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = sequences.len(), seq_path, phase, "discovered sequences");
    Ok(sequences)
}

/// Parses a MOTChallenge detection file: `frame,-1,x1,y1,w,h,score,-1,-1,-1`,
/// no header row. `(w, h)` is converted to `(x2, y2)` on the way in so every
/// downstream consumer works in corner form.
pub fn load_detections(det_file: &Path) -> Result<Vec<RawDetection>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_path(det_file)
        .with_context(|| format!("opening detection file {}", det_file.display()))?;

    let mut detections = Vec::new();
    for (line_no, record) in reader.records().enumerate() {
        let record = record.with_context(|| {
            format!("parsing record {} of {}", line_no + 1, det_file.display())
        })?;

        let frame: f64 = record
            .get(0)
            .with_context(|| format!("{}: missing frame column", det_file.display()))?
            .parse()
            .with_context(|| format!("{}: non-numeric frame column", det_file.display()))?;
        let x1: f64 = record.get(2).unwrap_or("0").parse().unwrap_or(0.0);
        let y1: f64 = record.get(3).unwrap_or("0").parse().unwrap_or(0.0);
        let w: f64 = record.get(4).unwrap_or("0").parse().unwrap_or(0.0);
        let h: f64 = record.get(5).unwrap_or("0").parse().unwrap_or(0.0);
        let score: f64 = record.get(6).unwrap_or("1").parse().unwrap_or(1.0);

        detections.push(RawDetection {
            frame: frame as u64,
            detection: Detection::new(BBox::new(x1, y1, x1 + w, y1 + h), score),
        });
    }

    Ok(detections)
}

/// Groups raw detections by frame number, returning every frame from 1 up
/// to (and including) the highest frame number seen — spec.md §6's
/// "exactly once per frame" contract means frames absent from the file
/// still get an empty detection list rather than being skipped.
pub fn group_by_frame(detections: &[RawDetection]) -> BTreeMap<u64, Vec<Detection>> {
    let max_frame = detections.iter().map(|d| d.frame).max().unwrap_or(0);
    let mut by_frame: BTreeMap<u64, Vec<Detection>> = (1..=max_frame).map(|f| (f, Vec::new())).collect();
    for raw in detections {
        by_frame.entry(raw.frame).or_default().push(raw.detection);
    }
    by_frame
}

/// Writes tracker output in MOTChallenge format:
/// `frame,id,x1,y1,w,h,1,-1,-1,-1`.
pub fn write_output(path: &Path, rows: &[(u64, TrackedObject)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating output file {}", path.display()))?;

    for (frame, obj) in rows {
        writer.write_record(&[
            frame.to_string(),
            obj.id.to_string(),
            format!("{:.3}", obj.x1),
            format!("{:.3}", obj.y1),
            format!("{:.3}", obj.x2 - obj.x1),
            format!("{:.3}", obj.y2 - obj.y1),
            "1".to_string(),
            "-1".to_string(),
            "-1".to_string(),
            "-1".to_string(),
        ])?;
    }
    writer.flush().with_context(|| format!("flushing {}", path.display()))?;

    info!(path = %path.display(), rows = rows.len(), "wrote tracker output");
    Ok(())
}
