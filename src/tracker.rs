use tracing::warn;

use crate::associate::{AssignmentSolver, KuhnMunkresSolver, associate_detections_to_tracks};
use crate::bbox::BBox;
use crate::config::TrackerConfig;
use crate::kalman::KalmanTrack;

/// A single-frame observation: a box plus its detector confidence. Only the
/// box feeds the tracker; the score is carried through untouched for the
/// caller (or the I/O layer) to do with as it pleases.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
    pub bbox: BBox,
    pub score: f64,
}

impl Detection {
    pub fn new(bbox: BBox, score: f64) -> Self {
        Self { bbox, score }
    }
}

/// One tracked object as emitted for the current frame.
#[derive(Debug, Clone, Copy)]
pub struct TrackedObject {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub id: u64,
}

/// Owns the live track set and runs the per-frame predict → associate →
/// update → birth → death → emit pipeline.
///
/// Identifiers are allocated from a counter owned by this instance (not a
/// process-global one — see DESIGN.md): two `Tracker`s never share an
/// identifier space, which is the only difference from the original
/// class-level-counter design and is invisible to a caller of a single
/// instance.
pub struct Tracker {
    tracks: Vec<KalmanTrack>,
    next_id: u64,
    frame_count: u64,
    config: TrackerConfig,
    solver: Box<dyn AssignmentSolver>,
}

impl Tracker {
    pub fn new(max_age: u32, min_hits: u32, iou_threshold: f64) -> Self {
        Self::with_config(TrackerConfig {
            max_age,
            min_hits,
            iou_threshold,
        })
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 0,
            frame_count: 0,
            config,
            solver: Box::new(KuhnMunkresSolver),
        }
    }

    /// Runs one frame of the pipeline. Must be called exactly once per
    /// frame, including frames with no detections.
    pub fn step(&mut self, detections: &[Detection]) -> Vec<TrackedObject> {
        self.frame_count += 1;

        // Numerical hygiene (spec.md §9): detections with non-positive
        // extent are dropped before they ever enter association, rather
        // than being silently carried through as permanently-unmatched
        // candidates.
        let detections: Vec<Detection> = detections
            .iter()
            .copied()
            .filter(|d| {
                let ok = d.bbox.width() > 0.0 && d.bbox.height() > 0.0;
                if !ok {
                    warn!(bbox = ?d.bbox, "dropping degenerate detection before association");
                }
                ok
            })
            .collect();

        let predicted = self.predict_all();

        let (matches, unmatched_dets, unmatched_trks) = associate_detections_to_tracks(
            &detections.iter().map(|d| d.bbox).collect::<Vec<_>>(),
            &predicted,
            self.config.iou_threshold,
            self.solver.as_ref(),
        );

        for (d, t) in matches {
            if let Err(err) = self.tracks[t].update(detections[d].bbox) {
                warn!(?err, "dropping matched detection that failed observation conversion");
            }
        }

        let _ = unmatched_trks; // kept alive: coasting, handled in the emission walk below.

        for d in unmatched_dets {
            match KalmanTrack::new(self.next_id, detections[d].bbox) {
                Ok(track) => {
                    self.next_id += 1;
                    self.tracks.push(track);
                }
                Err(err) => {
                    warn!(?err, "dropping unmatched detection that failed observation conversion");
                }
            }
        }

        self.emit()
    }

    /// Predicts every live track, in place, dropping any whose predicted box
    /// has gone non-finite. Order-preserving over the surviving tracks.
    fn predict_all(&mut self) -> Vec<BBox> {
        let mut predicted = Vec::with_capacity(self.tracks.len());
        let mut i = 0;
        while i < self.tracks.len() {
            let bbox = self.tracks[i].predict();
            if bbox.is_finite() {
                predicted.push(bbox);
                i += 1;
            } else {
                warn!(id = self.tracks[i].id, "removing track with non-finite prediction");
                self.tracks.remove(i);
            }
        }
        predicted
    }

    /// Walks live tracks in reverse, emitting currently-confirmed ones and
    /// removing those that have coasted past `max_age`. Both checks run
    /// unconditionally for every track, in that order, per frame — this is
    /// the ordering spec.md §9 leaves as an Open Question; it is the
    /// ordering the original implementation uses and this crate locks it
    /// with a scenario test (see tests/lifecycle.rs).
    fn emit(&mut self) -> Vec<TrackedObject> {
        let mut emitted = Vec::new();
        let mut i = self.tracks.len();
        while i > 0 {
            i -= 1;
            let track = &self.tracks[i];

            if track.time_since_update < 1
                && (track.hit_streak >= self.config.min_hits
                    || self.frame_count <= self.config.min_hits as u64)
            {
                let state = track.get_state();
                emitted.push(TrackedObject {
                    x1: state.x1,
                    y1: state.y1,
                    x2: state.x2,
                    y2: state.y2,
                    id: track.id + 1,
                });
            }

            if track.time_since_update > self.config.max_age {
                self.tracks.remove(i);
            }
        }
        emitted
    }
}
