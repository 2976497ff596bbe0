use pathfinding::prelude::{Matrix, kuhn_munkres_min};

use crate::bbox::{BBox, iou_batch};

/// Scales a float IoU into the integer cost space `kuhn_munkres_min` solves
/// over; ten thousand buckets is comfortably more resolution than an IoU
/// measurement carries.
const IOU_MULTIPLIER: f64 = 10_000.0;

/// The assignment backend's narrow interface: turn a cost matrix (lower is
/// better) into a one-to-one `(row, col)` matching. `Tracker` selects a
/// concrete implementation once at construction time; swapping backends
/// never changes observable matching behavior on well-conditioned inputs.
pub trait AssignmentSolver {
    fn solve(&self, cost: &Matrix<i64>) -> Vec<(usize, usize)>;
}

/// Dense rectangular assignment via Kuhn-Munkres (Hungarian algorithm).
#[derive(Default)]
pub struct KuhnMunkresSolver;

impl AssignmentSolver for KuhnMunkresSolver {
    fn solve(&self, cost: &Matrix<i64>) -> Vec<(usize, usize)> {
        if cost.rows == 0 || cost.columns == 0 {
            return Vec::new();
        }

        let transpose = cost.rows > cost.columns;
        let weights = if transpose {
            cost.transposed()
        } else {
            cost.clone()
        };

        let assignment = kuhn_munkres_min(&weights).1;
        assignment
            .into_iter()
            .enumerate()
            .map(|(i, j)| if transpose { (j, i) } else { (i, j) })
            .collect()
    }
}

/// Associates detections to predicted track boxes by IoU.
///
/// Returns `(matches, unmatched_dets, unmatched_trks)` as `(det_idx,
/// trk_idx)` pairs and index lists, partitioning `0..detections.len()` and
/// `0..tracks.len()` exactly.
pub fn associate_detections_to_tracks(
    detections: &[BBox],
    tracks: &[BBox],
    iou_threshold: f64,
    solver: &dyn AssignmentSolver,
) -> (Vec<(usize, usize)>, Vec<usize>, Vec<usize>) {
    if tracks.is_empty() {
        return (Vec::new(), (0..detections.len()).collect(), Vec::new());
    }
    if detections.is_empty() {
        return (Vec::new(), Vec::new(), (0..tracks.len()).collect());
    }

    let iou = iou_batch(detections, tracks);

    let candidates = unique_threshold_matching(&iou, iou_threshold).unwrap_or_else(|| {
        let mut cost = Matrix::new(detections.len(), tracks.len(), 0i64);
        for (i, row) in iou.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                cost[(i, j)] = -(v * IOU_MULTIPLIER) as i64;
            }
        }
        solver.solve(&cost)
    });

    let mut matches = Vec::new();
    let mut matched_det = vec![false; detections.len()];
    let mut matched_trk = vec![false; tracks.len()];

    for (d, t) in candidates {
        if iou[d][t] < iou_threshold {
            continue;
        }
        matches.push((d, t));
        matched_det[d] = true;
        matched_trk[t] = true;
    }

    let unmatched_dets = matched_det
        .iter()
        .enumerate()
        .filter(|&(_, &matched)| !matched)
        .map(|(d, _)| d)
        .collect();
    let unmatched_trks = matched_trk
        .iter()
        .enumerate()
        .filter(|&(_, &matched)| !matched)
        .map(|(t, _)| t)
        .collect();

    (matches, unmatched_dets, unmatched_trks)
}

/// The fast path of spec step 3: if thresholding the IoU matrix at
/// `iou_threshold` already yields a matrix where every row and column has at
/// most one nonzero entry, that's a valid one-to-one matching and no LP
/// solve is needed.
fn unique_threshold_matching(
    iou: &[Vec<f64>],
    iou_threshold: f64,
) -> Option<Vec<(usize, usize)>> {
    if iou.is_empty() || iou[0].is_empty() {
        return None;
    }

    let rows = iou.len();
    let cols = iou[0].len();
    let mut col_counts = vec![0usize; cols];
    let mut row_counts = vec![0usize; rows];
    let mut pairs = Vec::new();

    for (i, row) in iou.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            if v > iou_threshold {
                row_counts[i] += 1;
                col_counts[j] += 1;
                pairs.push((i, j));
            }
        }
    }

    if row_counts.iter().all(|&c| c <= 1) && col_counts.iter().all(|&c| c <= 1) {
        Some(pairs)
    } else {
        None
    }
}
