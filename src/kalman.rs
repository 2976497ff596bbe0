use nalgebra::{SMatrix, SVector};

use crate::bbox::BBox;
use crate::error::TrackerError;

/// A fixed-size (`dim_x = 7`, `dim_z = 4`) linear Kalman filter, specialized
/// for the constant-velocity box motion model: `F`, `H`, `Q`, `R` never
/// change shape or change after construction, so there is no benefit to a
/// generic allocator-based filter here.
#[allow(non_snake_case)]
struct KalmanFilter7x4 {
    x: SVector<f64, 7>,
    P: SMatrix<f64, 7, 7>,
    F: SMatrix<f64, 7, 7>,
    H: SMatrix<f64, 4, 7>,
    Q: SMatrix<f64, 7, 7>,
    R: SMatrix<f64, 4, 4>,
}

#[allow(non_snake_case)]
impl KalmanFilter7x4 {
    fn new(x0: SVector<f64, 4>) -> Self {
        let mut F = SMatrix::<f64, 7, 7>::identity();
        F[(0, 4)] = 1.0;
        F[(1, 5)] = 1.0;
        F[(2, 6)] = 1.0;

        let H = SMatrix::<f64, 4, 7>::identity();

        let mut q_diag = SVector::<f64, 7>::repeat(1.0);
        q_diag[6] *= 0.01;
        for i in 4..7 {
            q_diag[i] *= 0.01;
        }
        let Q = SMatrix::from_diagonal(&q_diag);

        let mut r_diag = SVector::<f64, 4>::repeat(1.0);
        r_diag[2] *= 10.0;
        r_diag[3] *= 10.0;
        let R = SMatrix::from_diagonal(&r_diag);

        let mut p_diag = SVector::<f64, 7>::repeat(10.0);
        for i in 4..7 {
            p_diag[i] *= 1000.0;
        }
        let P = SMatrix::from_diagonal(&p_diag);

        let mut x = SVector::<f64, 7>::zeros();
        x.fixed_rows_mut::<4>(0).copy_from(&x0);

        Self { x, P, F, H, Q, R }
    }

    /// Zeroes the scale velocity if the next step would collapse `s` to zero
    /// or below, then advances `x` and `P` one step.
    fn predict(&mut self) {
        if self.x[6] + self.x[2] <= 0.0 {
            self.x[6] = 0.0;
        }
        self.x = self.F * self.x;
        self.P = self.F * self.P * self.F.transpose() + self.Q;
    }

    fn update(&mut self, z: SVector<f64, 4>) {
        let y = z - self.H * self.x;
        let s = self.H * self.P * self.H.transpose() + self.R;
        let s_inv = s
            .try_inverse()
            .expect("measurement covariance is always positive definite by construction");
        let k = self.P * self.H.transpose() * s_inv;

        self.x += k * y;
        let identity = SMatrix::<f64, 7, 7>::identity();
        self.P = (identity - k * self.H) * self.P;
    }

    fn observation(&self) -> SVector<f64, 4> {
        self.x.fixed_rows::<4>(0).into_owned()
    }
}

/// One track's constant-velocity Kalman filter plus the lifecycle counters
/// the orchestrator reads and mutates every frame.
///
/// State vector `z = (cx, cy, s, r, ċx, ċy, ṡ)`: box center, area, aspect
/// ratio, and their per-frame velocities (aspect ratio has none).
pub struct KalmanTrack {
    filter: KalmanFilter7x4,
    pub id: u64,
    pub time_since_update: u32,
    pub hits: u32,
    pub hit_streak: u32,
    pub age: u32,
}

impl KalmanTrack {
    /// Builds a new track from its first observation. The caller is
    /// responsible for validating `bbox` (non-degenerate extent) before
    /// calling this — see [`BBox::to_z`].
    pub fn new(id: u64, bbox: BBox) -> Result<Self, TrackerError> {
        let z0 = bbox.to_z()?;
        Ok(Self {
            filter: KalmanFilter7x4::new(z0),
            id,
            time_since_update: 0,
            hits: 0,
            hit_streak: 0,
            age: 0,
        })
    }

    /// Advances the filter one step and returns the predicted box.
    pub fn predict(&mut self) -> BBox {
        self.age += 1;
        if self.time_since_update > 0 {
            self.hit_streak = 0;
        }
        self.time_since_update += 1;

        self.filter.predict();
        BBox::from_z(self.filter.observation())
    }

    /// Corrects the filter with a matched detection.
    pub fn update(&mut self, bbox: BBox) -> Result<(), TrackerError> {
        let z = bbox.to_z()?;
        self.time_since_update = 0;
        self.hits += 1;
        self.hit_streak += 1;
        self.filter.update(z);
        Ok(())
    }

    /// Current box estimate without stepping the filter.
    pub fn get_state(&self) -> BBox {
        BBox::from_z(self.filter.observation())
    }
}
