mod associate;
mod bbox;
mod config;
mod error;
mod kalman;
mod tracker;

pub mod io;

pub use associate::{AssignmentSolver, KuhnMunkresSolver};
pub use bbox::BBox;
pub use config::TrackerConfig;
pub use error::TrackerError;
pub use tracker::{Detection, TrackedObject, Tracker};
