use thiserror::Error;

/// The core's narrow, non-fatal error surface.
///
/// `Tracker::step` never returns a `Result` — every frame-boundary condition
/// it can encounter (non-finite predictions, empty frames) is recovered from
/// silently. This type exists for the one place recovery isn't possible
/// without caller awareness: constructing the observation vector for a
/// degenerate box.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TrackerError {
    /// A bounding box with zero or negative width/height was offered to the
    /// geometry kernel's observation-space conversion.
    #[error("degenerate box ({width}x{height}): cannot convert to observation space")]
    DegenerateBox { width: f64, height: f64 },
}
