//! Trajectories detected on a kymograph.
//!
//! A [`Trajectory`] is an ordered list of [`TrackPoint`]s in the kymograph's
//! coordinate space. The service works in `(time, position)` order: time is
//! the frame index (image row), position is the displacement along the line
//! (image column). Spatial consumers that want `(x, y)` should use
//! [`TrackPoint::to_xy`].
//!
//! # Example
//!
//! ```
//! use kymobutler::track::{Trajectory, TrackPoint};
//!
//! let dense = Trajectory::new(
//!     "Track_1",
//!     vec![
//!         TrackPoint::new(0.0, 0.0),
//!         TrackPoint::new(1.0, 1.0),
//!         TrackPoint::new(2.0, 2.0),
//!         TrackPoint::new(3.0, 2.0),
//!     ],
//! );
//!
//! let sparse = dense.simplified();
//! assert_eq!(sparse.len(), 3);
//! ```

mod simplify;
pub mod wire;

pub use simplify::simplify;

use serde::{Deserialize, Serialize};

/// Prefix of the label given to decoded tracks (`Track_1`, `Track_2`, ...).
pub const TRACK_LABEL_PREFIX: &str = "Track_";

/// One sample of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Frame index (vertical axis of the kymograph).
    pub time: f64,
    /// Displacement along the line (horizontal axis of the kymograph).
    pub position: f64,
}

impl TrackPoint {
    /// Creates a point from its `(time, position)` pair.
    pub fn new(time: f64, position: f64) -> Self {
        Self { time, position }
    }

    /// Returns the point as `(x, y)` image coordinates, i.e. `(position, time)`.
    pub fn to_xy(&self) -> (f64, f64) {
        (self.position, self.time)
    }
}

/// A labelled, ordered sequence of track points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    label: String,
    points: Vec<TrackPoint>,
}

impl Trajectory {
    /// Creates a trajectory from already ordered points.
    pub fn new(label: impl Into<String>, points: Vec<TrackPoint>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    /// Returns the label for the track at `index` (0-based) in a response.
    pub fn label_for_index(index: usize) -> String {
        format!("{}{}", TRACK_LABEL_PREFIX, index + 1)
    }

    /// Returns the trajectory label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the points in order.
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true when the trajectory has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last frame covered, if any.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.time, last.time)),
            _ => None,
        }
    }

    /// Returns a sparse copy keeping only slope breakpoints.
    ///
    /// See [`simplify`] for the exact rule.
    pub fn simplified(&self) -> Trajectory {
        Trajectory {
            label: self.label.clone(),
            points: simplify(&self.points),
        }
    }
}
