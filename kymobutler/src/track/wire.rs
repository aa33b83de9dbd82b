//! Wire encoding of trajectories.
//!
//! The service exchanges tracks as a JSON array of tracks, each track being an
//! array of `[time, position]` pairs in frame order:
//!
//! ```text
//! [[[0, 12], [1, 13], [2, 13]], [[5, 40], [6, 38]]]
//! ```
//!
//! The same encoding is used in analysis responses (`tracks` key) and in
//! correction uploads (`tracks` form field).

use serde_json::Value;
use thiserror::Error;

use super::{TrackPoint, Trajectory};

/// Errors raised while reading the wire encoding.
#[derive(Debug, Error)]
pub enum WireError {
    /// The text is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is valid but not shaped as a list of `[time, position]` lists.
    #[error("Track {track}: {reason}")]
    Shape { track: usize, reason: String },

    /// The top-level value is not an array.
    #[error("Expected an array of tracks")]
    NotAnArray,
}

/// Encodes trajectories as the wire JSON string.
///
/// JSON has no representation for NaN or infinity, so tracks holding
/// non-finite coordinates are rejected rather than sent as `null`.
pub fn encode_tracks(tracks: &[Trajectory]) -> Result<String, WireError> {
    let raw = tracks
        .iter()
        .enumerate()
        .map(|(index, track)| {
            track
                .points()
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    if p.time.is_finite() && p.position.is_finite() {
                        Ok([p.time, p.position])
                    } else {
                        Err(WireError::Shape {
                            track: index + 1,
                            reason: format!("point {} has a non-finite coordinate", i + 1),
                        })
                    }
                })
                .collect::<Result<Vec<[f64; 2]>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(serde_json::to_string(&raw)?)
}

/// Decodes a wire JSON string into dense trajectories labelled `Track_<n>`.
pub fn decode_tracks(text: &str) -> Result<Vec<Trajectory>, WireError> {
    let value: Value = serde_json::from_str(text)?;
    tracks_from_value(&value)
}

/// Reads dense trajectories from an already parsed JSON value.
///
/// Point order is preserved exactly as given.
pub fn tracks_from_value(value: &Value) -> Result<Vec<Trajectory>, WireError> {
    let tracks = value.as_array().ok_or(WireError::NotAnArray)?;

    tracks
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let points = track.as_array().ok_or_else(|| WireError::Shape {
                track: index + 1,
                reason: "expected an array of points".to_string(),
            })?;

            let points = points
                .iter()
                .enumerate()
                .map(|(point_index, point)| {
                    point_from_value(point).map_err(|reason| WireError::Shape {
                        track: index + 1,
                        reason: format!("point {}: {}", point_index, reason),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Trajectory::new(Trajectory::label_for_index(index), points))
        })
        .collect()
}

fn point_from_value(value: &Value) -> Result<TrackPoint, String> {
    match value.as_array().map(Vec::as_slice) {
        Some([time, position]) => {
            let time = time.as_f64().ok_or("time is not a number")?;
            let position = position.as_f64().ok_or("position is not a number")?;
            Ok(TrackPoint::new(time, position))
        }
        Some(other) => Err(format!("expected 2 coordinates, found {}", other.len())),
        None => Err("expected a [time, position] pair".to_string()),
    }
}
