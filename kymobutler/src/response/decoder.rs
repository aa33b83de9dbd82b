//! Response decoder.
//!
//! Turns the body returned by the service into typed results. Every section
//! of the response is optional: presence is checked with the `has_*` methods,
//! extraction returns `Ok(None)` for an absent section and an error only for
//! a section that is present but unusable.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::error::DecodeError;
use super::fields;
use super::grid::ImageGrid;
use crate::track::{wire, Trajectory};

/// Byte prefix produced by the service's pretty-printer: `{`, newline, tab, `"`.
pub const WELL_FORMED_PREFIX: &[u8] = b"{\n\t\"";

/// Number of channels of the overlay image.
pub const OVERLAY_CHANNELS: usize = 3;

/// Checks the structural fingerprint of a service response.
///
/// This matches the exact whitespace the service emits; it is not JSON
/// validation. Bodies that fail it are never parsed.
pub fn is_well_formed(body: &[u8]) -> bool {
    body.starts_with(WELL_FORMED_PREFIX)
}

/// Options applied by [`ResponseDecoder::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reduce tracks to their slope breakpoints.
    pub simplify_tracks: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            simplify_tracks: true,
        }
    }
}

/// Everything decoded from one response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedResult {
    /// Single-channel kymograph, `[y][x]`.
    pub kymograph: Option<ImageGrid>,
    /// Three-channel overlay.
    pub overlay: Option<ImageGrid>,
    /// Trajectories in response order; `None` when the section is absent.
    pub tracks: Option<Vec<Trajectory>>,
    pub messages: Option<String>,
    pub error: Option<String>,
    pub max_kymographs: Option<i64>,
    pub kymographs_left: Option<i64>,
    pub version: Option<String>,
    /// Field-level problems met while decoding the other fields.
    pub field_errors: Vec<DecodeError>,
}

impl DecodedResult {
    pub fn has_kymograph(&self) -> bool {
        self.kymograph.is_some()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn has_tracks(&self) -> bool {
        self.tracks.is_some()
    }

    /// Decoded tracks, empty when the section was absent.
    pub fn tracks(&self) -> &[Trajectory] {
        self.tracks.as_deref().unwrap_or(&[])
    }

    /// True when no field-level error was recorded.
    pub fn is_complete(&self) -> bool {
        self.field_errors.is_empty()
    }
}

/// Parsed service response with per-section accessors.
#[derive(Debug, Clone)]
pub struct ResponseDecoder {
    root: Map<String, Value>,
}

impl ResponseDecoder {
    /// Parses a response body.
    ///
    /// Fails with [`DecodeError::MalformedResponse`] when the body does not
    /// start with [`WELL_FORMED_PREFIX`] (no parse is attempted), is not valid
    /// JSON, or is not a JSON object.
    pub fn parse(body: &[u8]) -> Result<Self, DecodeError> {
        if !is_well_formed(body) {
            return Err(DecodeError::MalformedResponse(
                "response does not look like a service payload".to_string(),
            ));
        }
        Self::parse_unchecked(body)
    }

    /// Parses a body without the fingerprint check.
    ///
    /// Useful for responses that were re-serialised by another tool.
    pub fn parse_unchecked(body: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| DecodeError::MalformedResponse(format!("invalid JSON: {}", e)))?;

        match value {
            Value::Object(root) => {
                debug!(keys = root.len(), "Response parsed");
                Ok(Self { root })
            }
            _ => Err(DecodeError::MalformedResponse(
                "top-level value is not an object".to_string(),
            )),
        }
    }

    pub fn has_kymograph(&self) -> bool {
        self.root.contains_key(fields::KYMOGRAPH)
    }

    pub fn has_overlay(&self) -> bool {
        self.root.contains_key(fields::OVERLAY)
    }

    pub fn has_tracks(&self) -> bool {
        self.root.contains_key(fields::TRACKS)
    }

    pub fn has_messages(&self) -> bool {
        self.root.contains_key(fields::MESSAGES)
    }

    pub fn has_error(&self) -> bool {
        self.root.contains_key(fields::ERROR)
    }

    pub fn has_max_kymographs(&self) -> bool {
        self.root.contains_key(fields::MAX_KYMOGRAPHS)
    }

    pub fn has_kymographs_left(&self) -> bool {
        self.root.contains_key(fields::KYMOGRAPHS_LEFT)
    }

    pub fn has_version(&self) -> bool {
        self.root.contains_key(fields::VERSION)
    }

    /// True when any of the diagnostic fields is present.
    pub fn has_something_to_log(&self) -> bool {
        self.has_messages()
            || self.has_kymographs_left()
            || self.has_max_kymographs()
            || self.has_version()
    }

    /// Single-channel kymograph grid.
    pub fn kymograph(&self) -> Result<Option<ImageGrid>, DecodeError> {
        self.root
            .get(fields::KYMOGRAPH)
            .map(|value| decode_grid(value, fields::KYMOGRAPH, 1))
            .transpose()
    }

    /// Three-channel overlay grid.
    pub fn overlay(&self) -> Result<Option<ImageGrid>, DecodeError> {
        self.root
            .get(fields::OVERLAY)
            .map(|value| decode_grid(value, fields::OVERLAY, OVERLAY_CHANNELS))
            .transpose()
    }

    /// Tracks, dense or reduced to slope breakpoints.
    pub fn tracks(&self, simplify: bool) -> Result<Option<Vec<Trajectory>>, DecodeError> {
        let Some(value) = self.root.get(fields::TRACKS) else {
            return Ok(None);
        };

        if !value.is_array() {
            return Err(DecodeError::FieldTypeError {
                field: fields::TRACKS,
                expected: "array of tracks",
            });
        }

        let dense = wire::tracks_from_value(value).map_err(|e| DecodeError::MalformedPayload {
            field: fields::TRACKS,
            reason: e.to_string(),
        })?;

        if simplify {
            Ok(Some(dense.iter().map(Trajectory::simplified).collect()))
        } else {
            Ok(Some(dense))
        }
    }

    pub fn messages(&self) -> Result<Option<String>, DecodeError> {
        self.string_field(fields::MESSAGES)
    }

    /// Error text reported by the service itself.
    pub fn error_message(&self) -> Result<Option<String>, DecodeError> {
        self.string_field(fields::ERROR)
    }

    pub fn max_kymographs(&self) -> Result<Option<i64>, DecodeError> {
        self.int_field(fields::MAX_KYMOGRAPHS)
    }

    pub fn kymographs_left(&self) -> Result<Option<i64>, DecodeError> {
        self.int_field(fields::KYMOGRAPHS_LEFT)
    }

    pub fn version(&self) -> Result<Option<String>, DecodeError> {
        self.string_field(fields::VERSION)
    }

    /// Human-readable digest of the diagnostic fields, one per line.
    ///
    /// Returns an empty string when none of them is present and usable.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        if let Ok(Some(messages)) = self.messages() {
            lines.push(format!("Messages: {}", messages));
        }
        if let Ok(Some(left)) = self.kymographs_left() {
            lines.push(format!("Kymographs left: {}", left));
        }
        if let Ok(Some(max)) = self.max_kymographs() {
            lines.push(format!("Max. kymographs: {}", max));
        }
        if let Ok(Some(version)) = self.version() {
            lines.push(format!("API version: {}", version));
        }

        lines.join("\n")
    }

    /// Decodes every section, collecting field-level errors.
    pub fn decode(&self, options: &DecodeOptions) -> DecodedResult {
        let mut field_errors = Vec::new();

        let result = DecodedResult {
            kymograph: keep(self.kymograph(), &mut field_errors),
            overlay: keep(self.overlay(), &mut field_errors),
            tracks: keep(self.tracks(options.simplify_tracks), &mut field_errors),
            messages: keep(self.messages(), &mut field_errors),
            error: keep(self.error_message(), &mut field_errors),
            max_kymographs: keep(self.max_kymographs(), &mut field_errors),
            kymographs_left: keep(self.kymographs_left(), &mut field_errors),
            version: keep(self.version(), &mut field_errors),
            field_errors,
        };

        debug!(
            kymograph = result.has_kymograph(),
            overlay = result.has_overlay(),
            tracks = result.tracks().len(),
            field_errors = result.field_errors.len(),
            "Response decoded"
        );

        result
    }

    fn string_field(&self, field: &'static str) -> Result<Option<String>, DecodeError> {
        match self.root.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(DecodeError::FieldTypeError {
                field,
                expected: "string",
            }),
        }
    }

    fn int_field(&self, field: &'static str) -> Result<Option<i64>, DecodeError> {
        let Some(value) = self.root.get(field) else {
            return Ok(None);
        };

        let integer = value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        });

        integer.map(Some).ok_or(DecodeError::FieldTypeError {
            field,
            expected: "integer",
        })
    }
}

/// Parses and fully decodes a body in one call.
pub fn decode(body: &[u8], options: &DecodeOptions) -> Result<DecodedResult, DecodeError> {
    ResponseDecoder::parse(body).map(|decoder| decoder.decode(options))
}

fn keep<T>(result: Result<Option<T>, DecodeError>, errors: &mut Vec<DecodeError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Skipping response field");
            errors.push(e);
            None
        }
    }
}

/// Decodes `height × width` (× `channels` when more than one) nested arrays.
fn decode_grid(
    value: &Value,
    field: &'static str,
    channels: usize,
) -> Result<ImageGrid, DecodeError> {
    let malformed = |reason: String| DecodeError::MalformedPayload { field, reason };

    let rows = value.as_array().ok_or(DecodeError::FieldTypeError {
        field,
        expected: "array of rows",
    })?;

    let width = match rows.first() {
        None => return Err(malformed("image has no rows".to_string())),
        Some(first) => first
            .as_array()
            .ok_or_else(|| malformed("row 0 is not an array".to_string()))?
            .len(),
    };
    if width == 0 {
        return Err(malformed("image has no columns".to_string()));
    }

    let height = rows.len();
    let mut data = Vec::with_capacity(width * height * channels);

    for (y, row) in rows.iter().enumerate() {
        let row = row
            .as_array()
            .ok_or_else(|| malformed(format!("row {} is not an array", y)))?;
        if row.len() != width {
            return Err(malformed(format!(
                "row {} has {} columns, expected {}",
                y,
                row.len(),
                width
            )));
        }

        for (x, pixel) in row.iter().enumerate() {
            if channels == 1 {
                data.push(
                    sample(pixel)
                        .ok_or_else(|| malformed(format!("pixel ({}, {}) is not a number", x, y)))?,
                );
                continue;
            }

            let values = pixel
                .as_array()
                .filter(|values| values.len() == channels)
                .ok_or_else(|| {
                    malformed(format!(
                        "pixel ({}, {}) is not an array of {} channels",
                        x, y, channels
                    ))
                })?;
            for (c, v) in values.iter().enumerate() {
                data.push(sample(v).ok_or_else(|| {
                    malformed(format!("pixel ({}, {}) channel {} is not a number", x, y, c))
                })?);
            }
        }
    }

    ImageGrid::from_raw(width, height, channels, data)
        .ok_or_else(|| malformed("sample count does not match dimensions".to_string()))
}

fn sample(value: &Value) -> Option<f32> {
    value.as_f64().map(|v| v as f32)
}
