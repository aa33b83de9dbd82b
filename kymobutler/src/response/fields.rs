//! Field tags used on the wire.
//!
//! Outbound tags name multipart form fields, inbound tags name top-level keys
//! of the JSON response. The image and track tags are used in both directions.

/// Form field selecting the kind of query.
pub const QUERY: &str = "query";

/// `query` value asking for usage statistics.
pub const QUERY_STATS: &str = "stats";

/// `query` value asking for an analysis.
pub const QUERY_ANALYSIS: &str = "analysis";

/// `query` value uploading corrected tracks.
pub const QUERY_UPLOAD: &str = "upload";

/// Kymograph image (form field and response key).
pub const KYMOGRAPH: &str = "Kymograph";

/// Detection threshold form field.
pub const THRESHOLD: &str = "p";

/// Minimum track size form field, in pixels.
pub const MINIMUM_SIZE: &str = "minimumSize";

/// Minimum track duration form field, in frames.
pub const MINIMUM_FRAMES: &str = "minimumFrames";

/// Tracks (form field and response key).
pub const TRACKS: &str = "tracks";

/// Overlay image response key.
pub const OVERLAY: &str = "overlay";

/// Free-text message response key.
pub const MESSAGES: &str = "messages";

/// Service-side error response key.
pub const ERROR: &str = "error";

/// Quota: total kymographs allowed.
pub const MAX_KYMOGRAPHS: &str = "MaxKymographs";

/// Quota: kymographs left.
pub const KYMOGRAPHS_LEFT: &str = "KymographsLeft";

/// API version response key.
pub const VERSION: &str = "Version";
