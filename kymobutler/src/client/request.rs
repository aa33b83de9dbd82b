//! Analysis parameters and the forms sent for each query.

use crate::response::fields;
use crate::track::{wire, Trajectory};
use crate::transport::MultipartForm;

/// Default detection threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.2;

/// Default minimum track size, in pixels travelled.
pub const DEFAULT_MINIMUM_SIZE: u32 = 3;

/// Default minimum number of frames per track.
pub const DEFAULT_MINIMUM_FRAMES: u32 = 3;

/// An image to analyse and the detection parameters.
///
/// # Example
///
/// ```
/// use kymobutler::client::AnalysisRequest;
///
/// let request = AnalysisRequest::new(vec![0u8; 16])
///     .with_threshold(0.35)
///     .with_minimum_frames(5);
///
/// assert_eq!(request.threshold(), 0.35);
/// assert_eq!(request.minimum_size(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    image: Vec<u8>,
    file_name: Option<String>,
    threshold: f32,
    minimum_size: u32,
    minimum_frames: u32,
}

impl AnalysisRequest {
    /// Creates a request for an encoded image with default parameters.
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            file_name: None,
            threshold: DEFAULT_THRESHOLD,
            minimum_size: DEFAULT_MINIMUM_SIZE,
            minimum_frames: DEFAULT_MINIMUM_FRAMES,
        }
    }

    /// File name sent with the image part.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_minimum_size(mut self, size: u32) -> Self {
        self.minimum_size = size;
        self
    }

    pub fn with_minimum_frames(mut self, frames: u32) -> Self {
        self.minimum_frames = frames;
        self
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn minimum_size(&self) -> u32 {
        self.minimum_size
    }

    pub fn minimum_frames(&self) -> u32 {
        self.minimum_frames
    }
}

/// Form for a statistics query.
pub fn statistics_form() -> MultipartForm {
    MultipartForm::new().text(fields::QUERY, fields::QUERY_STATS)
}

/// Form for an analysis query.
pub fn analysis_form(request: &AnalysisRequest) -> MultipartForm {
    MultipartForm::new()
        .text(fields::QUERY, fields::QUERY_ANALYSIS)
        .bytes(
            fields::KYMOGRAPH,
            request.image.clone(),
            request.file_name.clone(),
        )
        .text(fields::THRESHOLD, request.threshold.to_string())
        .text(fields::MINIMUM_SIZE, request.minimum_size.to_string())
        .text(fields::MINIMUM_FRAMES, request.minimum_frames.to_string())
}

/// Form for a correction upload.
pub fn upload_form(
    request: &AnalysisRequest,
    tracks: &[Trajectory],
) -> Result<MultipartForm, wire::WireError> {
    let encoded = wire::encode_tracks(tracks)?;

    Ok(MultipartForm::new()
        .text(fields::QUERY, fields::QUERY_UPLOAD)
        .bytes(
            fields::KYMOGRAPH,
            request.image.clone(),
            request.file_name.clone(),
        )
        .text(fields::TRACKS, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackPoint;

    #[test]
    fn test_defaults() {
        let request = AnalysisRequest::new(vec![1, 2, 3]);
        assert_eq!(request.threshold(), DEFAULT_THRESHOLD);
        assert_eq!(request.minimum_size(), DEFAULT_MINIMUM_SIZE);
        assert_eq!(request.minimum_frames(), DEFAULT_MINIMUM_FRAMES);
        assert_eq!(request.file_name(), None);
    }

    #[test]
    fn test_statistics_form_has_only_query() {
        let form = statistics_form();
        assert_eq!(form.len(), 1);
        assert_eq!(form.get_text("query"), Some("stats"));
    }

    #[test]
    fn test_analysis_form_fields() {
        let request = AnalysisRequest::new(vec![7; 8])
            .with_file_name("kymo.png")
            .with_threshold(0.35)
            .with_minimum_size(4)
            .with_minimum_frames(6);

        let form = analysis_form(&request);
        assert_eq!(form.get_text("query"), Some("analysis"));
        assert_eq!(form.get_bytes("Kymograph"), Some(&[7u8; 8][..]));
        assert_eq!(form.get_text("p"), Some("0.35"));
        assert_eq!(form.get_text("minimumSize"), Some("4"));
        assert_eq!(form.get_text("minimumFrames"), Some("6"));
        assert_eq!(form.get_text("tracks"), None);
    }

    #[test]
    fn test_default_threshold_text() {
        let form = analysis_form(&AnalysisRequest::new(vec![]));
        assert_eq!(form.get_text("p"), Some("0.2"));
        assert_eq!(form.get_text("minimumSize"), Some("3"));
    }

    #[test]
    fn test_upload_form_encodes_tracks() {
        let tracks = vec![Trajectory::new(
            "Track_1",
            vec![TrackPoint::new(0.0, 4.0), TrackPoint::new(2.0, 6.0)],
        )];
        let form = upload_form(&AnalysisRequest::new(vec![1]), &tracks).unwrap();

        assert_eq!(form.get_text("query"), Some("upload"));
        assert_eq!(form.get_text("tracks"), Some("[[[0.0,4.0],[2.0,6.0]]]"));
        assert_eq!(form.get_text("p"), None);
    }
}
