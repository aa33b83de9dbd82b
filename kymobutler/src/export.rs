//! Writing decoded results to disk.
//!
//! The kymograph is saved as an 8-bit grayscale PNG stretched to the grid's
//! own value range. The overlay is saved as an RGB PNG with samples read as
//! `0.0..=1.0` intensities. Tracks go to pretty-printed JSON.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, RgbImage};
use thiserror::Error;
use tracing::{debug, info};

use crate::response::{DecodedResult, ImageGrid, OVERLAY_CHANNELS};
use crate::track::Trajectory;

/// File name of the exported kymograph.
pub const KYMOGRAPH_FILE_NAME: &str = "kymograph.png";

/// File name of the exported overlay.
pub const OVERLAY_FILE_NAME: &str = "overlay.png";

/// File name of the exported tracks.
pub const TRACKS_FILE_NAME: &str = "tracks.json";

/// Suffix of saved debug responses, after the timestamp.
pub const DEBUG_FILE_SUFFIX: &str = "_debug_KymoButler.json";

/// Errors raised while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to serialise tracks: {0}")]
    Json(#[from] serde_json::Error),

    /// The grid cannot be represented as the requested image.
    #[error("Cannot export {width}x{height} grid with {channels} channel(s): {reason}")]
    Shape {
        width: usize,
        height: usize,
        channels: usize,
        reason: &'static str,
    },
}

/// Files written by [`export_result`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportedFiles {
    pub kymograph: Option<PathBuf>,
    pub overlay: Option<PathBuf>,
    pub tracks: Option<PathBuf>,
}

impl ExportedFiles {
    /// All written paths, in kymograph, overlay, tracks order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        [&self.kymograph, &self.overlay, &self.tracks]
            .into_iter()
            .filter_map(|p| p.as_deref())
    }
}

/// Converts a single-channel grid to grayscale, min-max normalised.
///
/// A constant grid maps to black. NaN samples map to black.
pub fn kymograph_to_image(grid: &ImageGrid) -> Result<GrayImage, ExportError> {
    if grid.channels() != 1 {
        return Err(shape_error(grid, "expected a single channel"));
    }
    let (width, height) = dimensions(grid)?;

    let (lo, hi) = grid.value_range().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    let pixels = grid
        .as_slice()
        .iter()
        .map(|&v| {
            if span > 0.0 && !v.is_nan() {
                to_byte((v - lo) / span)
            } else {
                0
            }
        })
        .collect();

    GrayImage::from_raw(width, height, pixels)
        .ok_or_else(|| shape_error(grid, "sample count does not match dimensions"))
}

/// Converts a three-channel grid with `0.0..=1.0` samples to RGB.
pub fn overlay_to_image(grid: &ImageGrid) -> Result<RgbImage, ExportError> {
    if grid.channels() != OVERLAY_CHANNELS {
        return Err(shape_error(grid, "expected three channels"));
    }
    let (width, height) = dimensions(grid)?;

    let pixels = grid.as_slice().iter().map(|&v| to_byte(v)).collect();

    RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| shape_error(grid, "sample count does not match dimensions"))
}

/// Saves the kymograph grid as a grayscale PNG.
pub fn save_kymograph(grid: &ImageGrid, path: &Path) -> Result<(), ExportError> {
    let image = kymograph_to_image(grid)?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| ExportError::Image {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Kymograph saved");
    Ok(())
}

/// Saves the overlay grid as an RGB PNG.
pub fn save_overlay(grid: &ImageGrid, path: &Path) -> Result<(), ExportError> {
    let image = overlay_to_image(grid)?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| ExportError::Image {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Overlay saved");
    Ok(())
}

/// Saves labelled tracks as pretty-printed JSON.
pub fn save_tracks(tracks: &[Trajectory], path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(tracks)?;
    write_file(path, json.as_bytes())?;
    debug!(path = %path.display(), count = tracks.len(), "Tracks saved");
    Ok(())
}

/// Reads tracks previously written by [`save_tracks`].
pub fn load_tracks(path: &Path) -> Result<Vec<Trajectory>, ExportError> {
    let text = fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Writes every present section of `result` into `dir`.
///
/// The directory is created when missing. Absent sections are skipped.
pub fn export_result(result: &DecodedResult, dir: &Path) -> Result<ExportedFiles, ExportError> {
    create_dir(dir)?;
    let mut files = ExportedFiles::default();

    if let Some(grid) = &result.kymograph {
        let path = dir.join(KYMOGRAPH_FILE_NAME);
        save_kymograph(grid, &path)?;
        files.kymograph = Some(path);
    }

    if let Some(grid) = &result.overlay {
        let path = dir.join(OVERLAY_FILE_NAME);
        save_overlay(grid, &path)?;
        files.overlay = Some(path);
    }

    if let Some(tracks) = &result.tracks {
        let path = dir.join(TRACKS_FILE_NAME);
        save_tracks(tracks, &path)?;
        files.tracks = Some(path);
    }

    info!(dir = %dir.display(), files = files.paths().count(), "Results exported");
    Ok(files)
}

/// Saves a raw response body as `<yyyy-MM-dd_HH-mm-ss>_debug_KymoButler.json`.
pub fn save_debug_response(dir: &Path, body: &[u8]) -> Result<PathBuf, ExportError> {
    create_dir(dir)?;
    let path = dir.join(debug_file_name(chrono::Local::now()));
    write_file(&path, body)?;
    info!(path = %path.display(), bytes = body.len(), "Debug response saved");
    Ok(path)
}

/// Debug file name for a given local time.
pub fn debug_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("{}{}", now.format("%Y-%m-%d_%H-%M-%S"), DEBUG_FILE_SUFFIX)
}

fn to_byte(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn dimensions(grid: &ImageGrid) -> Result<(u32, u32), ExportError> {
    match (u32::try_from(grid.width()), u32::try_from(grid.height())) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(shape_error(grid, "dimensions out of range")),
    }
}

fn shape_error(grid: &ImageGrid, reason: &'static str) -> ExportError {
    ExportError::Shape {
        width: grid.width(),
        height: grid.height(),
        channels: grid.channels(),
        reason,
    }
}

fn create_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), ExportError> {
    fs::write(path, data).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
