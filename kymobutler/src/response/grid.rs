//! Pixel grids decoded from the response.

/// A row-major floating-point image with interleaved channels.
///
/// The kymograph is a single-channel grid; the overlay has three channels in
/// the order the service sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGrid {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f32>,
}

impl ImageGrid {
    /// Builds a grid from interleaved row-major samples.
    ///
    /// Returns `None` when `data` does not hold exactly
    /// `width * height * channels` samples.
    pub fn from_raw(width: usize, height: usize, channels: usize, data: Vec<f32>) -> Option<Self> {
        if channels == 0 || data.len() != width * height * channels {
            return None;
        }

        Some(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// All samples, row-major, channels interleaved.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Sample at row `y`, column `x`, channel 0.
    pub fn get(&self, y: usize, x: usize) -> Option<f32> {
        self.sample(y, x, 0)
    }

    /// Sample at row `y`, column `x`, channel `c`.
    pub fn sample(&self, y: usize, x: usize, c: usize) -> Option<f32> {
        if y >= self.height || x >= self.width || c >= self.channels {
            return None;
        }
        self.data
            .get((y * self.width + x) * self.channels + c)
            .copied()
    }

    /// All channels of the pixel at row `y`, column `x`.
    pub fn pixel(&self, y: usize, x: usize) -> Option<&[f32]> {
        if y >= self.height || x >= self.width {
            return None;
        }
        let start = (y * self.width + x) * self.channels;
        self.data.get(start..start + self.channels)
    }

    /// Smallest and largest sample, ignoring NaN.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
