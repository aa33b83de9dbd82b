//! Decoding of analysis service responses.
//!
//! A response is a JSON object whose sections are all optional:
//!
//! | Key              | Decoded as                         |
//! |------------------|------------------------------------|
//! | `Kymograph`      | [`ImageGrid`], one channel         |
//! | `overlay`        | [`ImageGrid`], three channels      |
//! | `tracks`         | [`Trajectory`](crate::track::Trajectory) list |
//! | `messages`       | string                             |
//! | `error`          | string                             |
//! | `MaxKymographs`  | integer                            |
//! | `KymographsLeft` | integer                            |
//! | `Version`        | string                             |
//!
//! Before any JSON parse the body must pass [`is_well_formed`], a check on the
//! exact whitespace the service's pretty-printer produces.

mod decoder;
mod error;
pub mod fields;
mod grid;

pub use decoder::{
    decode, is_well_formed, DecodeOptions, DecodedResult, ResponseDecoder, OVERLAY_CHANNELS,
    WELL_FORMED_PREFIX,
};
pub use error::DecodeError;
pub use grid::ImageGrid;
