use std::path::PathBuf;

use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::region::CropRect;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("crop {0} does not overlap the frame")]
    EmptyRegion(CropRect),
    #[error("error opening {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error encoding {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persists the crop of one accepted detection.
pub trait ArtifactWriter: Send {
    /// Writes the part of `frame` inside `rect` as artifact number `index`
    /// and returns where it went.
    ///
    /// Must not leave a file behind on failure, so the same index can be
    /// retried for the next crop.
    fn write(&self, index: u64, frame: &Frame, rect: &CropRect) -> Result<PathBuf, ArtifactError>;
}
