use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;

use crate::artifact::domain::artifact_counter::{artifact_file_name, parse_artifact_index};
use crate::artifact::domain::artifact_writer::{ArtifactError, ArtifactWriter};
use crate::shared::frame::Frame;
use crate::shared::region::CropRect;

/// Writes crops as numbered JPEG files into one directory.
///
/// Files are created exclusively: an existing artifact is never overwritten.
pub struct JpegArtifactWriter {
    dir: PathBuf,
}

impl JpegArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.dir.join(artifact_file_name(index))
    }

    /// Highest artifact index already present in the output directory.
    pub fn highest_existing_index(&self) -> std::io::Result<Option<u64>> {
        let mut highest = None;
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            if let Some(index) = name.to_str().and_then(parse_artifact_index) {
                highest = highest.max(Some(index));
            }
        }
        Ok(highest)
    }
}

impl ArtifactWriter for JpegArtifactWriter {
    fn write(&self, index: u64, frame: &Frame, rect: &CropRect) -> Result<PathBuf, ArtifactError> {
        self.write_through(index, frame, rect, BufWriter::new)
    }
}

impl JpegArtifactWriter {
    /// Creates the artifact file and encodes through the sink `wrap` builds
    /// around it. The file is removed again if encoding or flushing fails.
    fn write_through<W: Write>(
        &self,
        index: u64,
        frame: &Frame,
        rect: &CropRect,
        wrap: impl FnOnce(fs::File) -> W,
    ) -> Result<PathBuf, ArtifactError> {
        let visible = rect
            .clamp_to(frame.width(), frame.height())
            .ok_or(ArtifactError::EmptyRegion(*rect))?;
        let crop = frame.crop(&visible);

        let path = self.path_for(index);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| ArtifactError::Open {
                path: path.clone(),
                source,
            })?;

        if let Err(e) = encode(wrap(file), &crop, &path) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }
        Ok(path)
    }
}

fn encode<W: Write>(mut out: W, crop: &Frame, path: &Path) -> Result<(), ArtifactError> {
    let img = image::RgbImage::from_raw(crop.width(), crop.height(), crop.data().to_vec())
        .ok_or_else(|| ArtifactError::Encode {
            path: path.to_path_buf(),
            source: image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            )),
        })?;

    img.write_with_encoder(JpegEncoder::new(&mut out))
        .map_err(|source| ArtifactError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    out.flush().map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })
}
