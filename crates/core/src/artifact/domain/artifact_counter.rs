use crate::shared::constants::{ARTIFACT_EXTENSION, ARTIFACT_PREFIX};

/// File name of artifact number `index`: `image00042.jpg`.
pub fn artifact_file_name(index: u64) -> String {
    format!("{ARTIFACT_PREFIX}{index:05}.{ARTIFACT_EXTENSION}")
}

/// Inverse of [`artifact_file_name`]. Returns `None` for foreign files.
pub fn parse_artifact_index(file_name: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(ARTIFACT_PREFIX)?
        .strip_suffix(ARTIFACT_EXTENSION)?
        .strip_suffix('.')?;
    if digits.len() < 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Sequence number for the next artifact.
///
/// Only [`ArtifactCounter::commit`] advances it, and the pipeline calls that
/// after a successful write, so failed writes never consume a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactCounter {
    next: u64,
}

impl ArtifactCounter {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    /// Continues numbering after the highest existing artifact, if any.
    pub fn resume_after(highest: Option<u64>) -> Self {
        Self::new(highest.map_or(0, |h| h.saturating_add(1)))
    }

    /// Index the next artifact will be written under.
    pub fn current(&self) -> u64 {
        self.next
    }

    /// Marks the current index as used.
    pub fn commit(&mut self) -> u64 {
        let used = self.next;
        self.next += 1;
        used
    }
}
