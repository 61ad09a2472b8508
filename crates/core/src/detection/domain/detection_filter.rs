use ndarray::ArrayView2;

use crate::detection::domain::detection::Detection;
use crate::inference::domain::raw_detections::{RawDetections, BOX_VALUES};
use crate::shared::constants::{DEFAULT_CONFIDENCE, DETECTION_SLOTS, FACE_CLASS_LIMIT};

/// Selects the face detections worth cropping from a model's raw output.
///
/// A slot is accepted iff `class < 1.5` and `score >= min_score`. Slots are
/// visited in the order the model returned them; nothing is deduplicated,
/// merged, or re-ranked.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionFilter {
    min_score: f32,
    max_slots: usize,
}

impl DetectionFilter {
    pub fn new(min_score: f32, max_slots: usize) -> Self {
        Self {
            min_score,
            max_slots,
        }
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }

    pub fn accepts(&self, class: f32, score: f32) -> bool {
        class < FACE_CLASS_LIMIT && score >= self.min_score
    }

    pub fn filter(&self, raw: &RawDetections) -> Vec<Detection> {
        let slots = raw.slot_count(self.max_slots);
        let flat = &raw.boxes[..slots * BOX_VALUES];
        let Ok(boxes) = ArrayView2::from_shape((slots, BOX_VALUES), flat) else {
            return Vec::new();
        };

        boxes
            .outer_iter()
            .enumerate()
            .filter(|&(i, _)| self.accepts(raw.classes[i], raw.scores[i]))
            .map(|(i, row)| Detection {
                slot: i,
                score: raw.scores[i],
                class: raw.classes[i],
                bbox: [row[0], row[1], row[2], row[3]],
            })
            .collect()
    }
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE, DETECTION_SLOTS)
    }
}
