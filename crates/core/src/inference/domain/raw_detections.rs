/// Values per slot in the flattened box output.
pub const BOX_VALUES: usize = 4;

/// Raw detection tensors of one inference call, consumed once.
///
/// The three sequences are parallel: slot `i` has score `scores[i]`, class
/// `classes[i]` and box `boxes[4 * i..4 * i + 4]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawDetections {
    pub scores: Vec<f32>,
    pub classes: Vec<f32>,
    pub boxes: Vec<f32>,
    /// Valid slot count, when the model reports one.
    pub num_detections: Option<usize>,
}

impl RawDetections {
    /// Number of slots that can be read without going out of range, capped
    /// at `max_slots` and at the reported detection count.
    pub fn slot_count(&self, max_slots: usize) -> usize {
        let available = self
            .scores
            .len()
            .min(self.classes.len())
            .min(self.boxes.len() / BOX_VALUES);
        let reported = self.num_detections.unwrap_or(usize::MAX);
        available.min(reported).min(max_slots)
    }

    /// Score of the highest-priority slot, if any.
    pub fn top_score(&self) -> Option<f32> {
        self.scores.first().copied()
    }
}
