/// A detection slot that passed the face filter.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Position of the slot in the model output (its priority rank).
    pub slot: usize,
    pub score: f32,
    pub class: f32,
    /// The slot's four normalized box values, as returned by the model.
    pub bbox: [f32; 4],
}
