pub mod artifact;
pub mod capture;
pub mod detection;
pub mod inference;
pub mod pipeline;
pub mod shared;
pub mod transport;
