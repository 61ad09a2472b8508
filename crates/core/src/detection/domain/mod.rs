pub mod box_mapper;
pub mod detection;
pub mod detection_filter;
