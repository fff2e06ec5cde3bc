pub mod tags;

pub use tags::TagAnnotator;
