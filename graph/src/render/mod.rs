pub mod text;
pub mod graph;

pub use text::TextLayout;
pub use graph::TextRenderer;
