pub mod core;
pub mod error;
pub mod layout;
pub mod decor;
pub mod git_backend;
pub mod render;

pub use core::{
    CommitRecord, RawCommitRecord, MissingField, Lane, LaneId, LaneOrigin, Palette,
    GraphEvent, MergeEdge, GraphModel, LaneSummary, NodeSummary, ModelStats,
};
pub use error::{GraphError, BuildWarning};
pub use layout::{GraphBuilder, SequenceStrategy};
pub use decor::TagAnnotator;
pub use git_backend::{GitWalker, BranchAttribution, WalkOptions};
pub use render::{TextRenderer, TextLayout};
