pub mod record;
pub mod lane;
pub mod event;
pub mod model;

pub use record::{CommitRecord, RawCommitRecord, MissingField};
pub use lane::{Lane, LaneId, LaneOrigin, Palette};
pub use event::{GraphEvent, MergeEdge};
pub use model::{GraphModel, LaneSummary, NodeSummary, ModelStats};
