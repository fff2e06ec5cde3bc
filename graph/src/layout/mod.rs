pub mod sequencer;
pub mod allocator;
pub mod merge;
pub mod builder;

pub use sequencer::{ChronologicalSequencer, SequenceStrategy};
pub use allocator::LaneAllocator;
pub use merge::MergeResolver;
pub use builder::GraphBuilder;
