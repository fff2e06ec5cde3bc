pub mod walker;

pub use walker::{GitWalker, BranchAttribution, WalkOptions, DEFAULT_LIMIT, MAX_LIMIT};
