//! Collaborators around the lane layout core: where commit records come
//! from, per-commit details, and a session that only ever publishes the
//! graph of the newest request.

pub mod error;
pub mod detail;
pub mod source;
pub mod session;

pub use error::SourceError;
pub use detail::{CommitDetail, Person};
pub use source::{CommitSource, GitSource, JsonSource};
pub use session::{GraphSession, RefreshOutcome, RequestToken, SessionError};
