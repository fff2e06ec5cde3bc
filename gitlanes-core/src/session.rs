use crate::error::SourceError;
use crate::source::CommitSource;
use graph::{GraphBuilder, GraphError, GraphModel};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("graph build failed: {0}")]
    Build(#[from] GraphError),
}

/// Identifies one refresh request; only the newest one may publish a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken {
    generation: u64,
}

impl RequestToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The new model is now current
    Accepted(Arc<GraphModel>),
    /// A newer request was issued meanwhile; this result was dropped
    Superseded,
}

struct Published {
    generation: u64,
    model: Arc<GraphModel>,
}

/// Keeps the latest accepted graph and discards results of superseded fetches.
///
/// Every refresh takes a token from a monotonically increasing counter. A
/// finished build is published only if its token is still the newest one
/// issued and no newer model has been published already.
pub struct GraphSession {
    builder: GraphBuilder,
    generation: AtomicU64,
    published: Mutex<Published>,
}

impl GraphSession {
    pub fn new(builder: GraphBuilder) -> Self {
        Self {
            builder,
            generation: AtomicU64::new(0),
            published: Mutex::new(Published {
                generation: 0,
                model: Arc::new(GraphModel::empty()),
            }),
        }
    }

    /// Issue a new token, superseding every earlier one
    pub fn begin(&self) -> RequestToken {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RequestToken { generation }
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.generation
    }

    /// Last accepted model (empty until the first refresh succeeds)
    pub fn current(&self) -> Arc<GraphModel> {
        let published = self.published.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&published.model)
    }

    /// Fetch and lay out a fresh graph under a new token
    pub async fn refresh(
        &self,
        source: &dyn CommitSource,
        limit: usize,
        branch_filter: Option<&str>,
    ) -> Result<RefreshOutcome, SessionError> {
        let token = self.begin();
        self.resolve(token, source, limit, branch_filter).await
    }

    /// Fetch and lay out a graph for an already issued token
    pub async fn resolve(
        &self,
        token: RequestToken,
        source: &dyn CommitSource,
        limit: usize,
        branch_filter: Option<&str>,
    ) -> Result<RefreshOutcome, SessionError> {
        let raw = match source.fetch_commit_graph(limit, branch_filter).await {
            Ok(raw) => raw,
            Err(err) if !self.is_current(&token) => {
                tracing::debug!(generation = token.generation, %err, "stale fetch failed, ignoring");
                return Ok(RefreshOutcome::Superseded);
            }
            Err(err) => return Err(err.into()),
        };

        if !self.is_current(&token) {
            tracing::debug!(generation = token.generation, "fetch superseded before build");
            return Ok(RefreshOutcome::Superseded);
        }

        let model = self.builder.build_raw(raw)?;
        if model.dropped_records() > 0 {
            tracing::warn!(dropped = model.dropped_records(), "malformed commit records dropped");
        }
        Ok(self.publish(token, model))
    }

    fn publish(&self, token: RequestToken, model: GraphModel) -> RefreshOutcome {
        let mut published = self.published.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_current(&token) || published.generation > token.generation {
            tracing::debug!(generation = token.generation, "build superseded, dropping");
            return RefreshOutcome::Superseded;
        }

        let model = Arc::new(model);
        *published = Published {
            generation: token.generation,
            model: Arc::clone(&model),
        };
        tracing::info!(
            generation = token.generation,
            commits = model.nodes().len(),
            lanes = model.lanes().len(),
            "graph updated"
        );
        RefreshOutcome::Accepted(model)
    }
}

impl Default for GraphSession {
    fn default() -> Self {
        Self::new(GraphBuilder::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::detail::CommitDetail;
    use crate::error::Result;
    use async_trait::async_trait;
    use graph::{CommitRecord, RawCommitRecord};
    use std::time::Duration;

    struct DelayedSource {
        records: Vec<RawCommitRecord>,
        delay: Duration,
    }

    impl DelayedSource {
        fn new(branch: &str, delay_ms: u64) -> Self {
            let records = vec![
                CommitRecord::new("a", vec![], 1).with_branches([branch]).into(),
                CommitRecord::new("b", vec!["a".to_string()], 2).with_branches([branch]).into(),
            ];
            Self {
                records,
                delay: Duration::from_millis(delay_ms),
            }
        }
    }

    #[async_trait]
    impl CommitSource for DelayedSource {
        async fn fetch_commit_graph(&self, _limit: usize, _filter: Option<&str>) -> Result<Vec<RawCommitRecord>> {
            tokio::time::sleep(self.delay).await;
            Ok(self.records.clone())
        }

        async fn fetch_commit(&self, sha: &str) -> Result<CommitDetail> {
            Err(SourceError::NotFound { sha: sha.to_string() })
        }
    }

    fn lane_names(model: &GraphModel) -> Vec<String> {
        model.lanes().into_iter().map(|lane| lane.name).collect()
    }

    #[tokio::test]
    async fn newest_request_wins_when_older_is_slower() {
        let session = GraphSession::default();
        let old = DelayedSource::new("old", 60);
        let new = DelayedSource::new("new", 5);

        let (first, second) = tokio::join!(
            session.refresh(&old, 100, None),
            session.refresh(&new, 100, None),
        );

        assert!(matches!(first.unwrap(), RefreshOutcome::Superseded));
        assert!(matches!(second.unwrap(), RefreshOutcome::Accepted(_)));
        assert_eq!(lane_names(&session.current()), vec!["new"]);
    }

    #[tokio::test]
    async fn older_result_arriving_first_is_dropped() {
        let session = GraphSession::default();
        let old = DelayedSource::new("old", 5);
        let new = DelayedSource::new("new", 40);

        let (first, second) = tokio::join!(
            session.refresh(&old, 100, None),
            session.refresh(&new, 100, None),
        );

        assert!(matches!(first.unwrap(), RefreshOutcome::Superseded));
        assert!(matches!(second.unwrap(), RefreshOutcome::Accepted(_)));
        assert_eq!(lane_names(&session.current()), vec!["new"]);
    }

    #[tokio::test]
    async fn failed_build_keeps_previous_model() {
        let session = GraphSession::default();
        let good = DelayedSource::new("main", 0);
        session.refresh(&good, 100, None).await.unwrap();

        let mut bad = DelayedSource::new("main", 0);
        bad.records.push(CommitRecord::new("a", vec![], 3).into());
        let err = session.refresh(&bad, 100, None).await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Build(GraphError::DuplicateCommit { ref sha }) if sha == "a"
        ));
        assert_eq!(lane_names(&session.current()), vec!["main"]);
    }

    #[test]
    fn tokens_increase() {
        let session = GraphSession::default();
        let first = session.begin();
        let second = session.begin();
        assert!(second > first);
        assert!(!session.is_current(&first));
        assert!(session.is_current(&second));
        assert!(session.current().is_empty());
    }
}
