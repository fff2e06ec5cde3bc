use crate::detail::{CommitDetail, Person};
use crate::error::{Result, SourceError};
use async_trait::async_trait;
use git2::Repository;
use graph::{BranchAttribution, GitWalker, RawCommitRecord, WalkOptions};
use std::path::PathBuf;

/// Where commit records come from.
///
/// Implementations do their own I/O; the layout core only ever sees the
/// finished list.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Up to `limit` commit records, optionally narrowed to one branch
    async fn fetch_commit_graph(&self, limit: usize, branch_filter: Option<&str>) -> Result<Vec<RawCommitRecord>>;

    /// Full details of a single commit
    async fn fetch_commit(&self, sha: &str) -> Result<CommitDetail>;
}

/// Local repository read through git2 on the blocking pool
#[derive(Debug, Clone)]
pub struct GitSource {
    path: PathBuf,
    attribution: BranchAttribution,
}

impl GitSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            attribution: BranchAttribution::default(),
        }
    }

    pub fn attribution(mut self, attribution: BranchAttribution) -> Self {
        self.attribution = attribution;
        self
    }
}

#[async_trait]
impl CommitSource for GitSource {
    async fn fetch_commit_graph(&self, limit: usize, branch_filter: Option<&str>) -> Result<Vec<RawCommitRecord>> {
        let path = self.path.clone();
        let options = WalkOptions::latest(limit)
            .with_branch(branch_filter.map(str::to_string))
            .with_attribution(self.attribution);

        let records = tokio::task::spawn_blocking(move || {
            GitWalker::open(&path)?.commit_records(&options)
        })
        .await??;

        tracing::debug!(path = %self.path.display(), commits = records.len(), "fetched commit graph");
        Ok(records.into_iter().map(RawCommitRecord::from).collect())
    }

    async fn fetch_commit(&self, sha: &str) -> Result<CommitDetail> {
        let path = self.path.clone();
        let sha = sha.to_string();
        tokio::task::spawn_blocking(move || {
            let repo = Repository::discover(&path)?;
            CommitDetail::load(&repo, &sha)
        })
        .await?
    }
}

/// Commit list stored as a JSON array in a file
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> Result<Vec<RawCommitRecord>> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(RawCommitRecord::decode_list(&text)?)
    }
}

#[async_trait]
impl CommitSource for JsonSource {
    async fn fetch_commit_graph(&self, limit: usize, branch_filter: Option<&str>) -> Result<Vec<RawCommitRecord>> {
        let mut records = self.read().await?;

        if let Some(branch) = branch_filter {
            let on_branch: Vec<RawCommitRecord> = records
                .iter()
                .filter(|r| r.branches.iter().any(|b| b == branch))
                .cloned()
                .collect();
            if on_branch.is_empty() {
                tracing::warn!(branch, "branch filter matches nothing, showing all branches");
            } else {
                records = on_branch;
            }
        }
        records.truncate(limit);
        Ok(records)
    }

    async fn fetch_commit(&self, sha: &str) -> Result<CommitDetail> {
        let record = self
            .read()
            .await?
            .into_iter()
            .filter_map(|raw| raw.into_record().ok())
            .find(|record| record.sha == sha)
            .ok_or_else(|| SourceError::NotFound { sha: sha.to_string() })?;

        // A plain commit list carries no committer, tree or zone
        let person = Person {
            name: record.author.clone(),
            email: String::new(),
            timestamp: record.timestamp,
            timezone: "+0000".to_string(),
        };
        Ok(CommitDetail {
            sha: record.sha,
            tree: String::new(),
            parents: record.parents,
            author: person.clone(),
            committer: person,
            message: record.message.lines().next().unwrap_or("").to_string(),
            full_message: record.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use graph::{BuildWarning, GraphBuilder, MissingField};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const COMMITS: &str = r#"[
        {"sha":"a","parents":[],"branches":["main"],"tags":[],"timestamp":1,"author":"Ann","message":"init"},
        {"sha":"b","parents":["a"],"branches":["feature"],"tags":["v1"],"timestamp":2,"author":"Bob","message":"feat\n\nmore"},
        {"parents":["a"],"branches":["main"],"timestamp":3}
    ]"#;

    fn json_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(COMMITS.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn json_source_keeps_malformed_records() {
        let file = json_file();
        let source = JsonSource::new(file.path());
        let records = source.fetch_commit_graph(500, None).await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[2].sha.is_none());
    }

    #[tokio::test]
    async fn json_source_filters_and_limits() {
        let file = json_file();
        let source = JsonSource::new(file.path());

        let feature = source.fetch_commit_graph(500, Some("feature")).await.unwrap();
        assert_eq!(feature.len(), 1);
        assert_eq!(feature[0].sha.as_deref(), Some("b"));

        let unknown = source.fetch_commit_graph(500, Some("nope")).await.unwrap();
        assert_eq!(unknown.len(), 3);

        assert_eq!(source.fetch_commit_graph(1, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn json_source_commit_detail() {
        let file = json_file();
        let source = JsonSource::new(file.path());
        let detail = source.fetch_commit("b").await.unwrap();
        assert_eq!(detail.message, "feat");
        assert_eq!(detail.author.name, "Bob");
        assert!(matches!(
            source.fetch_commit("zzz").await,
            Err(SourceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn json_source_drops_only_the_bad_record() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                {"sha":"a","parents":[],"branches":null,"timestamp":1},
                {"sha":7,"parents":["a"],"branches":["main"],"timestamp":2},
                {"sha":"c","parents":["a"],"branches":["main"],"timestamp":3}
            ]"#,
        )
        .unwrap();

        let records = JsonSource::new(file.path()).fetch_commit_graph(500, None).await.unwrap();
        assert_eq!(records.len(), 3);

        let model = GraphBuilder::new().build_raw(records).unwrap();
        assert_eq!(model.nodes().len(), 2);
        assert_eq!(model.dropped_records(), 1);
        assert_eq!(
            model.warnings(),
            &[BuildWarning::MalformedCommitRecord {
                index: 1,
                missing: MissingField::Sha
            }]
        );
    }

    #[tokio::test]
    async fn json_source_rejects_garbage() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let result = JsonSource::new(file.path()).fetch_commit_graph(10, None).await;
        assert!(matches!(result, Err(SourceError::Json(_))));
    }

    #[tokio::test]
    async fn git_source_reads_repository() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let sig = Signature::now("Tester", "t@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let oid = repo.commit(Some("HEAD"), &sig, &sig, "Only commit", &tree, &[]).unwrap();

        let source = GitSource::new(dir.path());
        let records = source.fetch_commit_graph(10, None).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sha.as_deref(), Some(oid.to_string().as_str()));

        let detail = source.fetch_commit(&oid.to_string()).await.unwrap();
        assert_eq!(detail.message, "Only commit");
    }

    #[tokio::test]
    async fn git_source_reports_missing_repository() {
        let dir = TempDir::new().unwrap();
        let result = GitSource::new(dir.path().join("absent")).fetch_commit_graph(10, None).await;
        assert!(result.is_err());
    }
}
