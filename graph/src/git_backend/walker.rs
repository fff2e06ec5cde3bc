use crate::core::CommitRecord;
use anyhow::{Context, Result};
use git2::{BranchType, Commit, Oid, Repository, Sort};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

pub const DEFAULT_LIMIT: usize = 500;
pub const MAX_LIMIT: usize = 2000;

/// Which branch names a commit record lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchAttribution {
    /// Only the commit a branch tip points at
    Tips,
    /// Every commit the tip reaches; first-parent reach is listed first
    #[default]
    Reachable,
}

/// What to walk and how to label it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    pub limit: usize,
    pub branch: Option<String>,
    pub attribution: BranchAttribution,
}

impl WalkOptions {
    /// Walk at most `limit` commits, clamped to `1..=MAX_LIMIT`
    pub fn latest(limit: usize) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            branch: None,
            attribution: BranchAttribution::default(),
        }
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_attribution(mut self, attribution: BranchAttribution) -> Self {
        self.attribution = attribution;
        self
    }
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::latest(DEFAULT_LIMIT)
    }
}

/// Reads commit records out of a local repository
pub struct GitWalker {
    repo: Repository,
}

impl GitWalker {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path)
            .with_context(|| format!("Failed to open repository at {}", path.display()))?;
        Ok(Self { repo })
    }

    /// Commit records for the walked window, oldest first
    pub fn commit_records(&self, options: &WalkOptions) -> Result<Vec<CommitRecord>> {
        let branches = self.branch_tips(options.branch.as_deref())?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        if branches.is_empty() {
            // Detached HEAD with no local branches, or an empty repository
            match self.repo.head().ok().and_then(|head| head.target()) {
                Some(target) => revwalk.push(target)?,
                None => return Ok(Vec::new()),
            }
        }
        for (_, tip) in &branches {
            revwalk.push(*tip)?;
        }

        let mut walked = Vec::new();
        for oid in revwalk.take(options.limit) {
            let oid = oid?;
            walked.push(self.repo.find_commit(oid)?);
        }

        let labels = match options.attribution {
            BranchAttribution::Tips => Self::tip_labels(&branches),
            BranchAttribution::Reachable => Self::reach_labels(&branches, &walked),
        };
        let tags = self.tags_by_commit()?;

        tracing::debug!(
            commits = walked.len(),
            branches = branches.len(),
            tags = tags.len(),
            "walked repository"
        );

        // Walk order is children first; hand out parents first
        let mut records = Vec::with_capacity(walked.len());
        for commit in walked.iter().rev() {
            let oid = commit.id();
            let mut record = Self::commit_to_record(commit);
            record.branches = labels.get(&oid).cloned().unwrap_or_default();
            record.tags = tags.get(&oid).cloned().unwrap_or_default();
            records.push(record);
        }

        Ok(records)
    }

    /// Local branch tips, HEAD's branch first and the rest by name.
    ///
    /// An unknown `filter` falls back to every branch.
    pub fn branch_tips(&self, filter: Option<&str>) -> Result<Vec<(String, Oid)>> {
        let head_name = self
            .repo
            .head()
            .ok()
            .filter(|head| head.is_branch())
            .and_then(|head| head.shorthand().map(str::to_string));

        let mut tips = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            let Some(name) = branch.name()? else { continue };
            if let Some(target) = branch.get().target() {
                tips.push((name.to_string(), target));
            }
        }
        tips.sort_by(|(a, _), (b, _)| {
            let a_head = Some(a) == head_name.as_ref();
            let b_head = Some(b) == head_name.as_ref();
            b_head.cmp(&a_head).then_with(|| a.cmp(b))
        });

        if let Some(wanted) = filter {
            if let Some(found) = tips.iter().find(|(name, _)| name == wanted) {
                return Ok(vec![found.clone()]);
            }
            tracing::warn!(branch = wanted, "branch filter matches nothing, showing all branches");
        }

        Ok(tips)
    }

    fn tip_labels(branches: &[(String, Oid)]) -> HashMap<Oid, Vec<String>> {
        let mut labels: HashMap<Oid, Vec<String>> = HashMap::new();
        for (name, tip) in branches {
            labels.entry(*tip).or_default().push(name.clone());
        }
        labels
    }

    /// Propagate branch reach down the walked window.
    ///
    /// `walked` is topologically ordered with children first, so one pass
    /// carries every tip's reach to all of its ancestors inside the window.
    fn reach_labels(branches: &[(String, Oid)], walked: &[Commit]) -> HashMap<Oid, Vec<String>> {
        let mut first_parent: HashMap<Oid, BTreeSet<usize>> = HashMap::new();
        let mut reach: HashMap<Oid, BTreeSet<usize>> = HashMap::new();
        for (idx, (_, tip)) in branches.iter().enumerate() {
            first_parent.entry(*tip).or_default().insert(idx);
            reach.entry(*tip).or_default().insert(idx);
        }

        for commit in walked {
            let oid = commit.id();
            let fp = first_parent.get(&oid).cloned().unwrap_or_default();
            let all = reach.get(&oid).cloned().unwrap_or_default();
            for (i, parent) in commit.parent_ids().enumerate() {
                if i == 0 {
                    first_parent.entry(parent).or_default().extend(fp.iter().copied());
                }
                reach.entry(parent).or_default().extend(all.iter().copied());
            }
        }

        let mut labels = HashMap::new();
        for commit in walked {
            let oid = commit.id();
            let fp = first_parent.get(&oid).cloned().unwrap_or_default();
            let all = reach.get(&oid).cloned().unwrap_or_default();
            let names: Vec<String> = fp
                .iter()
                .chain(all.difference(&fp))
                .map(|&idx| branches[idx].0.clone())
                .collect();
            if !names.is_empty() {
                labels.insert(oid, names);
            }
        }
        labels
    }

    /// Tag names keyed by the commit they peel to
    pub fn tags_by_commit(&self) -> Result<HashMap<Oid, Vec<String>>> {
        let mut raw = Vec::new();
        self.repo.tag_foreach(|oid, name| {
            if let Ok(name) = std::str::from_utf8(name) {
                raw.push((oid, name.trim_start_matches("refs/tags/").to_string()));
            }
            true
        })?;

        let mut tags: HashMap<Oid, Vec<String>> = HashMap::new();
        for (oid, name) in raw {
            let peeled = self
                .repo
                .find_object(oid, None)
                .and_then(|object| object.peel_to_commit());
            match peeled {
                Ok(commit) => tags.entry(commit.id()).or_default().push(name),
                Err(err) => tracing::debug!(tag = %name, %err, "tag does not point at a commit"),
            }
        }
        for names in tags.values_mut() {
            names.sort();
        }
        Ok(tags)
    }

    fn commit_to_record(commit: &Commit) -> CommitRecord {
        let parents = commit.parent_ids().map(|oid| oid.to_string()).collect();
        let author = commit.author().name().unwrap_or("Unknown").to_string();
        let message = commit.summary().unwrap_or("").to_string();

        CommitRecord::new(commit.id().to_string(), parents, commit.time().seconds())
            .with_meta(author, message)
    }
}
