use super::allocator::LaneAllocator;
use super::merge::MergeResolver;
use super::sequencer::{ChronologicalSequencer, SequenceStrategy};
use crate::core::{CommitRecord, GraphEvent, GraphModel, NodeSummary, Palette, RawCommitRecord};
use crate::decor::TagAnnotator;
use crate::error::{BuildWarning, GraphError};
use std::collections::HashSet;

/// Lays out a flat commit list into lanes, merge edges and tag labels
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    palette: Palette,
    strategy: SequenceStrategy,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lane color palette
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set how commits are ordered before placement
    pub fn strategy(mut self, strategy: SequenceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Build from wire records, dropping (and reporting) the malformed ones
    pub fn build_raw(&self, raw: Vec<RawCommitRecord>) -> Result<GraphModel, GraphError> {
        let mut warnings = Vec::new();
        let mut records = Vec::with_capacity(raw.len());

        for (index, record) in raw.into_iter().enumerate() {
            match record.into_record() {
                Ok(record) => records.push(record),
                Err(missing) => {
                    tracing::warn!(index, ?missing, "dropping malformed commit record");
                    warnings.push(BuildWarning::MalformedCommitRecord { index, missing });
                }
            }
        }

        self.layout(&records, warnings)
    }

    /// Build from validated records
    pub fn build(&self, records: &[CommitRecord]) -> Result<GraphModel, GraphError> {
        self.layout(records, Vec::new())
    }

    fn layout(&self, records: &[CommitRecord], mut warnings: Vec<BuildWarning>) -> Result<GraphModel, GraphError> {
        let _span = tracing::debug_span!("layout", commits = records.len()).entered();

        let known = Self::intake(records)?;
        let sequence = ChronologicalSequencer::new(self.strategy).sequence(records)?;

        // Real branch names, so synthesized ones can steer clear of them
        let mut taken: HashSet<String> = records
            .iter()
            .flat_map(|commit| commit.branches.iter().cloned())
            .collect();

        let mut lanes = LaneAllocator::new(self.palette.clone());
        let mut events = Vec::with_capacity(records.len() * 2);
        let mut nodes = Vec::with_capacity(records.len());

        for commit in sequence {
            for parent in &commit.parents {
                if !known.contains(parent.as_str()) {
                    warnings.push(BuildWarning::UnresolvedParent {
                        sha: commit.sha.clone(),
                        parent: parent.clone(),
                    });
                }
            }

            let (owner, detached) = match Self::heuristic_owner(commit) {
                Some(branch) => (branch.to_string(), false),
                None => (Self::detached_name(&commit.sha, &mut taken), true),
            };

            // Primary parent's lane, if already placed, is where a new lane branches from
            let source = commit
                .primary_parent()
                .and_then(|parent| lanes.lane_of(parent))
                .map(|lane| lane.id);

            let lane_id = {
                let (lane, created) = lanes.ensure_lane(&owner, source, detached);
                if created {
                    events.push(GraphEvent::LaneCreated {
                        id: lane.id,
                        name: lane.name.clone(),
                        origin: lane.origin,
                    });
                }
                lane.id
            };

            let parents_drawn: Vec<String> = commit
                .parents
                .iter()
                .filter(|parent| lanes.lane_of(parent).is_some())
                .cloned()
                .collect();
            lanes.place(&commit.sha, lane_id);

            events.push(GraphEvent::CommitAppended {
                lane: lane_id,
                sha: commit.sha.clone(),
                parents_drawn,
            });
            if let Some(tag_event) = TagAnnotator::annotate(commit) {
                events.push(tag_event);
            }
            events.extend(
                MergeResolver::resolve(commit, lane_id, &lanes)
                    .into_iter()
                    .map(GraphEvent::MergeEdge),
            );

            nodes.push(NodeSummary {
                sha: commit.sha.clone(),
                lane_id,
                tags: TagAnnotator::distinct(&commit.tags),
                timestamp: commit.timestamp,
                author: commit.author.clone(),
                message: commit.message.clone(),
                is_merge: commit.is_merge(),
            });
        }

        tracing::debug!(
            lanes = lanes.lane_count(),
            events = events.len(),
            warnings = warnings.len(),
            "layout finished"
        );

        Ok(GraphModel {
            events,
            lanes: lanes.into_lanes(),
            nodes,
            warnings,
        })
    }

    /// Reject input that cannot be laid out at all; returns the set of known shas
    fn intake(records: &[CommitRecord]) -> Result<HashSet<&str>, GraphError> {
        let mut known = HashSet::with_capacity(records.len());
        for commit in records {
            if !known.insert(commit.sha.as_str()) {
                tracing::error!(sha = %commit.sha, "duplicate commit in input");
                return Err(GraphError::DuplicateCommit {
                    sha: commit.sha.clone(),
                });
            }
            if commit.parents.iter().any(|parent| *parent == commit.sha) {
                tracing::error!(sha = %commit.sha, "commit lists itself as parent");
                return Err(GraphError::CyclicHistory {
                    sha: commit.sha.clone(),
                });
            }
        }
        Ok(known)
    }

    /// First listed branch; blank names do not count
    fn heuristic_owner(commit: &CommitRecord) -> Option<&str> {
        commit
            .branches
            .first()
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    fn detached_name(sha: &str, taken: &mut HashSet<String>) -> String {
        let base = format!("detached-{}", sha);
        let mut name = base.clone();
        let mut suffix = 1;
        while taken.contains(&name) {
            name = format!("{}~{}", base, suffix);
            suffix += 1;
        }
        taken.insert(name.clone());
        name
    }
}
