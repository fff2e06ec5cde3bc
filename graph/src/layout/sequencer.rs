use crate::core::CommitRecord;
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// How commits are ordered before lane assignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceStrategy {
    /// Ascending timestamp, ties broken by input order. Ignores parentage.
    #[default]
    Chronological,
    /// Parents before children (Kahn), timestamp then input order among ready commits
    Topological,
}

/// Orders commits into processing sequence, oldest first
pub struct ChronologicalSequencer {
    strategy: SequenceStrategy,
}

impl ChronologicalSequencer {
    pub fn new(strategy: SequenceStrategy) -> Self {
        Self { strategy }
    }

    pub fn sequence<'a>(&self, commits: &'a [CommitRecord]) -> Result<Vec<&'a CommitRecord>, GraphError> {
        match self.strategy {
            SequenceStrategy::Chronological => Ok(Self::by_timestamp(commits)),
            SequenceStrategy::Topological => Self::topological(commits),
        }
    }

    fn by_timestamp(commits: &[CommitRecord]) -> Vec<&CommitRecord> {
        let mut sorted: Vec<&CommitRecord> = commits.iter().collect();
        // sort_by_key is stable, so equal timestamps keep input order
        sorted.sort_by_key(|commit| commit.timestamp);
        sorted
    }

    fn topological(commits: &[CommitRecord]) -> Result<Vec<&CommitRecord>, GraphError> {
        let index: HashMap<&str, usize> = commits
            .iter()
            .enumerate()
            .map(|(i, commit)| (commit.sha.as_str(), i))
            .collect();

        // Pending parent count per commit and reverse adjacency, inside the input set only
        let mut pending = vec![0usize; commits.len()];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); commits.len()];
        for (i, commit) in commits.iter().enumerate() {
            for parent in &commit.parents {
                if let Some(&p) = index.get(parent.as_str()) {
                    pending[i] += 1;
                    children[p].push(i);
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<(i64, usize)>> = pending
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count == 0)
            .map(|(i, _)| Reverse((commits[i].timestamp, i)))
            .collect();

        let mut sorted = Vec::with_capacity(commits.len());
        while let Some(Reverse((_, i))) = ready.pop() {
            sorted.push(&commits[i]);
            for &child in &children[i] {
                pending[child] -= 1;
                if pending[child] == 0 {
                    ready.push(Reverse((commits[child].timestamp, child)));
                }
            }
        }

        if sorted.len() < commits.len() {
            // Whatever never became ready sits on a cycle or downstream of one
            let stuck = pending
                .iter()
                .enumerate()
                .filter(|&(_, &count)| count > 0)
                .map(|(i, _)| i)
                .min_by_key(|&i| (commits[i].timestamp, i));
            if let Some(i) = stuck {
                return Err(GraphError::CyclicHistory {
                    sha: commits[i].sha.clone(),
                });
            }
        }

        Ok(sorted)
    }
}

impl Default for ChronologicalSequencer {
    fn default() -> Self {
        Self::new(SequenceStrategy::default())
    }
}
