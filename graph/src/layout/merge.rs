use super::allocator::LaneAllocator;
use crate::core::{CommitRecord, LaneId, MergeEdge};
use smallvec::SmallVec;

/// Emits cross-lane edges for multi-parent commits
pub struct MergeResolver;

impl MergeResolver {
    /// Edges from each placed non-primary parent's lane into `lane`.
    ///
    /// Parents that are not placed yet, or that sit on `lane` itself,
    /// produce nothing.
    pub fn resolve(commit: &CommitRecord, lane: LaneId, lanes: &LaneAllocator) -> SmallVec<[MergeEdge; 2]> {
        let mut edges = SmallVec::new();
        if !commit.is_merge() {
            return edges;
        }

        for parent in commit.merge_parents() {
            match lanes.lane_of(parent) {
                Some(from) if from.id != lane => edges.push(MergeEdge {
                    from_lane: from.id,
                    to_lane: lane,
                    at_sha: commit.sha.clone(),
                }),
                Some(_) => {}
                None => {
                    tracing::debug!(sha = %commit.sha, %parent, "merge parent not placed, no edge");
                }
            }
        }

        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Palette;

    fn setup() -> LaneAllocator {
        let mut lanes = LaneAllocator::new(Palette::dark());
        lanes.ensure_lane("main", None, false);
        lanes.ensure_lane("feature", Some(0), false);
        lanes.ensure_lane("fix", Some(0), false);
        lanes.place("m1", 0);
        lanes.place("f1", 1);
        lanes.place("x1", 2);
        lanes
    }

    fn commit(parents: &[&str]) -> CommitRecord {
        CommitRecord::new("merge", parents.iter().map(|p| p.to_string()).collect(), 10)
    }

    #[test]
    fn single_parent_has_no_edges() {
        let lanes = setup();
        assert!(MergeResolver::resolve(&commit(&["m1"]), 0, &lanes).is_empty());
    }

    #[test]
    fn octopus_merge_emits_edge_per_lane() {
        let lanes = setup();
        let edges = MergeResolver::resolve(&commit(&["m1", "f1", "x1"]), 0, &lanes);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].from_lane, 1);
        assert_eq!(edges[1].from_lane, 2);
        assert!(edges.iter().all(|e| e.to_lane == 0 && e.at_sha == "merge"));
    }

    #[test]
    fn same_lane_and_unknown_parents_are_skipped() {
        let lanes = setup();
        let edges = MergeResolver::resolve(&commit(&["f1", "m1", "ghost"]), 0, &lanes);
        assert!(edges.is_empty());
    }
}
