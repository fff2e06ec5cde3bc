use crate::core::{Lane, LaneId, LaneOrigin, Palette};
use std::collections::HashMap;

/// Owns the lanes of a single build.
///
/// Lanes live in an append-only arena addressed by `LaneId`; commits are
/// mapped to lanes by sha. Nothing is ever removed, so ids stay valid for
/// the whole build.
pub struct LaneAllocator {
    palette: Palette,
    lanes: Vec<Lane>,
    by_name: HashMap<String, LaneId>,
    by_sha: HashMap<String, LaneId>,
}

impl LaneAllocator {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            lanes: Vec::new(),
            by_name: HashMap::new(),
            by_sha: HashMap::new(),
        }
    }

    /// Return the lane called `name`, creating it if needed.
    ///
    /// `source` is only recorded when the lane is new. The boolean is true
    /// when this call created the lane.
    pub fn ensure_lane(&mut self, name: &str, source: Option<LaneId>, detached: bool) -> (&Lane, bool) {
        if let Some(&id) = self.by_name.get(name) {
            return (&self.lanes[id], false);
        }

        let id = self.lanes.len();
        let origin = match source {
            Some(parent) => LaneOrigin::InheritedFrom(parent),
            None => LaneOrigin::Root,
        };
        self.lanes.push(Lane {
            id,
            name: name.to_string(),
            color: self.palette.color_for(id).to_string(),
            origin,
            detached,
        });
        self.by_name.insert(name.to_string(), id);
        tracing::trace!(lane = id, name, ?origin, "lane created");

        (&self.lanes[id], true)
    }

    /// Record that `sha` was placed on `lane`
    pub fn place(&mut self, sha: &str, lane: LaneId) {
        self.by_sha.insert(sha.to_string(), lane);
    }

    /// Lane of an already placed commit
    pub fn lane_of(&self, sha: &str) -> Option<&Lane> {
        self.by_sha.get(sha).map(|&id| &self.lanes[id])
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn into_lanes(self) -> Vec<Lane> {
        self.lanes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_lane_by_name() {
        let mut alloc = LaneAllocator::new(Palette::dark());
        let (main, created) = alloc.ensure_lane("main", None, false);
        assert!(created);
        assert_eq!(main.id, 0);
        assert_eq!(main.origin, LaneOrigin::Root);

        let (again, created) = alloc.ensure_lane("main", Some(7), false);
        assert!(!created);
        assert_eq!(again.id, 0);
        // origin is fixed at creation
        assert_eq!(again.origin, LaneOrigin::Root);
        assert_eq!(alloc.lane_count(), 1);
    }

    #[test]
    fn records_source_lane_and_colors() {
        let mut alloc = LaneAllocator::new(Palette::new(vec!["red".into(), "blue".into()]));
        alloc.ensure_lane("main", None, false);
        alloc.ensure_lane("feature", Some(0), false);
        let (third, _) = alloc.ensure_lane("hotfix", Some(1), false);
        assert_eq!(third.color, "red");
        assert_eq!(third.origin, LaneOrigin::InheritedFrom(1));

        let lanes = alloc.into_lanes();
        assert_eq!(lanes[1].color, "blue");
        assert_eq!(lanes[1].origin, LaneOrigin::InheritedFrom(0));
    }

    #[test]
    fn tracks_commit_placement() {
        let mut alloc = LaneAllocator::new(Palette::dark());
        let (lane, _) = alloc.ensure_lane("main", None, false);
        let id = lane.id;
        alloc.place("abc", id);
        assert_eq!(alloc.lane_of("abc").map(|l| l.id), Some(id));
        assert!(alloc.lane_of("def").is_none());
    }
}
