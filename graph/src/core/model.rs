use super::event::GraphEvent;
use super::lane::{Lane, LaneId, LaneOrigin};
use crate::error::BuildWarning;
use serde::Serialize;

/// Row of the derived lane table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneSummary {
    pub id: LaneId,
    pub name: String,
    pub color: String,
    pub origin: LaneOrigin,
}

/// Row of the derived node list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub sha: String,
    pub lane_id: LaneId,
    pub tags: Vec<String>,
    pub timestamp: i64,
    pub author: String,
    pub message: String,
    pub is_merge: bool,
}

/// Complete output of one build, handed to a renderer as a read-only snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphModel {
    pub(crate) events: Vec<GraphEvent>,
    pub(crate) lanes: Vec<Lane>,
    pub(crate) nodes: Vec<NodeSummary>,
    pub(crate) warnings: Vec<BuildWarning>,
}

impl GraphModel {
    pub fn empty() -> Self {
        Self {
            events: Vec::new(),
            lanes: Vec::new(),
            nodes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Structural events in emission order
    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    pub fn lanes(&self) -> Vec<LaneSummary> {
        self.lanes
            .iter()
            .map(|lane| LaneSummary {
                id: lane.id,
                name: lane.name.clone(),
                color: lane.color.clone(),
                origin: lane.origin,
            })
            .collect()
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id)
    }

    pub fn lane_named(&self, name: &str) -> Option<&Lane> {
        self.lanes.iter().find(|lane| lane.name == name)
    }

    /// Nodes in processing order
    pub fn nodes(&self) -> &[NodeSummary] {
        &self.nodes
    }

    pub fn node(&self, sha: &str) -> Option<&NodeSummary> {
        self.nodes.iter().find(|node| node.sha == sha)
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    /// Number of input records dropped as malformed
    pub fn dropped_records(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, BuildWarning::MalformedCommitRecord { .. }))
            .count()
    }

    /// SHAs placed on a lane, in append order
    pub fn commits_on(&self, lane: LaneId) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| node.lane_id == lane)
            .map(|node| node.sha.as_str())
            .collect()
    }

    pub fn merge_edges(&self) -> impl Iterator<Item = &super::event::MergeEdge> {
        self.events.iter().filter_map(|event| match event {
            GraphEvent::MergeEdge(edge) => Some(edge),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            total_commits: self.nodes.len(),
            total_lanes: self.lanes.len(),
            root_lanes: self
                .lanes
                .iter()
                .filter(|lane| lane.origin == LaneOrigin::Root)
                .count(),
            detached_lanes: self.lanes.iter().filter(|lane| lane.detached).count(),
            merge_commits: self.nodes.iter().filter(|node| node.is_merge).count(),
            merge_edges: self.merge_edges().count(),
            tagged_commits: self.nodes.iter().filter(|node| !node.tags.is_empty()).count(),
            warnings: self.warnings.len(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&ModelView::from(self))
    }
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub total_commits: usize,
    pub total_lanes: usize,
    pub root_lanes: usize,
    pub detached_lanes: usize,
    pub merge_commits: usize,
    pub merge_edges: usize,
    pub tagged_commits: usize,
    pub warnings: usize,
}

/// Serialized shape of the output contract
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelView<'a> {
    events: &'a [GraphEvent],
    lanes: Vec<LaneSummary>,
    nodes: &'a [NodeSummary],
    warnings: &'a [BuildWarning],
    dropped_records: usize,
}

impl<'a> From<&'a GraphModel> for ModelView<'a> {
    fn from(model: &'a GraphModel) -> Self {
        Self {
            events: &model.events,
            lanes: model.lanes(),
            nodes: &model.nodes,
            warnings: &model.warnings,
            dropped_records: model.dropped_records(),
        }
    }
}
