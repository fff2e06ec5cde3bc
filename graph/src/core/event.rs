use super::lane::{LaneId, LaneOrigin};
use serde::{Deserialize, Serialize};

/// A connection from a non-primary parent's lane into the merge commit's lane
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeEdge {
    pub from_lane: LaneId,
    pub to_lane: LaneId,
    pub at_sha: String,
}

/// Structural event emitted while laying out the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GraphEvent {
    #[serde(rename_all = "camelCase")]
    LaneCreated {
        id: LaneId,
        name: String,
        origin: LaneOrigin,
    },
    #[serde(rename_all = "camelCase")]
    CommitAppended {
        lane: LaneId,
        sha: String,
        /// Parents already placed when this commit was appended
        parents_drawn: Vec<String>,
    },
    MergeEdge(MergeEdge),
    #[serde(rename_all = "camelCase")]
    TagAttached { sha: String, tag_names: Vec<String> },
}

impl GraphEvent {
    /// Lanes this event refers to (not counting the one it creates)
    pub fn referenced_lanes(&self) -> Vec<LaneId> {
        match self {
            GraphEvent::LaneCreated { origin, .. } => origin.source().into_iter().collect(),
            GraphEvent::CommitAppended { lane, .. } => vec![*lane],
            GraphEvent::MergeEdge(edge) => vec![edge.from_lane, edge.to_lane],
            GraphEvent::TagAttached { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = GraphEvent::MergeEdge(MergeEdge {
            from_lane: 1,
            to_lane: 0,
            at_sha: "d".to_string(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "mergeEdge");
        assert_eq!(json["fromLane"], 1);
        assert_eq!(json["atSha"], "d");

        let event = GraphEvent::TagAttached {
            sha: "g".to_string(),
            tag_names: vec!["v1".to_string()],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "tagAttached");
        assert_eq!(json["tagNames"][0], "v1");
    }
}
