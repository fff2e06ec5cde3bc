use crate::core::{CommitRecord, GraphEvent};
use std::collections::HashSet;

/// Attaches tag labels to placed commits
pub struct TagAnnotator;

impl TagAnnotator {
    /// Tag event for `commit`, or `None` when it carries no tags.
    ///
    /// Every distinct name is kept, in the order first listed.
    pub fn annotate(commit: &CommitRecord) -> Option<GraphEvent> {
        let tag_names = Self::distinct(&commit.tags);
        if tag_names.is_empty() {
            return None;
        }
        Some(GraphEvent::TagAttached {
            sha: commit.sha.clone(),
            tag_names,
        })
    }

    pub fn distinct(tags: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        tags.iter()
            .filter(|tag| seen.insert(tag.as_str()))
            .cloned()
            .collect()
    }
}
