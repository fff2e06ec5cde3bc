use serde::{Deserialize, Serialize};

/// Index of a lane in the build's lane arena
pub type LaneId = usize;

/// How a lane came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "laneId", rename_all = "camelCase")]
pub enum LaneOrigin {
    /// Started without a known primary parent
    Root,
    /// Branched out of another lane
    InheritedFrom(LaneId),
}

impl LaneOrigin {
    pub fn source(&self) -> Option<LaneId> {
        match self {
            LaneOrigin::Root => None,
            LaneOrigin::InheritedFrom(id) => Some(*id),
        }
    }
}

/// One rendered branch line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    pub id: LaneId,
    pub name: String,
    pub color: String,
    pub origin: LaneOrigin,
    /// True when the name was synthesized for a commit no branch reaches
    pub detached: bool,
}

const DARK: [&str; 7] = [
    "#60a5fa", "#f472b6", "#4ade80", "#fbbf24", "#fb7185", "#22d3ee", "#a78bfa",
];
const LIGHT: [&str; 7] = [
    "#2563eb", "#db2777", "#16a34a", "#d97706", "#dc2626", "#0891b2", "#7c3aed",
];

/// Fixed set of lane colors; lane `id` gets color `id % len`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// Build a palette from explicit colors, falling back to the dark theme when empty
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            tracing::warn!("empty lane palette configured, using the dark palette");
            return Self::dark();
        }
        Self { colors }
    }

    pub fn dark() -> Self {
        Self {
            colors: DARK.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn light() -> Self {
        Self {
            colors: LIGHT.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color_for(&self, id: LaneId) -> &str {
        &self.colors[id % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}
