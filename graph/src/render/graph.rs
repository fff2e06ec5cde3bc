use super::text::TextLayout;
use crate::core::{GraphModel, LaneId, LaneOrigin};
use chrono::{TimeZone, Utc};
use std::fmt::Write;

/// Plain-text view of a `GraphModel`, newest commit on top.
///
/// Each lane gets a column: `*` marks a commit, `M` a merge commit and `|`
/// a lane that continues through the row.
pub struct TextRenderer {
    message_width: usize,
    legend: bool,
}

impl TextRenderer {
    pub fn new(message_width: usize) -> Self {
        Self {
            message_width,
            legend: true,
        }
    }

    pub fn legend(mut self, show: bool) -> Self {
        self.legend = show;
        self
    }

    pub fn render(&self, model: &GraphModel) -> String {
        let mut out = String::new();
        if model.is_empty() {
            out.push_str("No commits to display\n");
            return out;
        }

        let lane_count = model.lanes().len();
        let (first, last) = Self::lane_spans(model, lane_count);

        for (row, node) in model.nodes().iter().enumerate().rev() {
            let mut line = String::with_capacity(lane_count * 2 + self.message_width + 32);
            for lane in 0..lane_count {
                let cell = if lane == node.lane_id {
                    if node.is_merge { 'M' } else { '*' }
                } else if first[lane] < row && row < last[lane] {
                    '|'
                } else {
                    ' '
                };
                line.push(cell);
                line.push(' ');
            }

            let short: String = node.sha.chars().take(8).collect();
            let date = Utc
                .timestamp_opt(node.timestamp, 0)
                .single()
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let _ = write!(line, "{} {:10} ", short, date);

            // Branch label on a lane's tip commit
            if last[node.lane_id] == row {
                if let Some(lane) = model.lane(node.lane_id).filter(|lane| !lane.detached) {
                    let _ = write!(line, "({}) ", lane.name);
                }
            }
            if !node.tags.is_empty() {
                let _ = write!(line, "[{}] ", node.tags.join(", "));
            }
            line.push_str(&TextLayout::truncate_to_width(&node.message, self.message_width));

            out.push_str(line.trim_end());
            out.push('\n');
        }

        if self.legend {
            out.push('\n');
            for lane in model.lanes() {
                let origin = match lane.origin {
                    LaneOrigin::Root => "root".to_string(),
                    LaneOrigin::InheritedFrom(source) => format!("from lane {}", source),
                };
                let _ = writeln!(
                    out,
                    "lane {:>2} {} {} {}",
                    lane.id,
                    lane.color,
                    TextLayout::pad_to_width(&lane.name, 24),
                    origin
                );
            }
        }

        let dropped = model.dropped_records();
        if dropped > 0 {
            let _ = writeln!(out, "\n{} malformed record(s) dropped", dropped);
        }

        out
    }

    /// First and last row index per lane
    fn lane_spans(model: &GraphModel, lane_count: usize) -> (Vec<usize>, Vec<usize>) {
        let mut first = vec![usize::MAX; lane_count];
        let mut last = vec![0; lane_count];
        for (row, node) in model.nodes().iter().enumerate() {
            let lane: LaneId = node.lane_id;
            first[lane] = first[lane].min(row);
            last[lane] = last[lane].max(row);
        }
        (first, last)
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(60)
    }
}
