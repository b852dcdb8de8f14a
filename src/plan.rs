//! Execution plan redaction.
//!
//! [`redact`] reduces an engine plan to operator labels and estimates;
//! [`render`] turns the result into indented text. The two are kept apart so
//! tree construction and formatting can be checked independently.
//!
//! ```text
//! - Hash Join (rows≈120) (cost≈48.5)
//!   - Seq Scan (rows≈1000) (cost≈22)
//!   - Hash (rows≈40) (cost≈12)
//! ```

mod source;

use serde::{Deserialize, Serialize};
pub use source::{QueryPlanRow, RawPlan};

/// Operator label and estimates of one plan step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    pub op:       String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows:     Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost:     Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlanNode>
}

impl PlanNode {
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op:       op.into(),
            rows:     None,
            cost:     None,
            children: Vec::new()
        }
    }

    pub fn with_children(mut self, children: Vec<PlanNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in the tree, root included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(PlanNode::node_count).sum::<usize>()
    }
}

/// Fixed plan reported when the backend cannot explain a statement.
///
/// Carries no estimates and says nothing about the actual statement.
pub fn degraded_plan() -> PlanNode {
    PlanNode::new("Select").with_children(vec![PlanNode::new("Scan")])
}

/// Strip a raw engine plan down to operators, estimates and shape.
///
/// Predicates, literals, relation and index names never survive. Returns
/// `None` when the plan holds no operator at all.
pub fn redact(raw: &RawPlan) -> Option<PlanNode> {
    let mut roots = match raw {
        RawPlan::Json(value) => source::redact_json(value),
        RawPlan::Rows(rows) => source::redact_rows(rows)
    };
    match roots.len() {
        0 => None,
        1 => Some(roots.remove(0)),
        _ => Some(PlanNode::new("Select").with_children(roots))
    }
}

/// One line per node, two spaces of indent per level
pub fn render(node: &PlanNode) -> String {
    let mut lines = Vec::with_capacity(node.node_count());
    render_into(node, 0, &mut lines);
    lines.join("\n")
}

fn render_into(node: &PlanNode, depth: usize, lines: &mut Vec<String>) {
    let mut line = format!("{}- {}", "  ".repeat(depth), node.op);
    if let Some(rows) = node.rows {
        line.push_str(&format!(" (rows≈{})", rows));
    }
    if let Some(cost) = node.cost {
        line.push_str(&format!(" (cost≈{})", cost));
    }
    lines.push(line);
    for child in &node.children {
        render_into(child, depth + 1, lines);
    }
}
