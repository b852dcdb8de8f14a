use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PlanNode;

/// Plan as handed over by an execution engine
#[derive(Debug, Clone, PartialEq)]
pub enum RawPlan {
    /// PostgreSQL `EXPLAIN (FORMAT JSON)` output
    Json(Value),
    /// SQLite `EXPLAIN QUERY PLAN` rows
    Rows(Vec<QueryPlanRow>)
}

impl RawPlan {
    /// Recognize a captured plan document.
    ///
    /// An array of objects that all carry `id`, `parent` and `detail` is
    /// taken as SQLite rows; anything else as a JSON plan.
    pub fn from_json(value: Value) -> Self {
        if let Value::Array(items) = &value
            && !items.is_empty()
            && items.iter().all(is_query_plan_row)
            && let Ok(rows) = serde_json::from_value::<Vec<QueryPlanRow>>(value.clone())
        {
            return Self::Rows(rows);
        }
        Self::Json(value)
    }
}

/// One row of SQLite `EXPLAIN QUERY PLAN`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlanRow {
    pub id:     i64,
    pub parent: i64,
    pub detail: String
}

fn is_query_plan_row(item: &Value) -> bool {
    item.get("id").is_some() && item.get("parent").is_some() && item.get("detail").is_some()
}

const NODE_TYPE: &str = "Node Type";
const PLAN_ROWS: &str = "Plan Rows";
const TOTAL_COST: &str = "Total Cost";
const SUB_PLANS: &str = "Plans";

pub(super) fn redact_json(value: &Value) -> Vec<PlanNode> {
    match value {
        Value::Array(items) => items.iter().flat_map(redact_json).collect(),
        Value::Object(map) => match map.get("Plan") {
            Some(plan) => vec![redact_json_node(plan)],
            None => vec![redact_json_node(value)]
        },
        _ => Vec::new()
    }
}

fn redact_json_node(node: &Value) -> PlanNode {
    let op = node
        .get(NODE_TYPE)
        .and_then(Value::as_str)
        .unwrap_or("Operation");
    let rows = node.get(PLAN_ROWS).and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
    });
    let cost = node.get(TOTAL_COST).and_then(Value::as_f64);
    let children = node
        .get(SUB_PLANS)
        .and_then(Value::as_array)
        .map(|plans| plans.iter().map(redact_json_node).collect())
        .unwrap_or_default();
    PlanNode {
        op: op.to_string(),
        rows,
        cost,
        children
    }
}

/// Leading keywords of SQLite plan details, longest first.
///
/// Everything after the keyword names tables, indexes or predicates.
const SQLITE_OPERATORS: &[&str] = &[
    "CORRELATED SCALAR SUBQUERY",
    "CORRELATED LIST SUBQUERY",
    "UNION USING TEMP B-TREE",
    "INTERSECT USING TEMP B-TREE",
    "EXCEPT USING TEMP B-TREE",
    "USE TEMP B-TREE",
    "LEFT-MOST SUBQUERY",
    "SCALAR SUBQUERY",
    "LIST SUBQUERY",
    "COMPOUND QUERY",
    "MULTI-INDEX OR",
    "BLOOM FILTER",
    "MERGE",
    "UNION ALL",
    "CO-ROUTINE",
    "MATERIALIZE",
    "RIGHT-JOIN",
    "SEARCH",
    "SCAN",
    "INDEX"
];

pub(super) fn redact_rows(rows: &[QueryPlanRow]) -> Vec<PlanNode> {
    let mut visited = vec![false; rows.len()];
    let roots: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.parent == 0 || !rows.iter().any(|r| r.id == row.parent))
        .map(|(i, _)| i)
        .collect();
    roots
        .into_iter()
        .filter_map(|i| build_row_node(rows, i, &mut visited))
        .collect()
}

fn build_row_node(rows: &[QueryPlanRow], index: usize, visited: &mut [bool]) -> Option<PlanNode> {
    if visited[index] {
        return None;
    }
    visited[index] = true;
    let id = rows[index].id;
    let children = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.parent == id && row.parent != 0)
        .map(|(i, _)| i)
        .collect::<Vec<_>>()
        .into_iter()
        .filter_map(|i| build_row_node(rows, i, visited))
        .collect();
    Some(PlanNode::new(sqlite_operator(&rows[index].detail)).with_children(children))
}

fn sqlite_operator(detail: &str) -> String {
    let detail = detail.trim_start();
    SQLITE_OPERATORS
        .iter()
        .find(|op| {
            detail.starts_with(*op)
                && detail[op.len()..]
                    .chars()
                    .next()
                    .is_none_or(|c| c == ' ' || c == '(')
        })
        .map(|op| title_case(op))
        .unwrap_or_else(|| String::from("Operation"))
}

/// `USE TEMP B-TREE` -> `Use Temp B-Tree`
fn title_case(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    let mut word_start = true;
    for c in keyword.chars() {
        if word_start {
            out.push(c);
        } else {
            out.extend(c.to_lowercase());
        }
        word_start = c == ' ' || c == '-';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_operator_drops_identifiers() {
        assert_eq!(sqlite_operator("SCAN users"), "Scan");
        assert_eq!(
            sqlite_operator("SEARCH orders USING INDEX idx_orders_user (user_id=?)"),
            "Search"
        );
        assert_eq!(sqlite_operator("USE TEMP B-TREE FOR ORDER BY"), "Use Temp B-Tree");
        assert_eq!(sqlite_operator("CO-ROUTINE secret_view"), "Co-Routine");
    }

    #[test]
    fn test_sqlite_operator_unknown_detail() {
        assert_eq!(sqlite_operator("SCANNER customers"), "Operation");
        assert_eq!(sqlite_operator("users"), "Operation");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("LEFT-MOST SUBQUERY"), "Left-Most Subquery");
    }
}
