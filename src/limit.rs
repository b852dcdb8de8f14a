//! Row cap rewriting.

use sqlparser::ast::{Expr, LimitClause, Query, SetExpr, TopQuantity, UnaryOperator, Value};

use crate::statement::SqlStatement;

/// Alias given to the wrapped statement
pub const CAPPED_ALIAS: &str = "gateway_capped";

/// Text of `statement` guaranteed to return at most `cap` rows.
///
/// A statement that already bounds its own result at the top level with a
/// non-negative row count (`LIMIT n`, `LIMIT offset, n`, `FETCH FIRST n ROWS`,
/// `TOP n`) is returned as is. `LIMIT -1`, `LIMIT NULL`, percentages and
/// computed counts do not count as a bound. Anything else is wrapped as
/// `SELECT * FROM (<statement>) AS gateway_capped LIMIT <cap>`, which keeps
/// the projection untouched. Applying the cap to its own output is a no-op.
pub fn apply_row_cap(statement: &SqlStatement, cap: u64) -> String {
    let sql = statement.to_sql();
    if has_explicit_bound(statement.query()) {
        tracing::debug!("statement carries its own bound, left unchanged");
        return sql;
    }
    tracing::debug!(cap, "wrapping statement with row cap");
    format!("SELECT * FROM ({}) AS {} LIMIT {}", sql, CAPPED_ALIAS, cap)
}

/// Whether the top level of `query` already limits its result size
pub fn has_explicit_bound(query: &Query) -> bool {
    let limited = match &query.limit_clause {
        Some(LimitClause::LimitOffset {
            limit, ..
        }) => limit.as_ref().is_some_and(is_row_count),
        Some(LimitClause::OffsetCommaLimit {
            limit, ..
        }) => is_row_count(limit),
        None => false
    };
    let fetched = query
        .fetch
        .as_ref()
        .is_some_and(|fetch| !fetch.percent && fetch.quantity.as_ref().is_none_or(is_row_count));
    limited || fetched || body_has_top(&query.body)
}

fn body_has_top(body: &SetExpr) -> bool {
    match body {
        SetExpr::Select(select) => select.top.as_ref().is_some_and(|top| {
            !top.percent
                && match &top.quantity {
                    Some(TopQuantity::Expr(expr)) => is_row_count(expr),
                    Some(TopQuantity::Constant(_)) => true,
                    None => false
                }
        }),
        _ => false
    }
}

/// Non-negative integer literal, optionally parenthesized or with a unary `+`
fn is_row_count(expr: &Expr) -> bool {
    match expr {
        Expr::Value(v) => match &v.value {
            Value::Number(n, _) => !n.starts_with('-'),
            _ => false
        },
        Expr::Nested(inner) => is_row_count(inner),
        Expr::UnaryOp {
            op: UnaryOperator::Plus,
            expr
        } => is_row_count(expr),
        _ => false
    }
}
