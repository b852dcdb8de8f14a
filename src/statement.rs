//! Statement validation: exactly one statement, and it is a read-only SELECT.

use std::{fmt, ops::ControlFlow};

use indexmap::IndexSet;
use serde::Serialize;
use sqlparser::ast::{Query, SetExpr, Statement, Visit, Visitor};

use crate::{
    error::GatewayError,
    grammar::{RelationRef, SqlDialect, parse_statements, query_relations}
};

/// Classified kind of a parsed statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    Drop,
    Ddl,
    Pragma,
    Other
}

impl StatementKind {
    pub fn of(statement: &Statement) -> Self {
        match statement {
            Statement::Query(_) => Self::Select,
            Statement::Insert {
                ..
            } => Self::Insert,
            Statement::Update {
                ..
            } => Self::Update,
            Statement::Delete {
                ..
            } => Self::Delete,
            Statement::Truncate {
                ..
            } => Self::Truncate,
            Statement::Drop {
                ..
            } => Self::Drop,
            Statement::CreateTable {
                ..
            }
            | Statement::CreateView {
                ..
            }
            | Statement::CreateIndex {
                ..
            }
            | Statement::AlterTable {
                ..
            } => Self::Ddl,
            Statement::Pragma {
                ..
            } => Self::Pragma,
            _ => Self::Other
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Truncate => write!(f, "TRUNCATE"),
            Self::Drop => write!(f, "DROP"),
            Self::Ddl => write!(f, "DDL"),
            Self::Pragma => write!(f, "PRAGMA"),
            Self::Other => write!(f, "OTHER")
        }
    }
}

/// A single statement proven to be a read-only SELECT
#[derive(Debug, Clone)]
pub struct SqlStatement {
    raw:     String,
    query:   Box<Query>,
    kind:    StatementKind,
    dialect: SqlDialect
}

impl SqlStatement {
    /// Original text as received
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Top-level query of the statement
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Relations referenced anywhere in the statement
    pub fn relations(&self) -> IndexSet<RelationRef> {
        query_relations(&self.query)
    }

    /// Canonical SQL text regenerated from the syntax tree
    pub fn to_sql(&self) -> String {
        self.query.to_string()
    }
}

/// Parse `sql` and prove it is exactly one read-only SELECT.
///
/// # Errors
///
/// - [`GatewayError::Parse`] when the text does not parse or is empty
/// - [`GatewayError::MultipleStatements`] for more than one statement
/// - [`GatewayError::NotSelect`] for anything other than a read-only query,
///   including `SELECT ... INTO`, locking clauses and data-modifying CTEs
pub fn validate(sql: &str, dialect: SqlDialect) -> Result<SqlStatement, GatewayError> {
    let mut statements = parse_statements(sql, dialect)?;
    match statements.len() {
        0 => return Err(GatewayError::parse("no statement found")),
        1 => {}
        count => {
            return Err(GatewayError::MultipleStatements {
                count
            });
        }
    }
    let ast = statements.remove(0);
    let kind = StatementKind::of(&ast);
    let Statement::Query(query) = ast else {
        return Err(GatewayError::NotSelect {
            kind: kind.to_string()
        });
    };
    if let Some(reason) = write_effect(&query) {
        return Err(GatewayError::NotSelect {
            kind: reason.to_string()
        });
    }
    tracing::debug!(%kind, "statement validated");
    Ok(SqlStatement {
        raw: sql.to_string(),
        query,
        kind,
        dialect
    })
}

/// Finds write side effects hidden inside a query
struct WriteEffectFinder {
    reason: Option<&'static str>
}

impl Visitor for WriteEffectFinder {
    type Break = ();

    fn pre_visit_statement(&mut self, _statement: &Statement) -> ControlFlow<Self::Break> {
        self.reason = Some("data-modifying statement inside query");
        ControlFlow::Break(())
    }

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if !query.locks.is_empty() {
            self.reason = Some("SELECT with locking clause");
            return ControlFlow::Break(());
        }
        if let Some(reason) = set_expr_effect(&query.body) {
            self.reason = Some(reason);
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

fn write_effect(query: &Query) -> Option<&'static str> {
    let mut finder = WriteEffectFinder {
        reason: None
    };
    let _ = query.visit(&mut finder);
    finder.reason
}

fn set_expr_effect(body: &SetExpr) -> Option<&'static str> {
    match body {
        SetExpr::Select(select) if select.into.is_some() => Some("SELECT INTO"),
        SetExpr::SetOperation {
            left,
            right,
            ..
        } => set_expr_effect(left).or_else(|| set_expr_effect(right)),
        SetExpr::Insert(_)
        | SetExpr::Update(_)
        | SetExpr::Delete(_)
        | SetExpr::Merge(_) => Some("data-modifying statement inside query"),
        _ => None
    }
}
