//! Grammar adapter over `sqlparser`.
//!
//! Exposes the two capabilities the pipeline needs from a SQL grammar:
//! parsing text into statements for a dialect, and listing the relations a
//! statement touches.

mod relations;

use std::fmt;

use compact_str::CompactString;
use indexmap::IndexSet;
use serde::Serialize;
use sqlparser::{
    ast::{ObjectName, ObjectNamePart, Query, Statement},
    dialect::{
        ClickHouseDialect, Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect
    },
    parser::Parser
};

use crate::error::GatewayError;

/// SQL dialect for parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum SqlDialect {
    #[default]
    Generic,
    MySQL,
    PostgreSQL,
    SQLite,
    ClickHouse
}

impl SqlDialect {
    /// Convert to sqlparser dialect for parsing
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::MySQL => Box::new(MySqlDialect {}),
            Self::PostgreSQL => Box::new(PostgreSqlDialect {}),
            Self::SQLite => Box::new(SQLiteDialect {}),
            Self::ClickHouse => Box::new(ClickHouseDialect {})
        }
    }
}

/// Table or view named by a statement.
///
/// Stored lowercase; `schema` holds every qualifier in front of the relation
/// name (`catalog.schema` for three-part names).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelationRef {
    pub schema: Option<CompactString>,
    pub name:   CompactString
}

impl RelationRef {
    /// Build from dotted parts, lowercasing each one
    pub fn from_parts<I, S>(parts: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        let mut parts: Vec<CompactString> = parts
            .into_iter()
            .map(|p| CompactString::from(p.as_ref().trim().to_lowercase()))
            .collect();
        let name = parts.pop().filter(|n| !n.is_empty())?;
        let schema = if parts.is_empty() {
            None
        } else {
            Some(CompactString::from(parts.join(".")))
        };
        Some(Self {
            schema,
            name
        })
    }

    /// Normalized `schema.name` or `name`
    pub fn qualified(&self) -> CompactString {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name).into(),
            None => self.name.clone()
        }
    }

    pub(crate) fn from_object_name(name: &ObjectName) -> Option<Self> {
        Self::from_parts(name.0.iter().map(object_name_part))
    }
}

impl fmt::Display for RelationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

fn object_name_part(part: &ObjectNamePart) -> String {
    match part {
        ObjectNamePart::Identifier(ident) => ident.value.clone(),
        #[allow(unreachable_patterns)]
        other => other.to_string()
    }
}

/// Parse SQL text into top-level statements
pub fn parse_statements(sql: &str, dialect: SqlDialect) -> Result<Vec<Statement>, GatewayError> {
    let parser_dialect = dialect.into_parser_dialect();
    Parser::parse_sql(parser_dialect.as_ref(), sql).map_err(|e| GatewayError::parse(e.to_string()))
}

/// Relations touched by a statement, in first-seen order.
///
/// Covers joins, derived tables, set operations, subqueries in any
/// expression, and the bodies of common table expressions. Names that
/// resolve to a CTE in scope are not relations and are skipped.
pub fn query_relations(query: &Query) -> IndexSet<RelationRef> {
    let mut out = IndexSet::new();
    relations::collect_query(query, &[], &mut out);
    out
}

/// Relations touched by a statement; empty for anything but a query
pub fn relation_references(statement: &Statement) -> IndexSet<RelationRef> {
    match statement {
        Statement::Query(query) => query_relations(query),
        _ => IndexSet::new()
    }
}
