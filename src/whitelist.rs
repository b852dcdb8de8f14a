//! Relation whitelist enforcement.

use compact_str::CompactString;
use indexmap::IndexSet;

use crate::{error::GatewayError, grammar::RelationRef, statement::SqlStatement};

/// Immutable set of relations callers may query.
///
/// Entries are trimmed and lowercased on construction; a schema-qualified
/// entry (`analytics.events`) only admits the qualified reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    relations: IndexSet<CompactString>
}

impl Whitelist {
    pub fn new<I, S>(relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        let relations = relations
            .into_iter()
            .map(|r| r.as_ref().trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .map(CompactString::from)
            .collect();
        Self {
            relations
        }
    }

    pub fn contains(&self, relation: &RelationRef) -> bool {
        self.relations.contains(&relation.qualified())
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Allowed names, in configuration order
    pub fn names(&self) -> Vec<String> {
        self.relations.iter().map(|r| r.to_string()).collect()
    }
}

/// Reject the statement if it touches any relation outside `whitelist`.
///
/// Reports the first offending relation in reference order. A statement
/// that references no relation at all passes.
pub fn check_whitelist(statement: &SqlStatement, whitelist: &Whitelist) -> Result<(), GatewayError> {
    let relations = statement.relations();
    if let Some(forbidden) = relations.iter().find(|r| !whitelist.contains(r)) {
        tracing::warn!(relation = %forbidden, "relation outside whitelist");
        return Err(GatewayError::ForbiddenRelation {
            name:    forbidden.qualified().to_string(),
            allowed: whitelist.names()
        });
    }
    tracing::debug!(relations = relations.len(), "whitelist check passed");
    Ok(())
}
