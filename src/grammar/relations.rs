use std::ops::ControlFlow;

use compact_str::CompactString;
use indexmap::IndexSet;
use sqlparser::ast::{ObjectName, Query, SetExpr, TableFactor, Visit, Visitor};

use super::RelationRef;

/// Relation or nested query met while walking one query level
enum Found {
    Relation(RelationRef),
    Nested(Box<Query>)
}

/// Walks a single query level.
///
/// Nested queries (derived tables, expression subqueries, CTE bodies) are
/// handed back instead of descended into, so each one can be resolved with
/// the CTE names visible at its own position.
struct LevelWalker<'a> {
    depth: usize,
    scope: &'a [CompactString],
    found: Vec<Found>
}

impl LevelWalker<'_> {
    fn record(&mut self, relation: RelationRef) {
        let shadowed = relation.schema.is_none() && self.scope.contains(&relation.name);
        if !shadowed {
            self.found.push(Found::Relation(relation));
        }
    }

    /// `TABLE name` bodies carry a bare name the visitor never reports
    fn record_table_commands(&mut self, body: &SetExpr) {
        match body {
            SetExpr::Table(table) => {
                let parts = table.schema_name.iter().chain(table.table_name.iter());
                if let Some(relation) = RelationRef::from_parts(parts) {
                    self.record(relation);
                }
            }
            SetExpr::SetOperation {
                left,
                right,
                ..
            } => {
                self.record_table_commands(left);
                self.record_table_commands(right);
            }
            _ => {}
        }
    }
}

impl Visitor for LevelWalker<'_> {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        self.depth += 1;
        match self.depth {
            1 => self.record_table_commands(&query.body),
            2 => self.found.push(Found::Nested(Box::new(query.clone()))),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.depth -= 1;
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        if self.depth == 1
            && let Some(relation) = RelationRef::from_object_name(relation)
        {
            self.record(relation);
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(&mut self, table_factor: &TableFactor) -> ControlFlow<Self::Break> {
        if self.depth != 1 {
            return ControlFlow::Continue(());
        }
        match table_factor {
            TableFactor::Function {
                name, ..
            } => {
                if let Some(relation) = RelationRef::from_object_name(name) {
                    self.record(relation);
                }
            }
            TableFactor::TableFunction {
                ..
            } => {
                if let Some(relation) = RelationRef::from_parts(["table()"]) {
                    self.found.push(Found::Relation(relation));
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}

pub(super) fn collect_query(
    query: &Query,
    outer_scope: &[CompactString],
    out: &mut IndexSet<RelationRef>
) {
    let mut scope = outer_scope.to_vec();
    let mut cte_bodies: Vec<&Query> = Vec::new();

    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            let alias = CompactString::from(cte.alias.name.value.to_lowercase());
            // A non-recursive CTE body cannot see its own name
            if with.recursive {
                scope.push(alias.clone());
            }
            collect_query(&cte.query, &scope, out);
            if !with.recursive {
                scope.push(alias);
            }
            cte_bodies.push(&cte.query);
        }
    }

    let mut walker = LevelWalker {
        depth: 0,
        scope: &scope,
        found: Vec::new()
    };
    let _ = query.visit(&mut walker);

    for found in walker.found {
        match found {
            Found::Relation(relation) => {
                out.insert(relation);
            }
            // CTE bodies were already resolved with their narrower scope
            Found::Nested(nested) if cte_bodies.iter().any(|body| **body == *nested) => {}
            Found::Nested(nested) => collect_query(&nested, &scope, out)
        }
    }
}
