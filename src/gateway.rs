//! Request pipeline.
//!
//! ```text
//! query:        sql -> validate -> whitelist -> row cap -> adapter -> mask
//! explain_safe: sql -> validate -> whitelist -> adapter plan -> redact
//! ```
//!
//! Every stage fails fast; nothing after a failing stage runs and the
//! adapter is called at most once per request. A [`Gateway`] holds only the
//! immutable [`GatewaySettings`], so one instance can serve any number of
//! concurrent callers.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    adapter::ExecutionAdapter,
    config::GatewaySettings,
    error::GatewayError,
    limit::apply_row_cap,
    masking::mask_rows,
    plan::{PlanNode, degraded_plan, redact, render},
    row::ResultRow,
    statement::{SqlStatement, validate},
    whitelist::check_whitelist
};

/// Statement cleared for execution
#[derive(Debug, Clone)]
pub struct VettedQuery {
    pub statement: SqlStatement,
    /// Text handed to the execution adapter
    pub sql:       String,
    /// Whether the row cap wrapper was added
    pub capped:    bool
}

/// Response of the `query` operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub rows:          Vec<ResultRow>,
    pub rows_returned: usize
}

/// Response of the `explainSafe` operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainResponse {
    pub tree:     PlanNode,
    pub text:     String,
    /// Set when the backend had no real plan and the fixed fallback is shown
    pub degraded: bool
}

#[derive(Debug, Clone)]
pub struct Gateway {
    settings: Arc<GatewaySettings>
}

impl Gateway {
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            settings: Arc::new(settings)
        }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Validate and whitelist without rewriting
    pub fn admit(&self, sql: &str) -> Result<SqlStatement, GatewayError> {
        let statement = validate(sql, self.settings.dialect()).inspect_err(log_rejection)?;
        check_whitelist(&statement, self.settings.whitelist()).inspect_err(log_rejection)?;
        Ok(statement)
    }

    /// Run every check and the row cap rewrite; performs no I/O
    pub fn vet(&self, sql: &str) -> Result<VettedQuery, GatewayError> {
        let statement = self.admit(sql)?;
        let capped_sql = apply_row_cap(&statement, self.settings.row_cap());
        let capped = capped_sql != statement.to_sql();
        Ok(VettedQuery {
            statement,
            sql: capped_sql,
            capped
        })
    }

    /// Vet, execute once, cap and mask.
    ///
    /// Rows beyond the configured cap are dropped even when the statement's
    /// own LIMIT allowed more.
    pub async fn query<A>(&self, sql: &str, adapter: &A) -> Result<QueryResponse, GatewayError>
    where
        A: ExecutionAdapter + ?Sized
    {
        let vetted = self.vet(sql)?;
        let mut rows = adapter
            .fetch_rows(&vetted.sql)
            .await
            .inspect_err(log_rejection)?;
        let cap = usize::try_from(self.settings.row_cap()).unwrap_or(usize::MAX);
        if rows.len() > cap {
            tracing::debug!(fetched = rows.len(), cap, "truncating result to row cap");
            rows.truncate(cap);
        }
        let rows = mask_rows(&rows);
        tracing::info!(rows = rows.len(), capped = vetted.capped, "query served");
        Ok(QueryResponse {
            rows_returned: rows.len(),
            rows
        })
    }

    /// Vet and describe the plan without revealing schema or data
    pub async fn explain_safe<A>(
        &self,
        sql: &str,
        adapter: &A
    ) -> Result<ExplainResponse, GatewayError>
    where
        A: ExecutionAdapter + ?Sized
    {
        let statement = self.admit(sql)?;
        let raw = adapter
            .explain(&statement.to_sql())
            .await
            .inspect_err(log_rejection)?;
        let (tree, degraded) = match raw.as_ref().and_then(redact) {
            Some(tree) => (tree, false),
            None => {
                tracing::debug!("backend has no usable plan, using degraded output");
                (degraded_plan(), true)
            }
        };
        let text = render(&tree);
        Ok(ExplainResponse {
            tree,
            text,
            degraded
        })
    }
}

fn log_rejection(err: &GatewayError) {
    tracing::warn!(kind = err.kind(), "request rejected");
}
