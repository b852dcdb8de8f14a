//! Execution adapter seam.
//!
//! The gateway never talks to a database itself. It hands a vetted statement
//! to an [`ExecutionAdapter`], which owns the connection for the duration of
//! the call and releases it on every exit path.

use std::{fs, path::Path};

use async_trait::async_trait;

use crate::{
    error::{AppResult, GatewayError, file_read_error, snapshot_error},
    plan::RawPlan,
    row::ResultRow
};

/// Runs statements that already passed validation, whitelisting and capping
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Execute `sql` and return its rows in result order.
    ///
    /// Fails with [`GatewayError::Execution`] on any backend failure.
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<ResultRow>, GatewayError>;

    /// Engine plan for `sql`, or `None` when the backend cannot produce one
    async fn explain(&self, _sql: &str) -> Result<Option<RawPlan>, GatewayError> {
        Ok(None)
    }
}

/// Replays a captured result set and plan instead of querying a database.
///
/// Used to audit what a caller would receive for a recorded result, and as a
/// deterministic stand-in for a live backend.
#[derive(Debug, Clone, Default)]
pub struct SnapshotAdapter {
    rows: Option<Vec<ResultRow>>,
    plan: Option<RawPlan>
}

impl SnapshotAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, rows: Vec<ResultRow>) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_plan(mut self, plan: RawPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    /// Load a JSON array of row objects
    pub fn load_rows(path: &Path) -> AppResult<Vec<ResultRow>> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| file_read_error(&display, e))?;
        parse_rows(&content).map_err(|e| snapshot_error(&display, e))
    }

    /// Load a PostgreSQL JSON plan or SQLite query plan rows
    pub fn load_plan(path: &Path) -> AppResult<RawPlan> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| file_read_error(&display, e))?;
        let value = serde_json::from_str(&content).map_err(|e| snapshot_error(&display, e))?;
        Ok(RawPlan::from_json(value))
    }
}

/// Parse a JSON array of row objects
pub fn parse_rows(content: &str) -> Result<Vec<ResultRow>, serde_json::Error> {
    serde_json::from_str(content)
}

#[async_trait]
impl ExecutionAdapter for SnapshotAdapter {
    async fn fetch_rows(&self, _sql: &str) -> Result<Vec<ResultRow>, GatewayError> {
        self.rows
            .clone()
            .ok_or_else(|| GatewayError::execution("no result snapshot loaded"))
    }

    async fn explain(&self, _sql: &str) -> Result<Option<RawPlan>, GatewayError> {
        Ok(self.plan.clone())
    }
}
