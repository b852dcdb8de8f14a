//! # SQL Safety Gateway Library
//!
//! Accepts untrusted SQL text, proves it is a single read-only query over
//! whitelisted relations, bounds its result size, masks PII in the rows it
//! returns, and describes execution plans without revealing schema or data.
//!
//! # Modules
//!
//! - [`grammar`] - SQL parsing and relation extraction
//! - [`statement`] - Single read-only SELECT validation
//! - [`whitelist`] - Relation whitelist enforcement
//! - [`limit`] - Row cap rewriting
//! - [`masking`] - PII detection and masking
//! - [`plan`] - Plan redaction and rendering
//! - [`gateway`] - The `query` and `explain_safe` pipelines
//! - [`adapter`] - Execution adapter seam
//! - [`config`] - Configuration loading and immutable settings
//! - [`error`] - Error types and constructors

pub mod adapter;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod grammar;
pub mod limit;
pub mod masking;
pub mod output;
pub mod plan;
pub mod row;
pub mod statement;
pub mod whitelist;
