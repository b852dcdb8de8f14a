//! # SQL Safety Gateway
//!
//! Command-line front end for the read-only SQL gateway.
//!
//! Every statement goes through the same pipeline before anything touches a
//! database:
//!
//! 1. **Validation** - exactly one statement, and it is a read-only SELECT.
//! 2. **Whitelist** - every table or view referenced, including inside
//!    joins, subqueries and CTEs, must be explicitly allowed.
//! 3. **Row cap** - statements without their own LIMIT are wrapped so they
//!    return at most the configured number of rows.
//! 4. **Masking** - emails, phone numbers and SSN-like values in results are
//!    masked before leaving the gateway.
//!
//! Plans are reported as operator trees without table names, index names or
//! literals.
//!
//! # Quick Start
//!
//! ```bash
//! # Vet a statement and print what would be executed
//! sql-safety-gateway --whitelist safe_users_v check "SELECT id, email FROM safe_users_v"
//!
//! # Serve a captured result set through the full pipeline
//! sql-safety-gateway --whitelist safe_users_v query "SELECT * FROM safe_users_v" -r rows.json
//!
//! # Redacted plan from a captured EXPLAIN (FORMAT JSON)
//! sql-safety-gateway --backend networked --whitelist orders \
//!     explain "SELECT * FROM orders" -p plan.json -f json
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - Request rejected, or configuration/input error
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::process;

use clap::Parser;
use sql_safety_gateway::{app, cli::Cli};
use tokio::main;
use tracing_subscriber::EnvFilter;

#[main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match app::run(cli).await {
        Ok(result) => {
            println!("{}", result.output);
            process::exit(result.exit_code);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
