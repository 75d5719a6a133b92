// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # soql-extract
//!
//! Record extraction from Salesforce-style select queries, with three
//! strategies that trade memory, round-trips and consistency:
//!
//! - **Full pull**: one call, the provider follows every continuation
//! - **Cursor pagination**: page by page, notifying an observer per page
//! - **Offset batching**: count first, then fixed-size `LIMIT`/`OFFSET` batches
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use soql_extract::credentials::FileCredentialStore;
//! use soql_extract::engine::{batch_observer, ExtractionEngine};
//! use soql_extract::session::SalesforceProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> soql_extract::Result<()> {
//!     let store = FileCredentialStore::new("secrets.json");
//!     let provider = SalesforceProvider::new(Arc::new(store), "salesforce/prod");
//!     let mut engine = ExtractionEngine::new(provider);
//!
//!     let mut observer = batch_observer(|event| {
//!         println!("batch {}: {} records", event.number, event.records.len());
//!         Ok(())
//!     });
//!     let extraction = engine
//!         .query_in_batches("SELECT Id, Name FROM Account", 2000, Some(&mut observer))
//!         .await?;
//!
//!     println!("{} of {} records", extraction.len(), extraction.total_count);
//!     engine.close().await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     ExtractionEngine                         │
//! │  query(paginate)   query_count   query_in_batches   extract  │
//! └──────────────────────────────────────────────────────────────┘
//!          │                    │                     │
//! ┌────────┴────────┬───────────┴──────────┬──────────┴─────────┐
//! │ SessionProvider │   Query rewriting    │   BatchObserver    │
//! ├─────────────────┼──────────────────────┼────────────────────┤
//! │ SOAP login      │ count()              │ per-batch callback │
//! │ REST query      │ LIMIT / OFFSET       │ failures isolated  │
//! │ nextRecordsUrl  │                      │                    │
//! └─────────────────┴──────────────────────┴────────────────────┘
//!          │
//! ┌────────┴────────┬──────────────────────┐
//! │ CredentialStore │ HttpClient           │
//! │ aws / file      │ retry, rate limit    │
//! └─────────────────┴──────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credential stores
pub mod credentials;

/// HTTP client with retry and rate limiting
pub mod http;

/// SOAP login and session tokens
pub mod auth;

/// Session providers
pub mod session;

/// Query parsing and rewriting
pub mod query;

/// Extraction engine
pub mod engine;

/// Configuration file
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::Config;
pub use engine::{
    batch_observer, BatchEvent, BatchObserver, BatchTotal, Extraction, ExtractionEngine, Strategy,
};
pub use session::{SalesforceProvider, SessionProvider};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
