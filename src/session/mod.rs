//! Session provider module
//!
//! The collaborator contract the extraction engine drives, and its
//! Salesforce REST implementation.
//!
//! # Overview
//!
//! - [`SessionProvider`] - connect, run a query, follow continuation tokens,
//!   release
//! - [`Page`] - one page of query results plus pagination metadata
//! - [`SalesforceProvider`] - SOAP login + REST `query` endpoint

mod provider;
mod salesforce;
mod types;

pub use provider::SessionProvider;
pub use salesforce::{SalesforceProvider, SalesforceSession, SalesforceSettings};
pub use types::Page;
