//! Query model module
//!
//! Parses select-style queries into a minimal structural model (select list,
//! `FROM` position, trailing clauses) and derives the count-only and
//! limit/offset variants the extraction engine needs.
//!
//! # Example
//!
//! ```rust
//! use soql_extract::query::SoqlQuery;
//!
//! let query = SoqlQuery::parse("select id from Account order by name limit 10").unwrap();
//! assert_eq!(query.count_query(), "select count() from Account ");
//! assert_eq!(
//!     query.with_limit_offset(2000, 4000),
//!     "select id from Account order by name LIMIT 2000 OFFSET 4000"
//! );
//! ```

mod parser;
mod rewrite;

pub use parser::{preview, Clause, ClauseKind, SoqlQuery};
