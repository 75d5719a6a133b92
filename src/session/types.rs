//! Page type shared by all providers

use crate::error::{Error, Result};
use crate::types::Record;
use serde::{Deserialize, Serialize};

/// One page of query results.
///
/// Deserializes from the REST wire shape
/// `{"totalSize": .., "done": .., "nextRecordsUrl": .., "records": [..]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Records on this page, in server order
    #[serde(default)]
    pub records: Vec<Record>,
    /// Total number of records the query matches
    #[serde(rename = "totalSize", default)]
    pub total_count: u64,
    /// Whether this is the last page
    #[serde(default = "default_done")]
    pub done: bool,
    /// Token for the next page; only meaningful while `done` is false
    #[serde(
        rename = "nextRecordsUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub continuation_token: Option<String>,
}

fn default_done() -> bool {
    true
}

impl Page {
    /// Create a final page
    pub fn last(records: Vec<Record>, total_count: u64) -> Self {
        Self {
            records,
            total_count,
            done: true,
            continuation_token: None,
        }
    }

    /// Create a page that continues at `token`
    pub fn partial(records: Vec<Record>, total_count: u64, token: impl Into<String>) -> Self {
        Self {
            records,
            total_count,
            done: false,
            continuation_token: Some(token.into()),
        }
    }

    /// Token for the page after this one.
    ///
    /// `Ok(None)` when this page is the last; an error when the page claims
    /// more results but carries no usable token.
    pub fn next_token(&self) -> Result<Option<&str>> {
        if self.done {
            return Ok(None);
        }
        match self.continuation_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(Some(token)),
            _ => Err(Error::pagination(
                "page is not done but carries no continuation token",
            )),
        }
    }

    /// Append a follow-up page, taking over its pagination state
    pub fn absorb(&mut self, next: Page) {
        self.records.extend(next.records);
        self.done = next.done;
        self.continuation_token = next.continuation_token;
    }

    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this page has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
