//! The session provider contract

use super::types::Page;
use crate::error::Result;
use async_trait::async_trait;

/// A remote source that can run select-style queries.
///
/// The engine owns at most one session per instance and never calls a
/// provider concurrently for the same session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Authenticated handle produced by [`connect`](Self::connect)
    type Session: Send + Sync;

    /// Establish a session. Fails with `Authentication` (or
    /// `SecretRetrieval` when credentials cannot be loaded).
    async fn connect(&self) -> Result<Self::Session>;

    /// Run a query and return its first page. Fails with `Query`.
    async fn execute(&self, session: &Self::Session, query: &str) -> Result<Page>;

    /// Fetch the page identified by a continuation token. Fails with
    /// `Pagination`.
    async fn continue_query(&self, session: &Self::Session, token: &str) -> Result<Page>;

    /// Run a query and follow every continuation token, returning a single
    /// `done` page holding all records.
    async fn execute_all(&self, session: &Self::Session, query: &str) -> Result<Page> {
        let mut page = self.execute(session, query).await?;
        while let Some(token) = page.next_token()? {
            let token = token.to_string();
            let next = self.continue_query(session, &token).await?;
            page.absorb(next);
        }
        Ok(page)
    }

    /// Release the session's remote resources
    async fn release(&self, _session: Self::Session) -> Result<()> {
        Ok(())
    }
}
