use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::watch;

use super::tracker::{Table, TableVersions};
use super::Dao;
use crate::error::Result;

type QueryFn<T> = dyn Fn(&Connection) -> Result<T> + Send + Sync;

/// A query that re-runs whenever one of the tables it reads from is written.
///
/// The first [`next`](LiveQuery::next) runs the query straight away. Each
/// later call parks until a committed write bumps one of the dependent tables,
/// then runs the query again. Bursts of writes coalesce into one re-run that
/// sees the final state.
pub struct LiveQuery<T> {
    dao: Dao,
    tables: &'static [Table],
    versions: watch::Receiver<TableVersions>,
    seen: Option<TableVersions>,
    query: Arc<QueryFn<T>>,
}

impl<T: Send + 'static> LiveQuery<T> {
    pub(crate) fn new<F>(dao: Dao, tables: &'static [Table], query: F) -> Self
    where
        F: Fn(&Connection) -> Result<T> + Send + Sync + 'static,
    {
        let versions = dao.inner.tracker.subscribe();
        Self {
            dao,
            tables,
            versions,
            seen: None,
            query: Arc::new(query),
        }
    }

    /// Wait for the next result. Returns `None` once the store handle behind
    /// this query is gone. Dropping the future before it resolves is safe: the
    /// pending emission is produced again on the next call.
    pub async fn next(&mut self) -> Option<Result<T>> {
        if let Some(seen) = self.seen {
            loop {
                let current = *self.versions.borrow_and_update();
                if seen.differs_in(&current, self.tables) {
                    break;
                }
                if self.versions.changed().await.is_err() {
                    return None;
                }
            }
        }

        // Snapshot before reading so a write landing mid-query triggers
        // another run instead of being lost.
        let snapshot = *self.versions.borrow_and_update();
        let query = Arc::clone(&self.query);
        let result = self.dao.read(move |conn| query(conn)).await;
        self.seen = Some(snapshot);
        Some(result)
    }

    pub fn tables(&self) -> &'static [Table] {
        self.tables
    }
}
