// Debounced member search
// Only the most recent query is allowed to deliver results

use crate::config::{DEFAULT_SEARCH_DEBOUNCE, MIN_SEARCH_LEN};
use crate::models::MemberSuggestion;
use crate::store::DirectorySearch;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Fewer than the minimum number of characters; nothing was sent.
    TooShort,
    /// A newer query arrived before this one finished.
    Superseded,
    /// The owning scope was torn down.
    Cancelled,
    Results(Vec<MemberSuggestion>),
    Failed(String),
}

pub struct MemberSearch {
    directory: Arc<dyn DirectorySearch>,
    debounce: Duration,
    min_len: usize,
    latest: AtomicU64,
    scope: CancellationToken,
}

impl MemberSearch {
    pub fn new(directory: Arc<dyn DirectorySearch>, scope: CancellationToken) -> Self {
        Self {
            directory,
            debounce: DEFAULT_SEARCH_DEBOUNCE,
            min_len: MIN_SEARCH_LEN,
            latest: AtomicU64::new(0),
            scope,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Waits out the debounce, then searches unless a newer query has been
    /// issued in the meantime.
    pub async fn query(&self, input: &str) -> SearchOutcome {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let term = input.trim();
        if term.chars().count() < self.min_len {
            return SearchOutcome::TooShort;
        }

        tokio::select! {
            _ = tokio::time::sleep(self.debounce) => {}
            _ = self.scope.cancelled() => return SearchOutcome::Cancelled,
        }
        if !self.is_current(ticket) {
            return SearchOutcome::Superseded;
        }

        debug!("Searching directory for '{}'", term);
        let result = tokio::select! {
            result = self.directory.search(term) => result,
            _ = self.scope.cancelled() => return SearchOutcome::Cancelled,
        };

        if !self.is_current(ticket) {
            return SearchOutcome::Superseded;
        }
        match result {
            Ok(found) => SearchOutcome::Results(found),
            Err(e) => SearchOutcome::Failed(e.to_string()),
        }
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct StaticDirectory {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DirectorySearch for StaticDirectory {
        async fn search(&self, query: &str) -> Result<Vec<MemberSuggestion>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query == "fail" {
                return Err(StoreError::status(500, "directory down"));
            }
            Ok(vec![MemberSuggestion {
                value: format!("{}@example.com", query),
                label: query.to_string(),
                email: format!("{}@example.com", query),
            }])
        }
    }

    fn search() -> (Arc<StaticDirectory>, MemberSearch) {
        let directory = Arc::new(StaticDirectory {
            calls: AtomicUsize::new(0),
        });
        let search = MemberSearch::new(directory.clone(), CancellationToken::new())
            .with_debounce(Duration::from_millis(20));
        (directory, search)
    }

    #[tokio::test]
    async fn test_short_query_skips_directory() {
        let (directory, search) = search();
        assert_eq!(search.query(" al ").await, SearchOutcome::TooShort);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_latest_query_wins() {
        let (directory, search) = search();
        let (first, second) = tokio::join!(search.query("ali"), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            search.query("alice").await
        });
        assert_eq!(first, SearchOutcome::Superseded);
        match second {
            SearchOutcome::Results(found) => assert_eq!(found[0].label, "alice"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_reported() {
        let (_, search) = search();
        assert!(matches!(search.query("fail").await, SearchOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_cancelled_scope() {
        let scope = CancellationToken::new();
        let directory = Arc::new(StaticDirectory {
            calls: AtomicUsize::new(0),
        });
        let search = MemberSearch::new(directory, scope.clone());
        scope.cancel();
        assert_eq!(search.query("alice").await, SearchOutcome::Cancelled);
    }
}
