//! Paginated upstream source.
//!
//! A [`PageSource`] fetches a single page of raw records for a named
//! collection. [`Pages`] drives it: fixed-size pages, an offset cursor
//! advanced by the page size, and termination on the first empty page.
//!
//! ```text
//! skip=0  → 10 records  → yield
//! skip=10 → 10 records  → yield
//! skip=20 →  3 records  → yield   (short page does not stop iteration)
//! skip=30 →  0 records  → done
//! ```

use anyhow::Result;
use async_trait::async_trait;

/// Default number of records requested per page.
pub const PAGE_SIZE: usize = 10;

/// A batch of raw upstream records, in upstream order.
pub type Batch = Vec<serde_json::Value>;

/// Fetches one page of a collection.
///
/// Implementations return an empty vector when the collection array is
/// missing or empty, and an error on any transport or protocol failure.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, collection: &str, limit: usize, skip: usize) -> Result<Batch>;
}

/// Forward-only, single-pass cursor over the pages of one collection.
///
/// Once exhausted (or after an error) every further call returns `Ok(None)`;
/// a new cursor is needed to read the collection again.
pub struct Pages<'a> {
    source: &'a dyn PageSource,
    collection: String,
    page_size: usize,
    skip: usize,
    done: bool,
}

impl<'a> Pages<'a> {
    pub fn new(source: &'a dyn PageSource, collection: impl Into<String>) -> Self {
        Self::with_page_size(source, collection, PAGE_SIZE)
    }

    pub fn with_page_size(
        source: &'a dyn PageSource,
        collection: impl Into<String>,
        page_size: usize,
    ) -> Self {
        Self {
            source,
            collection: collection.into(),
            page_size: page_size.max(1),
            skip: 0,
            done: false,
        }
    }

    /// Fetch the next non-empty batch, or `None` once an empty page was seen.
    pub async fn next_batch(&mut self) -> Result<Option<Batch>> {
        if self.done {
            return Ok(None);
        }

        let page = match self
            .source
            .fetch_page(&self.collection, self.page_size, self.skip)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e.context(format!(
                    "fetching {} (limit={}, skip={})",
                    self.collection, self.page_size, self.skip
                )));
            }
        };

        if page.is_empty() {
            tracing::info!(collection = %self.collection, "no more records to process");
            self.done = true;
            return Ok(None);
        }

        tracing::info!(
            collection = %self.collection,
            skip = self.skip,
            records = page.len(),
            "fetched batch"
        );
        self.skip += self.page_size;
        Ok(Some(page))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves pre-built pages keyed by `skip / limit`, recording every request.
    pub(crate) struct ScriptedSource {
        pages: Vec<Batch>,
        fail_at: Option<usize>,
        pub(crate) requests: Mutex<Vec<(String, usize, usize)>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(pages: Vec<Batch>) -> Self {
            Self {
                pages,
                fail_at: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn of_sizes(sizes: &[usize]) -> Self {
            let pages = sizes
                .iter()
                .map(|&n| (0..n).map(|i| json!({ "id": i })).collect())
                .collect();
            Self::new(pages)
        }

        fn failing_at(mut self, page: usize) -> Self {
            self.fail_at = Some(page);
            self
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch_page(&self, collection: &str, limit: usize, skip: usize) -> Result<Batch> {
            self.requests
                .lock()
                .unwrap()
                .push((collection.to_string(), limit, skip));
            let index = skip / limit;
            if self.fail_at == Some(index) {
                anyhow::bail!("connection reset");
            }
            Ok(self.pages.get(index).cloned().unwrap_or_default())
        }
    }

    async fn drain(pages: &mut Pages<'_>) -> Result<Vec<usize>> {
        let mut sizes = Vec::new();
        while let Some(batch) = pages.next_batch().await? {
            sizes.push(batch.len());
        }
        Ok(sizes)
    }

    #[tokio::test]
    async fn test_short_page_does_not_terminate() {
        let source = ScriptedSource::of_sizes(&[10, 10, 3, 0]);
        let mut pages = Pages::new(&source, "users");
        assert_eq!(drain(&mut pages).await.unwrap(), vec![10, 10, 3]);

        let requests = source.requests.lock().unwrap();
        let skips: Vec<usize> = requests.iter().map(|r| r.2).collect();
        assert_eq!(skips, vec![0, 10, 20, 30]);
        assert!(requests.iter().all(|r| r.0 == "users" && r.1 == PAGE_SIZE));
    }

    #[tokio::test]
    async fn test_stops_at_first_empty_page() {
        let source = ScriptedSource::of_sizes(&[10, 0, 10]);
        let mut pages = Pages::new(&source, "carts");
        assert_eq!(drain(&mut pages).await.unwrap(), vec![10]);
        assert_eq!(source.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_cursor_stays_exhausted() {
        let source = ScriptedSource::of_sizes(&[2]);
        let mut pages = Pages::new(&source, "products");
        assert_eq!(drain(&mut pages).await.unwrap(), vec![2]);
        assert!(pages.next_batch().await.unwrap().is_none());
        assert_eq!(source.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let source = ScriptedSource::of_sizes(&[10, 10]).failing_at(1);
        let mut pages = Pages::new(&source, "users");
        assert!(pages.next_batch().await.unwrap().is_some());

        let err = pages.next_batch().await.unwrap_err();
        assert!(format!("{:#}", err).contains("connection reset"));
        assert!(format!("{:#}", err).contains("skip=10"));
        assert!(pages.next_batch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_custom_page_size_advances_cursor() {
        let source = ScriptedSource::of_sizes(&[4, 4, 1]);
        let mut pages = Pages::with_page_size(&source, "users", 4);
        assert_eq!(drain(&mut pages).await.unwrap(), vec![4, 4, 1]);
        let skips: Vec<usize> = source.requests.lock().unwrap().iter().map(|r| r.2).collect();
        assert_eq!(skips, vec![0, 4, 8, 12]);
    }
}
