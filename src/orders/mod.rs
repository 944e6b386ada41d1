//! Paginated order listing.

mod types;

pub use types::{Order, OrderPage, Pagination};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, UploaderError};
use crate::logging::{log_debug, COMPONENT_ORDERS};

#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn list_orders(&self, page: u32, items_per_page: u32) -> Result<OrderPage>;
}

/// Bounds-checked access to the listing endpoint.
///
/// The upper bound is whatever the last successful response reported. Until
/// one has arrived there is exactly one page, so only page 1 is reachable.
#[derive(Clone)]
pub struct ResultFetcher {
    source: Arc<dyn OrderSource>,
    known_total_pages: u32,
}

impl std::fmt::Debug for ResultFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultFetcher")
            .field("source", &"<order source>")
            .field("known_total_pages", &self.known_total_pages)
            .finish()
    }
}

impl ResultFetcher {
    pub fn new(source: Arc<dyn OrderSource>) -> Self {
        Self {
            source,
            known_total_pages: 1,
        }
    }

    pub fn known_total_pages(&self) -> u32 {
        self.known_total_pages
    }

    /// Back to a single known page, e.g. when a new upload changes the dataset
    pub fn reset(&mut self) {
        self.known_total_pages = 1;
    }

    pub fn check_page(&self, page: u32) -> Result<()> {
        if page < 1 || page > self.known_total_pages {
            return Err(UploaderError::InvalidPage {
                page,
                total_pages: self.known_total_pages,
            });
        }
        Ok(())
    }

    pub async fn fetch_page(&mut self, page: u32, page_size: u32) -> Result<OrderPage> {
        self.check_page(page)?;

        let result = self.source.list_orders(page, page_size).await?;
        self.known_total_pages = result.total_pages.max(1);

        log_debug(
            COMPONENT_ORDERS,
            &format!(
                "Fetched page {}/{} ({} orders)",
                result.page,
                result.total_pages,
                result.orders.len()
            ),
        )
        .unwrap_or_default();

        Ok(result)
    }

    /// Jump straight to `page` without a prior listing.
    ///
    /// A page beyond the known bound first refreshes the bound from page 1;
    /// if it is still out of range the request is rejected.
    pub async fn seek_page(&mut self, page: u32, page_size: u32) -> Result<OrderPage> {
        if page > self.known_total_pages {
            let first = self.fetch_page(1, page_size).await?;
            if page == 1 {
                return Ok(first);
            }
        }
        self.fetch_page(page, page_size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves `total` synthetic orders, paged like the real service
    struct InMemoryOrders {
        total: u32,
        calls: AtomicUsize,
    }

    impl InMemoryOrders {
        fn new(total: u32) -> Arc<Self> {
            Arc::new(Self {
                total,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl OrderSource for InMemoryOrders {
        async fn list_orders(&self, page: u32, items_per_page: u32) -> Result<OrderPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let start = (page - 1) * items_per_page;
            let end = (start + items_per_page).min(self.total);
            let orders = (start..end)
                .map(|i| Order {
                    id: i64::from(i) + 1,
                    customer_id: 100,
                    product_id: 200,
                    product_name: format!("Product {}", i + 1),
                    quantity: 1,
                    price: 9.5,
                    order_date: "2024-01-01".to_string(),
                    category: "General".to_string(),
                })
                .collect();
            Ok(OrderPage {
                orders,
                page,
                total_pages: self.total.div_ceil(items_per_page).max(1),
            })
        }
    }

    #[tokio::test]
    async fn test_page_two_of_twenty_five() {
        let source = InMemoryOrders::new(25);
        let mut fetcher = ResultFetcher::new(source.clone());

        fetcher.fetch_page(1, 10).await.unwrap();
        let page = fetcher.fetch_page(2, 10).await.unwrap();
        assert_eq!(page.orders.len(), 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.orders[0].id, 11);
        assert_eq!(fetcher.known_total_pages(), 3);
    }

    #[tokio::test]
    async fn test_out_of_range_never_hits_network() {
        let source = InMemoryOrders::new(25);
        let mut fetcher = ResultFetcher::new(source.clone());

        assert!(matches!(
            fetcher.fetch_page(0, 10).await,
            Err(UploaderError::InvalidPage { page: 0, .. })
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        fetcher.fetch_page(1, 10).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        assert!(matches!(
            fetcher.fetch_page(4, 10).await,
            Err(UploaderError::InvalidPage {
                page: 4,
                total_pages: 3
            })
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let last = fetcher.fetch_page(3, 10).await.unwrap();
        assert_eq!(last.orders.len(), 5);
    }

    #[tokio::test]
    async fn test_reset_forgets_bound() {
        let source = InMemoryOrders::new(5);
        let mut fetcher = ResultFetcher::new(source);

        fetcher.fetch_page(1, 10).await.unwrap();
        assert!(fetcher.check_page(2).is_err());

        fetcher.reset();
        assert_eq!(fetcher.known_total_pages(), 1);
        assert!(fetcher.check_page(1).is_ok());
        assert!(fetcher.check_page(2).is_err());
        assert!(fetcher.check_page(0).is_err());
    }

    #[tokio::test]
    async fn test_fresh_fetcher_only_allows_first_page() {
        let source = InMemoryOrders::new(25);
        let mut fetcher = ResultFetcher::new(source.clone());

        assert!(matches!(
            fetcher.fetch_page(2, 10).await,
            Err(UploaderError::InvalidPage {
                page: 2,
                total_pages: 1
            })
        ));
        assert!(fetcher.fetch_page(7, 10).await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_seek_page_learns_bound_first() {
        let source = InMemoryOrders::new(25);
        let mut fetcher = ResultFetcher::new(source.clone());

        let last = fetcher.seek_page(3, 10).await.unwrap();
        assert_eq!(last.page, 3);
        assert_eq!(last.orders.len(), 5);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        // Bound already known: no extra round trip
        fetcher.seek_page(2, 10).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);

        assert!(matches!(
            fetcher.seek_page(4, 10).await,
            Err(UploaderError::InvalidPage {
                page: 4,
                total_pages: 3
            })
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);

        let mut fresh = ResultFetcher::new(source.clone());
        assert_eq!(fresh.seek_page(1, 10).await.unwrap().page, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 5);
        assert!(fresh.seek_page(0, 10).await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 5);
    }
}
