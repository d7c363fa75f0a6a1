//! Page-number pagination primitives shared by listing endpoints.
//!
//! Listing endpoints accept a 1-based page number and a bounded page size,
//! and reply with a [`Page`] envelope carrying the slice plus enough totals
//! for clients to render pagers. Repositories translate a [`PageRequest`]
//! into `LIMIT`/`OFFSET` via [`PageRequest::limit`] and
//! [`PageRequest::offset`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Page size used when a request leaves it unspecified.
pub const DEFAULT_PER_PAGE: u32 = 12;

/// Validation failures for [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Page numbers are 1-based.
    #[error("page number must be at least 1")]
    ZeroPage,
    /// An empty page is never a useful request.
    #[error("page size must be at least 1")]
    ZeroPerPage,
    /// Requested page size exceeds [`MAX_PER_PAGE`].
    #[error("page size must not exceed {MAX_PER_PAGE}")]
    PerPageTooLarge,
}

/// Validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Validate and construct a page request.
    pub fn new(page: u32, per_page: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if per_page == 0 {
            return Err(PageRequestError::ZeroPerPage);
        }
        if per_page > MAX_PER_PAGE {
            return Err(PageRequestError::PerPageTooLarge);
        }
        Ok(Self { page, per_page })
    }

    /// Build a request from optional query parameters, applying defaults.
    pub fn from_query(page: Option<u32>, per_page: Option<u32>) -> Result<Self, PageRequestError> {
        Self::new(page.unwrap_or(1), per_page.unwrap_or(DEFAULT_PER_PAGE))
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Row limit for the underlying query.
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// Row offset for the underlying query.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results plus pager totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Assemble a page envelope from a result slice and the total row count.
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total_items,
            total_pages: total_pages(total_items, request.per_page()),
        }
    }

    /// Map the item type while keeping pager totals intact.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

fn total_pages(total_items: u64, per_page: u32) -> u32 {
    if total_items == 0 {
        return 0;
    }
    let pages = total_items.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 10, PageRequestError::ZeroPage)]
    #[case(1, 0, PageRequestError::ZeroPerPage)]
    #[case(1, MAX_PER_PAGE + 1, PageRequestError::PerPageTooLarge)]
    fn rejects_invalid_requests(
        #[case] page: u32,
        #[case] per_page: u32,
        #[case] expected: PageRequestError,
    ) {
        let err = PageRequest::new(page, per_page).expect_err("invalid request");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case(1, 12, 0)]
    #[case(2, 12, 12)]
    #[case(3, 20, 40)]
    fn computes_offsets(#[case] page: u32, #[case] per_page: u32, #[case] offset: i64) {
        let request = PageRequest::new(page, per_page).expect("valid request");
        assert_eq!(request.offset(), offset);
        assert_eq!(request.limit(), i64::from(per_page));
    }

    #[rstest]
    fn defaults_apply_when_query_is_silent() {
        let request = PageRequest::from_query(None, None).expect("defaults are valid");
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), DEFAULT_PER_PAGE);
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(25, 12, 3)]
    #[case(24, 12, 2)]
    fn envelope_reports_total_pages(
        #[case] total: u64,
        #[case] per_page: u32,
        #[case] pages: u32,
    ) {
        let request = PageRequest::new(1, per_page).expect("valid request");
        let page = Page::new(Vec::<u8>::new(), request, total);
        assert_eq!(page.total_pages, pages);
    }

    #[rstest]
    fn map_preserves_totals() {
        let request = PageRequest::new(2, 2).expect("valid request");
        let page = Page::new(vec![1, 2], request, 5).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 3);
    }
}
