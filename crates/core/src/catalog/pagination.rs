//! In-memory pagination of fully fetched result sets.
//!
//! Pages are 1-based. Requests before page 1 or past the last page are
//! rejected with [`PageError::OutOfRange`], never clamped. An empty result
//! set still has a (blank) page 1 so a listing with no matches renders.

use serde::Serialize;

/// Page sizes used by each listing surface.
pub mod sizes {
    /// `/products`.
    pub const PRODUCT_LISTING: usize = 70;
    /// `/brands/{slug}`.
    pub const BRAND_PAGE: usize = 100;
    /// Admin product list.
    pub const ADMIN_LIST: usize = 50;
    /// Home-page product carousels.
    pub const CAROUSEL: usize = 8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page {requested} is out of range (1..={page_count})")]
    OutOfRange { requested: usize, page_count: usize },
}

/// Slices result sets into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    /// A paginator with the given page size. Zero is treated as one.
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self {
            page_size: if page_size == 0 { 1 } else { page_size },
        }
    }

    #[must_use]
    pub const fn page_size(self) -> usize {
        self.page_size
    }

    /// `ceil(total / page_size)`.
    #[must_use]
    pub const fn page_count(self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Index range `[(page-1)*size, page*size)` clipped to `total`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::OutOfRange`] for page 0 or a page past the last.
    pub fn bounds(self, total: usize, page: usize) -> Result<std::ops::Range<usize>, PageError> {
        let page_count = self.page_count(total);
        if page == 0 || page > page_count.max(1) {
            return Err(PageError::OutOfRange {
                requested: page,
                page_count,
            });
        }
        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(total);
        Ok(start..end)
    }

    /// Borrow page `page` of `items`.
    ///
    /// # Errors
    ///
    /// See [`Paginator::bounds`].
    pub fn slice<T>(self, items: &[T], page: usize) -> Result<&[T], PageError> {
        let range = self.bounds(items.len(), page)?;
        Ok(&items[range])
    }

    /// Take page `page` of `items` with its envelope.
    ///
    /// # Errors
    ///
    /// See [`Paginator::bounds`].
    pub fn page<T>(self, items: Vec<T>, page: usize) -> Result<Page<T>, PageError> {
        let total = items.len();
        let range = self.bounds(total, page)?;
        let items = items
            .into_iter()
            .skip(range.start)
            .take(range.len())
            .collect();
        Ok(Page {
            items,
            page,
            page_size: self.page_size,
            total,
            page_count: self.page_count(total),
        })
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub page_count: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    /// Transform the items, keeping the envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            page_count: self.page_count,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_237_items_in_pages_of_100() {
        let items: Vec<usize> = (1..=237).collect();
        let pager = Paginator::new(sizes::BRAND_PAGE);
        assert_eq!(pager.page_count(items.len()), 3);

        let first = pager.slice(&items, 1).unwrap();
        assert_eq!((first[0], first[first.len() - 1], first.len()), (1, 100, 100));
        let second = pager.slice(&items, 2).unwrap();
        assert_eq!((second[0], second[second.len() - 1]), (101, 200));
        let third = pager.slice(&items, 3).unwrap();
        assert_eq!((third[0], third[third.len() - 1], third.len()), (201, 237, 37));

        assert_eq!(
            pager.slice(&items, 4),
            Err(PageError::OutOfRange {
                requested: 4,
                page_count: 3
            })
        );
        assert!(pager.slice(&items, 0).is_err());
    }

    #[test]
    fn test_page_count_is_ceiling() {
        for size in [1, 7, 8, 50, 70, 100] {
            let pager = Paginator::new(size);
            for total in 0..=250 {
                let count = pager.page_count(total);
                assert_eq!(count, total.div_ceil(size));
                for page in 1..=count {
                    let range = pager.bounds(total, page).unwrap();
                    assert_eq!(range.start, (page - 1) * size);
                    assert_eq!(range.end, (page * size).min(total));
                    assert!(!range.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_empty_result_has_blank_first_page() {
        let pager = Paginator::new(sizes::PRODUCT_LISTING);
        let page = pager.page(Vec::<u8>::new(), 1).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.page_count, 0);
        assert!(!page.has_next());
        assert!(pager.page(Vec::<u8>::new(), 2).is_err());
    }

    #[test]
    fn test_page_envelope() {
        let pager = Paginator::new(sizes::CAROUSEL);
        let page = pager.page((0..20).collect::<Vec<_>>(), 2).unwrap();
        assert_eq!(page.items, (8..16).collect::<Vec<_>>());
        assert!(page.has_previous());
        assert!(page.has_next());
        let doubled = page.map(|n| n * 2);
        assert_eq!(doubled.items[0], 16);
        assert_eq!(doubled.total, 20);
    }
}
