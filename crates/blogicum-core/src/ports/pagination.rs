use serde::{Deserialize, Serialize};

/// A request for one page of a listing. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(number: u64, size: u64) -> Self {
        Self { number, size }
    }

    /// Number of items preceding this page.
    pub fn offset(&self) -> u64 {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }

    /// The offset, or `None` when it cannot be addressed by a query
    /// (beyond `i64::MAX`, the largest SQL `OFFSET`).
    pub fn checked_offset(&self) -> Option<u64> {
        self.number
            .saturating_sub(1)
            .checked_mul(self.size)
            .filter(|offset| *offset <= i64::MAX as u64)
    }
}

/// One page of results plus the totals needed to render a paginator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            total_items.div_ceil(request.size)
        };

        Self {
            items,
            number: request.number,
            size: request.size,
            total_items,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_totals() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(2, 10), 23);

        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(page.has_previous());
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::new(3, 10).checked_offset(), Some(20));
    }

    #[test]
    fn test_empty_page() {
        let page: Page<u8> = Page::new(vec![], PageRequest::new(1, 10), 0);

        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let request = PageRequest::new(u64::MAX, 10);

        assert_eq!(request.offset(), u64::MAX);
        assert_eq!(request.checked_offset(), None);
        assert_eq!(PageRequest::new(u64::MAX / 10, 1).checked_offset(), None);
    }
}
