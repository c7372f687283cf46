//! Fixed-size paging over an ordered slice.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PaginatorError {
    #[error("page size must be at least 1, got {0}")]
    InvalidPageSize(usize),
}

/// A read-only view that splits `items` into pages of `per_page`.
///
/// Page numbers are 1-based. Asking for page 0 gives page 1; asking past the
/// last page gives an empty slice.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a, T> {
    items: &'a [T],
    per_page: usize,
}

impl<'a, T> Paginator<'a, T> {
    pub fn new(items: &'a [T], per_page: usize) -> Result<Self, PaginatorError> {
        if per_page < 1 {
            return Err(PaginatorError::InvalidPageSize(per_page));
        }
        Ok(Self { items, per_page })
    }

    /// Number of pages; 0 when there are no items.
    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(self.per_page)
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Items on page `number`.
    pub fn page(&self, number: usize) -> &'a [T] {
        let number = number.max(1);
        let offset = (number - 1).saturating_mul(self.per_page);
        if offset >= self.items.len() {
            return &[];
        }
        let end = offset.saturating_add(self.per_page).min(self.items.len());
        &self.items[offset..end]
    }
}
