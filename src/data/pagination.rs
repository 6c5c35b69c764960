use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page cursor over a sequence owned by the caller.
///
/// The cursor remembers the item count it last saw; when the count changes
/// (source replaced or filtered) it jumps back to page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    current_page: usize,
    item_count: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// Create a cursor on page 1. A page size of 0 is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            item_count: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Record the source length, resetting to page 1 if it changed
    pub fn sync(&mut self, item_count: usize) {
        if item_count != self.item_count {
            tracing::trace!(
                target: "pagination",
                "Item count changed {} -> {}, back to page 1",
                self.item_count,
                item_count
            );
            self.item_count = item_count;
            self.current_page = 1;
        }
    }

    /// Number of pages, never less than 1
    pub fn total_pages(&self) -> usize {
        self.item_count.div_ceil(self.page_size).max(1)
    }

    /// Jump to `page`, clamped into `[1, total_pages]`
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.current_page.saturating_sub(1));
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Index range of the current page within the source
    pub fn page_range(&self) -> Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(self.item_count);
        let end = (start + self.page_size).min(self.item_count);
        start..end
    }

    /// Items on the current page. The slice must be the one last synced.
    pub fn current_items<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.page_range();
        let end = range.end.min(items.len());
        &items[range.start.min(end)..end]
    }

    /// Sync against `items` and return the current page in one step
    pub fn paginate<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        self.sync(items.len());
        self.current_items(items)
    }
}
