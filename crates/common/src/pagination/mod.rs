//! Pagination cursor for the post list

use serde::Serialize;

/// Count of rows currently visible in the post list
///
/// Never decreases and never exceeds the dataset length it was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationCursor {
    visible: usize,
    page_size: usize,
}

/// What the list view should show after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Rows `0..shown` are rendered
    pub shown: usize,
    pub total: usize,
    /// Whether "load more" is offered
    pub has_more: bool,
}

impl PaginationCursor {
    /// Start at one page, clamped to the dataset length
    pub fn new(page_size: usize, total: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            visible: page_size.min(total),
            page_size,
        }
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }

    /// Advance by one page; a no-op once everything is visible
    pub fn load_more(&mut self, total: usize) -> bool {
        if !self.has_more(total) {
            return false;
        }
        self.visible = (self.visible + self.page_size).min(total);
        true
    }

    pub fn window(&self, total: usize) -> PageWindow {
        let shown = self.visible.min(total);
        PageWindow {
            shown,
            total,
            has_more: shown < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_page_walk() {
        let mut cursor = PaginationCursor::new(1000, 2500);
        assert_eq!(cursor.window(2500), PageWindow { shown: 1000, total: 2500, has_more: true });

        assert!(cursor.load_more(2500));
        assert_eq!(cursor.window(2500).shown, 2000);

        assert!(cursor.load_more(2500));
        assert_eq!(cursor.window(2500), PageWindow { shown: 2500, total: 2500, has_more: false });
    }

    #[test]
    fn test_load_more_past_end_is_noop() {
        let mut cursor = PaginationCursor::new(1000, 2500);
        while cursor.load_more(2500) {}
        let before = cursor;
        for _ in 0..5 {
            assert!(!cursor.load_more(2500));
        }
        assert_eq!(cursor, before);
    }

    #[test]
    fn test_small_dataset_is_clamped() {
        let cursor = PaginationCursor::new(1000, 40);
        assert_eq!(cursor.visible(), 40);
        assert!(!cursor.has_more(40));
    }

    #[test]
    fn test_monotone_and_bounded() {
        let total = 7;
        let mut cursor = PaginationCursor::new(3, total);
        let mut last = cursor.visible();
        for _ in 0..10 {
            cursor.load_more(total);
            assert!(cursor.visible() >= last);
            assert!(cursor.visible() <= total);
            last = cursor.visible();
        }
        assert_eq!(last, total);
    }

    #[test]
    fn test_zero_page_size_still_advances() {
        let mut cursor = PaginationCursor::new(0, 3);
        assert_eq!(cursor.visible(), 1);
        assert!(cursor.load_more(3));
        assert_eq!(cursor.visible(), 2);
    }

    #[test]
    fn test_empty_dataset() {
        let mut cursor = PaginationCursor::new(1000, 0);
        assert_eq!(cursor.window(0), PageWindow { shown: 0, total: 0, has_more: false });
        assert!(!cursor.load_more(0));
    }
}
