use serde::{Deserialize, Serialize};

/// Client-side page over an already loaded result set.
///
/// Paging never refetches; it only re-slices. `current_page` is 1-based and
/// is kept within `1..=total_pages(len)` by `go_to` and `clamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    current_page: usize,
    items_per_page: usize,
}

impl PageWindow {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            items_per_page: items_per_page.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.items_per_page)
    }

    pub fn slice<'a, T>(&self, records: &'a [T]) -> &'a [T] {
        let start = (self.current_page - 1)
            .saturating_mul(self.items_per_page)
            .min(records.len());
        let end = start.saturating_add(self.items_per_page).min(records.len());
        &records[start..end]
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.current_page < self.total_pages(len)
    }

    pub fn next(&mut self, len: usize) {
        if self.has_next(len) {
            self.current_page += 1;
        }
    }

    pub fn previous(&mut self) {
        if self.has_previous() {
            self.current_page -= 1;
        }
    }

    pub fn go_to(&mut self, page: usize, len: usize) {
        self.current_page = page;
        self.clamp(len);
    }

    /// Pull the page back into range, e.g. after rows were removed
    pub fn clamp(&mut self, len: usize) {
        let last = self.total_pages(len).max(1);
        self.current_page = self.current_page.clamp(1, last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_three_rows_make_three_pages() {
        let rows: Vec<u32> = (0..23).collect();
        let mut window = PageWindow::new(10);
        assert_eq!(window.total_pages(rows.len()), 3);

        let mut lengths = Vec::new();
        for page in 1..=3 {
            window.go_to(page, rows.len());
            lengths.push(window.slice(&rows).len());
        }
        assert_eq!(lengths, vec![10, 10, 3]);
    }

    #[test]
    fn slices_cover_every_row_once() {
        for len in [0usize, 1, 9, 10, 11, 20, 57] {
            let rows: Vec<usize> = (0..len).collect();
            let mut window = PageWindow::new(10);
            let mut seen = Vec::new();
            for page in 1..=window.total_pages(len) {
                window.go_to(page, len);
                seen.extend_from_slice(window.slice(&rows));
            }
            assert_eq!(seen, rows, "len {}", len);
        }
    }

    #[test]
    fn reslicing_is_idempotent() {
        let rows: Vec<u32> = (0..15).collect();
        let mut window = PageWindow::new(4);
        window.go_to(2, rows.len());
        assert_eq!(window.slice(&rows), window.slice(&rows));
        assert_eq!(window.slice(&rows), &[4, 5, 6, 7]);
    }

    #[test]
    fn last_page_length() {
        let rows = [0u8; 20];
        let mut window = PageWindow::new(10);
        window.go_to(2, rows.len());
        assert_eq!(window.slice(&rows).len(), 10);
    }

    #[test]
    fn navigation_stops_at_edges() {
        let len = 25;
        let mut window = PageWindow::new(10);
        assert!(!window.has_previous());
        window.previous();
        assert_eq!(window.current_page(), 1);

        window.go_to(3, len);
        assert!(!window.has_next(len));
        window.next(len);
        assert_eq!(window.current_page(), 3);
    }

    #[test]
    fn clamp_after_deletion() {
        let mut window = PageWindow::new(5);
        window.go_to(3, 15);
        window.clamp(9);
        assert_eq!(window.current_page(), 2);

        window.clamp(0);
        assert_eq!(window.current_page(), 1);
    }

    #[test]
    fn go_to_out_of_range_is_corrected() {
        let mut window = PageWindow::new(10);
        window.go_to(0, 30);
        assert_eq!(window.current_page(), 1);
        window.go_to(99, 30);
        assert_eq!(window.current_page(), 3);
    }
}
