//! Page window over long directory listings

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_LINK_SPAN: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Previous { enabled: bool },
    Page { number: u32, active: bool },
    Next { enabled: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: u32,
    page_size: u32,
    link_span: u32,
    total: u64,
}

impl Pagination {
    pub fn new(page_size: u32, link_span: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            link_span,
            total: 0,
        }
    }

    /// Rebuild from a listing event: requested page plus server total.
    pub fn rebuilt(&self, current_page: u32, total: u64) -> Self {
        Self {
            current_page: current_page.max(1),
            total,
            ..*self
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Pages needed for `total` items; the server may still answer beyond it.
    pub fn page_count(&self) -> u32 {
        let size = u64::from(self.page_size);
        self.total.div_ceil(size).max(1).min(u64::from(u32::MAX)) as u32
    }

    /// `(offset, limit)` for requesting `page`.
    pub fn window(&self, page: u32) -> (u64, u32) {
        let page = u64::from(page.max(1));
        ((page - 1) * u64::from(self.page_size), self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        let size = u64::from(self.page_size);
        !(self.total <= size || u64::from(self.current_page) * size >= self.total)
    }

    pub fn links(&self) -> Vec<PageLink> {
        let cur = u64::from(self.current_page);
        let size = u64::from(self.page_size);
        let span = u64::from(self.link_span);
        let mut links = Vec::with_capacity(2 * self.link_span as usize + 3);
        links.push(PageLink::Previous {
            enabled: self.has_previous(),
        });
        for d in (1..=span).rev() {
            if cur > d {
                links.push(PageLink::Page {
                    number: (cur - d) as u32,
                    active: false,
                });
            }
        }
        links.push(PageLink::Page {
            number: self.current_page,
            active: true,
        });
        for d in 1..=span {
            // page cur+d starts at item (cur+d-1)*size; the last partial page is still offered
            let start = (cur + d - 1).saturating_mul(size);
            if cur + d <= u64::from(u32::MAX) && start < self.total {
                links.push(PageLink::Page {
                    number: (cur + d) as u32,
                    active: false,
                });
            }
        }
        links.push(PageLink::Next {
            enabled: self.has_next(),
        });
        links
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_LINK_SPAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_numbers(links: &[PageLink]) -> Vec<u32> {
        links
            .iter()
            .filter_map(|l| match l {
                PageLink::Page { number, .. } => Some(*number),
                _ => None,
            })
            .collect()
    }

    fn edges(links: &[PageLink]) -> (bool, bool) {
        let prev = matches!(links.first(), Some(PageLink::Previous { enabled: true }));
        let next = matches!(links.last(), Some(PageLink::Next { enabled: true }));
        (prev, next)
    }

    #[test]
    fn middle_page_of_partial_last_page() {
        let p = Pagination::new(100, 5).rebuilt(2, 250);
        let links = p.links();
        assert_eq!(page_numbers(&links), vec![1, 2, 3]);
        assert_eq!(edges(&links), (true, true));
        assert!(links.contains(&PageLink::Page { number: 2, active: true }));
    }

    #[test]
    fn first_page_disables_previous() {
        for total in [0, 10, 100, 1000] {
            let links = Pagination::new(100, 5).rebuilt(1, total).links();
            assert!(!edges(&links).0, "total={total}");
        }
    }

    #[test]
    fn last_page_disables_next() {
        let p = Pagination::new(100, 5).rebuilt(3, 250);
        assert_eq!(p.page_count(), 3);
        assert_eq!(edges(&p.links()), (true, false));
        let exact = Pagination::new(100, 5).rebuilt(2, 200);
        assert!(!exact.has_next());
    }

    #[test]
    fn empty_directory_disables_next_on_any_page() {
        for page in 1..5 {
            let p = Pagination::new(100, 5).rebuilt(page, 0);
            assert!(!p.has_next(), "page={page}");
        }
    }

    #[test]
    fn window_is_clipped_by_span() {
        let p = Pagination::new(10, 2).rebuilt(10, 1000);
        assert_eq!(page_numbers(&p.links()), vec![8, 9, 10, 11, 12]);
    }

    #[test]
    fn links_are_idempotent() {
        let p = Pagination::new(50, 5).rebuilt(7, 1234);
        assert_eq!(p.links(), p.links());
    }

    #[test]
    fn page_zero_is_floored() {
        let p = Pagination::default().rebuilt(0, 10);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.window(0), (0, 100));
        assert_eq!(p.window(3), (200, 100));
    }

    #[test]
    fn huge_total_does_not_overflow() {
        let p = Pagination::default().rebuilt(1, u64::MAX);
        let links = p.links();
        assert_eq!(page_numbers(&links), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(edges(&links), (false, true));

        let top = Pagination::new(u32::MAX, 5).rebuilt(u32::MAX, u64::MAX);
        let expected: Vec<u32> = (u32::MAX - 5..=u32::MAX).collect();
        assert_eq!(page_numbers(&top.links()), expected);
    }
}
