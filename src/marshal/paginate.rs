//! Splitting an export across sheets of bounded size.

use std::ops::Range;

/// Largest number of data rows one exported sheet holds (header excluded).
pub const MAX_PAGE_ROWS: usize = 65_535;

/// Clamp a requested page capacity to `1..=MAX_PAGE_ROWS`; `0` means "use the maximum".
pub fn clamp_capacity(requested: usize) -> usize {
    if requested == 0 || requested > MAX_PAGE_ROWS {
        MAX_PAGE_ROWS
    } else {
        requested
    }
}

/// A contiguous slice of the exported records written to one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// One-based page number.
    pub number: usize,
    /// Index of the first record on this page.
    pub first: usize,
    /// Index one past the last record on this page.
    pub end: usize,
}

impl Page {
    pub fn len(&self) -> usize {
        self.end - self.first
    }

    pub fn is_empty(&self) -> bool {
        self.first == self.end
    }

    /// Record indices on this page.
    pub fn range(&self) -> Range<usize> {
        self.first..self.end
    }

    /// Sheet name for this page: `base` alone when the export fits one page, otherwise `base`
    /// followed by the page number.
    pub fn sheet_name(&self, base: &str, page_count: usize) -> String {
        if page_count <= 1 {
            base.to_string()
        } else {
            format!("{base}{}", self.number)
        }
    }
}

/// Split `record_count` records into consecutive pages of at most `capacity` (clamped) records.
pub fn paginate(record_count: usize, capacity: usize) -> Vec<Page> {
    let capacity = clamp_capacity(capacity);
    (0..record_count)
        .step_by(capacity)
        .enumerate()
        .map(|(i, first)| Page {
            number: i + 1,
            first,
            end: (first + capacity).min(record_count),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_cover_every_record_once() {
        let pages = paginate(10, 4);
        let spans: Vec<_> = pages.iter().map(Page::range).collect();
        assert_eq!(spans, vec![0..4, 4..8, 8..10]);
        assert_eq!(pages.iter().map(Page::len).sum::<usize>(), 10);
    }

    #[test]
    fn small_counts_and_capacities_tile_without_gaps() {
        for count in 1..=50 {
            for capacity in 1..=12 {
                let pages = paginate(count, capacity);
                assert_eq!(pages.len(), count.div_ceil(capacity), "count={count} cap={capacity}");

                let mut next = 0;
                for (i, page) in pages.iter().enumerate() {
                    assert_eq!(page.number, i + 1);
                    assert_eq!(page.first, next, "gap before page {} (count={count} cap={capacity})", page.number);
                    assert!((1..=capacity).contains(&page.len()), "count={count} cap={capacity}");
                    next = page.end;
                }
                assert_eq!(next, count, "count={count} cap={capacity}");
            }
        }
    }

    #[test]
    fn capacity_is_clamped() {
        assert_eq!(clamp_capacity(0), MAX_PAGE_ROWS);
        assert_eq!(clamp_capacity(1_000_000), MAX_PAGE_ROWS);
        assert_eq!(clamp_capacity(3), 3);
    }

    #[test]
    fn seventy_thousand_rows_split_in_two() {
        let pages = paginate(70_000, 0);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 65_535);
        assert_eq!(pages[1].len(), 4_465);
        assert_eq!(pages[0].sheet_name("Students", pages.len()), "Students1");
        assert_eq!(pages[1].sheet_name("Students", pages.len()), "Students2");
    }

    #[test]
    fn single_page_keeps_bare_name() {
        let pages = paginate(3, 0);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].sheet_name("Students", 1), "Students");
    }

    #[test]
    fn no_records_no_pages() {
        assert!(paginate(0, 10).is_empty());
    }
}
