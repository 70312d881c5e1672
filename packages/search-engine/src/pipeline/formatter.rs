//! Page slicing and pagination metadata.

use crate::types::response::PaginationMeta;
use crate::types::result::CanonicalResult;

/// Pagination block for a list of `total` results.
///
/// `total_pages` is never below 1 so an empty result still has a page to show.
pub fn paginate(total: u64, page: u32, per_page: u32, is_estimate: bool) -> PaginationMeta {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let per = u64::from(per_page);
    let current = u64::from(page);

    let total_pages = total.div_ceil(per).max(1);
    let start_index = (current - 1) * per + 1;
    let end_index = (current * per).min(total).max(start_index - 1);

    PaginationMeta {
        current_page: page,
        per_page,
        total_results: total,
        total_pages,
        has_next_page: current < total_pages,
        has_prev_page: page > 1,
        start_index,
        end_index,
        total_is_estimate: is_estimate,
    }
}

/// One page of a fully ranked list.
pub fn format_page(ranked: &[CanonicalResult], page: u32, per_page: u32) -> (Vec<CanonicalResult>, PaginationMeta) {
    let meta = paginate(ranked.len() as u64, page, per_page, false);
    let start = (meta.start_index - 1) as usize;
    let end = meta.end_index as usize;
    let slice = ranked.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
    (slice, meta)
}

/// Metadata for a window that was fetched already sliced.
///
/// Totals come from the upstream estimate. The end index follows what was
/// actually returned, and the total is raised if the estimate undercounts.
/// An empty window never raises the total.
pub fn window_meta(estimate: u64, page: u32, per_page: u32, returned: usize) -> PaginationMeta {
    let start = (u64::from(page.max(1)) - 1) * u64::from(per_page.max(1));
    let seen = start + returned as u64;
    let total = if returned > 0 { estimate.max(seen) } else { estimate };
    let mut meta = paginate(total, page, per_page, true);
    meta.end_index = meta.end_index.min(seen).max(meta.start_index - 1);
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::canonical;
    use proptest::prelude::*;

    fn ranked(n: usize) -> Vec<CanonicalResult> {
        (0..n).map(|i| canonical(&format!("Job {}", i), "Acme")).collect()
    }

    #[test]
    fn test_estimate_scenario() {
        let meta = paginate(237, 1, 10, true);
        assert_eq!(meta.total_pages, 24);
        assert!(meta.has_next_page);
        assert!(!meta.has_prev_page);
        assert_eq!(meta.start_index, 1);
        assert_eq!(meta.end_index, 10);
        assert!(meta.total_is_estimate);
    }

    #[test]
    fn test_empty_list() {
        let meta = paginate(0, 1, 10, false);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next_page);
        assert_eq!(meta.start_index, 1);
        assert_eq!(meta.end_index, 0);
    }

    #[test]
    fn test_last_partial_page() {
        let (slice, meta) = format_page(&ranked(23), 3, 10);
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].title, "Job 20");
        assert_eq!(meta.start_index, 21);
        assert_eq!(meta.end_index, 23);
        assert!(!meta.has_next_page);
        assert!(meta.has_prev_page);
    }

    #[test]
    fn test_page_past_the_end() {
        let (slice, meta) = format_page(&ranked(5), 4, 10);
        assert!(slice.is_empty());
        assert_eq!(meta.start_index, 31);
        assert_eq!(meta.end_index, 30);
        assert_eq!(meta.total_pages, 1);
    }

    #[test]
    fn test_window_meta_short_window() {
        // Page 11 of 10 sits past the upstream offset cap: nothing returned
        let meta = window_meta(237, 11, 10, 0);
        assert_eq!(meta.start_index, 101);
        assert_eq!(meta.end_index, 100);
        assert_eq!(meta.total_results, 237);

        // Estimate missing but items came back
        let meta = window_meta(0, 1, 10, 7);
        assert_eq!(meta.total_results, 7);
        assert_eq!(meta.end_index, 7);
    }

    #[test]
    fn test_empty_window_keeps_estimate() {
        // Nothing fetched for a page past the upstream range
        let meta = window_meta(0, 12, 10, 0);
        assert_eq!(meta.total_results, 0);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next_page);
        assert_eq!(meta.start_index, 111);
        assert_eq!(meta.end_index, 110);

        let meta = window_meta(40, 12, 10, 0);
        assert_eq!(meta.total_results, 40);
        assert_eq!(meta.total_pages, 4);
    }

    proptest! {
        #[test]
        fn prop_pagination_is_consistent(total in 0usize..200, page in 1u32..30, per_page in 1u32..=40) {
            let list = ranked(total);
            let (slice, meta) = format_page(&list, page, per_page);

            let expected_pages = std::cmp::max(1, (total as u64).div_ceil(u64::from(per_page)));
            prop_assert_eq!(meta.total_pages, expected_pages);
            prop_assert_eq!(meta.has_next_page, u64::from(page) < expected_pages);
            prop_assert_eq!(meta.has_prev_page, page > 1);
            prop_assert_eq!(meta.start_index, u64::from(page - 1) * u64::from(per_page) + 1);
            prop_assert_eq!(
                meta.end_index,
                std::cmp::max(
                    std::cmp::min(u64::from(page) * u64::from(per_page), total as u64),
                    meta.start_index - 1
                )
            );
            prop_assert_eq!(slice.len() as u64, meta.end_index + 1 - meta.start_index);
            if let Some(first) = slice.first() {
                prop_assert_eq!(first, &list[(meta.start_index - 1) as usize]);
            }
        }
    }
}
