use crate::types::Page;

/// Zero-based offset of a 1-based page. Page 0 is treated as page 1.
pub fn page_offset(page: usize, page_size: usize) -> usize {
    page.max(1).saturating_sub(1).saturating_mul(page_size)
}

/// Slice one page out of the full filtered list.
///
/// `has_more` is true iff matching items remain past this page.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let total_results = items.len();
    let offset = page_offset(page, page_size);
    let results: Vec<T> = items.into_iter().skip(offset).take(page_size).collect();
    Page {
        results,
        total_results,
        has_more: offset.saturating_add(page_size) < total_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_page_of_twenty() {
        let page = paginate((0..20).collect(), 2, 12);
        assert_eq!(page.results.len(), 8);
        assert_eq!(page.results[0], 12);
        assert_eq!(page.total_results, 20);
        assert!(!page.has_more);
    }

    #[test]
    fn test_first_page_has_more() {
        let page = paginate((0..20).collect(), 1, 12);
        assert_eq!(page.results.len(), 12);
        assert!(page.has_more);
    }

    #[test]
    fn test_exact_fit_has_no_more() {
        let page = paginate((0..12).collect(), 1, 12);
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = paginate((0..5).collect::<Vec<u32>>(), 3, 12);
        assert!(page.is_empty());
        assert_eq!(page.total_results, 5);
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_zero_is_first_page() {
        assert_eq!(page_offset(0, 12), 0);
        assert_eq!(page_offset(1, 12), 0);
        assert_eq!(page_offset(3, 10), 20);
    }
}
