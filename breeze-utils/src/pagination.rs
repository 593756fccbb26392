/// Number of pages needed to show `total_items` with `per_page` items each.
///
/// Zero items yield zero pages.
pub fn total_pages(total_items: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 0;
    }

    total_items.div_ceil(per_page)
}

/// Row offset of a 1-indexed page.
pub fn page_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

#[cfg(test)]
mod tests {
    use super::{page_offset, total_pages};

    #[test]
    fn counts_pages() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(23, 10), 3);
        assert_eq!(total_pages(23, 0), 0);
    }

    #[test]
    fn offsets_are_one_indexed() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(2, 5), 5);
        assert_eq!(page_offset(0, 5), 0);
    }
}
