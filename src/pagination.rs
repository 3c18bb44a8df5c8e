use serde::Serialize;

/// One page of a sorted, filtered sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
    /// Requested index clamped into `0..total_pages`.
    pub page_index: usize,
}

/// There is always at least one page, even for an empty sequence. A page
/// size of 0 is treated as 1.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1)
}

pub fn paginate<T>(items: Vec<T>, page_index: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let page_index = page_index.min(total_pages - 1);

    let start = page_index * page_size;
    let items = items.into_iter().skip(start).take(page_size).collect();

    Page {
        items,
        total_pages,
        page_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_one_page() {
        let page = paginate(Vec::<u32>::new(), 0, 25);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page_index, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_partial_last_page() {
        let items: Vec<u32> = (0..26).collect();
        let first = paginate(items.clone(), 0, 25);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.items.len(), 25);

        let second = paginate(items, 1, 25);
        assert_eq!(second.items, vec![25]);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let items: Vec<u32> = (0..26).collect();
        let page = paginate(items, 5, 25);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.items, vec![25]);
    }

    #[test]
    fn test_zero_page_size() {
        let page = paginate(vec![1, 2, 3], 2, 0);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![3]);
    }
}
