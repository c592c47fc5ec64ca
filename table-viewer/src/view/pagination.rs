//! Page windows over an ordered row sequence

/// One page of rows plus the total page count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice<'a, T> {
    pub visible: &'a [T],
    pub page_count: usize,
}

/// Number of pages needed for `len` rows; zero rows means zero pages
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Window of rows for a 1-based `page`
///
/// Pages past the end, page 0 and a zero page size yield an empty window;
/// clamping the page control is the caller's job.
pub fn slice<T>(rows: &[T], page_size: usize, page: usize) -> PageSlice<'_, T> {
    let page_count = page_count(rows.len(), page_size);
    if page == 0 || page > page_count {
        return PageSlice {
            visible: &[],
            page_count,
        };
    }

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(rows.len());
    PageSlice {
        visible: &rows[start..end],
        page_count,
    }
}
