//! Client-side view over a fetched table: search, sort and paging

pub mod pagination;
pub mod pipeline;

pub use pagination::{page_count, slice, PageSlice};
pub use pipeline::{compute, display_value, NullOrdering, SortDirection, SortState};
