//! Paginated listing results.

use crate::MetadataRecord;
use serde::{Deserialize, Serialize};

/// One page of metadata records, most recently written first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePage {
    /// Records on this page
    pub images: Vec<MetadataRecord>,
    /// `ceil(total records / per_page)`
    pub total_pages: usize,
}

impl ImagePage {
    /// Compute the total page count for `total_items` at `per_page` per page.
    ///
    /// `per_page` must be non-zero.
    pub fn page_count(total_items: usize, per_page: usize) -> usize {
        total_items.div_ceil(per_page)
    }

    /// Index range of `page` (1-based) within `total_items`, or `None` when the
    /// page lies outside the collection.
    pub fn bounds(page: usize, per_page: usize, total_items: usize) -> Option<std::ops::Range<usize>> {
        let start = page.checked_sub(1)?.checked_mul(per_page)?;
        if start >= total_items {
            return None;
        }
        Some(start..start.saturating_add(per_page).min(total_items))
    }
}
