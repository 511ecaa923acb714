use crate::models::PageInfo;

/// One page of a result list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

/// Slice `items` into a 1-based page
///
/// `page` is raised to 1 and `per_page` clamped to `[1, max_per_page]`.
/// Pages past the end are empty but still report the totals.
pub fn paginate<T>(items: Vec<T>, page: u32, per_page: u32, max_per_page: u32) -> Page<T> {
    let per_page = per_page.clamp(1, max_per_page.max(1));
    let page = page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page as usize) as u32;

    let start = (page as usize - 1).saturating_mul(per_page as usize);
    let items = items
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    Page {
        items,
        info: PageInfo {
            page,
            per_page,
            total,
            total_pages,
        },
    }
}
