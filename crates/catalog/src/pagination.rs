//! Pagination arithmetic with corrective redirects.
//!
//! Out-of-range page requests are not errors: a page below 1 redirects to
//! page 1, and a page beyond the data redirects to the last page. Both are
//! carried as [`PagePlan`] variants for the caller to act on.

/// Stores shown per page.
pub const PAGE_SIZE: i64 = 4;

/// Outcome of planning a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagePlan {
    /// The requested page was below 1; re-issue the request at page 1.
    RedirectToFirst,
    /// The requested page starts beyond the available records; re-issue
    /// the request at `total_pages`.
    RedirectToLast { total_pages: i64 },
    /// A fetchable page.
    Page {
        /// The effective page number (>= 1).
        page: i64,
        /// Records to skip before this page starts.
        skip: i64,
        /// Maximum records on this page.
        limit: i64,
        /// Total number of pages; 0 when there are no records, which is
        /// served as a single empty page.
        total_pages: i64,
    },
}

/// Plan a page request against a record count.
///
/// `total_count` may drift between the count query and the fetch, so the
/// caller must re-evaluate the out-of-range case after fetching (see
/// [`crate::services::CatalogService::list_stores`]).
#[must_use]
pub fn plan(requested_page: i64, page_size: i64, total_count: i64) -> PagePlan {
    if requested_page < 1 {
        return PagePlan::RedirectToFirst;
    }

    let total_pages = total_pages(total_count, page_size);
    let skip = (requested_page - 1) * page_size;

    if skip > 0 && skip >= total_count {
        return PagePlan::RedirectToLast { total_pages };
    }

    PagePlan::Page {
        page: requested_page,
        skip,
        limit: page_size,
        total_pages,
    }
}

/// `ceil(total_count / page_size)`.
#[must_use]
pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if total_count <= 0 {
        return 0;
    }
    (total_count + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_empty_data_is_a_single_empty_page() {
        assert_eq!(
            plan(1, 4, 0),
            PagePlan::Page {
                page: 1,
                skip: 0,
                limit: 4,
                total_pages: 0
            }
        );
    }

    #[test]
    fn interior_page_computes_skip_and_totals() {
        assert_eq!(
            plan(3, 4, 10),
            PagePlan::Page {
                page: 3,
                skip: 8,
                limit: 4,
                total_pages: 3
            }
        );
    }

    #[test]
    fn page_below_one_redirects_to_first() {
        assert_eq!(plan(0, 4, 10), PagePlan::RedirectToFirst);
        assert_eq!(plan(-3, 4, 10), PagePlan::RedirectToFirst);
    }

    #[test]
    fn page_beyond_data_redirects_to_last() {
        // skip = 16, beyond 10 records
        assert_eq!(plan(5, 4, 10), PagePlan::RedirectToLast { total_pages: 3 });
    }

    #[test]
    fn last_partial_page_is_still_fetchable() {
        assert_eq!(
            plan(3, 4, 9),
            PagePlan::Page {
                page: 3,
                skip: 8,
                limit: 4,
                total_pages: 3
            }
        );
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 4), 0);
        assert_eq!(total_pages(1, 4), 1);
        assert_eq!(total_pages(4, 4), 1);
        assert_eq!(total_pages(5, 4), 2);
    }
}
