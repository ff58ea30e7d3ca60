//! Dashboard query layer.
//!
//! Takes the full ticket view list plus filter/sort parameters and
//! produces the derived, paginated page: conjunctive filters, descending
//! sort by the chosen key, fixed-size slicing. Pure over its inputs so
//! both the REST handler and the seed script evaluate it the same way.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{SortBy, TicketStatus, TicketView};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Dashboard parameters. Absent filters are the identity ("All"); absent
/// sort is recently-modified; absent paging is page 1 of
/// [`DEFAULT_PAGE_SIZE`]. Doubles as the axum `Query` extractor target.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub search: Option<String>,
    pub status: Option<TicketStatus>,
    pub category: Option<Uuid>,
    pub mine: Option<bool>,
    pub sort_by: Option<SortBy>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// One page of the filtered, sorted ticket list.
#[derive(Serialize, Debug, Clone)]
pub struct DashboardPage {
    pub tickets: Vec<TicketView>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Evaluate the dashboard query over the full ticket list.
///
/// Filters compose conjunctively. Free-text search is a case-insensitive
/// substring match over subject OR description. The "mine" filter applies
/// only when a current user is known. Sort is descending by the chosen
/// key; ties order by `updated_at` descending, then id ascending, so the
/// result is a total order and pages are stable across calls.
pub fn evaluate(
    tickets: Vec<TicketView>,
    params: &DashboardQuery,
    current_user: Option<Uuid>,
) -> DashboardPage {
    let needle = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut filtered: Vec<TicketView> = tickets
        .into_iter()
        .filter(|t| match &needle {
            Some(q) => {
                t.subject.to_lowercase().contains(q) || t.description.to_lowercase().contains(q)
            }
            None => true,
        })
        .filter(|t| params.status.map_or(true, |s| t.status == s))
        .filter(|t| params.category.map_or(true, |c| t.category_id == c))
        .filter(|t| match (params.mine.unwrap_or(false), current_user) {
            (true, Some(user_id)) => t.created_by == user_id,
            _ => true,
        })
        .collect();

    let sort_by = params.sort_by.unwrap_or(SortBy::RecentlyModified);
    filtered.sort_by(|a, b| match sort_by {
        SortBy::MostReplied => b
            .replies
            .cmp(&a.replies)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
            .then_with(|| a.id.cmp(&b.id)),
        SortBy::RecentlyModified => b
            .updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id)),
    });

    let total = filtered.len();
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let total_pages = total.div_ceil(page_size);
    let page = params.page.unwrap_or(1).max(1);

    let start = (page - 1).saturating_mul(page_size);
    let tickets = if start >= total {
        Vec::new()
    } else {
        filtered[start..(start + page_size).min(total)].to_vec()
    };

    DashboardPage {
        tickets,
        total,
        page,
        page_size,
        total_pages,
    }
}
