use serde::Serialize;

/// Pages are shown in full up to this count; beyond it the window collapses.
const FULL_WINDOW: usize = 7;

/// Entry of the pager: a 0-based page or a gap marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

/// Builds the pager buttons for `current_page` out of `total_pages`.
///
/// Returns nothing when there is at most one page. Otherwise the first and
/// last pages are always present, with a window around the current page and
/// ellipsis markers for the skipped ranges.
pub fn page_window(current_page: usize, total_pages: usize) -> Vec<PageLink> {
    if total_pages <= 1 {
        return vec![];
    }

    if total_pages <= FULL_WINDOW {
        return (0..total_pages).map(PageLink::Page).collect();
    }

    let last_page = total_pages - 1;
    let mut pages = vec![PageLink::Page(0)];

    if current_page > 3 {
        pages.push(PageLink::Ellipsis);
    }

    let mut start = current_page.saturating_sub(1).max(1);
    let mut end = (current_page + 1).min(total_pages - 2);

    if current_page <= 3 {
        start = 1;
        end = 4;
    }
    if current_page + 4 >= total_pages {
        start = total_pages - 5;
        end = total_pages - 2;
    }

    pages.extend((start..=end).map(PageLink::Page));

    if current_page + 4 < total_pages {
        pages.push(PageLink::Ellipsis);
    }

    pages.push(PageLink::Page(last_page));
    pages
}

/// Pager state handed to presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pager {
    pub links: Vec<PageLink>,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Pager {
    pub fn new(current_page: usize, total_pages: usize) -> Self {
        Self {
            links: page_window(current_page, total_pages),
            current_page,
            total_pages,
            has_previous: current_page > 0,
            has_next: current_page + 1 < total_pages,
        }
    }
}
