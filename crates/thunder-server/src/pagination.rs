//! Pagination parameters and navigation links.
//!
//! List responses share one envelope: `{ totalResults, startIndex, count,
//! <items>, links[] }`, with `first`/`prev`/`next`/`last` links carrying
//! `?offset=...&limit=...` query strings. `limit` is accepted in
//! `[1, MAX_PAGE_SIZE]` and defaults to [`DEFAULT_PAGE_SIZE`]; `offset` must
//! be non-negative and defaults to zero.

use serde::Serialize;

/// Default page size when the client does not pass `limit`.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Largest accepted `limit`.
pub const MAX_PAGE_SIZE: usize = 100;

/// Validated pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// Page size
    pub limit: usize,
    /// Items skipped before the page starts
    pub offset: usize,
}

/// Which parameter failed validation. The caller maps this onto its
/// subsystem's error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageParamError {
    /// `limit` missing the `[1, MAX_PAGE_SIZE]` range or non-numeric
    InvalidLimit,
    /// `offset` negative or non-numeric
    InvalidOffset,
}

impl PageParams {
    /// Validate raw query values.
    ///
    /// # Errors
    ///
    /// [`PageParamError`] naming the offending parameter.
    pub fn validate(
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<Self, PageParamError> {
        let limit = match limit {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => {
                let parsed: i64 = raw.parse().map_err(|_| PageParamError::InvalidLimit)?;
                if parsed < 1 || parsed > MAX_PAGE_SIZE as i64 {
                    return Err(PageParamError::InvalidLimit);
                }
                parsed as usize
            }
        };
        let offset = match offset {
            None => 0,
            Some(raw) => {
                let parsed: i64 = raw.parse().map_err(|_| PageParamError::InvalidOffset)?;
                if parsed < 0 {
                    return Err(PageParamError::InvalidOffset);
                }
                parsed as usize
            }
        };
        Ok(Self { limit, offset })
    }
}

/// One navigation link in a list envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Target with query string
    pub href: String,
    /// `first`, `prev`, `next`, or `last`
    pub rel: String,
}

impl Link {
    fn new(base_path: &str, rel: &str, offset: usize, limit: usize) -> Self {
        Self {
            href: format!("{base_path}?offset={offset}&limit={limit}"),
            rel: rel.to_string(),
        }
    }
}

/// Build the `first`/`prev`/`next`/`last` links applicable to a page.
#[must_use]
pub fn build_links(base_path: &str, params: PageParams, total: usize) -> Vec<Link> {
    let PageParams { limit, offset } = params;
    let mut links = Vec::new();
    if total == 0 || limit == 0 {
        return links;
    }

    links.push(Link::new(base_path, "first", 0, limit));
    if offset > 0 {
        links.push(Link::new(
            base_path,
            "prev",
            offset.saturating_sub(limit),
            limit,
        ));
    }
    if offset + limit < total {
        links.push(Link::new(base_path, "next", offset + limit, limit));
    }
    let last_offset = ((total - 1) / limit) * limit;
    links.push(Link::new(base_path, "last", last_offset, limit));
    links
}
