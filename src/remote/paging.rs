//! Paged retrieval.

use crate::error::Result;
use crate::types::RemoteRecord;

/// Position of the next page to fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page_number: u32,
    pub paging_cookie: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            paging_cookie: None,
        }
    }
}

/// One page of results returned by the store.
#[derive(Clone, Debug, Default)]
pub struct Page {
    pub records: Vec<RemoteRecord>,
    pub more_records: bool,
    pub paging_cookie: Option<String>,
}

/// Fetch every page, starting at page 1 and following the paging cookie
/// until the store reports no more records.
pub fn retrieve_all<F>(mut fetch_page: F) -> Result<Vec<RemoteRecord>>
where
    F: FnMut(&PageRequest) -> Result<Page>,
{
    let mut request = PageRequest::default();
    let mut records = Vec::new();

    loop {
        let page = fetch_page(&request)?;
        records.extend(page.records);

        if !page.more_records {
            break;
        }

        request.page_number += 1;
        request.paging_cookie = page.paging_cookie;
    }

    tracing::debug!(pages = request.page_number, records = records.len(), "retrieved all pages");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;

    #[test]
    fn test_follows_cookie_until_exhausted() {
        let mut seen = Vec::new();
        let records = retrieve_all(|request| {
            seen.push(request.clone());
            let n = request.page_number;
            Ok(Page {
                records: vec![RemoteRecord::new("contact").with("page", n as i64)],
                more_records: n < 3,
                paging_cookie: Some(format!("cookie-{}", n)),
            })
        })
        .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(seen[0], PageRequest::default());
        assert_eq!(seen[2].page_number, 3);
        assert_eq!(seen[2].paging_cookie.as_deref(), Some("cookie-2"));
    }

    #[test]
    fn test_page_error_propagates() {
        let result = retrieve_all(|_| Err(TrackerError::remote("timeout")));
        assert!(matches!(result, Err(TrackerError::Remote(_))));
    }
}
