use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Largest page number whose offset still fits in an `i64`
pub const MAX_PAGE_NUMBER: i64 = i64::MAX / MAX_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Raw list query string. Numbers stay strings so a malformed value falls
/// back to its default instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page_number: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub search_name_term: Option<String>,
    pub search_login_term: Option<String>,
    pub search_email_term: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> PageParams {
        let page_number = self
            .page_number
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|n| *n >= 1)
            .map(|n| n.min(MAX_PAGE_NUMBER))
            .unwrap_or(1);

        let page_size = self
            .page_size
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|n| *n >= 1)
            .map(|n| n.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let direction = match self.sort_direction.as_deref().map(str::to_ascii_lowercase) {
            Some(d) if d == "asc" => SortDirection::Asc,
            _ => SortDirection::Desc,
        };

        PageParams {
            page_number,
            page_size,
            sort_by: self
                .sort_by
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "createdAt".to_string()),
            direction,
        }
    }

    /// Trimmed search term, `None` when blank
    pub fn term(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub page_number: i64,
    pub page_size: i64,
    pub sort_by: String,
    pub direction: SortDirection,
}

impl Default for PageParams {
    fn default() -> Self {
        ListQuery::default().page()
    }
}

impl PageParams {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }

    /// ORDER BY clause for `sort_by`, resolved against `(view field, column)`
    /// pairs. Unknown fields fall back to `fallback`.
    pub fn order_by(&self, columns: &[(&str, &'static str)], fallback: &'static str) -> String {
        let column = columns
            .iter()
            .find(|(field, _)| *field == self.sort_by)
            .map(|(_, column)| *column)
            .unwrap_or(fallback);
        format!("{} {}", column, self.direction.as_sql())
    }
}

/// Paged list response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginator<T> {
    pub pages_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub items: Vec<T>,
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>, total_count: i64, params: &PageParams) -> Self {
        let pages_count = if total_count <= 0 {
            0
        } else {
            (total_count + params.page_size - 1) / params.page_size
        };
        Self {
            pages_count,
            page: params.page_number,
            page_size: params.page_size,
            total_count,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page_number: &str, page_size: &str) -> ListQuery {
        ListQuery {
            page_number: Some(page_number.to_string()),
            page_size: Some(page_size.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let params = ListQuery::default().page();
        assert_eq!(params.page_number, 1);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.sort_by, "createdAt");
        assert_eq!(params.direction, SortDirection::Desc);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_normalizes_bad_numbers() {
        let params = query("0", "-3").page();
        assert_eq!((params.page_number, params.page_size), (1, 10));

        let params = query("abc", "1000").page();
        assert_eq!((params.page_number, params.page_size), (1, MAX_PAGE_SIZE));
    }

    #[test]
    fn test_offset() {
        let params = query("3", "20").page();
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_huge_page_number_is_capped() {
        let params = query("9223372036854775807", "10").page();
        assert_eq!(params.page_number, MAX_PAGE_NUMBER);
        assert!(params.offset() > 0);

        let params = query("9223372036854775807", "100").page();
        assert_eq!(params.offset(), (MAX_PAGE_NUMBER - 1) * 100);
    }

    #[test]
    fn test_pages_count_rounds_up() {
        let params = query("1", "10").page();
        assert_eq!(Paginator::new(Vec::<u8>::new(), 0, &params).pages_count, 0);
        assert_eq!(Paginator::new(Vec::<u8>::new(), 10, &params).pages_count, 1);
        assert_eq!(Paginator::new(Vec::<u8>::new(), 11, &params).pages_count, 2);
    }

    #[test]
    fn test_order_by_whitelist() {
        let columns = [("name", "b.name"), ("createdAt", "b.created_at")];
        let mut params = ListQuery {
            sort_by: Some("name".to_string()),
            sort_direction: Some("ASC".to_string()),
            ..Default::default()
        }
        .page();
        assert_eq!(params.order_by(&columns, "b.created_at"), "b.name ASC");

        params.sort_by = "name; DROP TABLE blogs".to_string();
        assert_eq!(params.order_by(&columns, "b.created_at"), "b.created_at ASC");
    }

    #[test]
    fn test_paginator_serializes_camel_case() {
        let params = PageParams::default();
        let json = serde_json::to_value(Paginator::new(vec![1, 2], 2, &params)).unwrap();
        assert_eq!(json["pagesCount"], 1);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["totalCount"], 2);
        assert_eq!(json["items"].as_array().unwrap().len(), 2);
    }
}
