//! Paginación de listados
//!
//! Los listados aceptan `page` (desde 1) y `limit` (máximo 100).

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;
/// Última página direccionable sin desbordar el OFFSET
pub const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

/// Parámetros de página tal como llegan en el query string
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Página efectiva, acotada a [1, MAX_PAGE]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    /// Límite efectivo, acotado a [1, MAX_LIMIT]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Página de resultados
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, params: &PageParams) -> Self {
        let limit = params.limit();
        Self {
            items,
            total,
            page: params.page(),
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_LIMIT);
        assert_eq!(params.offset(), 0);

        let params = PageParams::new(Some(0), Some(1_000));
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), MAX_LIMIT);

        let params = PageParams::new(Some(3), Some(10));
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let params = PageParams::new(Some(i64::MAX), Some(20));
        assert_eq!(params.page(), MAX_PAGE);
        assert!(params.offset() > 0);

        let params = PageParams::new(Some(i64::MAX), Some(MAX_LIMIT));
        assert_eq!(params.offset(), (MAX_PAGE - 1) * MAX_LIMIT);

        let params = PageParams::new(Some(i64::MIN), None);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_total_pages() {
        let params = PageParams::new(Some(1), Some(10));
        assert_eq!(Paginated::new(vec![1, 2, 3], 21, &params).total_pages, 3);
        assert_eq!(Paginated::<i32>::new(vec![], 0, &params).total_pages, 0);
        assert_eq!(Paginated::new(vec![1], 10, &params).total_pages, 1);
    }
}
