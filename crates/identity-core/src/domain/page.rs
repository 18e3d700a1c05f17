//! 페이지 응답 타입.

use serde::Serialize;

/// 0부터 시작하는 페이지 요청.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 10;
    pub const MAX_SIZE: u32 = 100;

    /// 크기를 1..=MAX_SIZE 범위로 보정합니다.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// 페이지 단위 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = request.size.max(1);
        let total_pages = total_elements.div_ceil(u64::from(size)) as u32;
        Self {
            content,
            page: request.page,
            size,
            total_elements,
            total_pages,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// 단일 항목 페이지. 요청의 페이지 번호와 크기를 그대로 유지합니다.
    pub fn single(item: T, request: PageRequest) -> Self {
        Self::new(vec![item], request, 1)
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_math() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(1, 3), 7);
        assert_eq!(page.total_pages, 3);
        assert!(!page.first);
        assert!(!page.last);

        let last = Page::new(vec![7], PageRequest::new(2, 3), 7);
        assert!(last.last);
    }

    #[test]
    fn test_empty_page_is_first_and_last() {
        let page: Page<i32> = Page::empty(PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert!(page.first);
        assert!(page.last);
    }

    #[test]
    fn test_page_request_clamps_size() {
        assert_eq!(PageRequest::new(0, 0).size, 1);
        assert_eq!(PageRequest::new(0, 1000).size, PageRequest::MAX_SIZE);
        assert_eq!(PageRequest::new(3, 20).offset(), 60);
    }

    #[test]
    fn test_single_and_map() {
        let page = Page::single(5, PageRequest::new(0, 10)).map(|v| v * 2);
        assert_eq!(page.content, vec![10]);
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.size, 10);
        assert!(page.first && page.last);
    }

    #[test]
    fn test_single_keeps_requested_page() {
        let page = Page::single("alice", PageRequest::new(2, 5));
        assert_eq!(page.page, 2);
        assert_eq!(page.size, 5);
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.first);
        assert!(page.last);
    }

    #[test]
    fn test_max_page_number_is_last() {
        let page: Page<i32> = Page::new(Vec::new(), PageRequest::new(u32::MAX, 10), 5);
        assert_eq!(page.page, u32::MAX);
        assert_eq!(page.total_pages, 1);
        assert!(!page.first);
        assert!(page.last);
    }
}
