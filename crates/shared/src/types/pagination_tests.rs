use super::*;
use rstest::rstest;

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 50);
}

#[rstest]
#[case(1, 20, 0)]
#[case(2, 20, 20)]
#[case(5, 50, 200)]
#[case(0, 10, 0)]
fn test_page_request_offset(#[case] page: u32, #[case] per_page: u32, #[case] expected: u64) {
    let request = PageRequest { page, per_page };
    assert_eq!(request.offset(), expected);
}

#[test]
fn test_page_request_new_clamps() {
    let request = PageRequest::new(0, 10_000);
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, MAX_PER_PAGE);

    let request = PageRequest::new(3, 0);
    assert_eq!(request.per_page, 1);
}

#[test]
fn test_page_response_new() {
    let data = vec![1, 2, 3];
    let response = PageResponse::new(data.clone(), 1, 10, 3);

    assert_eq!(response.data, data);
    assert_eq!(response.meta.page, 1);
    assert_eq!(response.meta.per_page, 10);
    assert_eq!(response.meta.total, 3);
    assert_eq!(response.meta.total_pages, 1);
}

#[test]
fn test_page_response_pagination() {
    // 25 items, 10 per page -> 3 pages
    let response: PageResponse<i32> = PageResponse::new(vec![], 1, 10, 25);
    assert_eq!(response.meta.total_pages, 3);
}

#[test]
fn test_page_response_empty() {
    let response: PageResponse<i32> = PageResponse::new(vec![], 1, 10, 0);
    assert_eq!(response.meta.total_pages, 1);
}

#[test]
fn test_page_response_map_keeps_meta() {
    let response = PageResponse::new(vec![1, 2], 2, 2, 4).map(|n| n * 10);
    assert_eq!(response.data, vec![10, 20]);
    assert_eq!(response.meta.total_pages, 2);
}
