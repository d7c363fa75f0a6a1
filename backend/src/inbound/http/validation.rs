//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use serde_json::json;

use crate::domain::Error;
use crate::domain::order::OrderStatus;
use pagination::PageRequest;

/// Build a page request from optional query parameters.
pub(crate) fn page_from_query(page: Option<u32>, per_page: Option<u32>) -> Result<PageRequest, Error> {
    PageRequest::from_query(page, per_page).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "page",
            "code": "invalid_page",
        }))
    })
}

/// Parse an order status query or body value.
pub(crate) fn parse_order_status(value: &str) -> Result<OrderStatus, Error> {
    OrderStatus::from_str(value).map_err(|_| {
        Error::invalid_request("unknown order status").with_details(json!({
            "field": "status",
            "value": value,
            "code": "invalid_status",
        }))
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    fn defaults_apply_when_the_query_is_empty() {
        let page = page_from_query(None, None).expect("defaults");
        assert_eq!(page.page(), 1);
    }

    #[rstest]
    fn a_zero_page_is_an_invalid_request() {
        let err = page_from_query(Some(0), None).expect_err("zero page");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn statuses_parse_from_their_wire_names() {
        assert_eq!(parse_order_status("shipped").expect("status"), OrderStatus::Shipped);
        let err = parse_order_status("teleported").expect_err("unknown status");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
