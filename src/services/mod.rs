pub mod accounts;
pub mod associate_companies;
pub mod companies;
pub mod customers;
pub mod dashboard;
pub mod devices;
pub mod documents;
pub mod email;
pub mod feedback;
pub mod form;
pub mod notifications;
pub mod profiles;
pub mod push;
pub mod shipment_filters;
pub mod shipments;
pub mod storage;
pub mod views;

/// Page size of every paginated list
pub const PAGE_SIZE: u64 = 10;

/// 1-based page from a query string; anything unparsable or zero is page 1
pub fn page_number(raw: Option<&str>) -> u64 {
    raw.and_then(|p| p.trim().parse::<u64>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::page_number;

    #[test]
    fn page_numbers_fall_back_to_first_page() {
        assert_eq!(page_number(Some("3")), 3);
        assert_eq!(page_number(Some("0")), 1);
        assert_eq!(page_number(Some("last")), 1);
        assert_eq!(page_number(None), 1);
    }
}
