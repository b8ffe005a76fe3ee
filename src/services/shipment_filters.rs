//! Query-string filters of the shipment list.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::{entities::ShipmentStatus, errors::ServiceError};

/// Inclusive `assigned_date` range for a named timeframe relative to `today`.
///
/// Unknown names yield `None`, meaning no date filter.
pub fn timeframe_range(timeframe: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let yesterday = today - Duration::days(1);
    match timeframe {
        "today" => Some((today, today)),
        "tomorrow" => {
            let tomorrow = today + Duration::days(1);
            Some((tomorrow, tomorrow))
        }
        "this_week" => {
            let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            Some((monday, monday + Duration::days(6)))
        }
        "past_day" => Some((yesterday, today)),
        "past_week" => Some((today - Duration::days(7), yesterday)),
        "past_month" => Some((today.checked_sub_months(Months::new(1))?, yesterday)),
        "past_6_months" => Some((today.checked_sub_months(Months::new(6))?, yesterday)),
        "past_year" => Some((today.checked_sub_months(Months::new(12))?, yesterday)),
        _ => None,
    }
}

/// Parses a comma separated list of status names, keeping the given order
pub fn parse_status_filter(raw: &str) -> Result<Vec<ShipmentStatus>, ServiceError> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            ShipmentStatus::from_name(name)
                .ok_or_else(|| ServiceError::not_found("Invalid status value."))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-03-13 is a Wednesday
    #[rstest]
    #[case("today", date(2024, 3, 13), date(2024, 3, 13))]
    #[case("tomorrow", date(2024, 3, 14), date(2024, 3, 14))]
    #[case("this_week", date(2024, 3, 11), date(2024, 3, 17))]
    #[case("past_day", date(2024, 3, 12), date(2024, 3, 13))]
    #[case("past_week", date(2024, 3, 6), date(2024, 3, 12))]
    #[case("past_month", date(2024, 2, 13), date(2024, 3, 12))]
    #[case("past_6_months", date(2023, 9, 13), date(2024, 3, 12))]
    #[case("past_year", date(2023, 3, 13), date(2024, 3, 12))]
    fn named_timeframes(#[case] name: &str, #[case] start: NaiveDate, #[case] end: NaiveDate) {
        assert_eq!(timeframe_range(name, date(2024, 3, 13)), Some((start, end)));
    }

    #[test]
    fn month_arithmetic_clamps_to_month_end() {
        assert_eq!(
            timeframe_range("past_month", date(2024, 3, 31)),
            Some((date(2024, 2, 29), date(2024, 3, 30)))
        );
    }

    #[test]
    fn unknown_timeframe_means_no_filter() {
        assert_eq!(timeframe_range("fortnight", date(2024, 3, 13)), None);
    }

    #[test]
    fn status_filter_keeps_order_and_rejects_unknown() {
        assert_eq!(
            parse_status_filter(" PICKED_UP,CONTAINER_QUEUED ").unwrap(),
            vec![ShipmentStatus::PickedUp, ShipmentStatus::Queued]
        );
        assert_matches!(
            parse_status_filter("PICKED_UP,Picked Up"),
            Err(ServiceError::NotFound(msg)) if msg == "Invalid status value."
        );
    }
}
