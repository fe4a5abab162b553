//! Domain helpers for the listing lifecycle
//!
//! Input normalization and the expiry-date handling shared by the create and
//! update handlers.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Listings stay live for 30 days after creation.
pub const LISTING_LIFETIME_DAYS: i64 = 30;

/// Display format used for `postedBy.memberSince` and `expiryDate`.
const DISPLAY_DATE_FORMAT: &str = "%d %b %Y";

/// Strip thousands-separator commas from a submitted price.
///
/// A missing price is stored as an empty string.
pub fn normalize_price(price: Option<&str>) -> String {
    price.map(|p| p.replace(',', "")).unwrap_or_default()
}

/// Format a timestamp as the display string stored in listing records.
pub fn format_display_date(at: DateTime<Utc>) -> String {
    at.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Compute the expiry display string for a listing created at `now`.
pub fn expiry_from(now: DateTime<Utc>) -> String {
    format_display_date(now + Duration::days(LISTING_LIFETIME_DAYS))
}

/// Recompute expiry from a stored display string.
///
/// Expiry dates are persisted pre-formatted, so the update path has to parse
/// them back before comparing. An unparseable value leaves the listing
/// unexpired, matching the stored-string comparison in the system this
/// replaces.
pub fn is_expired(expiry_date: &str, today: NaiveDate) -> bool {
    match NaiveDate::parse_from_str(expiry_date, DISPLAY_DATE_FORMAT) {
        Ok(expiry) => expiry < today,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_normalize_price_strips_commas() {
        assert_eq!(normalize_price(Some("12,000")), "12000");
        assert_eq!(normalize_price(Some("1,999")), "1999");
        assert_eq!(normalize_price(Some("1,234,567")), "1234567");
        assert_eq!(normalize_price(Some("500")), "500");
    }

    #[test]
    fn test_normalize_price_missing_is_empty() {
        assert_eq!(normalize_price(None), "");
    }

    #[test]
    fn test_expiry_round_trip() {
        let created = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap();
        let expiry = expiry_from(created);
        assert_eq!(expiry, "14 Feb 2026");

        // Still live the day it was minted
        assert!(!is_expired(&expiry, created.date_naive()));
        // Expired once the stored date has passed
        assert!(is_expired(
            &expiry,
            NaiveDate::from_ymd_opt(2026, 2, 15).unwrap()
        ));
        // Not expired on the expiry date itself
        assert!(!is_expired(
            &expiry,
            NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
        ));
    }

    #[test]
    fn test_unparseable_expiry_stays_live() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert!(!is_expired("garbage", today));
        assert!(!is_expired("", today));
    }

    #[test]
    fn test_member_since_format() {
        let joined = Utc.with_ymd_and_hms(2024, 7, 3, 0, 0, 0).unwrap();
        assert_eq!(format_display_date(joined), "03 Jul 2024");
    }
}
