//! Calendar-date helpers shared by the engine, the store and the CLI.
//!
//! Billing works on calendar dates only. Wall-clock timestamps coming from
//! the REST backend are reduced to their UTC date before any arithmetic.

use chrono::{DateTime, Datelike, Months, NaiveDate};

use crate::error::{BillingError, BillingResult};

/// Parse a billing date from either `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_billing_date(raw: &str) -> BillingResult<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|ts| ts.naive_utc().date())
        .map_err(|_| BillingError::InvalidDate(raw.to_string()))
}

/// Parse an optional wire date; empty strings count as absent.
pub fn parse_optional_date(raw: Option<&str>) -> BillingResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_billing_date(s).map(Some),
    }
}

/// First and last calendar day of `(year, month)`.
pub fn month_bounds(year: i32, month: u32) -> BillingResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| BillingError::InvalidDate(format!("{year}-{month:02}")))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| BillingError::InvalidDate(format!("{year}-{month:02}")))?;
    Ok((start, end))
}

/// Parse a `YYYY-MM` month selector.
pub fn parse_month(raw: &str) -> BillingResult<(i32, u32)> {
    let invalid = || BillingError::InvalidDate(raw.to_string());
    let (y, m) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    // Validates the month range as a side effect.
    month_bounds(year, month)?;
    Ok((year, month))
}

/// Add whole calendar months, clamping to the end of shorter months.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// `YYYY-MM-DD`, the format the backend accepts for date inputs.
pub fn format_wire_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Short display form, e.g. `15 Mar 2024`.
pub fn format_display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{} {}", d.day(), d.format("%b %Y")),
        None => "Not set".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_and_rfc3339_dates() {
        assert_eq!(parse_billing_date("2024-03-15").unwrap(), ymd(2024, 3, 15));
        assert_eq!(
            parse_billing_date("2024-03-15T18:30:00.000Z").unwrap(),
            ymd(2024, 3, 15)
        );
        // 23:30 at +05:30 is still the same UTC day.
        assert_eq!(
            parse_billing_date("2024-03-16T03:00:00+05:30").unwrap(),
            ymd(2024, 3, 15)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "15/03/2024", "2024-13-01", "yesterday"] {
            assert!(matches!(
                parse_billing_date(raw),
                Err(BillingError::InvalidDate(_))
            ));
        }
    }

    #[test]
    fn test_optional_date_treats_empty_as_absent() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(parse_optional_date(Some("  ")).unwrap(), None);
        assert!(parse_optional_date(Some("not-a-date")).is_err());
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(2024, 2).unwrap(),
            (ymd(2024, 2, 1), ymd(2024, 2, 29))
        );
        assert_eq!(
            month_bounds(2023, 12).unwrap(),
            (ymd(2023, 12, 1), ymd(2023, 12, 31))
        );
        assert!(month_bounds(2024, 0).is_err());
        assert!(month_bounds(2024, 13).is_err());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-03").unwrap(), (2024, 3));
        assert!(parse_month("2024-3x").is_err());
        assert!(parse_month("2024").is_err());
        assert!(parse_month("2024-00").is_err());
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months(ymd(2024, 1, 31), 1), ymd(2024, 2, 29));
        assert_eq!(add_months(ymd(2023, 8, 31), 6), ymd(2024, 2, 29));
        assert_eq!(add_months(ymd(2024, 3, 15), 12), ymd(2025, 3, 15));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(format_display_date(Some(ymd(2024, 3, 5))), "5 Mar 2024");
        assert_eq!(format_display_date(None), "Not set");
    }
}
