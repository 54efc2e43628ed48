//! Days-overdue counting and the overdue badge text.

use chrono::{DateTime, NaiveDate, TimeZone};

/// Approximate month length used by the badge text.
pub const DAYS_PER_MONTH: u32 = 30;

/// Whole calendar days between `next_due` and `today`, clamped at zero.
pub fn days_overdue(next_due: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(due) = next_due else {
        return 0;
    };
    let days = (today - due).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// Like [`days_overdue`], but takes a wall-clock instant and drops its
/// time of day in the instant's own timezone.
pub fn days_overdue_at<Tz: TimeZone>(next_due: Option<NaiveDate>, now: &DateTime<Tz>) -> u32 {
    days_overdue(next_due, now.date_naive())
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Badge text such as `"1 month 5 days overdue"`; empty when not overdue.
pub fn format_overdue_duration(days: u32) -> String {
    if days == 0 {
        return String::new();
    }
    if days < DAYS_PER_MONTH {
        return format!("{} overdue", plural(days, "day"));
    }

    let months = days / DAYS_PER_MONTH;
    let remainder = days % DAYS_PER_MONTH;
    if remainder == 0 {
        format!("{} overdue", plural(months, "month"))
    } else {
        format!(
            "{} {} overdue",
            plural(months, "month"),
            plural(remainder, "day")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_due_date_is_never_overdue() {
        assert_eq!(days_overdue(None, ymd(2024, 3, 10)), 0);
    }

    #[test]
    fn test_future_and_same_day_clamp_to_zero() {
        let due = ymd(2024, 3, 10);
        assert_eq!(days_overdue(Some(due), ymd(2024, 3, 1)), 0);
        assert_eq!(days_overdue(Some(due), due), 0);
        assert_eq!(days_overdue(Some(due), ymd(2024, 3, 11)), 1);
    }

    #[test]
    fn test_monotonic_as_today_advances() {
        let due = ymd(2024, 2, 20);
        let mut today = ymd(2024, 2, 1);
        let mut prev = 0;
        for _ in 0..90 {
            let d = days_overdue(Some(due), today);
            assert!(d >= prev);
            prev = d;
            today += Duration::days(1);
        }
        assert_eq!(prev, days_overdue(Some(due), ymd(2024, 4, 30)));
    }

    #[test]
    fn test_time_of_day_is_ignored() {
        let due = ymd(2024, 3, 10);
        let late_evening = Utc.with_ymd_and_hms(2024, 3, 11, 23, 59, 59).unwrap();
        let early_morning = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 1).unwrap();
        assert_eq!(days_overdue_at(Some(due), &late_evening), 1);
        assert_eq!(days_overdue_at(Some(due), &early_morning), 1);

        // 01:00 on the 11th in IST is still the 10th in UTC; the local date counts.
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let local = ist.with_ymd_and_hms(2024, 3, 11, 1, 0, 0).unwrap();
        assert_eq!(days_overdue_at(Some(due), &local), 1);
    }

    #[test]
    fn test_format_days() {
        assert_eq!(format_overdue_duration(0), "");
        assert_eq!(format_overdue_duration(1), "1 day overdue");
        assert_eq!(format_overdue_duration(2), "2 days overdue");
        assert_eq!(format_overdue_duration(29), "29 days overdue");
    }

    #[test]
    fn test_format_months() {
        assert_eq!(format_overdue_duration(30), "1 month overdue");
        assert_eq!(format_overdue_duration(31), "1 month 1 day overdue");
        assert_eq!(format_overdue_duration(35), "1 month 5 days overdue");
        assert_eq!(format_overdue_duration(60), "2 months overdue");
        assert_eq!(format_overdue_duration(95), "3 months 5 days overdue");
    }
}
