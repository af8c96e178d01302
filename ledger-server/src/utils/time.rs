//! 时间工具函数 (业务时区转换)
//!
//! 所有日期字符串→时间戳转换统一在 API handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在，fallback 到 UTC。
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 解析表单日期 → Unix millis
///
/// 接受 RFC 3339 (`2024-03-14T10:00:00.000Z`)、无时区的
/// `YYYY-MM-DDTHH:MM[:SS]` (按业务时区) 以及纯日期 `YYYY-MM-DD`。
pub fn parse_datetime_millis(value: &str, tz: Tz) -> AppResult<i64> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive
                .and_local_timezone(tz)
                .earliest()
                .map(|dt| dt.timestamp_millis())
                .unwrap_or_else(|| naive.and_utc().timestamp_millis()));
        }
    }
    parse_date(value).map(|date| day_start_millis(date, tz))
}

/// Unix millis → (year, month) in the business timezone
///
/// Returns `None` for timestamps outside chrono's representable range.
pub fn year_month(millis: i64, tz: Tz) -> Option<(i32, u32)> {
    let dt = tz.timestamp_millis_opt(millis).single()?;
    Some((dt.year(), dt.month()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_variants() {
        let tz = chrono_tz::UTC;
        let rfc = parse_datetime_millis("2024-03-14T10:00:00.000Z", tz).unwrap();
        let naive = parse_datetime_millis("2024-03-14T10:00:00", tz).unwrap();
        assert_eq!(rfc, naive);

        let day = parse_datetime_millis("2024-03-14", tz).unwrap();
        assert_eq!(rfc - day, 10 * 3600 * 1000);

        assert!(parse_datetime_millis("14/03/2024", tz).is_err());
    }

    #[test]
    fn test_year_month_uses_business_timezone() {
        // 2024-01-31T23:30:00Z is already February 1st in Kinshasa (UTC+1)
        let millis = parse_datetime_millis("2024-01-31T23:30:00Z", chrono_tz::UTC).unwrap();
        assert_eq!(year_month(millis, chrono_tz::UTC), Some((2024, 1)));
        assert_eq!(year_month(millis, chrono_tz::Africa::Kinshasa), Some((2024, 2)));
    }

    #[test]
    fn test_year_month_out_of_range() {
        assert_eq!(year_month(i64::MAX, chrono_tz::UTC), None);
    }
}
