//! Revenue report window and summary
//!
//! The server report endpoint and the client's offline fallback both go
//! through [`report_window`] and [`RevenueReport::build`], so a report
//! computed on either side has the same boundaries and totals.

use crate::error::{AppError, ErrorCode};
use crate::money;
use crate::order::{Order, OrderSource, OrderStatus};
use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Istanbul is UTC+3 all year (no DST since 2016)
pub const ISTANBUL_OFFSET_SECS: i32 = 3 * 3600;

/// Fixed offset used for business days
pub fn istanbul_offset() -> FixedOffset {
    FixedOffset::east_opt(ISTANBUL_OFFSET_SECS).unwrap_or(Utc.fix())
}

/// Report period selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
    /// Local dates, both inclusive
    Custom { start: NaiveDate, end: NaiveDate },
}

/// Half-open `[start_ms, end_ms)` interval in Unix milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl ReportWindow {
    pub fn contains(&self, millis: i64) -> bool {
        millis >= self.start_ms && millis < self.end_ms
    }
}

/// Millis of local midnight at the start of `date`
fn local_midnight_millis(date: NaiveDate, offset: FixedOffset) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
        - i64::from(offset.local_minus_utc()) * 1000
}

/// Compute the report window for `period` as seen at `now` in `offset`
///
/// - daily: the local day containing `now`
/// - weekly: Monday 00:00 of the local week, 7 days
/// - monthly: the 1st of the local month up to the 1st of the next
/// - custom: `start` 00:00 up to the day after `end`
pub fn report_window(
    period: ReportPeriod,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<ReportWindow, AppError> {
    let today = now.with_timezone(&offset).date_naive();

    let (start, end) = match period {
        ReportPeriod::Daily => (today, today + Days::new(1)),
        ReportPeriod::Weekly => {
            let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
            (monday, monday + Days::new(7))
        }
        ReportPeriod::Monthly => {
            let first = today - Days::new(u64::from(today.day0()));
            (first, first + Months::new(1))
        }
        ReportPeriod::Custom { start, end } => {
            if end < start {
                return Err(AppError::validation("endDate must not be before startDate")
                    .with_detail("startDate", start.to_string())
                    .with_detail("endDate", end.to_string()));
            }
            (start, end + Days::new(1))
        }
    };

    Ok(ReportWindow {
        start_ms: local_midnight_millis(start, offset),
        end_ms: local_midnight_millis(end, offset),
    })
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::with_message(
            ErrorCode::InvalidFormat,
            format!("Invalid date format: {s}, expected YYYY-MM-DD"),
        )
    })
}

/// `GET /api/v1/orders/report` query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub source: Option<String>,
}

impl ReportQuery {
    /// Query string for `period`, the inverse of [`ReportQuery::period`]
    pub fn for_period(period: ReportPeriod, source: Option<OrderSource>) -> Self {
        let (period, start_date, end_date) = match period {
            ReportPeriod::Daily => (Some("daily"), None, None),
            ReportPeriod::Weekly => (Some("weekly"), None, None),
            ReportPeriod::Monthly => (Some("monthly"), None, None),
            ReportPeriod::Custom { start, end } => (
                None,
                Some(start.format("%Y-%m-%d").to_string()),
                Some(end.format("%Y-%m-%d").to_string()),
            ),
        };
        Self {
            period: period.map(str::to_string),
            start_date,
            end_date,
            source: source.map(|s| s.as_str().to_string()),
        }
    }

    /// Explicit dates win over the period keyword; nothing means today
    pub fn period(&self) -> Result<ReportPeriod, AppError> {
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => {
                return Ok(ReportPeriod::Custom {
                    start: parse_date(start)?,
                    end: parse_date(end)?,
                });
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(AppError::with_message(
                    ErrorCode::RequiredField,
                    "startDate and endDate must be given together",
                ));
            }
            (None, None) => {}
        }

        match self.period.as_deref().map(str::trim) {
            None | Some("") | Some("daily") => Ok(ReportPeriod::Daily),
            Some("weekly") => Ok(ReportPeriod::Weekly),
            Some("monthly") => Ok(ReportPeriod::Monthly),
            Some(other) => Err(AppError::validation(format!("Unknown report period: {other}"))
                .with_detail("period", other)),
        }
    }

    /// `None` or `all` disables the filter
    pub fn source(&self) -> Result<Option<OrderSource>, AppError> {
        match self.source.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}

/// Report line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportItem {
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: f64,
}

/// One order as it enters a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine {
    pub order_code: String,
    pub table_number: Option<i32>,
    pub source: OrderSource,
    pub status: OrderStatus,
    pub total: f64,
    pub paid_at: Option<i64>,
    pub items: Vec<ReportItem>,
}

impl From<&Order> for ReportLine {
    fn from(order: &Order) -> Self {
        Self {
            order_code: order.order_code.clone(),
            table_number: order.table_number(),
            source: order.source,
            status: order.status,
            total: order.total,
            paid_at: order.paid_at,
            items: order
                .items
                .iter()
                .map(|i| ReportItem {
                    product_name: i.product_name.clone(),
                    quantity: i.quantity,
                    subtotal: i.subtotal,
                })
                .collect(),
        }
    }
}

/// Revenue report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub window: ReportWindow,
    pub source: Option<OrderSource>,
    pub total_revenue: f64,
    pub restaurant_revenue: f64,
    pub third_party_revenue: f64,
    pub order_count: usize,
    pub orders: Vec<ReportLine>,
}

impl RevenueReport {
    /// Keep revenue-status orders paid inside `window` (and matching
    /// `source` when given), ordered by payment time, and total them.
    pub fn build<I>(window: ReportWindow, source: Option<OrderSource>, candidates: I) -> Self
    where
        I: IntoIterator<Item = ReportLine>,
    {
        let mut orders: Vec<ReportLine> = candidates
            .into_iter()
            .filter(|l| l.status.is_revenue())
            .filter(|l| l.paid_at.is_some_and(|t| window.contains(t)))
            .filter(|l| source.is_none_or(|s| l.source == s))
            .collect();
        orders.sort_by_key(|l| l.paid_at);

        let restaurant_revenue = money::sum(
            orders
                .iter()
                .filter(|l| !l.source.is_third_party())
                .map(|l| l.total),
        );
        let third_party_revenue = money::sum(
            orders
                .iter()
                .filter(|l| l.source.is_third_party())
                .map(|l| l.total),
        );

        Self {
            window,
            source,
            total_revenue: money::sum([restaurant_revenue, third_party_revenue]),
            restaurant_revenue,
            third_party_revenue,
            order_count: orders.len(),
            orders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ist() -> FixedOffset {
        istanbul_offset()
    }

    /// Istanbul wall-clock time as a UTC instant
    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        ist()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn line(code: &str, status: OrderStatus, source: OrderSource, total: f64, paid_at: Option<i64>) -> ReportLine {
        ReportLine {
            order_code: code.to_string(),
            table_number: None,
            source,
            status,
            total,
            paid_at,
            items: vec![],
        }
    }

    #[test]
    fn daily_window_is_istanbul_midnight_to_midnight() {
        // 01:30 local on 2025-03-12 is still 2025-03-11 in UTC
        let now = at(2025, 3, 12, 1, 30);
        let w = report_window(ReportPeriod::Daily, ist(), now).unwrap();
        assert_eq!(w.start_ms, at(2025, 3, 12, 0, 0).timestamp_millis());
        assert_eq!(w.end_ms, at(2025, 3, 13, 0, 0).timestamp_millis());
        assert_eq!(w.end_ms - w.start_ms, 86_400_000);
        // 21:00 UTC the previous day is local midnight
        assert_eq!(
            w.start_ms,
            Utc.with_ymd_and_hms(2025, 3, 11, 21, 0, 0).unwrap().timestamp_millis()
        );
    }

    #[test]
    fn daily_excludes_previous_evening() {
        let now = at(2025, 3, 12, 14, 0);
        let w = report_window(ReportPeriod::Daily, ist(), now).unwrap();
        assert!(!w.contains(at(2025, 3, 11, 23, 59).timestamp_millis()));
        assert!(w.contains(at(2025, 3, 12, 0, 0).timestamp_millis()));
        assert!(w.contains(at(2025, 3, 12, 23, 59).timestamp_millis()));
        assert!(!w.contains(at(2025, 3, 13, 0, 0).timestamp_millis()));
    }

    #[test]
    fn weekly_anchors_on_monday() {
        // 2025-03-16 is a Sunday
        let w = report_window(ReportPeriod::Weekly, ist(), at(2025, 3, 16, 22, 0)).unwrap();
        assert_eq!(w.start_ms, at(2025, 3, 10, 0, 0).timestamp_millis());
        assert_eq!(w.end_ms, at(2025, 3, 17, 0, 0).timestamp_millis());

        // Monday itself
        let w = report_window(ReportPeriod::Weekly, ist(), at(2025, 3, 10, 0, 5)).unwrap();
        assert_eq!(w.start_ms, at(2025, 3, 10, 0, 0).timestamp_millis());
    }

    #[test]
    fn monthly_spans_calendar_month() {
        let w = report_window(ReportPeriod::Monthly, ist(), at(2024, 2, 29, 12, 0)).unwrap();
        assert_eq!(w.start_ms, at(2024, 2, 1, 0, 0).timestamp_millis());
        assert_eq!(w.end_ms, at(2024, 3, 1, 0, 0).timestamp_millis());

        let w = report_window(ReportPeriod::Monthly, ist(), at(2025, 12, 31, 23, 0)).unwrap();
        assert_eq!(w.end_ms, at(2026, 1, 1, 0, 0).timestamp_millis());
    }

    #[test]
    fn custom_end_is_inclusive() {
        let period = ReportPeriod::Custom {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        let w = report_window(period, ist(), Utc::now()).unwrap();
        assert_eq!(w.start_ms, at(2025, 1, 1, 0, 0).timestamp_millis());
        assert_eq!(w.end_ms, at(2025, 1, 2, 0, 0).timestamp_millis());
    }

    #[test]
    fn custom_end_before_start_is_rejected() {
        let period = ReportPeriod::Custom {
            start: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 4).unwrap(),
        };
        let err = report_window(period, ist(), Utc::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn query_parsing() {
        let q = ReportQuery::default();
        assert_eq!(q.period().unwrap(), ReportPeriod::Daily);
        assert_eq!(q.source().unwrap(), None);

        let q = ReportQuery {
            period: Some("weekly".into()),
            source: Some("getir".into()),
            ..Default::default()
        };
        assert_eq!(q.period().unwrap(), ReportPeriod::Weekly);
        assert_eq!(q.source().unwrap(), Some(OrderSource::Getir));

        let q = ReportQuery {
            period: Some("daily".into()),
            start_date: Some("2025-01-01".into()),
            end_date: Some("2025-01-31".into()),
            ..Default::default()
        };
        assert!(matches!(q.period().unwrap(), ReportPeriod::Custom { .. }));

        let q = ReportQuery {
            start_date: Some("2025-01-01".into()),
            ..Default::default()
        };
        assert_eq!(q.period().unwrap_err().code, ErrorCode::RequiredField);

        let q = ReportQuery {
            start_date: Some("01/01/2025".into()),
            end_date: Some("2025-01-31".into()),
            ..Default::default()
        };
        assert_eq!(q.period().unwrap_err().code, ErrorCode::InvalidFormat);

        let q = ReportQuery {
            period: Some("yearly".into()),
            ..Default::default()
        };
        assert!(q.period().is_err());
    }

    #[test]
    fn build_filters_and_totals() {
        let now = at(2025, 3, 12, 15, 0);
        let w = report_window(ReportPeriod::Daily, ist(), now).unwrap();
        let today = at(2025, 3, 12, 12, 0).timestamp_millis();
        let yesterday = at(2025, 3, 11, 23, 59).timestamp_millis();

        let report = RevenueReport::build(
            w,
            None,
            vec![
                line("A", OrderStatus::Paid, OrderSource::Restaurant, 100.1, Some(today)),
                line("B", OrderStatus::CourierDelivered, OrderSource::Getir, 50.2, Some(today - 1)),
                line("C", OrderStatus::Paid, OrderSource::Restaurant, 999.0, Some(yesterday)),
                line("D", OrderStatus::Delivered, OrderSource::Restaurant, 10.0, None),
                line("E", OrderStatus::Cancelled, OrderSource::Restaurant, 10.0, Some(today)),
            ],
        );

        assert_eq!(report.order_count, 2);
        assert_eq!(report.orders[0].order_code, "B");
        assert_eq!(report.restaurant_revenue, 100.1);
        assert_eq!(report.third_party_revenue, 50.2);
        assert_eq!(report.total_revenue, 150.3);
    }

    #[test]
    fn query_for_period_parses_back() {
        let custom = ReportPeriod::Custom {
            start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
        };
        for period in [
            ReportPeriod::Daily,
            ReportPeriod::Weekly,
            ReportPeriod::Monthly,
            custom,
        ] {
            let q = ReportQuery::for_period(period, Some(OrderSource::Getir));
            assert_eq!(q.period().unwrap(), period);
            assert_eq!(q.source().unwrap(), Some(OrderSource::Getir));
        }
        assert_eq!(ReportQuery::for_period(ReportPeriod::Daily, None).source().unwrap(), None);
    }

    #[test]
    fn build_with_source_filter() {
        let w = ReportWindow { start_ms: 0, end_ms: 100 };
        let report = RevenueReport::build(
            w,
            Some(OrderSource::Restaurant),
            vec![
                line("A", OrderStatus::Paid, OrderSource::Restaurant, 10.0, Some(5)),
                line("B", OrderStatus::Paid, OrderSource::Trendyol, 20.0, Some(6)),
            ],
        );
        assert_eq!(report.order_count, 1);
        assert_eq!(report.total_revenue, 10.0);
        assert_eq!(report.third_party_revenue, 0.0);
    }
}
