//! Visitor analytics records and the traffic summary shown in the console.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::types::{now_iso, parse_iso, Timestamp};

/// Page recorded when the route path is empty.
pub const DEFAULT_PAGE: &str = "/";

/// One page visit. Append-only; the store key is the only identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ip: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub page: String,
    /// ISO-8601 visit time.
    #[serde(default, deserialize_with = "lenient::text")]
    pub timestamp: String,
}

impl Analytics {
    /// A visit record stamped with the current time. An empty `page` is
    /// recorded as `/`.
    pub fn visit(ip: impl Into<String>, page: &str) -> Self {
        Self {
            id: String::new(),
            ip: ip.into(),
            page: if page.is_empty() {
                DEFAULT_PAGE.to_string()
            } else {
                page.to_string()
            },
            timestamp: now_iso(),
        }
    }

    pub fn visited_at(&self) -> Option<Timestamp> {
        parse_iso(&self.timestamp)
    }
}

/* --------------------------------------------------------------------------
Traffic summary
-------------------------------------------------------------------------- */

/// Window counted as "active now".
pub const ACTIVE_WINDOW_MINUTES: i64 = 5;

/// Number of entries in the raw visit log.
pub const RECENT_LOG_LIMIT: usize = 50;

/// Visit counts over the console's reporting windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficSummary {
    pub active_now: usize,
    pub last_24_hours: usize,
    pub last_30_days: usize,
    pub total: usize,
}

impl TrafficSummary {
    /// Count visits younger than each window. Records with an unparseable
    /// timestamp only count toward `total`.
    pub fn compute(records: &[Analytics], now: Timestamp) -> Self {
        let within = |window: Duration| {
            records
                .iter()
                .filter_map(Analytics::visited_at)
                .filter(|ts| now.signed_duration_since(*ts) < window)
                .count()
        };

        Self {
            active_now: within(Duration::minutes(ACTIVE_WINDOW_MINUTES)),
            last_24_hours: within(Duration::hours(24)),
            last_30_days: within(Duration::days(30)),
            total: records.len(),
        }
    }
}

/// The most recent `limit` records, newest first (reverse store order).
pub fn recent(records: &[Analytics], limit: usize) -> Vec<&Analytics> {
    records.iter().rev().take(limit).collect()
}

/// Short relative label: `12m ago`, `3h ago`, otherwise the calendar date.
pub fn relative_time(ts: Timestamp, now: Timestamp) -> String {
    let elapsed = now.signed_duration_since(ts);
    let minutes = elapsed.num_minutes().max(0);
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }
    ts.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::to_iso;
    use chrono::TimeZone;

    fn at(now: Timestamp, ago: Duration) -> Analytics {
        Analytics {
            id: String::new(),
            ip: "203.0.113.9".into(),
            page: "/".into(),
            timestamp: to_iso(now - ago),
        }
    }

    #[test]
    fn visit_defaults_empty_page_to_root() {
        assert_eq!(Analytics::visit("1.2.3.4", "").page, "/");
        assert_eq!(Analytics::visit("1.2.3.4", "/posts").page, "/posts");
        assert!(Analytics::visit("1.2.3.4", "/").visited_at().is_some());
    }

    #[test]
    fn visit_serializes_without_id() {
        let value = serde_json::to_value(Analytics::visit("1.2.3.4", "/")).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["ip"], "1.2.3.4");
    }

    #[test]
    fn summary_counts_each_window() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let records = vec![
            at(now, Duration::minutes(1)),
            at(now, Duration::hours(2)),
            at(now, Duration::days(3)),
            at(now, Duration::days(40)),
            Analytics {
                timestamp: "not a date".into(),
                ..Default::default()
            },
        ];

        let summary = TrafficSummary::compute(&records, now);
        assert_eq!(
            summary,
            TrafficSummary {
                active_now: 1,
                last_24_hours: 2,
                last_30_days: 3,
                total: 5,
            }
        );
    }

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let records: Vec<Analytics> = (0..60)
            .map(|i| Analytics {
                id: format!("k{i:02}"),
                ..Default::default()
            })
            .collect();
        let log = recent(&records, RECENT_LOG_LIMIT);
        assert_eq!(log.len(), 50);
        assert_eq!(log[0].id, "k59");
        assert_eq!(log[49].id, "k10");
    }

    #[test]
    fn relative_labels() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(relative_time(now - Duration::minutes(7), now), "7m ago");
        assert_eq!(relative_time(now - Duration::hours(5), now), "5h ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2024-05-30");
        assert_eq!(relative_time(now + Duration::minutes(3), now), "0m ago");
    }
}
