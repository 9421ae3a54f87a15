//! Pure functions turning fetched data into view trees.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::models::{
    ChartPoint, ChartView, ClockEntry, ClockView, CurrencyCatalog, CurrencyOption, HistorySeries,
    RateListView, RateRow, RateSnapshot, TimeRange,
};
use crate::utils::{format_decimal, format_timestamp, round2};
use crate::AppError;

pub const NO_SELECTION_TITLE: &str = "Please select a currency to view live fluctuations";

/// Zones shown on the home view
pub const WORLD_CLOCK_ZONES: [Tz; 24] = [
    chrono_tz::UTC,
    chrono_tz::US::Eastern,
    chrono_tz::US::Central,
    chrono_tz::US::Mountain,
    chrono_tz::US::Pacific,
    chrono_tz::Europe::London,
    chrono_tz::Europe::Paris,
    chrono_tz::Europe::Berlin,
    chrono_tz::Europe::Moscow,
    chrono_tz::Asia::Tokyo,
    chrono_tz::Asia::Shanghai,
    chrono_tz::Asia::Kolkata,
    chrono_tz::Asia::Dubai,
    chrono_tz::Australia::Sydney,
    chrono_tz::Australia::Perth,
    chrono_tz::Africa::Johannesburg,
    chrono_tz::Africa::Cairo,
    chrono_tz::America::Sao_Paulo,
    chrono_tz::America::Mexico_City,
    chrono_tz::America::Buenos_Aires,
    chrono_tz::America::Vancouver,
    chrono_tz::America::Toronto,
    chrono_tz::Pacific::Auckland,
    chrono_tz::Pacific::Honolulu,
];

pub fn render_clock(now: DateTime<Utc>, zones: &[Tz]) -> ClockView {
    let entries = zones
        .iter()
        .map(|tz| ClockEntry {
            zone: tz.name().to_string(),
            time: format_timestamp(&now.with_timezone(tz)),
        })
        .collect();
    ClockView { entries }
}

/// Rows sorted by ascending rate; options follow the code order of the table.
pub fn render_rate_list(
    result: &Result<RateSnapshot, AppError>,
    catalog: &CurrencyCatalog,
) -> RateListView {
    let snapshot = match result {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return RateListView::Error {
                message: format!("Error fetching data: {e}"),
            }
        }
    };
    let mut sorted = snapshot.rates.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| a.1.total_cmp(b.1));
    let rows = sorted
        .into_iter()
        .map(|(code, rate)| RateRow {
            code: code.clone(),
            label: catalog.label(code),
            rate: format_decimal(round2(*rate)),
        })
        .collect();
    let options = snapshot
        .rates
        .keys()
        .map(|code| CurrencyOption {
            label: catalog.label(code),
            value: code.clone(),
        })
        .collect();
    RateListView::Rates { rows, options }
}

pub fn render_chart(
    currency: &str,
    base: &str,
    series: Option<&HistorySeries>,
    catalog: &CurrencyCatalog,
    range: TimeRange,
    now: DateTime<Utc>,
) -> ChartView {
    let cutoff = now - Duration::days(i64::from(range.days()));
    let points = series
        .map(|s| {
            s.since(cutoff)
                .map(|p| ChartPoint {
                    time: format_timestamp(&p.timestamp),
                    rate: p.rate,
                })
                .collect()
        })
        .unwrap_or_default();
    ChartView::Series {
        title: format!(
            "Live Exchange Rate for {} ({base})",
            catalog.display_name(currency)
        ),
        currency: currency.to_string(),
        base: base.to_string(),
        range_days: range.days(),
        x_label: "Time".to_string(),
        y_label: "Rate".to_string(),
        points,
    }
}

pub fn render_chart_error(error: &AppError) -> ChartView {
    ChartView::placeholder(format!("Error fetching data: {error}"))
}

pub fn render_rate_unavailable(currency: &str) -> ChartView {
    ChartView::placeholder(format!("Rate for {currency} not available."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryPoint;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn snapshot() -> RateSnapshot {
        RateSnapshot::new(
            "USD",
            BTreeMap::from([
                ("JPY".to_string(), 150.004),
                ("EUR".to_string(), 0.9),
                ("XYZ".to_string(), 3.14159),
            ]),
        )
    }

    #[test]
    fn test_clock_lists_every_zone() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let view = render_clock(now, &WORLD_CLOCK_ZONES);
        assert_eq!(view.entries.len(), 24);
        assert_eq!(view.entries[0].zone, "UTC");
        assert_eq!(view.entries[0].time, "2024-01-15 12:00:00");
        let tokyo = view
            .entries
            .iter()
            .find(|e| e.zone == "Asia/Tokyo")
            .map(|e| e.time.as_str());
        assert_eq!(tokyo, Some("2024-01-15 21:00:00"));
    }

    #[test]
    fn test_rate_list_sorted_ascending() {
        let catalog = CurrencyCatalog::default();
        let view = render_rate_list(&Ok(snapshot()), &catalog);
        let RateListView::Rates { rows, options } = view else {
            panic!("expected rates");
        };
        let codes = rows.iter().map(|r| r.code.as_str()).collect::<Vec<_>>();
        assert_eq!(codes, vec!["EUR", "XYZ", "JPY"]);
        assert_eq!(rows[0].label, "Eurozone Euro (EUR)");
        assert_eq!(rows[0].rate, "0.9");
        assert_eq!(rows[1].label, "XYZ (XYZ)");
        assert_eq!(rows[1].rate, "3.14");
        assert_eq!(rows[2].rate, "150.0");
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].value, "EUR");
    }

    #[test]
    fn test_rate_list_error_message() {
        let catalog = CurrencyCatalog::default();
        let view = render_rate_list(&Err(AppError::StatusError(502)), &catalog);
        assert_eq!(
            view,
            RateListView::Error {
                message: "Error fetching data: upstream responded with status 502".to_string()
            }
        );
    }

    #[test]
    fn test_chart_applies_look_back_window() {
        let catalog = CurrencyCatalog::default();
        let now = Utc::now();
        let mut series = HistorySeries::default();
        series.push(HistoryPoint {
            timestamp: now - Duration::days(10),
            rate: 149.98,
        });
        series.push(HistoryPoint {
            timestamp: now,
            rate: 150.02,
        });
        let week = render_chart("JPY", "USD", Some(&series), &catalog, TimeRange::Week, now);
        let month = render_chart("JPY", "USD", Some(&series), &catalog, TimeRange::Month, now);
        assert_eq!(week.title(), "Live Exchange Rate for Japan Yen (USD)");
        match (week, month) {
            (
                ChartView::Series { points: week, .. },
                ChartView::Series { points: month, .. },
            ) => {
                assert_eq!(week.len(), 1);
                assert_eq!(month.len(), 2);
                assert_eq!(week[0].rate, 150.02);
            }
            _ => panic!("expected series"),
        }
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(render_rate_unavailable("JPY").title(), "Rate for JPY not available.");
        assert_eq!(
            render_chart_error(&AppError::ReqwestError("connection refused".into())).title(),
            "Error fetching data: connection refused"
        );
    }
}
