use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The navigable tabs of the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    #[default]
    Home,
    LiveExchange,
    MonthlyRates,
}

/// Look-back window of the chart, in days
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TimeRange {
    Week,
    Fortnight,
    #[default]
    Month,
}

impl TimeRange {
    pub fn days(self) -> u32 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Fortnight => 15,
            TimeRange::Month => 30,
        }
    }
}

impl TryFrom<u32> for TimeRange {
    type Error = String;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(TimeRange::Week),
            15 => Ok(TimeRange::Fortnight),
            30 => Ok(TimeRange::Month),
            other => Err(format!("unsupported range of {other} days, use 7, 15 or 30")),
        }
    }
}

impl From<TimeRange> for u32 {
    fn from(range: TimeRange) -> Self {
        range.days()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClockEntry {
    pub zone: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClockView {
    pub entries: Vec<ClockEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RateRow {
    pub code: String,
    pub label: String,
    pub rate: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrencyOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RateListView {
    Rates {
        rows: Vec<RateRow>,
        options: Vec<CurrencyOption>,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPoint {
    pub time: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartView {
    Placeholder {
        title: String,
    },
    Series {
        title: String,
        currency: String,
        base: String,
        range_days: u32,
        x_label: String,
        y_label: String,
        points: Vec<ChartPoint>,
    },
}

impl ChartView {
    pub fn placeholder(title: impl Into<String>) -> Self {
        ChartView::Placeholder {
            title: title.into(),
        }
    }
    pub fn title(&self) -> &str {
        match self {
            ChartView::Placeholder { title } | ChartView::Series { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "view", content = "content", rename_all = "snake_case")]
pub enum Panel {
    Home(ClockView),
    LiveExchange(RateListView),
    MonthlyRates(ChartView),
}

impl Panel {
    pub fn kind(&self) -> ActiveView {
        match self {
            Panel::Home(_) => ActiveView::Home,
            Panel::LiveExchange(_) => ActiveView::LiveExchange,
            Panel::MonthlyRates(_) => ActiveView::MonthlyRates,
        }
    }
}

/// What a session last published
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardView {
    pub tick: u64,
    pub rendered_at: DateTime<Utc>,
    pub selected_currency: Option<String>,
    pub range_days: u32,
    #[serde(flatten)]
    pub panel: Panel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_time_range_from_days() -> Result<()> {
        let range: TimeRange = serde_json::from_str("15")?;
        assert_eq!(range, TimeRange::Fortnight);
        assert_eq!(serde_json::to_string(&TimeRange::Week)?, "7");
        assert!(serde_json::from_str::<TimeRange>("10").is_err());
        assert_eq!(TimeRange::default().days(), 30);
        Ok(())
    }

    #[test]
    fn test_active_view_names() -> Result<()> {
        let view: ActiveView = serde_json::from_str("\"live_exchange\"")?;
        assert_eq!(view, ActiveView::LiveExchange);
        Ok(())
    }

    #[test]
    fn test_dashboard_view_shape() -> Result<()> {
        let view = DashboardView {
            tick: 3,
            rendered_at: Utc::now(),
            selected_currency: None,
            range_days: 30,
            panel: Panel::MonthlyRates(ChartView::placeholder("nothing yet")),
        };
        let json = serde_json::to_value(&view)?;
        assert_eq!(json["view"], "monthly_rates");
        assert_eq!(json["content"]["status"], "placeholder");
        assert_eq!(json["content"]["title"], "nothing yet");
        assert_eq!(json["tick"], 3);
        Ok(())
    }
}
