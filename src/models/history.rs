use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub rate: f64,
}

/// Append-only samples of one currency, oldest first
#[derive(Debug, Clone, Default)]
pub struct HistorySeries {
    points: VecDeque<HistoryPoint>,
    limit: Option<usize>,
}

impl HistorySeries {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            points: VecDeque::new(),
            limit,
        }
    }
    /// Timestamps never go backwards: an earlier one is clamped to the last point's.
    pub fn push(&mut self, mut point: HistoryPoint) {
        if let Some(last) = self.points.back() {
            if point.timestamp < last.timestamp {
                point.timestamp = last.timestamp;
            }
        }
        self.points.push_back(point);
        if let Some(limit) = self.limit {
            while self.points.len() > limit {
                self.points.pop_front();
            }
        }
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    pub fn last(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }
    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }
    /// Points at or after `cutoff`
    pub fn since(&self, cutoff: DateTime<Utc>) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter().filter(move |p| p.timestamp >= cutoff)
    }
}

/// Per-session history of charted currencies
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    series: HashMap<String, HistorySeries>,
    limit: Option<usize>,
}

impl HistoryStore {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            series: HashMap::new(),
            limit,
        }
    }
    pub fn append(&mut self, code: &str, point: HistoryPoint) {
        let limit = self.limit;
        self.series
            .entry(code.to_string())
            .or_insert_with(|| HistorySeries::new(limit))
            .push(point);
    }
    pub fn series(&self, code: &str) -> Option<&HistorySeries> {
        self.series.get(code)
    }
    /// Number of points recorded for `code`
    pub fn len(&self, code: &str) -> usize {
        self.series.get(code).map(HistorySeries::len).unwrap_or_default()
    }
    #[cfg(test)]
    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}
