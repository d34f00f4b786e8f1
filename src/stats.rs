// SPDX-License-Identifier: AGPL-3.0-or-later

//! Aggregation over recorded efficiency entries.
//!
//! Pure functions only: the handlers load entries and hand them here.
//! Dashboards report what was actually recorded; an empty log produces
//! empty trends and zeroed totals.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate};

use crate::models::{CategorySlice, EfficiencyEntry, TeamStats, TrendPoint, UsageStats};

/// Monday and Sunday of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
    let sunday = monday + Days::new(6);
    (monday, sunday)
}

/// Saved hours as a percentage of the estimate; zero when the estimate is
/// not positive.
pub fn efficiency_percentage(estimate_hours: f64, gained_hours: f64) -> f64 {
    if estimate_hours > 0.0 {
        gained_hours / estimate_hours * 100.0
    } else {
        0.0
    }
}

/// Aggregate usage statistics for a set of entries.
pub fn usage_stats(entries: &[EfficiencyEntry]) -> UsageStats {
    let total_time_saved: f64 = entries.iter().map(|e| e.efficiency_gained_hours).sum();

    let (gained, estimated) = entries
        .iter()
        .filter(|e| e.original_estimate_hours > 0.0)
        .fold((0.0, 0.0), |(g, o), e| {
            (g + e.efficiency_gained_hours, o + e.original_estimate_hours)
        });
    let average_efficiency = efficiency_percentage(estimated, gained);

    let copilot_usage_rate = if entries.is_empty() {
        0.0
    } else {
        let used = entries.iter().filter(|e| e.copilot_used == "Yes").count();
        used as f64 / entries.len() as f64 * 100.0
    };

    UsageStats {
        total_time_saved,
        total_entries: entries.len(),
        average_efficiency,
        copilot_usage_rate,
    }
}

/// Per-team dashboard line.
pub fn team_stats(team_name: &str, entries: &[EfficiencyEntry]) -> TeamStats {
    let usage = usage_stats(entries);
    let developers: BTreeSet<&str> = entries.iter().map(|e| e.developer_name.as_str()).collect();
    TeamStats {
        team_name: team_name.to_string(),
        total_time_saved: usage.total_time_saved,
        total_entries: usage.total_entries,
        average_efficiency: usage.average_efficiency,
        copilot_usage_rate: usage.copilot_usage_rate,
        developers_count: developers.len(),
    }
}

/// Monthly trend points keyed by the week-start month, oldest first.
pub fn monthly_trends(entries: &[EfficiencyEntry]) -> Vec<TrendPoint> {
    bucketed_trends(entries, |e| format!("{:04}-{:02}", e.week.year(), e.week.month()))
}

/// Daily trend points over the `days` days ending at `today`, oldest first.
///
/// Entries are bucketed by the date they were recorded, not the week they
/// describe.
pub fn daily_trends(entries: &[EfficiencyEntry], today: NaiveDate, days: u64) -> Vec<TrendPoint> {
    let cutoff = today - Days::new(days.saturating_sub(1));
    let recent: Vec<EfficiencyEntry> = entries
        .iter()
        .filter(|e| {
            let recorded = e.timestamp.date_naive();
            recorded >= cutoff && recorded <= today
        })
        .cloned()
        .collect();
    bucketed_trends(&recent, |e| e.timestamp.date_naive().to_string())
}

/// Time saved per category, largest first.
pub fn category_breakdown(entries: &[EfficiencyEntry]) -> Vec<CategorySlice> {
    let total_saved: f64 = entries.iter().map(|e| e.efficiency_gained_hours).sum();

    let mut buckets: BTreeMap<&str, Vec<&EfficiencyEntry>> = BTreeMap::new();
    for entry in entries {
        buckets.entry(entry.category.as_str()).or_default().push(entry);
    }

    let mut slices: Vec<CategorySlice> = buckets
        .into_iter()
        .map(|(category, bucket)| {
            let time_saved: f64 = bucket.iter().map(|e| e.efficiency_gained_hours).sum();
            let percentage = if total_saved > 0.0 {
                time_saved / total_saved * 100.0
            } else {
                0.0
            };
            CategorySlice {
                category: category.to_string(),
                time_saved,
                entries: bucket.len(),
                percentage,
            }
        })
        .collect();

    slices.sort_by(|a, b| {
        b.time_saved
            .partial_cmp(&a.time_saved)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    slices
}

fn bucketed_trends<F>(entries: &[EfficiencyEntry], bucket_of: F) -> Vec<TrendPoint>
where
    F: Fn(&EfficiencyEntry) -> String,
{
    let mut buckets: BTreeMap<String, Vec<&EfficiencyEntry>> = BTreeMap::new();
    for entry in entries {
        buckets.entry(bucket_of(entry)).or_default().push(entry);
    }

    buckets
        .into_iter()
        .map(|(period, bucket)| {
            let owned: Vec<EfficiencyEntry> = bucket.into_iter().cloned().collect();
            let usage = usage_stats(&owned);
            TrendPoint {
                period,
                time_saved: usage.total_time_saved,
                entries: usage.total_entries,
                efficiency_rate: usage.average_efficiency,
                copilot_usage: usage.copilot_usage_rate,
            }
        })
        .collect()
}
