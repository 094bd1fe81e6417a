use crate::models::{ClickLog, ImpressionLog};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickSummary {
    pub impressions: u64,
    pub unique_clicks: u64,
    pub total_clicks: u64,
    pub ctr_unique: f64,
    pub ctr_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStats {
    pub source: String,
    pub impressions: u64,
    pub unique_clicks: u64,
    pub total_clicks: u64,
    pub ctr_unique: f64,
    pub ctr_total: f64,
}

fn ratio(clicks: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        0.0
    } else {
        clicks as f64 / impressions as f64
    }
}

/// Overall exposure/click counters. Unique clicks count distinct impressions
/// that received at least one click; total clicks count every click row.
pub fn click_summary(impressions: &[ImpressionLog], clicks: &[ClickLog]) -> ClickSummary {
    let unique: HashSet<Uuid> = clicks.iter().map(|c| c.impression_log_id).collect();
    let impression_count = impressions.len() as u64;
    let unique_clicks = unique.len() as u64;
    let total_clicks = clicks.len() as u64;

    ClickSummary {
        impressions: impression_count,
        unique_clicks,
        total_clicks,
        ctr_unique: ratio(unique_clicks, impression_count),
        ctr_total: ratio(total_clicks, impression_count),
    }
}

/// Per-source exposure/click breakdown, sorted by total CTR descending.
pub fn source_stats(impressions: &[ImpressionLog], clicks: &[ClickLog]) -> Vec<SourceStats> {
    let mut source_by_log: HashMap<Uuid, &str> = HashMap::new();
    let mut impressions_by_source: HashMap<&str, u64> = HashMap::new();

    for log in impressions {
        source_by_log.insert(log.id, log.source.as_str());
        *impressions_by_source.entry(log.source.as_str()).or_insert(0) += 1;
    }

    let mut total_by_source: HashMap<&str, u64> = HashMap::new();
    let mut clicked_logs_by_source: HashMap<&str, HashSet<Uuid>> = HashMap::new();

    for click in clicks {
        // Clicks on impressions outside the slice are ignored.
        if let Some(&source) = source_by_log.get(&click.impression_log_id) {
            *total_by_source.entry(source).or_insert(0) += 1;
            clicked_logs_by_source
                .entry(source)
                .or_default()
                .insert(click.impression_log_id);
        }
    }

    let mut stats: Vec<SourceStats> = impressions_by_source
        .into_iter()
        .map(|(source, imps)| {
            let total = total_by_source.get(source).copied().unwrap_or(0);
            let unique = clicked_logs_by_source
                .get(source)
                .map(|s| s.len() as u64)
                .unwrap_or(0);

            SourceStats {
                source: source.to_string(),
                impressions: imps,
                unique_clicks: unique,
                total_clicks: total,
                ctr_unique: ratio(unique, imps),
                ctr_total: ratio(total, imps),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.ctr_total
            .partial_cmp(&a.ctr_total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn impression(source: &str) -> ImpressionLog {
        ImpressionLog::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            source.to_string(),
            "test".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_click_summary_counts_unique_and_total() {
        let a = impression("CONTENT_BASED_EXPLOIT");
        let b = impression("TRENDING_FALLBACK_EXPLOIT");
        let clicks = vec![
            ClickLog::new(a.id, a.user_id, a.content_id),
            ClickLog::new(a.id, a.user_id, a.content_id),
        ];

        let summary = click_summary(&[a, b], &clicks);
        assert_eq!(summary.impressions, 2);
        assert_eq!(summary.unique_clicks, 1);
        assert_eq!(summary.total_clicks, 2);
        assert!((summary.ctr_unique - 0.5).abs() < 1e-9);
        assert!((summary.ctr_total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_source_stats_breakdown() {
        let a = impression("CONTENT_BASED_EXPLOIT");
        let b = impression("CONTENT_BASED_EXPLOIT");
        let c = impression("COLLABORATIVE_EXPLOIT");
        let clicks = vec![ClickLog::new(a.id, a.user_id, a.content_id)];

        let stats = source_stats(&[a, b, c], &clicks);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].source, "CONTENT_BASED_EXPLOIT");
        assert_eq!(stats[0].impressions, 2);
        assert_eq!(stats[0].unique_clicks, 1);
        assert_eq!(stats[1].total_clicks, 0);
    }
}
