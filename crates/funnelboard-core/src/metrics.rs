use std::collections::BTreeMap;

use serde::Serialize;

use funnelboard_parser::LeadRecord;

const SECONDS_PER_DAY: i64 = 86_400;

/// Headline numbers of the sales funnel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_leads: usize,
    pub qualified_leads: usize,
    pub responded_leads: usize,
    pub accepted_proposals: usize,
    pub finalized_signups: usize,
    /// Percentage of leads with a signup; `0.0` when there are no leads.
    pub conversion_rate: f64,
}

/// Stage counts only include rows carrying a lead id, matching how the sheet
/// counts them; signups count every row with a signup date.
pub fn compute_metrics<'a, I>(records: I) -> MetricsSummary
where
    I: IntoIterator<Item = &'a LeadRecord>,
{
    let mut summary = MetricsSummary::default();

    for record in records {
        if record.signup_date.is_some() {
            summary.finalized_signups += 1;
        }
        if !record.has_lead_id() {
            continue;
        }
        summary.total_leads += 1;
        if record.meets_requirements.is_reached() {
            summary.qualified_leads += 1;
        }
        if record.responded.is_reached() {
            summary.responded_leads += 1;
        }
        if record.accepted.is_reached() {
            summary.accepted_proposals += 1;
        }
    }

    summary.conversion_rate = conversion_rate(summary.finalized_signups, summary.total_leads);
    summary
}

pub fn conversion_rate(finalized_signups: usize, total_leads: usize) -> f64 {
    if total_leads == 0 {
        0.0
    } else {
        finalized_signups as f64 / total_leads as f64 * 100.0
    }
}

/// Closed sales per consultant. Unlike `accepted_proposals`, a sale needs the
/// exact affirmative marker in the `Aceitou` column.
pub fn sales_by_consultant<'a, I>(records: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a LeadRecord>,
{
    let mut sales = BTreeMap::new();
    for record in records {
        if !record.has_lead_id() || !record.accepted.is_affirmative() {
            continue;
        }
        if let Some(consultant) = &record.consultant {
            *sales.entry(consultant.clone()).or_insert(0) += 1;
        }
    }
    sales
}

/// Whole days between first message and signup, floored. Negative when the
/// message is dated after the signup.
pub fn closure_days(record: &LeadRecord) -> Option<i64> {
    let signup = record.signup_date?;
    let message = record.message_date?;
    Some((signup - message).num_seconds().div_euclid(SECONDS_PER_DAY))
}

pub fn closure_time_distribution<'a, I>(records: I) -> Vec<i64>
where
    I: IntoIterator<Item = &'a LeadRecord>,
{
    records.into_iter().filter_map(closure_days).collect()
}

pub const FUNNEL_LABELS: [&str; 5] = [
    "Leads",
    "Leads Qualificados",
    "Leads Respondidos",
    "Propostas Aceitas",
    "Assinaturas Finalizadas",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelStage {
    pub label: &'static str,
    pub count: usize,
}

pub fn funnel_stages(summary: &MetricsSummary) -> Vec<FunnelStage> {
    let counts = [
        summary.total_leads,
        summary.qualified_leads,
        summary.responded_leads,
        summary.accepted_proposals,
        summary.finalized_signups,
    ];
    FUNNEL_LABELS
        .into_iter()
        .zip(counts)
        .map(|(label, count)| FunnelStage { label, count })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Splits `days` into at most `bins` equal-width buckets spanning the observed range.
pub fn histogram_bins(days: &[i64], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (days.iter().min(), days.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            start: min as f64 - 0.5,
            end: max as f64 + 0.5,
            count: days.len(),
        }];
    }

    let width = (max - min) as f64 / bins as f64;
    let mut counts = vec![0usize; bins];
    for &day in days {
        let index = (((day - min) as f64) / width).floor() as usize;
        counts[index.min(bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| {
            let start = min as f64 + index as f64 * width;
            HistogramBin {
                start,
                end: start + width,
                count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_rate_guards_division_by_zero() {
        assert_eq!(conversion_rate(0, 0), 0.0);
        assert_eq!(conversion_rate(3, 0), 0.0);
        assert_eq!(conversion_rate(1, 4), 25.0);
    }

    #[test]
    fn histogram_spans_the_observed_range() {
        let bins = histogram_bins(&[0, 5, 10, 10], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[0].end, 5.0);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 3);
        assert_eq!(bins.iter().map(|bin| bin.count).sum::<usize>(), 4);
    }

    #[test]
    fn histogram_handles_degenerate_input() {
        assert!(histogram_bins(&[], 20).is_empty());
        assert!(histogram_bins(&[3], 0).is_empty());

        let single = histogram_bins(&[7, 7, 7], 20);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 3);
        assert!(single[0].start < 7.0 && single[0].end > 7.0);
    }

    #[test]
    fn histogram_keeps_negative_durations() {
        let bins = histogram_bins(&[-4, 0, 4], 4);
        assert_eq!(bins[0].start, -4.0);
        assert_eq!(bins.iter().map(|bin| bin.count).sum::<usize>(), 3);
        assert_eq!(bins[3].count, 1);
    }
}
