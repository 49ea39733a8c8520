use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use funnelboard_parser::{parse_lead_sheet, LeadRecord, ParsedSheet};

use crate::config::CycleOptions;
use crate::error::Result;
use crate::fetch::SheetSource;
use crate::metrics::{
    closure_time_distribution, compute_metrics, funnel_stages, histogram_bins,
    sales_by_consultant, FunnelStage, HistogramBin, MetricsSummary,
};
use crate::periods::{derive_periods, filter_by_period, PeriodSelection};

/// What the parser kept and dropped while reading the sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    pub format: &'static str,
    pub record_count: usize,
    pub filtered_count: usize,
    pub date_parse_failures: usize,
    pub skipped_empty_rows: usize,
}

/// Everything one page render needs, computed from a single fetch.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub periods: Vec<PeriodSelection>,
    pub selection: PeriodSelection,
    pub summary: MetricsSummary,
    pub funnel: Vec<FunnelStage>,
    pub sales_by_consultant: BTreeMap<String, usize>,
    pub closure_days: Vec<i64>,
    pub closure_histogram: Vec<HistogramBin>,
    pub diagnostics: ParseDiagnostics,
}

/// Computes a snapshot from records already in memory. A month that no record
/// belongs to falls back to every period.
pub fn snapshot_from_records(
    records: &[LeadRecord],
    selection: PeriodSelection,
    histogram_bin_count: usize,
) -> DashboardSnapshot {
    let periods = derive_periods(records);
    let selection = if periods.contains(&selection) {
        selection
    } else {
        warn!(%selection, "selected period has no signups, showing all periods");
        PeriodSelection::All
    };

    let filtered = filter_by_period(records, &selection);
    let summary = compute_metrics(filtered.iter().copied());
    let closure_days = closure_time_distribution(filtered.iter().copied());
    let closure_histogram = histogram_bins(&closure_days, histogram_bin_count);

    DashboardSnapshot {
        funnel: funnel_stages(&summary),
        sales_by_consultant: sales_by_consultant(filtered.iter().copied()),
        periods,
        selection,
        summary,
        closure_days,
        closure_histogram,
        diagnostics: ParseDiagnostics {
            record_count: records.len(),
            filtered_count: filtered.len(),
            ..ParseDiagnostics::default()
        },
    }
}

pub fn snapshot_from_sheet(
    sheet: &ParsedSheet,
    selection: PeriodSelection,
    histogram_bin_count: usize,
) -> DashboardSnapshot {
    let mut snapshot = snapshot_from_records(&sheet.records, selection, histogram_bin_count);
    snapshot.diagnostics.format = sheet.format;
    snapshot.diagnostics.date_parse_failures = sheet.date_parse_failures;
    snapshot.diagnostics.skipped_empty_rows = sheet.skipped_empty_rows;
    snapshot
}

/// Parses raw workbook bytes and computes the snapshot. Any parse failure
/// fails the whole cycle.
pub fn build_snapshot(
    content: &[u8],
    options: &CycleOptions,
    selection: PeriodSelection,
) -> Result<DashboardSnapshot> {
    let sheet = parse_lead_sheet(content, &options.parse)?;
    if sheet.date_parse_failures > 0 {
        debug!(
            failures = sheet.date_parse_failures,
            "unreadable date cells treated as missing"
        );
    }
    Ok(snapshot_from_sheet(&sheet, selection, options.histogram_bins))
}

/// One refresh cycle: fetch, parse, filter, aggregate.
#[instrument(skip_all, fields(source = %source.describe(), selection = %selection))]
pub async fn refresh(
    source: &dyn SheetSource,
    options: &CycleOptions,
    selection: PeriodSelection,
) -> Result<DashboardSnapshot> {
    let started = Instant::now();
    let content = source.fetch().await?;
    let snapshot = build_snapshot(&content, options, selection)?;

    info!(
        format = snapshot.diagnostics.format,
        records = snapshot.diagnostics.record_count,
        filtered = snapshot.diagnostics.filtered_count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "dashboard refreshed"
    );
    Ok(snapshot)
}
