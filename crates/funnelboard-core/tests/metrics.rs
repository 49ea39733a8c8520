use chrono::{NaiveDate, NaiveDateTime};
use funnelboard_core::metrics::{
    closure_time_distribution, compute_metrics, conversion_rate, funnel_stages,
    sales_by_consultant, MetricsSummary, FUNNEL_LABELS,
};
use funnelboard_core::periods::{derive_periods, filter_by_period, PeriodKey, PeriodSelection};
use funnelboard_core::{LeadRecord, StageMarker};

fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

fn marker(value: &str) -> StageMarker {
    StageMarker::from_text(value)
}

fn lead(id: &str) -> LeadRecord {
    LeadRecord {
        lead_id: Some(id.to_string()),
        meets_requirements: marker("-"),
        responded: marker("-"),
        accepted: marker("-"),
        ..LeadRecord::default()
    }
}

fn signed(id: &str, consultant: &str, message: NaiveDateTime, signup: NaiveDateTime) -> LeadRecord {
    LeadRecord {
        lead_id: Some(id.to_string()),
        signup_date: Some(signup),
        message_date: Some(message),
        meets_requirements: marker("ok"),
        responded: marker("ok"),
        accepted: marker("SIM"),
        consultant: Some(consultant.to_string()),
    }
}

fn sample() -> Vec<LeadRecord> {
    vec![
        lead("1"),
        signed("2", "Ana", date(2024, 2, 20), date(2024, 3, 1)),
        signed("3", "Bruno", date(2024, 3, 2), date(2024, 3, 28)),
        signed("4", "Ana", date(2024, 4, 1), date(2024, 4, 3)),
        LeadRecord {
            accepted: marker("NAO"),
            consultant: Some("Carla".into()),
            ..lead("5")
        },
    ]
}

#[test]
fn worked_example_matches_expected_metrics() {
    let records = vec![
        lead("1"),
        signed("2", "Ana", date(2024, 2, 20), date(2024, 3, 1)),
    ];

    let summary = compute_metrics(&records);
    assert_eq!(
        summary,
        MetricsSummary {
            total_leads: 2,
            qualified_leads: 1,
            responded_leads: 1,
            accepted_proposals: 1,
            finalized_signups: 1,
            conversion_rate: 50.0,
        }
    );
    assert_eq!(closure_time_distribution(&records), vec![10]);

    let sales = sales_by_consultant(&records);
    assert_eq!(sales.len(), 1);
    assert_eq!(sales.get("Ana"), Some(&1));
}

#[test]
fn empty_input_yields_zeroes() {
    let records: Vec<LeadRecord> = Vec::new();
    let summary = compute_metrics(&records);
    assert_eq!(summary, MetricsSummary::default());
    assert_eq!(summary.conversion_rate, 0.0);
    assert!(sales_by_consultant(&records).is_empty());
    assert!(closure_time_distribution(&records).is_empty());
    assert_eq!(derive_periods(&records), vec![PeriodSelection::All]);
}

#[test]
fn conversion_rate_is_exact_ratio() {
    let records = sample();
    let summary = compute_metrics(&records);
    assert_eq!(summary.total_leads, 5);
    assert_eq!(summary.finalized_signups, 3);
    assert_eq!(summary.conversion_rate, 3_f64 / 5_f64 * 100.0);
    assert_eq!(summary.conversion_rate, conversion_rate(3, 5));
}

#[test]
fn accepted_counts_differ_between_headline_and_consultant_chart() {
    let records = sample();
    let summary = compute_metrics(&records);
    // "NAO" is not the sentinel, so the headline counts it as accepted
    assert_eq!(summary.accepted_proposals, 4);

    let sales = sales_by_consultant(&records);
    assert_eq!(sales.get("Ana"), Some(&2));
    assert_eq!(sales.get("Bruno"), Some(&1));
    assert_eq!(sales.get("Carla"), None);
    assert_eq!(sales.values().sum::<usize>(), 3);
}

#[test]
fn rows_without_lead_id_only_count_as_signups() {
    let mut orphan = signed("x", "Ana", date(2024, 1, 1), date(2024, 1, 5));
    orphan.lead_id = None;
    let records = vec![orphan];

    let summary = compute_metrics(&records);
    assert_eq!(summary.total_leads, 0);
    assert_eq!(summary.qualified_leads, 0);
    assert_eq!(summary.finalized_signups, 1);
    assert_eq!(summary.conversion_rate, 0.0);
    assert!(sales_by_consultant(&records).is_empty());
    assert_eq!(closure_time_distribution(&records), vec![4]);
}

#[test]
fn blank_stage_cells_count_as_reached() {
    let record = LeadRecord {
        meets_requirements: StageMarker::Blank,
        ..lead("9")
    };
    let summary = compute_metrics(std::slice::from_ref(&record));
    assert_eq!(summary.qualified_leads, 1);
    assert_eq!(summary.responded_leads, 0);
}

#[test]
fn closure_times_skip_missing_dates_and_keep_negatives() {
    let mut backwards = signed("1", "Ana", date(2024, 3, 10), date(2024, 3, 1));
    let mut no_message = signed("2", "Ana", date(2024, 3, 1), date(2024, 3, 2));
    no_message.message_date = None;
    let same_day = LeadRecord {
        message_date: Some(date(2024, 3, 1) + chrono::Duration::hours(20)),
        signup_date: Some(date(2024, 3, 2) + chrono::Duration::hours(8)),
        ..lead("3")
    };
    backwards.consultant = None;

    let records = vec![backwards, no_message, same_day, lead("4")];
    assert_eq!(closure_time_distribution(&records), vec![-9, 0]);
}

#[test]
fn closure_days_floor_partial_days() {
    let record = LeadRecord {
        message_date: Some(date(2024, 3, 2) + chrono::Duration::hours(6)),
        signup_date: Some(date(2024, 3, 2)),
        ..lead("1")
    };
    assert_eq!(closure_time_distribution(std::slice::from_ref(&record)), vec![-1]);
}

#[test]
fn filtered_counts_never_exceed_totals() {
    let records = sample();
    let totals = compute_metrics(&records);

    for selection in derive_periods(&records) {
        let subset = compute_metrics(filter_by_period(&records, &selection));
        assert!(subset.total_leads <= totals.total_leads);
        assert!(subset.qualified_leads <= totals.qualified_leads);
        assert!(subset.responded_leads <= totals.responded_leads);
        assert!(subset.accepted_proposals <= totals.accepted_proposals);
        assert!(subset.finalized_signups <= totals.finalized_signups);
    }
}

#[test]
fn records_without_signup_only_appear_unfiltered() {
    let records = sample();
    let periods = derive_periods(&records);
    assert_eq!(
        periods,
        vec![
            PeriodSelection::All,
            PeriodSelection::Month(PeriodKey::new(2024, 4).expect("key")),
            PeriodSelection::Month(PeriodKey::new(2024, 3).expect("key")),
        ]
    );

    for selection in &periods[1..] {
        let subset = filter_by_period(&records, selection);
        assert!(subset.iter().all(|record| record.signup_date.is_some()));
    }
    assert_eq!(filter_by_period(&records, &PeriodSelection::All).len(), records.len());

    let march = PeriodSelection::Month(PeriodKey::new(2024, 3).expect("key"));
    let ids: Vec<&str> = filter_by_period(&records, &march)
        .iter()
        .filter_map(|record| record.lead_id.as_deref())
        .collect();
    assert_eq!(ids, vec!["2", "3"]);

    let absent = PeriodSelection::Month(PeriodKey::new(2019, 1).expect("key"));
    assert!(filter_by_period(&records, &absent).is_empty());
}

#[test]
fn filtering_leaves_source_records_untouched() {
    let records = sample();
    let before = records.clone();
    let march = PeriodSelection::Month(PeriodKey::new(2024, 3).expect("key"));
    let _ = filter_by_period(&records, &march);
    assert_eq!(records, before);
}

#[test]
fn compute_metrics_is_idempotent() {
    let records = sample();
    assert_eq!(compute_metrics(&records), compute_metrics(&records));
    assert_eq!(sales_by_consultant(&records), sales_by_consultant(&records));
}

#[test]
fn funnel_lists_stages_in_order() {
    let summary = compute_metrics(&sample());
    let funnel = funnel_stages(&summary);
    let labels: Vec<&str> = funnel.iter().map(|stage| stage.label).collect();
    assert_eq!(labels, FUNNEL_LABELS.to_vec());
    let counts: Vec<usize> = funnel.iter().map(|stage| stage.count).collect();
    assert_eq!(counts, vec![5, 3, 3, 4, 3]);
}
