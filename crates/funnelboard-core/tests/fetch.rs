use std::time::Duration;

use anyhow::Result;
use funnelboard_core::config::{CycleOptions, DashboardConfig};
use funnelboard_core::dashboard::refresh;
use funnelboard_core::error::DashboardError;
use funnelboard_core::fetch::{HttpSheetSource, SheetSource, StaticSheetSource};
use funnelboard_core::periods::PeriodSelection;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CSV: &str = "Number_leads,Data da assinatura,Data da mensagem,Atende aos requisitos,Respondeu as msgns,Aceitou,Consultor\n\
1,2024-03-01,2024-02-20,ok,ok,SIM,Ana\n\
2,,,-,-,-,Bruno\n";

#[tokio::test]
async fn downloads_the_published_sheet() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CSV))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpSheetSource::new(format!("{}/pub", server.uri()), Duration::from_secs(5))?;
    let body = source.fetch().await?;
    assert_eq!(body, CSV.as_bytes());
    Ok(())
}

#[tokio::test]
async fn refresh_computes_metrics_from_http() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CSV))
        .mount(&server)
        .await;

    let config = DashboardConfig {
        source_url: format!("{}/pub", server.uri()),
        ..DashboardConfig::default()
    };
    let source = HttpSheetSource::from_config(&config)?;

    let snapshot = refresh(&source, &config.cycle_options(), PeriodSelection::All).await?;
    assert_eq!(snapshot.summary.total_leads, 2);
    assert_eq!(snapshot.summary.conversion_rate, 50.0);
    assert_eq!(snapshot.closure_days, vec![10]);
    Ok(())
}

#[tokio::test]
async fn http_errors_abort_the_cycle() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = HttpSheetSource::new(format!("{}/gone", server.uri()), Duration::from_secs(5))?;
    let err = refresh(&source, &CycleOptions::default(), PeriodSelection::All)
        .await
        .unwrap_err();

    match &err {
        DashboardError::HttpStatus { status, url } => {
            assert_eq!(*status, 404);
            assert!(url.ends_with("/gone"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert!(err.is_fetch());
    Ok(())
}

#[tokio::test]
async fn slow_hosts_hit_the_client_timeout() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(CSV)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let source = HttpSheetSource::new(server.uri(), Duration::from_millis(200))?;
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, DashboardError::Fetch(_)));
    Ok(())
}

#[tokio::test]
async fn static_source_reads_local_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("leads.csv");
    std::fs::write(&file, CSV)?;

    let source = StaticSheetSource::from_file(&file)?;
    assert!(source.describe().ends_with("leads.csv"));
    assert_eq!(source.fetch().await?, CSV.as_bytes());
    Ok(())
}
