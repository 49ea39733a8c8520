//! HTML pages rendered with maud.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use tracing::warn;

use funnelboard_core::dashboard::DashboardSnapshot;
use funnelboard_core::metrics::MetricsSummary;

use crate::charts::{self, ChartError};

pub const PAGE_TITLE: &str = "Análise de Vendas";
pub const LOAD_ERROR_PREFIX: &str = "Erro ao carregar os dados";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; background: #fafafa; color: #31333f; }
main { max-width: 1180px; margin: 0 auto; padding: 24px; }
hr { border: none; border-top: 1px solid #e6e6e6; margin: 24px 0; }
.period { margin: 16px 0; }
.metrics { display: grid; grid-template-columns: repeat(6, 1fr); gap: 16px; }
.metric { background: #fff; border: 1px solid #e6e6e6; border-radius: 8px; padding: 12px; }
.metric .label { font-size: 14px; color: #6b6f7b; }
.metric .value { font-size: 32px; }
.charts { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.chart svg { width: 100%; height: auto; }
.error { background: #ffecec; border: 1px solid #ffbdbd; color: #7d1a1a; border-radius: 8px; padding: 16px; }
"#;

fn layout(refresh_secs: u64, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta http-equiv="refresh" content=(refresh_secs);
                title { (PAGE_TITLE) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                main {
                    h1 { "📊 " (PAGE_TITLE) }
                    p {
                        "Este dashboard apresenta as principais métricas e gráficos de desempenho de vendas com dados atualizados em tempo real."
                    }
                    hr;
                    (content)
                }
            }
        }
    }
}

/// Full dashboard for one snapshot.
pub fn dashboard_page(snapshot: &DashboardSnapshot, refresh_secs: u64) -> Markup {
    layout(
        refresh_secs,
        html! {
            (period_selector(snapshot))
            h2 { "📈 Principais Métricas" }
            (metric_cards(&snapshot.summary))
            hr;
            h2 { "📊 Visualizações de Dados" }
            div class="charts" {
                (chart(charts::consultant_sales_svg(&snapshot.sales_by_consultant)))
                (chart(charts::funnel_svg(&snapshot.funnel)))
            }
            (chart(charts::closure_histogram_svg(&snapshot.closure_histogram)))
        },
    )
}

/// Page shown when a refresh cycle fails. It keeps auto-refreshing.
pub fn error_page(message: &str, refresh_secs: u64) -> Markup {
    layout(
        refresh_secs,
        html! {
            div class="error" role="alert" {
                (LOAD_ERROR_PREFIX) ": " (message)
            }
        },
    )
}

fn period_selector(snapshot: &DashboardSnapshot) -> Markup {
    html! {
        form class="period" method="get" action="/" {
            label for="period" { "Selecione o Mês " }
            select id="period" name="period" onchange="this.form.submit()" {
                @for period in &snapshot.periods {
                    option value=(period.query_value()) selected[*period == snapshot.selection] {
                        (period.label())
                    }
                }
            }
            noscript { " " button type="submit" { "Aplicar" } }
        }
    }
}

fn metric_cards(summary: &MetricsSummary) -> Markup {
    let cards = [
        ("Total de Leads", summary.total_leads.to_string()),
        ("Leads Qualificados", summary.qualified_leads.to_string()),
        ("Leads Respondidos", summary.responded_leads.to_string()),
        ("Propostas Aceitas", summary.accepted_proposals.to_string()),
        ("Assinaturas Finalizadas", summary.finalized_signups.to_string()),
        ("Taxa de Conversão", format!("{:.1}%", summary.conversion_rate)),
    ];
    html! {
        div class="metrics" {
            @for (label, value) in &cards {
                div class="metric" {
                    div class="label" { (label) }
                    div class="value" { (value) }
                }
            }
        }
    }
}

fn chart(rendered: Result<String, ChartError>) -> Markup {
    match rendered {
        Ok(svg) => html! { div class="chart" { (PreEscaped(svg)) } },
        Err(err) => {
            warn!(chart = err.chart, error = %err.message, "chart rendering failed");
            html! { div class="chart error" { (err.to_string()) } }
        }
    }
}
