//! Plain-text rendering of a snapshot for the `report` command.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, ContentArrangement, Table};

use funnelboard_core::dashboard::DashboardSnapshot;

fn new_table(header: [&str; 2]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

pub fn metrics_table(snapshot: &DashboardSnapshot) -> Table {
    let mut table = new_table(["Métrica", "Valor"]);
    for stage in &snapshot.funnel {
        table.add_row(vec![stage.label.to_string(), stage.count.to_string()]);
    }
    table.add_row(vec![
        "Taxa de Conversão".to_string(),
        format!("{:.1}%", snapshot.summary.conversion_rate),
    ]);
    table
}

pub fn consultant_table(snapshot: &DashboardSnapshot) -> Table {
    let mut table = new_table(["Consultor", "Vendas"]);
    for (consultant, sales) in &snapshot.sales_by_consultant {
        table.add_row(vec![consultant.clone(), sales.to_string()]);
    }
    table
}

/// Period header, funnel counts, consultant sales and parse notes.
pub fn render_report(snapshot: &DashboardSnapshot) -> String {
    let diagnostics = &snapshot.diagnostics;
    let mut out = format!(
        "Período: {}\nFormato: {} ({} registros, {} no período)\n\n",
        snapshot.selection.label(),
        diagnostics.format,
        diagnostics.record_count,
        diagnostics.filtered_count,
    );
    out.push_str(&metrics_table(snapshot).to_string());
    out.push_str("\n\n");

    if snapshot.sales_by_consultant.is_empty() {
        out.push_str("Nenhuma venda no período.\n");
    } else {
        out.push_str(&consultant_table(snapshot).to_string());
        out.push('\n');
    }

    if let (Some(min), Some(max)) = (
        snapshot.closure_days.iter().min(),
        snapshot.closure_days.iter().max(),
    ) {
        out.push_str(&format!(
            "\nTempo de fechamento: {} vendas, de {min} a {max} dias\n",
            snapshot.closure_days.len()
        ));
    }
    if diagnostics.date_parse_failures > 0 {
        out.push_str(&format!(
            "\n{} datas ilegíveis foram ignoradas\n",
            diagnostics.date_parse_failures
        ));
    }
    out
}
