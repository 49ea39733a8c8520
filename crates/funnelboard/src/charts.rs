//! Inline SVG charts for the dashboard page.

use std::collections::BTreeMap;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

use funnelboard_core::metrics::{FunnelStage, HistogramBin};

pub const CONSULTANT_CHART_TITLE: &str = "Vendas por Consultor";
pub const FUNNEL_CHART_TITLE: &str = "Funil de Vendas";
pub const CLOSURE_CHART_TITLE: &str = "Distribuição do Tempo de Fechamento";

const NO_DATA: &str = "Sem dados";
const FONT: &str = "sans-serif";

const HALF_SIZE: (u32, u32) = (560, 380);
const FULL_SIZE: (u32, u32) = (1140, 380);

// Plotly's qualitative "Pastel" sequence.
const PASTEL: [RGBColor; 11] = [
    RGBColor(102, 197, 204),
    RGBColor(246, 207, 113),
    RGBColor(248, 156, 116),
    RGBColor(220, 176, 242),
    RGBColor(135, 197, 95),
    RGBColor(158, 185, 243),
    RGBColor(254, 136, 177),
    RGBColor(201, 219, 116),
    RGBColor(139, 224, 164),
    RGBColor(180, 151, 231),
    RGBColor(179, 179, 179),
];
const HISTOGRAM_COLOR: RGBColor = RGBColor(99, 110, 250);
const TEXT_COLOR: RGBColor = RGBColor(49, 51, 63);

#[derive(Debug, Error)]
#[error("failed to draw chart '{chart}': {message}")]
pub struct ChartError {
    pub chart: &'static str,
    pub message: String,
}

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

fn render_svg<F>(chart: &'static str, size: (u32, u32), draw: F) -> Result<String, ChartError>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<(), DrawingAreaErrorKind<std::io::Error>>,
{
    let failed = |err: &dyn std::fmt::Display| ChartError {
        chart,
        message: err.to_string(),
    };

    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE).map_err(|err| failed(&err))?;
        draw(&root).map_err(|err| failed(&err))?;
        root.present().map_err(|err| failed(&err))?;
    }
    Ok(buffer)
}

fn draw_placeholder<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, title: &str) -> DrawResult<DB> {
    let (width, height) = root.dim_in_pixel();
    let title_style = TextStyle::from((FONT, 20).into_font()).color(&TEXT_COLOR);
    root.draw_text(title, &title_style, (12, 12))?;

    let style = TextStyle::from((FONT, 16).into_font())
        .color(&TEXT_COLOR)
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw_text(NO_DATA, &style, (width as i32 / 2, height as i32 / 2))
}

/// Bar per consultant, coloured per bar.
pub fn consultant_sales_svg(sales: &BTreeMap<String, usize>) -> Result<String, ChartError> {
    render_svg(CONSULTANT_CHART_TITLE, HALF_SIZE, |root| {
        if sales.is_empty() {
            return draw_placeholder(root, CONSULTANT_CHART_TITLE);
        }
        draw_consultant_sales(root, sales)
    })
}

fn draw_consultant_sales<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    sales: &BTreeMap<String, usize>,
) -> DrawResult<DB> {
    let names: Vec<&str> = sales.keys().map(String::as_str).collect();
    let max = sales.values().copied().max().unwrap_or(0) as u32;

    let mut chart = ChartBuilder::on(root)
        .caption(CONSULTANT_CHART_TITLE, (FONT, 20))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d((0u32..names.len() as u32).into_segmented(), 0u32..max + 1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len())
        .x_desc("Consultor")
        .y_desc("Vendas")
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(index) => names
                .get(*index as usize)
                .map(|name| name.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .margin(16)
            .style_func(|value, _| {
                let index = match value {
                    SegmentValue::Exact(index) | SegmentValue::CenterOf(index) => *index as usize,
                    SegmentValue::Last => 0,
                };
                PASTEL[index % PASTEL.len()].filled()
            })
            .data(
                sales
                    .values()
                    .enumerate()
                    .map(|(index, count)| (index as u32, *count as u32)),
            ),
    )?;
    Ok(())
}

/// Centered bars, widest stage on top.
pub fn funnel_svg(stages: &[FunnelStage]) -> Result<String, ChartError> {
    render_svg(FUNNEL_CHART_TITLE, HALF_SIZE, |root| {
        if stages.is_empty() {
            return draw_placeholder(root, FUNNEL_CHART_TITLE);
        }
        draw_funnel(root, stages)
    })
}

fn draw_funnel<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, stages: &[FunnelStage]) -> DrawResult<DB> {
    let widest = stages.iter().map(|stage| stage.count).max().unwrap_or(0).max(1) as f64;
    let rows = stages.len() as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(FUNNEL_CHART_TITLE, (FONT, 20))
        .margin(12)
        .build_cartesian_2d(-widest / 2.0..widest / 2.0, 0f64..rows)?;

    let label_style = TextStyle::from((FONT, 14).into_font())
        .color(&TEXT_COLOR)
        .pos(Pos::new(HPos::Center, VPos::Center));

    for (position, stage) in stages.iter().enumerate() {
        let row = rows - 1.0 - position as f64;
        let half = stage.count as f64 / 2.0;
        let color = PASTEL[position % PASTEL.len()];

        chart.draw_series(std::iter::once(Rectangle::new(
            [(-half, row + 0.1), (half, row + 0.9)],
            color.filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{}: {}", stage.label, stage.count),
            (0.0, row + 0.5),
            label_style.clone(),
        )))?;
    }
    Ok(())
}

/// Histogram of closure days over precomputed bins.
pub fn closure_histogram_svg(bins: &[HistogramBin]) -> Result<String, ChartError> {
    render_svg(CLOSURE_CHART_TITLE, FULL_SIZE, |root| {
        if bins.is_empty() {
            return draw_placeholder(root, CLOSURE_CHART_TITLE);
        }
        draw_closure_histogram(root, bins)
    })
}

fn draw_closure_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    bins: &[HistogramBin],
) -> DrawResult<DB> {
    let start = bins.first().map(|bin| bin.start).unwrap_or(0.0);
    let end = bins.last().map(|bin| bin.end).unwrap_or(1.0);
    let tallest = bins.iter().map(|bin| bin.count).max().unwrap_or(0) as u32;

    let mut chart = ChartBuilder::on(root)
        .caption(CLOSURE_CHART_TITLE, (FONT, 20))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(start..end, 0u32..tallest + 1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Tempo de Fechamento (dias)")
        .y_desc("Quantidade")
        .x_label_formatter(&|days| format!("{days:.0}"))
        .draw()?;

    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.start, 0u32), (bin.end, bin.count as u32)],
            HISTOGRAM_COLOR.filled(),
        )
    }))?;
    Ok(())
}
