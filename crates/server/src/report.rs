//! Customer PDF report generation.
//!
//! Rendering strategy: `genpdf` (pure Rust). The document carries a
//! title, the date-range statement, one table-plus-bar block per
//! aggregation, a page break and the endpoint status table; every page is
//! decorated with its page number. Fonts are loaded from the configured
//! font directories (Liberation family).

use crate::config::ReportConfig;
use crate::entity::endpoint;
use crate::error::ApiError;
use crate::stats::AlertStats;
use genpdf::elements::{Break, FrameCellDecorator, PageBreak, Paragraph, TableLayout};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element, SimplePageDecorator, fonts};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const COMPACT_DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year][month][day]");

/// Widest bar drawn in the chart column of an aggregation table.
const BAR_WIDTH: u64 = 30;

/// Everything needed to render one report, assembled before any PDF work
/// so a rendering failure cannot leave partial state behind.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub company_name: String,
    pub after: OffsetDateTime,
    pub before: OffsetDateTime,
    pub stats: AlertStats,
    /// (endpoint name, is_active) for every endpoint of the customer.
    pub endpoints: Vec<(String, bool)>,
}

impl ReportData {
    pub fn build(
        company_name: String,
        after: OffsetDateTime,
        before: OffsetDateTime,
        stats: AlertStats,
        endpoints: Vec<endpoint::Model>,
    ) -> Self {
        ReportData {
            company_name,
            after,
            before,
            stats,
            endpoints: endpoints
                .into_iter()
                .map(|e| (e.name, e.is_active))
                .collect(),
        }
    }

    /// Download filename: `{company}_report_{YYYYMMDD}-{YYYYMMDD}.pdf`.
    pub fn filename(&self) -> String {
        format!(
            "{}_report_{}-{}.pdf",
            self.company_name,
            self.after
                .format(COMPACT_DATE_FORMAT)
                .unwrap_or_default(),
            self.before
                .format(COMPACT_DATE_FORMAT)
                .unwrap_or_default(),
        )
    }
}

fn load_font_family(
    config: &ReportConfig,
) -> Result<fonts::FontFamily<fonts::FontData>, ApiError> {
    config
        .font_dirs
        .iter()
        .filter(|dir| std::path::Path::new(dir).exists())
        .find_map(|dir| fonts::from_files(dir, "LiberationSans", None).ok())
        .ok_or_else(|| {
            ApiError::Report(format!(
                "no usable font family found in {:?}; install the Liberation fonts",
                config.font_dirs
            ))
        })
}

/// Append one aggregation block: a bold heading and a three-column table
/// (key, count, proportional bar standing in for the chart).
fn push_aggregation_block(
    doc: &mut Document,
    heading: &str,
    key_header: &str,
    rows: &[(String, u64)],
) -> Result<(), ApiError> {
    doc.push(Paragraph::new(heading).styled(Style::new().bold().with_font_size(14)));
    doc.push(Break::new(0.3));

    let mut table = TableLayout::new(vec![3, 1, 3]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let header_style = Style::new().bold();
    table
        .row()
        .element(Paragraph::new(key_header).styled(header_style))
        .element(Paragraph::new("Count").styled(header_style))
        .element(Paragraph::new("Chart").styled(header_style))
        .push()
        .map_err(|e| ApiError::Report(e.to_string()))?;

    let max = rows.iter().map(|(_, count)| *count).max().unwrap_or(0);
    for (key, count) in rows {
        let bar = if max == 0 {
            String::new()
        } else {
            "#".repeat(((count * BAR_WIDTH).div_ceil(max)) as usize)
        };
        table
            .row()
            .element(Paragraph::new(key.clone()))
            .element(Paragraph::new(count.to_string()))
            .element(Paragraph::new(bar))
            .push()
            .map_err(|e| ApiError::Report(e.to_string()))?;
    }

    doc.push(table);
    doc.push(Break::new(1.0));
    Ok(())
}

/// Render the report into PDF bytes. A customer with zero alerts in range
/// still yields a well-formed document with empty tables.
pub fn render_pdf(data: &ReportData, config: &ReportConfig) -> Result<Vec<u8>, ApiError> {
    let font_family = load_font_family(config)?;

    let mut doc = Document::new(font_family);
    doc.set_title(format!("Report for {}", data.company_name));
    doc.set_minimal_conformance();
    doc.set_line_spacing(1.25);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(15);
    decorator.set_header(|page| {
        Paragraph::new(format!("Page {page}"))
            .aligned(Alignment::Right)
            .styled(Style::new().with_font_size(10))
    });
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new(format!("Report for {}", data.company_name))
            .styled(Style::new().bold().with_font_size(18)),
    );
    doc.push(Break::new(0.5));
    doc.push(Paragraph::new(format!(
        "Data provided in this document is gathered between {} and {}",
        data.after.format(DATE_FORMAT).unwrap_or_default(),
        data.before.format(DATE_FORMAT).unwrap_or_default(),
    )));
    doc.push(Break::new(1.0));

    let severity_rows: Vec<(String, u64)> = data
        .stats
        .severity_stats
        .iter()
        .map(|s| (s.severity.clone(), s.count))
        .collect();
    push_aggregation_block(&mut doc, "Alerts Summary", "Severity", &severity_rows)?;

    let day_rows: Vec<(String, u64)> = data
        .stats
        .event_counts
        .iter()
        .map(|d| (d.date.clone(), d.count))
        .collect();
    push_aggregation_block(&mut doc, "Event Counts by Date", "Date", &day_rows)?;

    let status_rows: Vec<(String, u64)> = data
        .stats
        .status_stats
        .iter()
        .map(|s| (s.status.clone(), s.count))
        .collect();
    push_aggregation_block(&mut doc, "Alert Status Distribution", "Status", &status_rows)?;

    let source_rows: Vec<(String, u64)> = data
        .stats
        .source_stats
        .iter()
        .map(|s| (s.source.clone(), s.count))
        .collect();
    push_aggregation_block(&mut doc, "Alert Sources", "Source", &source_rows)?;

    doc.push(PageBreak::new());

    doc.push(Paragraph::new("Endpoint Status").styled(Style::new().bold().with_font_size(14)));
    doc.push(Break::new(0.3));
    let mut table = TableLayout::new(vec![3, 1]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    table
        .row()
        .element(Paragraph::new("Endpoint").styled(Style::new().bold()))
        .element(Paragraph::new("Is Active").styled(Style::new().bold()))
        .push()
        .map_err(|e| ApiError::Report(e.to_string()))?;
    for (name, is_active) in &data.endpoints {
        table
            .row()
            .element(Paragraph::new(name.clone()))
            .element(Paragraph::new(is_active.to_string()))
            .push()
            .map_err(|e| ApiError::Report(e.to_string()))?;
    }
    doc.push(table);

    let mut out = Vec::new();
    doc.render(&mut out)
        .map_err(|e| ApiError::Report(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::alert_stats;
    use time::macros::datetime;

    fn empty_report() -> ReportData {
        ReportData {
            company_name: "Acme".into(),
            after: datetime!(2024-12-01 00:00 UTC),
            before: datetime!(2024-12-07 00:00 UTC),
            stats: alert_stats(&[]),
            endpoints: vec![("web-01".into(), true), ("db-01".into(), false)],
        }
    }

    #[test]
    fn builder_keeps_endpoint_order_and_activity() {
        let data = empty_report();
        assert_eq!(
            data.endpoints,
            vec![("web-01".to_string(), true), ("db-01".to_string(), false)]
        );
        assert!(data.stats.severity_stats.is_empty());
    }

    #[test]
    fn filename_carries_company_and_range() {
        assert_eq!(
            empty_report().filename(),
            "Acme_report_20241201-20241207.pdf"
        );
    }

    #[test]
    fn zero_alert_report_renders_when_fonts_available() {
        let config = ReportConfig::default();
        let has_fonts = config
            .font_dirs
            .iter()
            .any(|dir| std::path::Path::new(dir).exists());
        if !has_fonts {
            // Host without Liberation fonts; rendering is covered where
            // the fonts exist.
            return;
        }
        let bytes = render_pdf(&empty_report(), &config).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn missing_fonts_reported_as_render_error() {
        let config = ReportConfig {
            font_dirs: vec!["/nonexistent/font/dir".into()],
        };
        assert!(matches!(
            render_pdf(&empty_report(), &config),
            Err(ApiError::Report(_))
        ));
    }
}
