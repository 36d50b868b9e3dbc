//! Turns day records into display rows and renders them as a terminal or HTML table.

use crate::api::types::PairDayData;
use crate::config::ExplorerConfig;
use crate::dashboard::params::{DashboardParams, OrderDirection, PairDayOrderBy, DATETIME_LOCAL_FORMAT};
use crate::dashboard::state::{DashboardSnapshot, RefreshState};
use chrono::DateTime;
use serde::Serialize;
use std::fmt::Write;
use std::ops::Range;

const HEADERS: [&str; 6] = [
    "ID",
    "Token0",
    "Token1",
    "dailyVolumeToken0",
    "dailyVolumeToken1",
    "dailyVolumeUSD",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairRow {
    pub id: String,
    pub pair_url: String,
    pub token0_symbol: String,
    pub token0_url: String,
    pub token1_symbol: String,
    pub token1_url: String,
    pub daily_volume_token0: String,
    pub daily_volume_token1: String,
    pub daily_volume_usd: String,
}

impl PairRow {
    pub fn from_record(record: &PairDayData, explorer: &ExplorerConfig) -> Self {
        Self {
            id: record.id.clone(),
            pair_url: pair_explorer_url(&explorer.pair_url, &record.id),
            token0_symbol: record.token0.symbol.clone(),
            token0_url: format!("{}{}", explorer.token_url, record.token0.id),
            token1_symbol: record.token1.symbol.clone(),
            token1_url: format!("{}{}", explorer.token_url, record.token1.id),
            daily_volume_token0: record.daily_volume_token0.to_string(),
            daily_volume_token1: record.daily_volume_token1.to_string(),
            daily_volume_usd: format_usd(record.daily_volume_usd),
        }
    }

    fn cells(&self) -> [&str; 6] {
        [
            self.id.as_str(),
            self.token0_symbol.as_str(),
            self.token1_symbol.as_str(),
            self.daily_volume_token0.as_str(),
            self.daily_volume_token1.as_str(),
            self.daily_volume_usd.as_str(),
        ]
    }
}

pub fn rows(records: &[PairDayData], explorer: &ExplorerConfig) -> Vec<PairRow> {
    records
        .iter()
        .map(|record| PairRow::from_record(record, explorer))
        .collect()
}

/// Day record ids look like `<pairAddress>-<dayIndex>`; the explorer wants the address.
pub fn pair_explorer_url(base: &str, id: &str) -> String {
    let address = id.split('-').next().unwrap_or(id);
    format!("{}{}", base, address)
}

/// Formats like `$ 1,234.5`: thousands separators, one decimal.
pub fn format_usd(value: f64) -> String {
    let formatted = format!("{:.1}", value.abs());
    let (integer, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "0"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.0" { "-" } else { "" };
    format!("{}$ {}.{}", sign, grouped, fraction)
}

/// Index range of rows on 1-based `page`; pages past the end clamp to the last one.
pub fn page_range(total: usize, page: usize, page_size: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let pages = page_count(total, page_size);
    let page = page.clamp(1, pages);
    let start = (page - 1) * page_size;
    start.min(total)..(start + page_size).min(total)
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    ((total + page_size - 1) / page_size).max(1)
}

fn write_line(out: &mut String, cells: [&str; 6], widths: &[usize; 6]) {
    let rendered: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .enumerate()
        .map(|(i, (cell, width))| {
            // USD column is right aligned.
            if i == 5 {
                format!("{:>width$}", cell, width = *width)
            } else {
                format!("{:<width$}", cell, width = *width)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", rendered.join("  ").trim_end());
}

pub fn render_text_table(rows: &[PairRow]) -> String {
    let mut widths = HEADERS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_line(&mut out, HEADERS, &widths);
    let separator = widths.map(|w| "-".repeat(w));
    write_line(
        &mut out,
        [
            separator[0].as_str(),
            separator[1].as_str(),
            separator[2].as_str(),
            separator[3].as_str(),
            separator[4].as_str(),
            separator[5].as_str(),
        ],
        &widths,
    );
    for row in rows {
        write_line(&mut out, row.cells(), &widths);
    }
    let _ = writeln!(out, "{} pairs", rows.len());
    out
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn link(url: &str, text: &str) -> String {
    format!(
        r#"<a target="_blank" rel="noopener noreferrer" href="{}">{}</a>"#,
        escape_html(url),
        escape_html(text)
    )
}

fn select(name: &str, selected: &str, options: &[(&str, &str)]) -> String {
    let mut html = format!(r#"<select name="{}">"#, name);
    for (value, label) in options {
        let _ = write!(
            html,
            r#"<option value="{}"{}>{}</option>"#,
            value,
            if *value == selected { " selected" } else { "" },
            label
        );
    }
    html.push_str("</select>");
    html
}

fn parameter_form(params: &DashboardParams) -> String {
    let created_after = DateTime::from_timestamp(params.created_after, 0)
        .map(|dt| dt.format(DATETIME_LOCAL_FORMAT).to_string())
        .unwrap_or_else(|| params.created_after.to_string());
    let order_by_options: Vec<(&str, &str)> = PairDayOrderBy::ALL
        .iter()
        .map(|field| (field.as_str(), field.as_str()))
        .collect();

    let mut html = String::from(r#"<form method="get" action="/"><table><tbody>"#);
    let mut row = |label: &str, input: String| {
        let _ = write!(html, "<tr><td>{}</td><td>{}</td></tr>", label, input);
    };
    row("First", format!(r#"<input name="first" value="{}">"#, params.first));
    row("OrderBy", select("order_by", params.order_by.as_str(), &order_by_options));
    row(
        "OrderDirection",
        select(
            "order_direction",
            params.order_direction.as_str(),
            &[(OrderDirection::Desc.as_str(), "Desc"), (OrderDirection::Asc.as_str(), "Asc")],
        ),
    );
    row(
        "Created After (UTC)",
        format!(
            r#"<input type="datetime-local" step="1" name="created_after" value="{}">"#,
            escape_html(&created_after)
        ),
    );
    row(
        "Daily Volume More Than",
        format!(r#"<input name="min_daily_volume_usd" value="{}">"#, params.min_daily_volume_usd),
    );
    row(
        "Created At Block Number",
        format!(
            r#"<input name="created_at_block_number" value="{}">"#,
            params.created_at_block_number.map(|b| b.to_string()).unwrap_or_default()
        ),
    );
    html.push_str(r#"</tbody></table><button type="submit">Apply</button></form>"#);
    html
}

/// Query string that reproduces `params`, so page links keep the current view.
pub fn params_query(params: &DashboardParams) -> String {
    let mut query = format!(
        "first={}&order_by={}&order_direction={}&created_after={}&min_daily_volume_usd={}",
        params.first,
        params.order_by.as_str(),
        params.order_direction.as_str(),
        params.created_after,
        params.min_daily_volume_usd
    );
    if let Some(block) = params.created_at_block_number {
        let _ = write!(query, "&created_at_block_number={}", block);
    }
    query
}

fn page_link(params: &DashboardParams, page: usize, text: &str) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        escape_html(&format!("/?{}&page={}", params_query(params), page)),
        text
    )
}

/// Full page: parameter form, status banner and one page of the table.
pub fn render_html(
    snapshot: &DashboardSnapshot,
    explorer: &ExplorerConfig,
    page: usize,
    page_size: usize,
) -> String {
    let all_rows = rows(&snapshot.rows, explorer);
    let range = page_range(all_rows.len(), page, page_size);
    let pages = page_count(all_rows.len(), page_size);
    let current = page.clamp(1, pages);

    let mut html = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Uniswap Pair Trading</title></head><body>",
    );
    html.push_str("<h3>Uniswap Pair Trading</h3>");
    html.push_str(&parameter_form(&snapshot.params));

    match snapshot.state {
        RefreshState::Loading => html.push_str(r#"<p class="status">Loading...</p>"#),
        RefreshState::Failed => {
            let _ = write!(
                html,
                r#"<p class="status error">{}</p>"#,
                escape_html(snapshot.last_error.as_deref().unwrap_or("Fetch failed"))
            );
        }
        RefreshState::Idle | RefreshState::Loaded => {}
    }

    html.push_str("<table><thead><tr>");
    for header in HEADERS {
        let _ = write!(html, "<th>{}</th>", header);
    }
    html.push_str("</tr></thead><tbody>");
    for row in &all_rows[range] {
        let _ = write!(
            html,
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td align="right">{}</td></tr>"#,
            link(&row.pair_url, &row.id),
            link(&row.token0_url, &row.token0_symbol),
            link(&row.token1_url, &row.token1_symbol),
            escape_html(&row.daily_volume_token0),
            escape_html(&row.daily_volume_token1),
            escape_html(&row.daily_volume_usd),
        );
    }
    html.push_str("</tbody></table>");
    html.push_str(r#"<p class="pagination">"#);
    if current > 1 {
        html.push_str(&page_link(&snapshot.params, current - 1, "Previous"));
        html.push(' ');
    }
    let _ = write!(html, "Page {} of {} ({} pairs)", current, pages, all_rows.len());
    if current < pages {
        html.push(' ');
        html.push_str(&page_link(&snapshot.params, current + 1, "Next"));
    }
    html.push_str("</p></body></html>");
    html
}
