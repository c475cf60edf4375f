// src/render.rs
use crate::catalog::Catalog;
use crate::chart::portfolio_chart;
use crate::models::{EstimationResult, QueryOutcome, SeriesRow, DATE_FORMAT};
use chrono::NaiveDate;

const STYLE: &str = "body{margin:0;font-family:sans-serif;display:flex}\
aside{width:16rem;padding:1rem;background:#f0f2f6;min-height:100vh}\
aside label{display:block;margin-top:1rem}\
main{flex:1;padding:1rem 2rem}\
.columns{display:flex;gap:2rem}.col-wide{flex:2}.col-narrow{flex:1}\
.col-wide img,.col-wide svg{width:100%}\
table{border-collapse:collapse}td,th{border:1px solid #ddd;padding:2px 8px;text-align:right}\
.error{color:#b00020}";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn link(url: &str, text: &str) -> String {
    format!(r#"<a href="{}">{}</a>"#, escape(url), escape(text))
}

/// Wraps the sidebar and the main content into a full document.
pub fn page(sidebar: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Symbols</title>\
         <style>{}</style></head><body>{}<main>{}</main></body></html>",
        STYLE, sidebar, content
    )
}

pub fn sidebar(
    catalog: &Catalog,
    selected: Option<&str>,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    let options: String = catalog
        .symbols()
        .iter()
        .map(|s| {
            let mark = if Some(s.as_str()) == selected {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{v}"{m}>{v}</option>"#,
                v = escape(s),
                m = mark
            )
        })
        .collect();
    format!(
        r#"<aside><h1>Symbols</h1><form method="get" action="/compute">
<label for="symbol">Choose a symbol</label><select id="symbol" name="symbol">{options}</select>
<label for="startdate">Start Date</label><input type="date" id="startdate" name="startdate" value="{start}">
<label for="enddate">End Date</label><input type="date" id="enddate" name="enddate" value="{end}">
<p><button type="submit">Compute!</button></p></form></aside>"#,
        options = options,
        start = start.format(DATE_FORMAT),
        end = end.format(DATE_FORMAT)
    )
}

/// One text line per metric. The beta line is left out when the service
/// had no beta for the symbol.
pub fn inference_lines(estimation: &EstimationResult, index: &str) -> Vec<String> {
    let mut lines = vec![
        format!(
            "yield = {:.4} (annually {:.2}%)",
            estimation.r,
            estimation.annual_return() * 100.0
        ),
        format!("volatility = {:.4}", estimation.vol),
        format!("downside risk = {:.4}", estimation.downside_risk),
        format!("upside risk = {:.4}", estimation.upside_risk),
    ];
    if let Some(beta) = estimation.beta {
        lines.push(format!("beta (w.r.t. {}) = {:.4}", index, beta));
    }
    lines
}

pub fn series_table(rows: &[SeriesRow]) -> String {
    let body: String = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            format!(
                "<tr><th>{}</th><td>{}</td><td>{}</td><td>{}</td></tr>",
                i,
                row.timestamp.format(DATE_FORMAT),
                row.stock_value,
                row.value
            )
        })
        .collect();
    format!(
        "<table class=\"series\"><thead><tr><th></th><th>TimeStamp</th><th>stock_value</th>\
         <th>value</th></tr></thead><tbody>{}</tbody></table>",
        body
    )
}

/// Main-area content for a completed query.
pub fn results(outcome: &QueryOutcome, symbol: &str, description: &str, index: &str) -> String {
    let mut narrow = String::from("<h1>Inference</h1>");
    for line in inference_lines(&outcome.estimation, index) {
        narrow.push_str(&format!("<p>{}</p>", escape(&line)));
    }
    narrow.push_str(&format!("<p>Name: {}</p>", escape(description)));
    narrow.push_str(&format!(
        "<p>Symbol: {}</p>",
        link(&format!("https://finance.yahoo.com/quote/{}", symbol), symbol)
    ));
    narrow.push_str(&format!(
        "<p>{}</p>",
        link(&outcome.series.plot_url, "Download plot (stock+dividend)")
    ));
    narrow.push_str(&format!(
        "<p>{}</p>",
        link(&outcome.ma_plot_url, "Download moving average plot")
    ));

    format!(
        "<div class=\"columns\"><div class=\"col-wide\">{chart}<img src=\"{ma}\" alt=\"moving average\"></div>\
         <div class=\"col-narrow\">{narrow}</div></div>\
         <h1>Data</h1><p>{excel}</p>{table}",
        chart = portfolio_chart(&outcome.series.rows),
        ma = escape(&outcome.ma_plot_url),
        narrow = narrow,
        excel = link(&outcome.series.spreadsheet_url, "Download Excel"),
        table = series_table(&outcome.series.rows)
    )
}

pub fn error_message(message: &str) -> String {
    format!(
        "<h1>Something went wrong</h1><p class=\"error\">{}</p>\
         <p>Adjust the inputs and press Compute! again.</p>",
        escape(message)
    )
}
