//! Rendering surfaces for a `ChainView`: ASCII table, HTML page, JSON.
//!
//! Every surface shows the same three columns (Call Mark, Strike, Put Mark), blank cells
//! for missing marks, and a message instead of a table when the data is unavailable.

use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::model::{ChainRow, ChainTable, ChainView};

const HEADERS: [&str; 3] = ["Call Mark", "Strike", "Put Mark"];
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Output format accepted by the `show` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ascii,
    Json,
}

impl Format {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw {
            "ascii" => Ok(Format::Ascii),
            "json" => Ok(Format::Json),
            other => anyhow::bail!("Unknown format '{other}'. Use: ascii, json"),
        }
    }

    pub fn render(self, view: &ChainView) -> anyhow::Result<String> {
        match self {
            Format::Ascii => Ok(ascii(view)),
            Format::Json => json(view),
        }
    }
}

fn cell(mark: Option<Decimal>) -> String {
    mark.map(|m| m.normalize().to_string()).unwrap_or_default()
}

fn title(table: &ChainTable) -> String {
    match table.expiry {
        Some(expiry) => format!("{} options, expiry {expiry}", table.underlying),
        None => format!("{} options", table.underlying),
    }
}

// ── ASCII ────────────────────────────────────────────────────────────

pub fn ascii(view: &ChainView) -> String {
    let table = match view {
        ChainView::Ready(table) => table,
        ChainView::Unavailable {
            underlying,
            reason,
            at,
        } => {
            return format!(
                "{underlying} options: data unavailable ({})\n  {reason}\n",
                at.format(TIME_FORMAT)
            );
        }
    };

    let mut out = format!(
        "{} (fetched {})\n",
        title(table),
        table.fetched_at.format(TIME_FORMAT)
    );

    if table.rows.is_empty() {
        out.push_str("No contracts listed.\n");
        return out;
    }

    let cells: Vec<[String; 3]> = table.rows.iter().map(row_cells).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (w, c) in widths.iter_mut().zip(row) {
            *w = (*w).max(c.len());
        }
    }

    let line = |cols: [&str; 3]| {
        format!(
            " {:>w0$} | {:^w1$} | {:<w2$}\n",
            cols[0],
            cols[1],
            cols[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        )
    };

    out.push_str(&line(HEADERS));
    let _ = writeln!(
        out,
        "-{}-+-{}-+-{}-",
        "-".repeat(widths[0]),
        "-".repeat(widths[1]),
        "-".repeat(widths[2])
    );
    for [call, strike, put] in &cells {
        out.push_str(&line([call.as_str(), strike.as_str(), put.as_str()]));
    }
    out
}

fn row_cells(row: &ChainRow) -> [String; 3] {
    [
        cell(row.call_mark),
        row.strike.normalize().to_string(),
        cell(row.put_mark),
    ]
}

// ── JSON ─────────────────────────────────────────────────────────────

pub fn json(view: &ChainView) -> anyhow::Result<String> {
    let mut s = serde_json::to_string_pretty(view)?;
    s.push('\n');
    Ok(s)
}

// ── HTML ─────────────────────────────────────────────────────────────

/// Options for the HTML page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageOptions {
    /// Ask the browser to reload the page every N seconds.
    pub auto_reload_secs: Option<u64>,
}

pub fn html(view: &ChainView, opts: PageOptions) -> String {
    let underlying = escape(view.underlying());
    let mut body = String::new();

    match view {
        ChainView::Ready(table) => {
            let _ = writeln!(body, "<h1>{}</h1>", escape(&title(table)));
            let _ = writeln!(
                body,
                "<p class=\"meta\">Fetched {}</p>",
                table.fetched_at.format(TIME_FORMAT)
            );
            if table.rows.is_empty() {
                body.push_str("<p class=\"empty\">No contracts listed.</p>\n");
            }
            body.push_str("<table>\n<thead><tr>");
            for (i, h) in HEADERS.iter().enumerate() {
                let class = if i == 1 { " class=\"strike\"" } else { "" };
                let _ = write!(body, "<th{class}>{h}</th>");
            }
            body.push_str("</tr></thead>\n<tbody>\n");
            for row in &table.rows {
                let [call, strike, put] = row_cells(row);
                let _ = writeln!(
                    body,
                    "<tr><td class=\"call\">{}</td><td class=\"strike\">{}</td><td class=\"put\">{}</td></tr>",
                    escape(&call),
                    escape(&strike),
                    escape(&put)
                );
            }
            body.push_str("</tbody>\n</table>\n");
        }
        ChainView::Unavailable { reason, at, .. } => {
            let _ = writeln!(body, "<h1>{underlying} options</h1>");
            let _ = writeln!(
                body,
                "<p class=\"error\">Data unavailable: {}</p>\n<p class=\"meta\">As of {}</p>",
                escape(reason),
                at.format(TIME_FORMAT)
            );
        }
    }

    let reload = opts
        .auto_reload_secs
        .filter(|s| *s > 0)
        .map(|s| format!("<meta http-equiv=\"refresh\" content=\"{s}\">\n"))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n{reload}\
<title>{underlying} option chain</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\
<form method=\"post\" action=\"/refresh\"><button type=\"submit\">Refresh</button></form>\n\
</body>\n</html>\n"
    )
}

const STYLE: &str = "body{font-family:sans-serif;margin:2rem}\
table{border-collapse:collapse}\
th,td{padding:.25rem .75rem;border-bottom:1px solid #ddd}\
td.call{text-align:right}td.put{text-align:left}\
.strike{text-align:center;font-weight:bold;background:#f4f4f4}\
.error{color:#b00}.meta{color:#666}";

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
