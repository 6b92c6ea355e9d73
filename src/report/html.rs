use std::fmt::{self, Write as FmtWrite};

use super::profile::{NumericSummary, ProfileReport, VariableProfile};

// ---------------------------------------------------------------------------
// Standalone HTML rendering of a profile report
// ---------------------------------------------------------------------------

const CSS: &str = "\
body{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}\
h1{margin:0 0 8px 0;font-size:24px;}\
h2{margin:24px 0 8px 0;font-size:20px;border-bottom:1px solid #eee;}\
h3{margin:16px 0 6px 0;font-size:16px;}\
table{border-collapse:collapse;margin:8px 0 16px 0;}\
th,td{border:1px solid #ddd;padding:4px 8px;text-align:left;font-size:13px;}\
.alert{color:#b35900;}\
.bar{display:inline-block;background:#4c78a8;height:10px;}\
.muted{color:#777;}";

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn num(v: f64) -> String {
    format!("{v:.4}")
}

/// Displays a report as a self-contained HTML document.
struct HtmlPage<'a>(&'a ProfileReport);

impl fmt::Display for HtmlPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_html(f)
    }
}

impl ProfileReport {
    /// Render the report as a self-contained HTML document.
    pub fn to_html(&self) -> String {
        HtmlPage(self).to_string()
    }

    fn write_html(&self, html: &mut impl FmtWrite) -> fmt::Result {
        let title = escape(&self.title);
        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html lang=\"en\"><head><meta charset=\"utf-8\"/>")?;
        writeln!(html, "<title>{title}</title><style>{CSS}</style></head><body>")?;
        writeln!(html, "<h1>{title}</h1>")?;

        let o = &self.overview;
        writeln!(html, "<h2>Overview</h2><table>")?;
        writeln!(html, "<tr><th>Number of variables</th><td>{}</td></tr>", o.n_cols)?;
        writeln!(html, "<tr><th>Number of observations</th><td>{}</td></tr>", o.n_rows)?;
        writeln!(
            html,
            "<tr><th>Missing cells</th><td>{} ({:.1}%)</td></tr>",
            o.missing_cells, o.missing_cells_pct
        )?;
        writeln!(
            html,
            "<tr><th>Duplicate rows</th><td>{} ({:.1}%)</td></tr>",
            o.duplicate_rows, o.duplicate_rows_pct
        )?;
        for (kind, n) in &o.kinds {
            writeln!(html, "<tr><th>{}</th><td>{n}</td></tr>", escape(kind))?;
        }
        writeln!(html, "</table>")?;

        writeln!(html, "<h2>Alerts</h2>")?;
        if self.alerts.is_empty() {
            writeln!(html, "<p class=\"muted\">No alerts.</p>")?;
        } else {
            writeln!(html, "<ul>")?;
            for a in &self.alerts {
                writeln!(html, "<li class=\"alert\">{}</li>", escape(&a.to_string()))?;
            }
            writeln!(html, "</ul>")?;
        }

        writeln!(html, "<h2>Variables</h2>")?;
        for v in &self.variables {
            write_variable(html, v)?;
        }

        writeln!(html, "<h2>Correlations</h2>")?;
        if self.correlations.columns.len() < 2 {
            writeln!(html, "<p class=\"muted\">Fewer than two numeric variables.</p>")?;
        } else {
            writeln!(html, "<table><tr><th></th>")?;
            for c in &self.correlations.columns {
                write!(html, "<th>{}</th>", escape(c))?;
            }
            writeln!(html, "</tr>")?;
            for (c, row) in self.correlations.columns.iter().zip(&self.correlations.matrix) {
                write!(html, "<tr><th>{}</th>", escape(c))?;
                for r in row {
                    match r {
                        Some(r) => write!(html, "<td>{r:.3}</td>")?,
                        None => write!(html, "<td class=\"muted\">–</td>")?,
                    }
                }
                writeln!(html, "</tr>")?;
            }
            writeln!(html, "</table>")?;
        }

        writeln!(html, "<h2>Missing values</h2><table><tr><th>Variable</th><th>Missing</th></tr>")?;
        for m in &self.missing {
            writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", escape(&m.column), m.missing)?;
        }
        writeln!(html, "</table>")?;

        writeln!(html, "<h2>Sample</h2><table><tr>")?;
        for c in &self.sample.columns {
            write!(html, "<th>{}</th>", escape(c))?;
        }
        writeln!(html, "</tr>")?;
        for row in &self.sample.rows {
            write!(html, "<tr>")?;
            for v in row {
                write!(html, "<td>{}</td>", escape(&v.to_string()))?;
            }
            writeln!(html, "</tr>")?;
        }
        writeln!(html, "</table></body></html>")
    }
}

fn write_variable(html: &mut impl FmtWrite, v: &VariableProfile) -> fmt::Result {
    writeln!(html, "<h3>{} <span class=\"muted\">{}</span></h3>", escape(&v.name), v.kind)?;
    writeln!(html, "<table>")?;
    writeln!(
        html,
        "<tr><th>Distinct</th><td>{} ({:.1}%)</td></tr>",
        v.distinct, v.distinct_pct
    )?;
    writeln!(
        html,
        "<tr><th>Missing</th><td>{} ({:.1}%)</td></tr>",
        v.missing, v.missing_pct
    )?;
    if let Some(n) = &v.numeric {
        write_numeric_rows(html, n)?;
    }
    writeln!(html, "</table>")?;

    if let Some(n) = &v.numeric {
        let peak = n.histogram.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        writeln!(html, "<table><tr><th>Bin</th><th>Count</th><th></th></tr>")?;
        for b in &n.histogram {
            writeln!(
                html,
                "<tr><td>[{}, {})</td><td>{}</td><td><span class=\"bar\" style=\"width:{}px\"></span></td></tr>",
                num(b.start),
                num(b.end),
                b.count,
                b.count * 200 / peak
            )?;
        }
        writeln!(html, "</table>")?;
    }

    if !v.top_values.is_empty() {
        writeln!(html, "<table><tr><th>Value</th><th>Count</th></tr>")?;
        for (val, count) in &v.top_values {
            writeln!(html, "<tr><td>{}</td><td>{count}</td></tr>", escape(&val.to_string()))?;
        }
        writeln!(html, "</table>")?;
    }
    Ok(())
}

fn write_numeric_rows(html: &mut impl FmtWrite, n: &NumericSummary) -> fmt::Result {
    let std = n.std.map(num).unwrap_or_else(|| "–".to_string());
    for (label, value) in [
        ("Mean", num(n.mean)),
        ("Std", std),
        ("Min", num(n.min)),
        ("25%", num(n.q1)),
        ("50%", num(n.median)),
        ("75%", num(n.q3)),
        ("Max", num(n.max)),
        ("Zeros", n.zeros.to_string()),
    ] {
        writeln!(html, "<tr><th>{label}</th><td>{value}</td></tr>")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::data::loader::parse_delimited;
    use crate::report::ProfileReport;

    #[test]
    fn html_contains_sections_and_escapes_values() {
        let ds = parse_delimited("name,v\n<b>,1\nx&y,2\n".as_bytes(), b',').expect("valid csv");
        let html = ProfileReport::build(&ds, "Data Profile Report").to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        for section in ["Overview", "Alerts", "Variables", "Correlations", "Missing values", "Sample"] {
            assert!(html.contains(&format!("<h2>{section}</h2>")), "missing {section}");
        }
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("x&amp;y"));
        assert!(!html.contains("<td><b></td>"));
    }

    #[test]
    fn page_is_a_complete_document() {
        let ds = parse_delimited("a\n".as_bytes(), b',').expect("valid csv");
        let report = ProfileReport::build(&ds, "Empty");
        let html = report.to_html();
        assert_eq!(html, super::HtmlPage(&report).to_string());
        assert!(html.trim_end().ends_with("</html>"));
    }
}
