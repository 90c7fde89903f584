//! HTML rendering for the browser dashboard.

use std::fmt::Write;

use crate::chart::{self, escape_xml};
use crate::filter::TimeRange;
use crate::models::format_percentage;
use crate::report::NO_DAILY_DATA;
use crate::session::{DashboardView, Session};

fn styles() -> &'static str {
    r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
        margin: 20px;
        background-color: #f5f5f5;
    }
    h1, h2, h3 {
        color: #333;
    }
    table {
        border-collapse: collapse;
        background-color: white;
        box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        margin-bottom: 20px;
    }
    th, td {
        border: 1px solid #ddd;
        padding: 8px;
        text-align: left;
    }
    th {
        background-color: #4a90d9;
        color: white;
    }
    tr:nth-child(even) {
        background-color: #f9f9f9;
    }
    form.controls label {
        margin-right: 16px;
    }
    .meta {
        font-size: 0.85em;
        color: #666;
    }
    .empty {
        color: #a94442;
    }
    "#
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>CSAT Dashboard</title>\n<style>{}</style>\n</head>\n<body>\n\
         <h1>CSAT Dashboard</h1>\n{}</body>\n</html>\n",
        styles(),
        body
    )
}

fn upload_form() -> &'static str {
    r#"<form method="post" action="/upload" enctype="multipart/form-data">
<label>Upload your CSV file <input type="file" name="file" accept=".csv,text/csv" required></label>
<button type="submit">Upload</button>
</form>
"#
}

pub fn render_upload_page() -> String {
    page(upload_form())
}

pub fn render_dashboard(session: &Session, view: &DashboardView) -> String {
    let mut body = String::new();
    body.push_str(upload_form());

    let _ = writeln!(
        body,
        r#"<p class="meta">Session {} &middot; {} &middot; {} submissions loaded {}</p>"#,
        session.id,
        escape_xml(&session.source_name),
        session.dataset.len(),
        session.loaded_at.format("%Y-%m-%d %H:%M:%S")
    );
    let columns: Vec<String> = session
        .dataset
        .columns
        .iter()
        .map(|name| escape_xml(name))
        .collect();
    let _ = writeln!(
        body,
        r#"<p class="meta">Column names in the uploaded CSV file: {}</p>"#,
        columns.join(", ")
    );

    write_controls(&mut body, view);
    write_summary(&mut body, view);
    write_daily(&mut body, view);

    page(&body)
}

fn write_controls(body: &mut String, view: &DashboardView) {
    let _ = writeln!(body, r#"<form class="controls" method="get" action="/">"#);

    let _ = write!(
        body,
        r#"<label>Filter by <select name="range" onchange="this.form.submit()">"#
    );
    for range in TimeRange::ALL {
        let selected = if range == view.range { " selected" } else { "" };
        let _ = write!(
            body,
            r#"<option value="{0}"{1}>{0}</option>"#,
            range.label(),
            selected
        );
    }
    let _ = writeln!(body, "</select></label>");

    let _ = write!(
        body,
        r#"<label>Select Entity <select name="entity" onchange="this.form.submit()">"#
    );
    for entity in &view.entities {
        let selected = if view.selected_entity.as_deref() == Some(entity.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            body,
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape_xml(entity),
            selected
        );
    }
    let _ = writeln!(body, "</select></label>");

    if let (Some(start), Some(end)) = (view.start, view.end) {
        let _ = writeln!(
            body,
            r#"<label>Start Date <input type="date" name="start" value="{start}" onchange="this.form.submit()"></label>"#
        );
        let _ = writeln!(
            body,
            r#"<label>End Date <input type="date" name="end" value="{end}" onchange="this.form.submit()"></label>"#
        );
    }

    let _ = writeln!(body, r#"<button type="submit">Update</button></form>"#);
}

fn write_summary(body: &mut String, view: &DashboardView) {
    let _ = writeln!(body, "<h2>CSAT Breakdown by Entity:</h2>");
    if view.summary.is_empty() {
        let _ = writeln!(
            body,
            r#"<p class="empty">No submissions in the selected time range.</p>"#
        );
        return;
    }

    let _ = writeln!(
        body,
        "<table class=\"summary\">\n<tr><th>Entity</th><th>CSAT (%)</th><th>Total Submissions</th></tr>"
    );
    for row in &view.summary {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_xml(&row.entity),
            row.formatted_csat(),
            row.total_submissions
        );
    }
    let _ = writeln!(body, "</table>");
}

fn write_daily(body: &mut String, view: &DashboardView) {
    let _ = writeln!(body, "<h3>CSAT Day-by-Day Analysis</h3>");

    let Some(daily) = view.daily.as_ref().filter(|daily| !daily.is_empty()) else {
        let _ = writeln!(body, r#"<p class="empty">{NO_DAILY_DATA}</p>"#);
        return;
    };

    let _ = writeln!(
        body,
        "<p>CSAT Day-by-Day for Entity: {}</p>",
        escape_xml(&daily.entity)
    );
    body.push_str(&chart::render_daily_chart(daily));

    let _ = writeln!(body, "<p>CSAT Day-by-Day Data</p>");
    let _ = writeln!(
        body,
        "<table class=\"daily\">\n<tr><th>Date</th><th>CSAT (%)</th><th>Respondents</th></tr>"
    );
    for point in &daily.points {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            point.date,
            format_percentage(point.csat),
            point.respondents
        );
    }
    let _ = writeln!(body, "</table>");
}
