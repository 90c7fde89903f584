//! SVG line chart for the day-by-day CSAT view.
//!
//! The y-axis is fixed to 60..100 with a dashed reference line at 80. Points
//! outside the window are clipped by the plot area, and every marker carries
//! its respondent count just above it.

use std::fmt::Write;

use crate::models::DailyCsat;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 110.0;

pub const Y_MIN: f64 = 60.0;
pub const Y_MAX: f64 = 100.0;
pub const REFERENCE_LINE: f64 = 80.0;
const Y_TICK_STEP: f64 = 5.0;
const ANNOTATION_OFFSET: f64 = 2.0;

struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PlotArea {
    fn new() -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
            height: HEIGHT - MARGIN_TOP - MARGIN_BOTTOM,
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn x(&self, index: usize, count: usize) -> f64 {
        if count <= 1 {
            return self.left + self.width / 2.0;
        }
        let step = self.width / (count - 1) as f64;
        self.left + step * index as f64
    }

    fn y(&self, value: f64) -> f64 {
        self.bottom() - (value - Y_MIN) / (Y_MAX - Y_MIN) * self.height
    }
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn render_daily_chart(daily: &DailyCsat) -> String {
    let area = PlotArea::new();
    let count = daily.points.len();
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    );
    let _ = writeln!(
        svg,
        r#"<defs><clipPath id="plot-area"><rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}"/></clipPath></defs>"#,
        area.left, area.top, area.width, area.height
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="30" text-anchor="middle" font-size="16">Daily CSAT for {}</text>"#,
        WIDTH / 2.0,
        escape_xml(&daily.entity)
    );

    write_axes(&mut svg, &area);

    let reference_y = area.y(REFERENCE_LINE);
    let _ = writeln!(
        svg,
        r#"<line class="reference" x1="{:.1}" y1="{reference_y:.1}" x2="{:.1}" y2="{reference_y:.1}" stroke="lightgrey" stroke-dasharray="6 4"/>"#,
        area.left,
        area.left + area.width
    );

    for (index, point) in daily.points.iter().enumerate() {
        let x = area.x(index, count);
        let _ = writeln!(
            svg,
            r#"<text x="{x:.1}" y="{:.1}" font-size="10" text-anchor="end" transform="rotate(-90 {x:.1} {:.1})">{}</text>"#,
            area.bottom() + 8.0,
            area.bottom() + 8.0,
            point.date
        );
    }

    let _ = writeln!(svg, r#"<g clip-path="url(#plot-area)">"#);
    let path: Vec<String> = daily
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| format!("{:.1},{:.1}", area.x(index, count), area.y(point.csat)))
        .collect();
    if count > 1 {
        let _ = writeln!(
            svg,
            r##"<polyline class="series" points="{}" fill="none" stroke="#1f77b4" stroke-width="2"/>"##,
            path.join(" ")
        );
    }
    for (index, point) in daily.points.iter().enumerate() {
        let x = area.x(index, count);
        let y = area.y(point.csat);
        let _ = writeln!(
            svg,
            r##"<circle class="marker" cx="{x:.1}" cy="{y:.1}" r="4" fill="#1f77b4"/>"##
        );
    }
    let _ = writeln!(svg, "</g>");

    // annotations stay unclipped so 100% and sub-60% days keep their counts
    for (index, point) in daily.points.iter().enumerate() {
        let _ = writeln!(
            svg,
            r#"<text class="respondents" x="{:.1}" y="{:.1}" font-size="8" fill="blue" text-anchor="middle">{}</text>"#,
            area.x(index, count),
            area.y(point.csat + ANNOTATION_OFFSET),
            point.respondents
        );
    }
    let _ = writeln!(svg, "</svg>");

    svg
}

fn write_axes(svg: &mut String, area: &PlotArea) {
    let _ = writeln!(
        svg,
        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="black"/>"#,
        area.left, area.top, area.width, area.height
    );

    let mut tick = Y_MIN;
    while tick <= Y_MAX {
        let y = area.y(tick);
        let _ = writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="black"/>"#,
            area.left - 5.0,
            area.left
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="10" text-anchor="end">{tick:.0}</text>"#,
            area.left - 8.0,
            y + 3.0
        );
        tick += Y_TICK_STEP;
    }

    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">Date</text>"#,
        area.left + area.width / 2.0,
        HEIGHT - 10.0
    );
    let label_y = area.top + area.height / 2.0;
    let _ = writeln!(
        svg,
        r#"<text x="20" y="{label_y:.1}" font-size="12" text-anchor="middle" transform="rotate(-90 20 {label_y:.1})">CSAT (%)</text>"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyPoint;
    use chrono::NaiveDate;

    fn daily(points: &[(u32, f64, usize)]) -> DailyCsat {
        DailyCsat {
            entity: "Support & Returns".to_string(),
            points: points
                .iter()
                .map(|(day, csat, respondents)| DailyPoint {
                    date: NaiveDate::from_ymd_opt(2024, 5, *day).unwrap(),
                    csat: *csat,
                    respondents: *respondents,
                })
                .collect(),
        }
    }

    #[test]
    fn plot_scale_maps_axis_limits_to_edges() {
        let area = PlotArea::new();
        assert_eq!(area.y(Y_MIN), area.bottom());
        assert_eq!(area.y(Y_MAX), area.top);
        assert_eq!(area.x(0, 3), area.left);
        assert_eq!(area.x(2, 3), area.left + area.width);
    }

    #[test]
    fn renders_markers_annotations_and_reference_line() {
        let svg = render_daily_chart(&daily(&[(1, 50.0, 2), (2, 100.0, 1), (3, 85.0, 12)]));

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Daily CSAT for Support &amp; Returns"));
        assert_eq!(svg.matches(r#"class="marker""#).count(), 3);
        assert_eq!(svg.matches(r#"class="respondents""#).count(), 3);
        assert!(svg.contains(">12</text>"));
        assert!(svg.contains(r#"class="reference""#));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("2024-05-02"));
        assert!(svg.contains(r#"clip-path="url(#plot-area)""#));
        assert!(svg.contains(">CSAT (%)</text>"));
    }

    #[test]
    fn respondent_counts_sit_outside_the_clipped_group() {
        let svg = render_daily_chart(&daily(&[(1, 100.0, 1), (2, 40.0, 3)]));
        let clip_end = svg.find("</g>").unwrap();

        let labels: Vec<usize> = svg
            .match_indices(r#"class="respondents""#)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(labels.len(), 2);
        assert!(labels.iter().all(|&index| index > clip_end));

        let area = PlotArea::new();
        let top_label = format!(r#"y="{:.1}""#, area.y(100.0 + ANNOTATION_OFFSET));
        assert!(area.y(100.0 + ANNOTATION_OFFSET) < area.top);
        assert!(svg[clip_end..].contains(&top_label));
    }

    #[test]
    fn single_point_has_no_polyline() {
        let svg = render_daily_chart(&daily(&[(4, 90.0, 5)]));
        assert!(!svg.contains("<polyline"));
        assert_eq!(svg.matches(r#"class="marker""#).count(), 1);
    }
}
