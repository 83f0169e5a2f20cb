//! Streaming SVG document builder.

use std::fmt::Write;

use quick_xml::escape::escape;

use crate::color::Color;

#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: u32,
    height: u32,
    body: String,
    open_groups: usize,
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

fn points_attr(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{},{}", fmt_num(*x), fmt_num(*y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn paint(color: Color) -> String {
    if color.a == 255 {
        color.to_hex()
    } else {
        format!(
            "rgba({},{},{},{:.2})",
            color.r,
            color.g,
            color.b,
            color.a as f32 / 255.0
        )
    }
}

impl SvgDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
            open_groups: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&mut self, fill: Color) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            paint(fill)
        );
        self
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color, stroke: Option<Color>) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            paint(fill)
        );
        if let Some(stroke) = stroke {
            let _ = write!(self.body, r#" stroke="{}""#, paint(stroke));
        }
        self.body.push_str("/>");
        self
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Color) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            fmt_num(cx),
            fmt_num(cy),
            fmt_num(r),
            paint(fill)
        );
        self
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], fill: Color, stroke: Color) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<polygon points="{}" fill="{}" stroke="{}" stroke-width="1"/>"#,
            points_attr(points),
            paint(fill),
            paint(stroke)
        );
        self
    }

    /// Open polyline; `dash` renders as `stroke-dasharray`.
    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: Color, width: f64, dash: Option<&str>) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}""#,
            points_attr(points),
            paint(stroke),
            fmt_num(width)
        );
        if let Some(dash) = dash {
            let _ = write!(self.body, r#" stroke-dasharray="{}""#, escape(dash));
        }
        self.body.push_str("/>");
        self
    }

    pub fn text(&mut self, x: f64, y: f64, size: u32, fill: Color, content: &str) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" font-family="Arial" font-size="{}" fill="{}">{}</text>"#,
            fmt_num(x),
            fmt_num(y),
            size,
            paint(fill),
            escape(content)
        );
        self
    }

    /// Text centred on `x`.
    pub fn centered_text(&mut self, x: f64, y: f64, size: u32, fill: Color, content: &str) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" text-anchor="middle" font-family="Arial" font-size="{}" font-weight="bold" fill="{}">{}</text>"#,
            fmt_num(x),
            fmt_num(y),
            size,
            paint(fill),
            escape(content)
        );
        self
    }

    pub fn group(&mut self, id: &str) -> &mut Self {
        let _ = write!(self.body, r#"<g id="{}">"#, escape(id));
        self.open_groups += 1;
        self
    }

    pub fn end_group(&mut self) -> &mut Self {
        if self.open_groups > 0 {
            self.body.push_str("</g>");
            self.open_groups -= 1;
        }
        self
    }

    /// Close any open groups and serialize.
    pub fn finish(mut self) -> String {
        while self.open_groups > 0 {
            self.end_group();
        }
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#,
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_well_formed_document() {
        let mut doc = SvgDocument::new(256, 128);
        doc.background(Color::rgb(0xe6, 0xf3, 0xff))
            .group("extents")
            .polygon(&[(0.0, 0.0), (10.5, 0.0), (10.5, 10.0)], Color::new(0, 0, 255, 64), Color::rgb(0, 0, 255))
            .text(4.0, 12.0, 10, Color::rgb(0, 0, 0), "Depth < 5 & shoal");
        let svg = doc.finish();

        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="256" height="128""#));
        assert!(svg.ends_with("</g></svg>"));
        assert!(svg.contains(r#"points="0,0 10.50,0 10.50,10""#));
        assert!(svg.contains("rgba(0,0,255,0.25)"));
        assert!(svg.contains("Depth &lt; 5 &amp; shoal"));
    }

    #[test]
    fn end_group_without_open_group_is_noop() {
        let mut doc = SvgDocument::new(1, 1);
        doc.end_group();
        assert_eq!(doc.finish().matches("</g>").count(), 0);
    }
}
