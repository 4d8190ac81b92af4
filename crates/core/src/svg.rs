//! SVG serialization of a laid-out treemap.

use peniko::Color;
use std::collections::VecDeque;
use std::fmt::Write as _;

use crate::color::Colorer;
use crate::layout::{UiBox, UiText, FONT_SIZE};
use crate::model::Tree;

/// Renders `root` and every descendant breadth-first, parents under children.
pub fn render_svg(root: &UiBox, tree: &Tree, colorer: &dyn Colorer, border: Color) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 {} {}" style="background: white none repeat scroll 0% 0%;">"#,
        fmt_num(root.rect.w),
        fmt_num(root.rect.h),
    );

    let mut queue = VecDeque::from([root]);
    while let Some(b) = queue.pop_front() {
        queue.extend(b.children.iter());
        write_box(&mut out, b, tree, colorer, border);
    }

    out.push_str("</svg>\n");
    out
}

fn write_box(out: &mut String, b: &UiBox, tree: &Tree, colorer: &dyn Colorer, border: Color) {
    if b.is_invisible {
        return;
    }
    let Some(node) = b.node else {
        return;
    };
    let (fill, fill_opacity) = color_to_svg(colorer.box_color(tree, node));
    let (stroke, stroke_opacity) = color_to_svg(border);

    let _ = writeln!(out, "<g>");
    let _ = writeln!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" style="fill: {fill}; fill-opacity: {fill_opacity:.2}; stroke: {stroke}; stroke-width: 1px; stroke-opacity: {stroke_opacity:.2};" />"#,
        fmt_num(b.rect.x),
        fmt_num(b.rect.y),
        fmt_num(b.rect.w),
        fmt_num(b.rect.h),
    );
    if let Some(title) = &b.title {
        write_text(out, title, colorer.text_color(tree, node));
    }
    let _ = writeln!(out, "</g>");
}

fn write_text(out: &mut String, t: &UiText, color: Color) {
    let (fill, opacity) = color_to_svg(color);
    let _ = writeln!(
        out,
        r#"<text data-notex="1" text-anchor="start" transform="translate({},{}) scale({})" style="font-family: Open Sans, verdana, arial, sans-serif !important; font-size: {FONT_SIZE}px; fill: {fill}; fill-opacity: {opacity:.2}; white-space: pre;" data-math="N">{}</text>"#,
        fmt_num(t.rect.x),
        fmt_num(t.rect.y + t.rect.h),
        fmt_num(t.scale),
        escape_xml(&t.text),
    );
}

fn color_to_svg(color: Color) -> (String, f32) {
    let rgba = color.to_rgba8();
    let a = f32::from(rgba.a) / 255.0;
    (format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b), a)
}

fn fmt_num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
