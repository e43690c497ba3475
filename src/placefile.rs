//! Placefile rendering.
//!
//! Turns alert entries into the line-oriented `Keyword: value` directive
//! format read by radar viewers. Blocks are separated by blank lines and
//! appear in the same order as the entries.
use std::fmt::Write;
use thiserror::Error;

use crate::feed::{AlertEntry, Coordinate, Geometry, Ring};

/// Fixed header: title, refresh interval (minutes), default color, font.
pub const PREAMBLE: &str = "Title: NWS Weather Alerts\n\
Refresh: 2\n\
Color: 255 0 0\n\
Font: 1, 11, 1, \"Arial\"\n\
\n";

const THRESHOLD: &str = "Threshold: 999";
const ICON: &str = "Icon: 1";
const OUTLINE: &str = "Line: 2, 0";
const FILL: &str = "Color: 255 0 0 64";

#[derive(Debug, Error)]
enum RenderError {
    #[error("coordinate is not finite: {0:?}")]
    NonFinite(Coordinate),
    #[error("formatting failed")]
    Format(#[from] std::fmt::Error),
}

/// Renders a complete placefile.
///
/// Never fails: an entry that cannot be written is logged and left out,
/// everything else is rendered as usual.
pub fn render(entries: &[AlertEntry]) -> String {
    let mut out = String::from(PREAMBLE);

    for (index, entry) in entries.iter().enumerate() {
        let mut block = String::new();
        match write_entry(&mut block, entry) {
            Ok(()) => out.push_str(&block),
            Err(e) => {
                tracing::warn!(
                    index = index,
                    title = %entry.title,
                    error = %e,
                    "Skipping alert that could not be rendered"
                );
            }
        }
    }

    out
}

fn write_entry(out: &mut String, entry: &AlertEntry) -> Result<(), RenderError> {
    match &entry.geometry {
        Geometry::Point(point) => write_object(out, *point, &entry.title),
        Geometry::Polygon(ring) => {
            write_boundary(out, ring)?;
            write_object(out, ring.vertex_mean(), &entry.title)
        }
    }
}

fn write_object(out: &mut String, at: Coordinate, title: &str) -> Result<(), RenderError> {
    ensure_finite(at)?;
    writeln!(out, "Object: {}/{}", format_coord(at.lat), format_coord(at.lon))?;
    writeln!(out, "{THRESHOLD}")?;
    writeln!(out, "{ICON}")?;
    writeln!(out, "Text: {title}")?;
    writeln!(out)?;
    Ok(())
}

fn write_boundary(out: &mut String, ring: &Ring) -> Result<(), RenderError> {
    let mut line = String::from("Polygon: ");
    for (i, vertex) in ring.vertices().iter().enumerate() {
        ensure_finite(*vertex)?;
        if i > 0 {
            line.push_str(", ");
        }
        write!(line, "{}, {}", format_coord(vertex.lat), format_coord(vertex.lon))?;
    }
    writeln!(out, "{line}")?;
    writeln!(out, "{OUTLINE}")?;
    writeln!(out, "{FILL}")?;
    writeln!(out, "{THRESHOLD}")?;
    writeln!(out)?;
    Ok(())
}

fn ensure_finite(c: Coordinate) -> Result<(), RenderError> {
    if c.is_finite() {
        Ok(())
    } else {
        Err(RenderError::NonFinite(c))
    }
}

/// Four decimal places, never scientific notation.
///
/// Values that round to zero are written without a sign.
pub fn format_coord(value: f64) -> String {
    let formatted = format!("{value:.4}");
    match formatted.strip_prefix('-') {
        Some(magnitude) if magnitude.bytes().all(|b| b == b'0' || b == b'.') => {
            magnitude.to_string()
        }
        _ => formatted,
    }
}
