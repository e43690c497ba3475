//! End-to-end tests for parse → render over a realistic alert feed.
//!
//! These run without network access: the feed is inlined and handed
//! straight to the parser, then the placefile text is checked line by line.

use alert_placefile::feed::{parse, parse_feed, Geometry, ParseError, RawFeedDocument};
use alert_placefile::placefile::{render, PREAMBLE};
use pretty_assertions::assert_eq;

const ACTIVE_ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<feed xmlns="http://www.w3.org/2005/Atom"
      xmlns:cap="urn:oasis:names:tc:emergency:cap:1.2"
      xmlns:georss="http://www.georss.org/georss">
  <id>https://api.weather.gov/alerts/active.atom</id>
  <generator>NWS CAP Server</generator>
  <updated>2026-10-18T12:00:00+00:00</updated>
  <title>Current watches, warnings, and advisories</title>
  <entry>
    <id>urn:oid:2.49.0.1.840.0.aaa.001.1</id>
    <updated>2026-10-18T11:50:00-05:00</updated>
    <title>Tornado Warning issued October 18 at 11:50AM CDT; until 12:30PM CDT by NWS Norman OK</title>
    <summary>THE NATIONAL WEATHER SERVICE IN NORMAN HAS ISSUED A TORNADO WARNING</summary>
    <cap:event>Tornado Warning</cap:event>
    <cap:severity>Extreme</cap:severity>
    <cap:areaDesc>Cleveland, OK</cap:areaDesc>
    <cap:polygon>35.20,-97.50 35.30,-97.50 35.30,-97.30 35.20,-97.30 35.20,-97.50</cap:polygon>
    <georss:point>35.25 -97.40</georss:point>
  </entry>
  <entry>
    <id>urn:oid:2.49.0.1.840.0.aaa.002.1</id>
    <title>Flood Warning; County X</title>
    <cap:event>Flood Warning</cap:event>
    <georss:point>34.05 -118.25</georss:point>
  </entry>
  <entry>
    <id>urn:oid:2.49.0.1.840.0.aaa.003.1</id>
    <title>Special Weather Statement issued October 18</title>
    <cap:event>Special Weather Statement</cap:event>
    <cap:areaDesc>Lake Michigan</cap:areaDesc>
  </entry>
  <entry>
    <id>urn:oid:2.49.0.1.840.0.aaa.004.1</id>
    <title>Red Flag Warning</title>
    <georss:polygon>40.0 -105.0 41.0 -105.0 41.0 -104.0</georss:polygon>
  </entry>
  <entry>
    <id>urn:oid:2.49.0.1.840.0.aaa.005.1</id>
    <title>Broken Geometry</title>
    <cap:polygon>40.0 -105.0 41.0</cap:polygon>
  </entry>
</feed>
"#;

fn doc(body: &str) -> RawFeedDocument {
    RawFeedDocument::new(body.as_bytes().to_vec(), 200)
}

#[test]
fn test_realistic_feed_renders_expected_placefile() {
    let entries = parse(doc(ACTIVE_ATOM)).unwrap();
    let out = render(&entries);

    let expected = format!(
        "{PREAMBLE}\
Polygon: 35.2000, -97.5000, 35.3000, -97.5000, 35.3000, -97.3000, 35.2000, -97.3000, 35.2000, -97.5000\n\
Line: 2, 0\n\
Color: 255 0 0 64\n\
Threshold: 999\n\
\n\
Object: 35.2400/-97.4200\n\
Threshold: 999\n\
Icon: 1\n\
Text: Tornado Warning issued October 18 at 11:50AM CDT, until 12:30PM CDT by NWS Norman OK\n\
\n\
Object: 34.0500/-118.2500\n\
Threshold: 999\n\
Icon: 1\n\
Text: Flood Warning, County X\n\
\n\
Polygon: 40.0000, -105.0000, 41.0000, -105.0000, 41.0000, -104.0000, 40.0000, -105.0000\n\
Line: 2, 0\n\
Color: 255 0 0 64\n\
Threshold: 999\n\
\n\
Object: 40.5000/-104.7500\n\
Threshold: 999\n\
Icon: 1\n\
Text: Red Flag Warning\n\
\n"
    );

    assert_eq!(out, expected);
}

#[test]
fn test_skipped_entries_are_counted() {
    let result = parse_feed(ACTIVE_ATOM.as_bytes()).unwrap();
    assert_eq!(result.entries.len(), 3);
    assert_eq!(result.skipped, 2);
}

#[test]
fn test_polygon_wins_over_point_on_same_entry() {
    let entries = parse(doc(ACTIVE_ATOM)).unwrap();
    assert!(matches!(entries[0].geometry, Geometry::Polygon(_)));
    let out = render(&entries[..1]);
    assert!(!out.contains("Object: 35.2500/-97.4000"));
}

#[test]
fn test_boundary_line_is_closed() {
    let entries = parse(doc(ACTIVE_ATOM)).unwrap();
    let out = render(&entries);
    for line in out.lines().filter(|l| l.starts_with("Polygon: ")) {
        let values: Vec<&str> = line["Polygon: ".len()..].split(", ").collect();
        assert_eq!(values.len() % 2, 0);
        let n = values.len();
        assert_eq!(values[..2], values[n - 2..], "ring not closed: {line}");
    }
}

#[test]
fn test_output_has_no_semicolons_outside_preamble() {
    let entries = parse(doc(ACTIVE_ATOM)).unwrap();
    let out = render(&entries);
    assert!(!out.contains(';'));
}

#[test]
fn test_render_twice_is_identical() {
    let entries = parse(doc(ACTIVE_ATOM)).unwrap();
    assert_eq!(render(&entries), render(&entries));
}

#[test]
fn test_truncated_feed_is_parse_error() {
    let truncated = &ACTIVE_ATOM[..ACTIVE_ATOM.len() / 2];
    let result = parse(doc(truncated));
    assert!(result.is_err());
}

#[test]
fn test_non_xml_body_is_parse_error() {
    let result = parse(doc(r#"{"title": "Not Found", "status": 404}"#));
    assert!(matches!(result, Err(ParseError::NoRoot)));
}
