use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;

use super::types::{AlertEntry, Coordinate, Geometry, RawFeedDocument, Ring};

/// Title used for entries that carry no (or an empty) `<title>`.
pub const PLACEHOLDER_TITLE: &str = "Untitled Alert";

const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";
const GEORSS_NS: &[u8] = b"http://www.georss.org/georss";
const CAP_NAMESPACES: [&[u8]; 2] = [
    b"urn:oasis:names:tc:emergency:cap:1.1",
    b"urn:oasis:names:tc:emergency:cap:1.2",
];

/// Document-level failures. Anything narrower than this only drops an entry.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Markup is not well-formed (syntax error, mismatched end tag, ...)
    #[error("XML parse error at byte {position}: {message}")]
    Xml { position: u64, message: String },
    /// Input ended while elements were still open
    #[error("Document truncated with {open} unclosed element(s)")]
    Truncated { open: usize },
    /// Input contained no element at all
    #[error("Document has no root element")]
    NoRoot,
}

/// Why a single entry was left out. Expected in steady state, never surfaced.
#[derive(Debug, Error)]
enum EntrySkip {
    #[error("undecodable text: {0}")]
    Malformed(String),
    #[error("no geometry")]
    NoGeometry,
    #[error("bad coordinate token {0:?}")]
    BadCoordinate(String),
    #[error("odd number of coordinate values ({0})")]
    OddCoordinateCount(usize),
    #[error("point needs exactly one pair, found {0}")]
    PointArity(usize),
    #[error("degenerate ring with {0} vertices")]
    DegenerateRing(usize),
}

/// Alerts extracted from one document, plus how many entries were dropped.
#[derive(Debug)]
pub struct ParseResult {
    pub entries: Vec<AlertEntry>,
    pub skipped: usize,
}

/// Decodes a fetched document into alert entries.
pub fn parse(doc: RawFeedDocument) -> Result<Vec<AlertEntry>, ParseError> {
    parse_feed(&doc.bytes).map(|r| r.entries)
}

/// Parses an Atom alert feed, keeping entries that resolve to a geometry.
///
/// Only a malformed document fails the call. Entries with undecodable text,
/// no geometry, or unusable coordinates are skipped and counted.
pub fn parse_feed(bytes: &[u8]) -> Result<ParseResult, ParseError> {
    // Text is trimmed per element in `EntryBuilder::close`, after CDATA and
    // comment-split fragments have been joined.
    let mut reader = NsReader::from_reader(bytes);

    let mut entries = Vec::new();
    let mut skipped = 0;
    let mut depth: usize = 0;
    let mut seen_root = false;
    let mut current: Option<EntryBuilder> = None;

    loop {
        let (vocab, event) = match reader.read_resolved_event() {
            Ok((ns, event)) => (Vocabulary::of(&ns), event),
            Err(e) => {
                return Err(ParseError::Xml {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                })
            }
        };

        match event {
            Event::Start(e) => {
                depth += 1;
                seen_root = true;
                let local = e.local_name();
                match current.as_mut() {
                    Some(builder) => builder.open(vocab, local.as_ref(), depth),
                    None if vocab.is_atom() && local.as_ref() == b"entry" => {
                        current = Some(EntryBuilder::new(depth));
                    }
                    None => {}
                }
            }
            Event::Empty(_) => seen_root = true,
            Event::Text(t) => {
                if let Some(builder) = current.as_mut().filter(|b| b.is_capturing(depth)) {
                    match t.unescape() {
                        Ok(text) => builder.push_text(&text),
                        Err(e) => builder.mark_malformed(e.to_string()),
                    }
                }
            }
            Event::CData(c) => {
                if let Some(builder) = current.as_mut().filter(|b| b.is_capturing(depth)) {
                    match std::str::from_utf8(&c) {
                        Ok(text) => builder.push_text(text),
                        Err(e) => builder.mark_malformed(e.to_string()),
                    }
                }
            }
            Event::End(_) => {
                if current.as_ref().is_some_and(|b| b.depth == depth) {
                    if let Some(builder) = current.take() {
                        match builder.finish() {
                            Ok(entry) => entries.push(entry),
                            Err(reason) => {
                                skipped += 1;
                                tracing::debug!(reason = %reason, "Skipping alert entry");
                            }
                        }
                    }
                } else if let Some(builder) = current.as_mut() {
                    builder.close(depth);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(ParseError::Truncated { open: depth });
    }
    if !seen_root {
        return Err(ParseError::NoRoot);
    }

    tracing::debug!(parsed = entries.len(), skipped = skipped, "Parsed alert feed");
    Ok(ParseResult { entries, skipped })
}

/// Replaces semicolons, which the directive grammar treats as delimiters.
pub fn sanitize_title(title: &str) -> String {
    title.replace(';', ",")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vocabulary {
    Atom,
    Cap,
    GeoRss,
    Unqualified,
    Other,
}

impl Vocabulary {
    fn of(ns: &ResolveResult<'_>) -> Self {
        match ns {
            ResolveResult::Bound(Namespace(ns)) if *ns == ATOM_NS => Vocabulary::Atom,
            ResolveResult::Bound(Namespace(ns)) if *ns == GEORSS_NS => Vocabulary::GeoRss,
            ResolveResult::Bound(Namespace(ns)) if CAP_NAMESPACES.iter().any(|cap| cap == ns) => {
                Vocabulary::Cap
            }
            ResolveResult::Unbound => Vocabulary::Unqualified,
            _ => Vocabulary::Other,
        }
    }

    fn is_atom(self) -> bool {
        matches!(self, Vocabulary::Atom | Vocabulary::Unqualified)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Point,
    Polygon,
}

/// A geometry source within an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GeometryKind {
    CapPolygon,
    GeoRssPolygon,
    GeoRssPoint,
    CapPoint,
}

/// Resolution order: the first kind with a candidate wins, nothing is merged.
const FALLBACK_ORDER: [GeometryKind; 4] = [
    GeometryKind::CapPolygon,
    GeometryKind::GeoRssPolygon,
    GeometryKind::GeoRssPoint,
    GeometryKind::CapPoint,
];

impl GeometryKind {
    fn matching(vocab: Vocabulary, local_name: &[u8]) -> Option<Self> {
        match (vocab, local_name) {
            (Vocabulary::Cap, b"polygon") => Some(GeometryKind::CapPolygon),
            (Vocabulary::GeoRss, b"polygon") => Some(GeometryKind::GeoRssPolygon),
            (Vocabulary::GeoRss, b"point") => Some(GeometryKind::GeoRssPoint),
            (Vocabulary::Cap, b"point") => Some(GeometryKind::CapPoint),
            _ => None,
        }
    }

    fn shape(self) -> Shape {
        match self {
            GeometryKind::CapPolygon | GeometryKind::GeoRssPolygon => Shape::Polygon,
            GeometryKind::GeoRssPoint | GeometryKind::CapPoint => Shape::Point,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Title,
    Geometry(GeometryKind),
}

#[derive(Debug)]
struct Capture {
    target: Target,
    depth: usize,
    text: String,
}

/// Accumulates one `<entry>` until its end tag.
#[derive(Debug)]
struct EntryBuilder {
    depth: usize,
    title: Option<String>,
    candidates: [Option<String>; 4],
    capture: Option<Capture>,
    malformed: Option<String>,
}

impl EntryBuilder {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            title: None,
            candidates: Default::default(),
            capture: None,
            malformed: None,
        }
    }

    fn open(&mut self, vocab: Vocabulary, local_name: &[u8], depth: usize) {
        if self.capture.is_some() {
            return;
        }
        let target = if depth == self.depth + 1
            && vocab.is_atom()
            && local_name == b"title"
            && self.title.is_none()
        {
            Target::Title
        } else if let Some(kind) = GeometryKind::matching(vocab, local_name) {
            if self.candidates[kind.index()].is_some() {
                return;
            }
            Target::Geometry(kind)
        } else {
            return;
        };
        self.capture = Some(Capture {
            target,
            depth,
            text: String::new(),
        });
    }

    fn is_capturing(&self, depth: usize) -> bool {
        self.capture.as_ref().is_some_and(|c| c.depth == depth)
    }

    fn push_text(&mut self, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.text.push_str(text);
        }
    }

    fn mark_malformed(&mut self, reason: String) {
        self.malformed.get_or_insert(reason);
    }

    fn close(&mut self, depth: usize) {
        if !self.is_capturing(depth) {
            return;
        }
        let Some(capture) = self.capture.take() else {
            return;
        };
        let text = capture.text.trim();
        if text.is_empty() {
            return;
        }
        match capture.target {
            Target::Title => self.title = Some(text.to_string()),
            Target::Geometry(kind) => self.candidates[kind.index()] = Some(text.to_string()),
        }
    }

    fn finish(self) -> Result<AlertEntry, EntrySkip> {
        if let Some(reason) = self.malformed {
            return Err(EntrySkip::Malformed(reason));
        }

        let (kind, text) = FALLBACK_ORDER
            .iter()
            .find_map(|&kind| {
                self.candidates[kind.index()]
                    .as_deref()
                    .map(|text| (kind, text))
            })
            .ok_or(EntrySkip::NoGeometry)?;

        let geometry = decode_geometry(kind.shape(), text)?;
        let title = sanitize_title(self.title.as_deref().unwrap_or(PLACEHOLDER_TITLE));

        Ok(AlertEntry { title, geometry })
    }
}

fn decode_geometry(shape: Shape, text: &str) -> Result<Geometry, EntrySkip> {
    let mut pairs = parse_coordinates(text)?;
    match shape {
        Shape::Point if pairs.len() == 1 => Ok(Geometry::Point(pairs.remove(0))),
        Shape::Point => Err(EntrySkip::PointArity(pairs.len())),
        Shape::Polygon => {
            let count = pairs.len();
            Ring::closed(pairs)
                .map(Geometry::Polygon)
                .ok_or(EntrySkip::DegenerateRing(count))
        }
    }
}

/// Splits `lat lon [lat lon ...]` into coordinates.
///
/// Commas count as separators too, so CAP's `lat,lon lat,lon` form decodes
/// the same way as GeoRSS's space-only form.
fn parse_coordinates(text: &str) -> Result<Vec<Coordinate>, EntrySkip> {
    let values = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(EntrySkip::BadCoordinate(token.to_string())),
        })
        .collect::<Result<Vec<f64>, _>>()?;

    if values.len() % 2 != 0 {
        return Err(EntrySkip::OddCoordinateCount(values.len()));
    }

    Ok(values
        .chunks_exact(2)
        .map(|pair| Coordinate::new(pair[0], pair[1]))
        .collect())
}
