//! Content stream geometry: positioned text spans and painted rules.
//!
//! A simplified interpreter for the subset of PDF graphics that table
//! detection needs. Coordinates are tracked through the transformation
//! stack so both strategies see device space.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

/// A positioned piece of text. `x`/`y` locate the span's text-space
/// origin in device space; glyph widths are not tracked.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextSpan {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// A painted straight segment in device space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Segment {
    fn between(from: (f64, f64), to: (f64, f64)) -> Self {
        Self {
            x0: from.0,
            y0: from.1,
            x1: to.0,
            y1: to.1,
        }
    }
}

/// Text spans and painted segments collected from one page.
#[derive(Debug, Default)]
pub(crate) struct PageGeometry {
    pub spans: Vec<TextSpan>,
    pub segments: Vec<Segment>,
}

impl PageGeometry {
    /// Decode and walk a page's content stream. `None` when the stream
    /// is missing or undecodable; table extraction then has nothing to
    /// work with.
    pub(crate) fn from_page(doc: &Document, page_id: ObjectId) -> Option<Self> {
        let data = match doc.get_page_content(page_id) {
            Ok(data) => data,
            Err(e) => {
                debug!("No readable content stream: {}", e);
                return None;
            }
        };
        let content = match Content::decode(&data) {
            Ok(content) => content,
            Err(e) => {
                debug!("Undecodable content stream: {}", e);
                return None;
            }
        };
        Some(Self::from_operations(&content.operations))
    }

    /// Interpret graphics operations, accumulating spans and segments.
    pub(crate) fn from_operations(ops: &[Operation]) -> Self {
        let mut geometry = PageGeometry::default();

        let mut ctm = Matrix::IDENTITY;
        let mut ctm_stack: Vec<Matrix> = Vec::new();

        // Path construction buffer; a paint operator decides whether
        // the buffered segments become rules or are thrown away.
        let mut pending: Vec<Segment> = Vec::new();
        let mut current: Option<(f64, f64)> = None;
        let mut subpath_start: Option<(f64, f64)> = None;

        let mut tm = Matrix::IDENTITY;
        let mut tlm = Matrix::IDENTITY;
        let mut leading = 0.0_f64;

        for op in ops {
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => {
                    if let Some(m) = ctm_stack.pop() {
                        ctm = m;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operands(op) {
                        ctm = m.multiply(&ctm);
                    }
                }

                "m" => {
                    if let [x, y] = numbers(op)[..] {
                        let p = ctm.apply(x, y);
                        current = Some(p);
                        subpath_start = Some(p);
                    }
                }
                "l" => {
                    if let [x, y] = numbers(op)[..] {
                        let p = ctm.apply(x, y);
                        if let Some(from) = current {
                            pending.push(Segment::between(from, p));
                        }
                        current = Some(p);
                    }
                }
                "re" => {
                    if let [x, y, w, h] = numbers(op)[..] {
                        let c0 = ctm.apply(x, y);
                        let c1 = ctm.apply(x + w, y);
                        let c2 = ctm.apply(x + w, y + h);
                        let c3 = ctm.apply(x, y + h);
                        pending.push(Segment::between(c0, c1));
                        pending.push(Segment::between(c1, c2));
                        pending.push(Segment::between(c2, c3));
                        pending.push(Segment::between(c3, c0));
                        current = Some(c0);
                        subpath_start = Some(c0);
                    }
                }
                "h" => {
                    if let (Some(from), Some(to)) = (current, subpath_start) {
                        pending.push(Segment::between(from, to));
                        current = Some(to);
                    }
                }
                // Curves contribute no straight rules, only an endpoint.
                "c" => {
                    if let [.., x, y] = numbers(op)[..] {
                        current = Some(ctm.apply(x, y));
                    }
                }
                "v" | "y" => {
                    if let [.., x, y] = numbers(op)[..] {
                        current = Some(ctm.apply(x, y));
                    }
                }

                "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    if matches!(op.operator.as_str(), "s" | "b" | "b*") {
                        if let (Some(from), Some(to)) = (current, subpath_start) {
                            pending.push(Segment::between(from, to));
                        }
                    }
                    geometry.segments.append(&mut pending);
                    current = None;
                    subpath_start = None;
                }
                "n" => {
                    pending.clear();
                    current = None;
                    subpath_start = None;
                }

                "BT" => {
                    tm = Matrix::IDENTITY;
                    tlm = Matrix::IDENTITY;
                }
                "Tm" => {
                    if let Some(m) = matrix_operands(op) {
                        tm = m;
                        tlm = m;
                    }
                }
                "Td" => {
                    if let [tx, ty] = numbers(op)[..] {
                        tlm = tlm.translated(tx, ty);
                        tm = tlm;
                    }
                }
                "TD" => {
                    if let [tx, ty] = numbers(op)[..] {
                        leading = -ty;
                        tlm = tlm.translated(tx, ty);
                        tm = tlm;
                    }
                }
                "TL" => {
                    if let [l] = numbers(op)[..] {
                        leading = l;
                    }
                }
                "T*" => {
                    tlm = tlm.translated(0.0, -leading);
                    tm = tlm;
                }

                "Tj" => {
                    if let Some(text) = op.operands.first().and_then(text_of) {
                        geometry.push_span(&tm, &ctm, &text);
                    }
                }
                "'" => {
                    tlm = tlm.translated(0.0, -leading);
                    tm = tlm;
                    if let Some(text) = op.operands.first().and_then(text_of) {
                        geometry.push_span(&tm, &ctm, &text);
                    }
                }
                "\"" => {
                    tlm = tlm.translated(0.0, -leading);
                    tm = tlm;
                    if let Some(text) = op.operands.get(2).and_then(text_of) {
                        geometry.push_span(&tm, &ctm, &text);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        let text: String = items.iter().filter_map(text_of).collect();
                        geometry.push_span(&tm, &ctm, &text);
                    }
                }

                _ => {}
            }
        }

        geometry
    }

    fn push_span(&mut self, tm: &Matrix, ctm: &Matrix, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        let trm = tm.multiply(ctm);
        self.spans.push(TextSpan {
            x: trm.e,
            y: trm.f,
            text: trimmed.to_string(),
        });
    }
}

/// Merge sorted 1-D positions whose consecutive gap is within `tol`;
/// each cluster is represented by its mean.
pub(crate) fn cluster_positions(mut values: Vec<f64>, tol: f64) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));

    let mut clusters = Vec::new();
    let mut members: Vec<f64> = Vec::new();
    for v in values {
        match members.last() {
            Some(&prev) if v - prev <= tol => members.push(v),
            Some(_) => {
                clusters.push(mean(&members));
                members = vec![v];
            }
            None => members.push(v),
        }
    }
    if !members.is_empty() {
        clusters.push(mean(&members));
    }
    clusters
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// PDF transformation matrix `[a b c d e f]`, row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Apply `self`, then `other`.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Premultiply a translation, as `Td`/`T*` require.
    fn translated(&self, tx: f64, ty: f64) -> Matrix {
        Matrix {
            e: tx * self.a + ty * self.c + self.e,
            f: tx * self.b + ty * self.d + self.f,
            ..*self
        }
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn numbers(op: &Operation) -> Vec<f64> {
    op.operands.iter().filter_map(number).collect()
}

fn matrix_operands(op: &Operation) -> Option<Matrix> {
    if let [a, b, c, d, e, f] = numbers(op)[..] {
        Some(Matrix { a, b, c, d, e, f })
    } else {
        None
    }
}

/// Decode a PDF string operand as Latin-1. Fonts with custom CID maps
/// will garble here; the positions still hold, which is all the grid
/// strategy needs.
fn text_of(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(bytes.iter().map(|&b| b as char).collect()),
        _ => None,
    }
}
