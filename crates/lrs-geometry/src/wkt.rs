//! Extended well-known-text reader and writer
//!
//! Besides the OGC forms (`POINT(1 2)`, `LINESTRING Z (...)`, `LINESTRING M (...)`,
//! `LINESTRING ZM (...)`, `... EMPTY`) the reader accepts SQL-style `NULL` ordinates for Z and M,
//! e.g. `LINESTRING(10 1 NULL 10, 25 1 NULL 25)`, which is how measured geometries without
//! elevation are usually exchanged with spatial databases. The `wkt` crate rejects that form,
//! hence the small dedicated parser here.
//!
//! Untagged coordinates are read positionally: `x y`, `x y z`, `x y z m`. With an `M` tag a
//! three-ordinate coordinate is `x y m`.
//!
//! The writer stays inside the OGC grammar apart from the `NULL` ordinate: no SRID prefix,
//! no dimension tag, no extension keywords. Should the `wkt` crate ever accept `NULL`
//! ordinates it can replace this module without changing the text produced.

use crate::{Coord, GeometryError, Result, Shape, ShapeKind};
use std::fmt::Write;

/// Parse extended WKT into a [`Shape`]
pub fn parse(text: &str) -> Result<Shape> {
    let mut parser = Parser::new(text);
    let shape = parser.geometry()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(shape)
}

/// Serialize a [`Shape`] as extended WKT
///
/// A missing Z is written as `NULL` whenever the shape carries measures, so the output parses
/// back to the same ordinates.
pub fn write(shape: &Shape) -> String {
    let coords: Vec<&Coord> = match shape {
        Shape::Point(coord) => coord.iter().collect(),
        Shape::LineString(coords) => coords.iter().collect(),
        Shape::MultiLineString(parts) | Shape::Polygon(parts) => parts.iter().flatten().collect(),
    };
    let layout = Layout {
        has_z: coords.iter().any(|c| c.z.is_some()),
        has_m: coords.iter().any(|c| c.m.is_some()),
    };

    let kind = match shape {
        Shape::Point(_) => ShapeKind::Point,
        Shape::LineString(_) => ShapeKind::LineString,
        Shape::MultiLineString(_) => ShapeKind::MultiLineString,
        Shape::Polygon(_) => ShapeKind::Polygon,
    };
    let mut out = String::from(kind.as_str());
    if coords.is_empty() {
        out.push_str(" EMPTY");
        return out;
    }

    match shape {
        Shape::Point(Some(coord)) => {
            out.push('(');
            layout.write_coord(&mut out, coord);
            out.push(')');
        }
        Shape::Point(None) => {}
        Shape::LineString(coords) => layout.write_part(&mut out, coords),
        Shape::MultiLineString(parts) | Shape::Polygon(parts) => {
            out.push('(');
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                layout.write_part(&mut out, part);
            }
            out.push(')');
        }
    }
    out
}

/// Which optional ordinates are written for every coordinate of a shape
struct Layout {
    has_z: bool,
    has_m: bool,
}

impl Layout {
    fn write_part(&self, out: &mut String, coords: &[Coord]) {
        out.push('(');
        for (i, coord) in coords.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_coord(out, coord);
        }
        out.push(')');
    }

    fn write_coord(&self, out: &mut String, coord: &Coord) {
        // Writing into a String cannot fail
        let _ = write!(out, "{} {}", coord.x, coord.y);
        if self.has_z || self.has_m {
            write_ordinate(out, coord.z);
        }
        if self.has_m {
            write_ordinate(out, coord.m);
        }
    }
}

fn write_ordinate(out: &mut String, value: Option<f64>) {
    match value {
        Some(v) => {
            let _ = write!(out, " {v}");
        }
        None => out.push_str(" NULL"),
    }
}

/// Dimension tag following the geometry keyword
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dimensions {
    Untagged,
    Z,
    M,
    Zm,
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn error(&self, message: &str) -> GeometryError {
        GeometryError::Parse {
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    /// Consume `byte` if it is next, returning whether it was there
    fn accept(&mut self, byte: u8) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek_word(&mut self) -> &'a str {
        self.skip_whitespace();
        let start = self.pos;
        let end = self.text[start..]
            .find(|c: char| !c.is_ascii_alphabetic())
            .map_or(self.text.len(), |offset| start + offset);
        &self.text[start..end]
    }

    fn accept_word(&mut self, word: &str) -> bool {
        let next = self.peek_word();
        if !next.is_empty() && next.eq_ignore_ascii_case(word) {
            self.pos += next.len();
            true
        } else {
            false
        }
    }

    fn geometry(&mut self) -> Result<Shape> {
        let keyword = self.peek_word();
        let kind = ShapeKind::from_keyword(keyword)
            .ok_or_else(|| self.error(&format!("unsupported geometry type '{keyword}'")))?;
        self.pos += keyword.len();

        let dims = if self.accept_word("ZM") {
            Dimensions::Zm
        } else if self.accept_word("Z") {
            Dimensions::Z
        } else if self.accept_word("M") {
            Dimensions::M
        } else {
            Dimensions::Untagged
        };

        if self.accept_word("EMPTY") {
            return Ok(match kind {
                ShapeKind::Point => Shape::Point(None),
                ShapeKind::LineString => Shape::LineString(Vec::new()),
                ShapeKind::MultiLineString => Shape::MultiLineString(Vec::new()),
                ShapeKind::Polygon => Shape::Polygon(Vec::new()),
            });
        }

        match kind {
            ShapeKind::Point => {
                self.expect(b'(')?;
                let coord = self.coord(dims)?;
                self.expect(b')')?;
                Ok(Shape::Point(Some(coord)))
            }
            ShapeKind::LineString => Ok(Shape::LineString(self.coord_list(dims)?)),
            ShapeKind::MultiLineString => Ok(Shape::MultiLineString(self.part_list(dims)?)),
            ShapeKind::Polygon => Ok(Shape::Polygon(self.part_list(dims)?)),
        }
    }

    fn part_list(&mut self, dims: Dimensions) -> Result<Vec<Vec<Coord>>> {
        self.expect(b'(')?;
        let mut parts = vec![self.coord_list(dims)?];
        while self.accept(b',') {
            parts.push(self.coord_list(dims)?);
        }
        self.expect(b')')?;
        Ok(parts)
    }

    fn coord_list(&mut self, dims: Dimensions) -> Result<Vec<Coord>> {
        self.expect(b'(')?;
        let mut coords = vec![self.coord(dims)?];
        while self.accept(b',') {
            coords.push(self.coord(dims)?);
        }
        self.expect(b')')?;
        Ok(coords)
    }

    fn coord(&mut self, dims: Dimensions) -> Result<Coord> {
        let x = self
            .ordinate()?
            .ok_or_else(|| self.error("X ordinate cannot be NULL"))?;
        let y = self
            .ordinate()?
            .ok_or_else(|| self.error("Y ordinate cannot be NULL"))?;

        let mut extra = Vec::with_capacity(2);
        while extra.len() < 2 && self.ordinate_follows() {
            extra.push(self.ordinate()?);
        }

        let (z, m) = match (dims, extra.as_slice()) {
            (Dimensions::Untagged, []) => (None, None),
            (Dimensions::Untagged | Dimensions::Z, [z]) => (*z, None),
            (Dimensions::M, [m]) => (None, *m),
            (Dimensions::Untagged | Dimensions::Zm, [z, m]) => (*z, *m),
            _ => return Err(self.error("coordinate dimension does not match the geometry tag")),
        };
        Ok(Coord::new(x, y, z, m))
    }

    fn ordinate_follows(&mut self) -> bool {
        self.skip_whitespace();
        match self.peek() {
            Some(b) if b.is_ascii_digit() || b == b'-' || b == b'+' || b == b'.' => true,
            _ => self.peek_word().eq_ignore_ascii_case("NULL"),
        }
    }

    /// Parse a number, or `NULL` as `None`
    fn ordinate(&mut self) -> Result<Option<f64>> {
        if self.accept_word("NULL") {
            return Ok(None);
        }
        self.skip_whitespace();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
        {
            self.pos += 1;
        }
        let token = &self.text[start..self.pos];
        if token.is_empty() {
            return Err(self.error("expected a number"));
        }
        token
            .parse::<f64>()
            .map(Some)
            .map_err(|_| GeometryError::Parse {
                position: start,
                message: format!("invalid number '{token}'"),
            })
    }
}
