//! Restricted OBJ reader and writer
//!
//! Only two record types are understood:
//!
//! ```text
//! v <f32> <f32> <f32>
//! f <uint> <uint> <uint> [<uint> ...]
//! ```
//!
//! The file is split into whitespace-separated words and walked as one token
//! stream, so a record may continue onto the next line. Every other word is
//! skipped, which also covers `vt`, `vn`, `g`, `usemtl` and `#` comments.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::ParseError;

/// Raw result of parsing an OBJ file.
///
/// `indices` are 0-based and come in triangle triples. Every index is
/// guaranteed to be smaller than `positions.len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl ObjData {
    /// Number of triangles described by `indices`.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when the file contained no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Write the data back out as `v` and `f` lines (1-based indices).
    ///
    /// Floats use Rust's shortest round-trip formatting, so parsing the
    /// output reproduces the same arrays.
    pub fn to_obj_string(&self) -> String {
        let mut out = String::new();
        for [x, y, z] in &self.positions {
            out.push_str(&format!("v {} {} {}\n", x, y, z));
        }
        for tri in self.indices.chunks_exact(3) {
            out.push_str(&format!("f {} {} {}\n", tri[0] + 1, tri[1] + 1, tri[2] + 1));
        }
        out
    }
}

/// Read a whole OBJ file into memory and parse it.
///
/// A path that is missing or is not a regular file (a directory, say) is
/// reported as [`ParseError::NotFound`]; failures while reading an existing
/// file are [`ParseError::Io`].
pub fn load_obj(path: &Path) -> Result<ObjData, ParseError> {
    if !path.is_file() {
        return Err(ParseError::NotFound(path.to_path_buf()));
    }

    let data = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ParseError::NotFound(path.to_path_buf()),
        _ => ParseError::Io(path.to_path_buf(), e),
    })?;

    let obj = parse_obj(&data)?;
    debug!(
        "Loaded OBJ '{}': {} positions, {} triangles",
        path.display(),
        obj.positions.len(),
        obj.triangle_count()
    );
    Ok(obj)
}

/// Parse the contents of an OBJ file.
///
/// Faces with more than three indices are fan-triangulated around their
/// first index: `f 1 2 3 4` becomes `(0, 1, 2)` and `(0, 2, 3)`.
pub fn parse_obj(data: &[u8]) -> Result<ObjData, ParseError> {
    let mut tokens = Tokens::new(data);
    let mut positions = Vec::new();
    let mut indices = Vec::new();

    while let Some(token) = tokens.next() {
        match token.text {
            b"v" => {
                let x = parse_coord(tokens.require("v", token.line)?)?;
                let y = parse_coord(tokens.require("v", token.line)?)?;
                let z = parse_coord(tokens.require("v", token.line)?)?;
                positions.push([x, y, z]);
            }
            b"f" => {
                let pivot = parse_index(tokens.require("f", token.line)?)?;
                let mut prev = parse_index(tokens.require("f", token.line)?)?;
                let mut next = parse_index(tokens.require("f", token.line)?)?;
                indices.extend_from_slice(&[pivot, prev, next]);

                while let Some(extra) = tokens.peek().filter(Token::starts_with_digit) {
                    tokens.next();
                    prev = next;
                    next = parse_index(extra)?;
                    indices.extend_from_slice(&[pivot, prev, next]);
                }
            }
            _ => {}
        }
    }

    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(ParseError::IndexOutOfRange {
            obj_index: u64::from(bad) + 1,
            vertex_count: positions.len(),
        });
    }

    Ok(ObjData { positions, indices })
}

fn parse_coord(token: Token<'_>) -> Result<f32, ParseError> {
    std::str::from_utf8(token.text)
        .ok()
        .and_then(|s| s.parse::<f32>().ok())
        .ok_or_else(|| token.malformed())
}

/// Parse a 1-based face index into a 0-based one.
///
/// Only the leading digits are read, so `7/3/2` yields position 7 and the
/// texture/normal references are dropped.
fn parse_index(token: Token<'_>) -> Result<u32, ParseError> {
    let digits = token
        .text
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();

    std::str::from_utf8(&token.text[..digits])
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .and_then(|i| i.checked_sub(1))
        .ok_or_else(|| token.malformed())
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a [u8],
    line: usize,
}

impl Token<'_> {
    fn starts_with_digit(&self) -> bool {
        self.text.first().is_some_and(u8::is_ascii_digit)
    }

    fn malformed(&self) -> ParseError {
        ParseError::MalformedNumber {
            token: String::from_utf8_lossy(self.text).into_owned(),
            line: self.line,
        }
    }
}

/// Word splitter over space, tab, CR and LF. Tracks line numbers for errors.
#[derive(Debug, Clone, Copy)]
struct Tokens<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, line: 1 }
    }

    fn peek(&self) -> Option<Token<'a>> {
        let mut ahead = *self;
        ahead.next()
    }

    /// Next token of a fixed-arity record, or `Truncated` if the data ran out.
    fn require(&mut self, record: &'static str, line: usize) -> Result<Token<'a>, ParseError> {
        self.next().ok_or(ParseError::Truncated { record, line })
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while let Some(&b) = self.data.get(self.pos) {
            if !is_delimiter(b) {
                break;
            }
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }

        if self.pos >= self.data.len() {
            return None;
        }

        let start = self.pos;
        while self.data.get(self.pos).is_some_and(|&b| !is_delimiter(b)) {
            self.pos += 1;
        }

        Some(Token {
            text: &self.data[start..self.pos],
            line: self.line,
        })
    }
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ObjData {
        parse_obj(text.as_bytes()).expect("valid OBJ")
    }

    #[test]
    fn single_vertex() {
        let obj = parse("v 1.0 2.0 3.0");
        assert_eq!(obj.positions, vec![[1.0, 2.0, 3.0]]);
        assert!(obj.indices.is_empty());
    }

    #[test]
    fn triangle_face_is_zero_based() {
        let obj = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3");
        assert_eq!(obj.indices, vec![0, 1, 2]);
    }

    #[test]
    fn quad_face_is_fan_triangulated() {
        let obj = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        assert_eq!(obj.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn pentagon_keeps_first_index_as_pivot() {
        let obj = parse("v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5");
        assert_eq!(obj.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
        assert_eq!(obj.triangle_count(), 3);
    }

    #[test]
    fn face_stops_at_next_record() {
        let obj = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nv 5 5 5\nf 4 1 2");
        assert_eq!(obj.positions.len(), 4);
        assert_eq!(obj.indices, vec![0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn unknown_records_and_comments_are_skipped() {
        let text = "# a comment line\n\
                    o teapot\n\
                    mtllib teapot.mtl\n\
                    v 0 0 0\n\
                    vt 0.5 0.5\n\
                    vn 0 0 1\n\
                    v 1 0 0\n\
                    v 0 1 0\n\
                    usemtl shiny\n\
                    s off\n\
                    f 1 2 3\n";
        let obj = parse(text);
        assert_eq!(obj.positions.len(), 3);
        assert_eq!(obj.indices, vec![0, 1, 2]);
    }

    #[test]
    fn composite_face_tokens_use_position_index() {
        let obj = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1/1 2/1/1 3//1");
        assert_eq!(obj.indices, vec![0, 1, 2]);
    }

    #[test]
    fn records_may_span_lines_and_tabs() {
        let obj = parse("v\t1.5\r\n-2e1\n  0.25\r\n");
        assert_eq!(obj.positions, vec![[1.5, -20.0, 0.25]]);
    }

    #[test]
    fn fourth_vertex_component_is_ignored() {
        let obj = parse("v 1 2 3 1.0\nv 4 5 6");
        assert_eq!(obj.positions, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn faces_may_reference_later_positions() {
        let obj = parse("f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0");
        assert_eq!(obj.indices, vec![0, 1, 2]);
    }

    #[test]
    fn empty_input_is_empty_data() {
        let obj = parse(" \n\t\r\n");
        assert!(obj.is_empty());
        assert!(obj.indices.is_empty());
    }

    #[test]
    fn truncated_vertex_is_reported() {
        let err = parse_obj(b"v 1.0 2.0").unwrap_err();
        match err {
            ParseError::Truncated { record, line } => {
                assert_eq!(record, "v");
                assert_eq!(line, 1);
            }
            other => panic!("expected Truncated, got: {:?}", other),
        }
    }

    #[test]
    fn truncated_face_is_reported_with_its_line() {
        let err = parse_obj(b"v 0 0 0\nv 1 0 0\nf 1 2").unwrap_err();
        match err {
            ParseError::Truncated { record, line } => {
                assert_eq!(record, "f");
                assert_eq!(line, 3);
            }
            other => panic!("expected Truncated, got: {:?}", other),
        }
    }

    #[test]
    fn malformed_coordinate_fails_the_load() {
        let err = parse_obj(b"v 0 0 0\nv 1.0 abc 3.0").unwrap_err();
        match err {
            ParseError::MalformedNumber { token, line } => {
                assert_eq!(token, "abc");
                assert_eq!(line, 2);
            }
            other => panic!("expected MalformedNumber, got: {:?}", other),
        }
    }

    #[test]
    fn zero_face_index_is_malformed() {
        let err = parse_obj(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2").unwrap_err();
        assert!(matches!(err, ParseError::MalformedNumber { .. }));
    }

    #[test]
    fn non_numeric_initial_face_index_is_malformed() {
        let err = parse_obj(b"v 0 0 0\nf 1 2 v 3 4 5").unwrap_err();
        match err {
            ParseError::MalformedNumber { token, .. } => assert_eq!(token, "v"),
            other => panic!("expected MalformedNumber, got: {:?}", other),
        }
    }

    #[test]
    fn out_of_range_face_index_is_rejected() {
        let err = parse_obj(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4").unwrap_err();
        match err {
            ParseError::IndexOutOfRange {
                obj_index,
                vertex_count,
            } => {
                assert_eq!(obj_index, 4);
                assert_eq!(vertex_count, 3);
            }
            other => panic!("expected IndexOutOfRange, got: {:?}", other),
        }
    }

    #[test]
    fn written_obj_parses_back_identically() {
        let original = parse(
            "v 0.1 -2.5 3.333333\nv 1e-7 0 1\nv 123456.78 0.5 -0.0\nv 9 8 7\n\
             f 1 2 3 4\nf 4 3 2\n",
        );
        let reparsed = parse(&original.to_obj_string());
        assert_eq!(reparsed, original);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_obj(Path::new("/nonexistent/umbra/teapot.obj")).unwrap_err();
        assert!(matches!(err, ParseError::NotFound(_)));
    }

    #[test]
    fn directory_is_not_found() {
        let dir = std::env::temp_dir();
        match load_obj(&dir) {
            Err(ParseError::NotFound(path)) => assert_eq!(path, dir),
            other => panic!("expected NotFound, got: {:?}", other),
        }
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("umbra-obj-load-{}.obj", std::process::id()));
        fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").expect("write temp OBJ");

        let obj = load_obj(&path);
        let _ = fs::remove_file(&path);

        let obj = obj.expect("temp OBJ loads");
        assert_eq!(obj.positions.len(), 3);
        assert_eq!(obj.indices, vec![0, 1, 2]);
    }
}
