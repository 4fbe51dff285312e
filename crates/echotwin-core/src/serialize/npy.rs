//! NumPy `.npy` array files.
//!
//! Layout: 6-byte magic `\x93NUMPY`, major/minor version bytes, a header
//! length (u16 for version 1, u32 for versions 2 and 3), then the header
//! text: a Python dict literal such as
//! `{'descr': '<f4', 'fortran_order': False, 'shape': (80, 59), }`,
//! space-padded and newline-terminated so the payload starts on a 16-byte
//! boundary. The payload is little-endian f32, row-major.
//!
//! Only C-ordered little-endian f32 arrays of rank 1 or 2 are accepted.

use std::io::Read;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use super::atomic::{read_file, write_atomic};
use crate::error::{EchoError, EchoResult};
use crate::matrix::FeatureMatrix;

/// Magic string at the start of every file.
pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Element type written and accepted: little-endian f32.
pub const F32_DESCR: &str = "<f4";

/// Payload alignment.
const ALIGNMENT: usize = 16;

/// Magic + version + u16 header length.
const V1_PREAMBLE_LEN: usize = 10;

/// Largest header text accepted when reading.
const MAX_HEADER_LEN: usize = 1 << 16;

/// Parsed `.npy` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    /// Format major version.
    pub major: u8,
    /// Format minor version.
    pub minor: u8,
    /// Element type descriptor, e.g. `<f4`.
    pub descr: String,
    /// Whether the payload is column-major.
    pub fortran_order: bool,
    /// Array dimensions.
    pub shape: Vec<usize>,
}

impl NpyHeader {
    /// Header for a C-ordered f32 array of the given shape.
    pub fn f32_array(shape: Vec<usize>) -> Self {
        Self {
            major: 1,
            minor: 0,
            descr: F32_DESCR.to_string(),
            fortran_order: false,
            shape,
        }
    }

    /// Product of the dimensions, or `None` if it or its f32 byte size
    /// overflows `usize`.
    pub fn element_count(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .filter(|n| n.checked_mul(4).is_some())
    }

    /// The dict literal, without padding.
    pub fn descriptor(&self) -> String {
        let shape = match self.shape.as_slice() {
            [n] => format!("({},)", n),
            dims => format!(
                "({})",
                dims.iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        format!(
            "{{'descr': '{}', 'fortran_order': {}, 'shape': {}, }}",
            self.descr,
            if self.fortran_order { "True" } else { "False" },
            shape
        )
    }

    /// Serializes magic, version, length and padded header text (version 1.0).
    pub fn encode(&self) -> Vec<u8> {
        let mut text = self.descriptor();
        let unpadded = V1_PREAMBLE_LEN + text.len() + 1;
        let padding = (ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT;
        text.extend(std::iter::repeat(' ').take(padding));
        text.push('\n');

        let mut out = Vec::with_capacity(V1_PREAMBLE_LEN + text.len());
        out.extend_from_slice(NPY_MAGIC);
        out.push(1);
        out.push(0);
        out.extend_from_slice(&(text.len() as u16).to_le_bytes());
        out.extend_from_slice(text.as_bytes());
        out
    }

    /// Reads and validates a header, leaving `reader` at the payload.
    pub fn read<R: Read>(reader: &mut R) -> EchoResult<Self> {
        let mut magic = [0u8; 6];
        reader
            .read_exact(&mut magic)
            .map_err(|_| EchoError::format("file too short for array magic"))?;
        if &magic != NPY_MAGIC {
            return Err(EchoError::format("missing \\x93NUMPY magic"));
        }

        let major = reader.read_u8().map_err(truncated("version"))?;
        let minor = reader.read_u8().map_err(truncated("version"))?;
        let header_len = match major {
            1 => reader
                .read_u16::<LittleEndian>()
                .map_err(truncated("header length"))? as usize,
            2 | 3 => reader
                .read_u32::<LittleEndian>()
                .map_err(truncated("header length"))? as usize,
            other => {
                return Err(EchoError::format(format!(
                    "unsupported array format version {}.{}",
                    other, minor
                )))
            }
        };

        if header_len > MAX_HEADER_LEN {
            return Err(EchoError::format(format!(
                "array header length {} exceeds {}",
                header_len, MAX_HEADER_LEN
            )));
        }
        let mut raw = vec![0u8; header_len];
        reader.read_exact(&mut raw).map_err(truncated("header"))?;
        let text = std::str::from_utf8(&raw)
            .map_err(|_| EchoError::format("array header is not valid text"))?;

        let fields = DescriptorParser::new(text).parse_dict()?;
        let mut descr = None;
        let mut fortran_order = None;
        let mut shape = None;
        for (key, value) in fields {
            match (key.as_str(), value) {
                ("descr", HeaderValue::Str(s)) => descr = Some(s),
                ("fortran_order", HeaderValue::Bool(b)) => fortran_order = Some(b),
                ("shape", HeaderValue::Tuple(dims)) => shape = Some(dims),
                ("descr" | "fortran_order" | "shape", _) => {
                    return Err(EchoError::format(format!("field '{}' has the wrong type", key)))
                }
                _ => {}
            }
        }

        Ok(Self {
            major,
            minor,
            descr: descr.ok_or_else(|| EchoError::format("header has no 'descr' field"))?,
            fortran_order: fortran_order
                .ok_or_else(|| EchoError::format("header has no 'fortran_order' field"))?,
            shape: shape.ok_or_else(|| EchoError::format("header has no 'shape' field"))?,
        })
    }

    /// Rejects element types and orderings this crate does not read.
    fn check_supported(&self) -> EchoResult<()> {
        if self.descr != F32_DESCR {
            return Err(EchoError::format(format!(
                "unsupported dtype '{}', expected '{}'",
                self.descr, F32_DESCR
            )));
        }
        if self.fortran_order {
            return Err(EchoError::format("fortran-ordered arrays are not supported"));
        }
        Ok(())
    }
}

fn truncated(what: &'static str) -> impl Fn(std::io::Error) -> EchoError {
    move |_| EchoError::format(format!("array file truncated in {}", what))
}

/// A decoded array of rank 1 or 2.
#[derive(Debug, Clone, PartialEq)]
pub enum NpyArray {
    Vector(Vec<f32>),
    Matrix(FeatureMatrix),
}

impl NpyArray {
    /// Array dimensions.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            NpyArray::Vector(v) => vec![v.len()],
            NpyArray::Matrix(m) => vec![m.rows(), m.cols()],
        }
    }
}

/// Encodes a 2-D array.
pub fn encode_matrix(matrix: &FeatureMatrix) -> Vec<u8> {
    encode_payload(
        NpyHeader::f32_array(vec![matrix.rows(), matrix.cols()]),
        matrix.as_slice(),
    )
}

/// Encodes a 1-D array.
pub fn encode_vector(values: &[f32]) -> Vec<u8> {
    encode_payload(NpyHeader::f32_array(vec![values.len()]), values)
}

fn encode_payload(header: NpyHeader, values: &[f32]) -> Vec<u8> {
    let mut out = header.encode();
    out.reserve(values.len() * 4);
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Decodes an array of rank 1 or 2.
pub fn decode_array(bytes: &[u8]) -> EchoResult<NpyArray> {
    let mut reader = bytes;
    let header = NpyHeader::read(&mut reader)?;
    header.check_supported()?;

    let count = header
        .element_count()
        .ok_or_else(|| EchoError::format(format!("shape {:?} is too large", header.shape)))?;
    if reader.len() != count * 4 {
        return Err(EchoError::format(format!(
            "payload holds {} bytes, shape {:?} needs {}",
            reader.len(),
            header.shape,
            count * 4
        )));
    }
    let mut values = vec![0.0f32; count];
    reader
        .read_f32_into::<LittleEndian>(&mut values)
        .map_err(truncated("payload"))?;

    match header.shape.as_slice() {
        [_] => Ok(NpyArray::Vector(values)),
        &[rows, cols] => Ok(NpyArray::Matrix(
            FeatureMatrix::from_row_major(rows, cols, values)
                .map_err(|e| EchoError::format(e.to_string()))?,
        )),
        dims => Err(EchoError::format(format!(
            "unsupported array rank {}",
            dims.len()
        ))),
    }
}

/// Decodes a 2-D array, rejecting other ranks.
pub fn decode_matrix(bytes: &[u8]) -> EchoResult<FeatureMatrix> {
    match decode_array(bytes)? {
        NpyArray::Matrix(m) => Ok(m),
        NpyArray::Vector(_) => Err(EchoError::format("expected a 2-D array, found 1-D")),
    }
}

/// Decodes a 1-D array, rejecting other ranks.
pub fn decode_vector(bytes: &[u8]) -> EchoResult<Vec<f32>> {
    match decode_array(bytes)? {
        NpyArray::Vector(v) => Ok(v),
        NpyArray::Matrix(_) => Err(EchoError::format("expected a 1-D array, found 2-D")),
    }
}

/// Writes a 2-D array file.
pub fn save_matrix(path: impl AsRef<Path>, matrix: &FeatureMatrix) -> EchoResult<()> {
    let path = path.as_ref();
    write_atomic(path, &encode_matrix(matrix))?;
    debug!(path = %path.display(), rows = matrix.rows(), cols = matrix.cols(), "wrote array");
    Ok(())
}

/// Writes a 1-D array file.
pub fn save_vector(path: impl AsRef<Path>, values: &[f32]) -> EchoResult<()> {
    let path = path.as_ref();
    write_atomic(path, &encode_vector(values))?;
    debug!(path = %path.display(), len = values.len(), "wrote array");
    Ok(())
}

/// Reads an array file of rank 1 or 2.
pub fn load_array(path: impl AsRef<Path>) -> EchoResult<NpyArray> {
    decode_array(&read_file(path.as_ref())?)
}

/// Reads a 2-D array file.
pub fn load_matrix(path: impl AsRef<Path>) -> EchoResult<FeatureMatrix> {
    decode_matrix(&read_file(path.as_ref())?)
}

/// Reads a 1-D array file.
pub fn load_vector(path: impl AsRef<Path>) -> EchoResult<Vec<f32>> {
    decode_vector(&read_file(path.as_ref())?)
}

/// Value of a header dict entry.
#[derive(Debug, Clone, PartialEq)]
enum HeaderValue {
    Str(String),
    Bool(bool),
    Tuple(Vec<usize>),
}

/// Recursive-descent parser for the header dict literal.
struct DescriptorParser<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> DescriptorParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.as_bytes(),
            pos: 0,
        }
    }

    fn parse_dict(&mut self) -> EchoResult<Vec<(String, HeaderValue)>> {
        let mut fields = Vec::new();
        self.expect(b'{')?;
        loop {
            self.skip_whitespace();
            if self.eat(b'}') {
                break;
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(b':')?;
            let value = self.parse_value()?;
            fields.push((key, value));
            self.skip_whitespace();
            if !self.eat(b',') {
                self.skip_whitespace();
                self.expect(b'}')?;
                break;
            }
        }
        self.skip_whitespace();
        if self.pos != self.text.len() {
            return Err(EchoError::format("unexpected text after array header"));
        }
        Ok(fields)
    }

    fn parse_value(&mut self) -> EchoResult<HeaderValue> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'\'') | Some(b'"') => self.parse_string().map(HeaderValue::Str),
            Some(b'(') => self.parse_tuple().map(HeaderValue::Tuple),
            Some(b'T') => self.keyword("True").map(|_| HeaderValue::Bool(true)),
            Some(b'F') => self.keyword("False").map(|_| HeaderValue::Bool(false)),
            _ => Err(self.error("expected a string, tuple or boolean")),
        }
    }

    fn parse_string(&mut self) -> EchoResult<String> {
        self.skip_whitespace();
        let quote = match self.peek() {
            Some(q @ (b'\'' | b'"')) => q,
            _ => return Err(self.error("expected a quoted string")),
        };
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let s = String::from_utf8_lossy(&self.text[start..self.pos]).into_owned();
                self.pos += 1;
                return Ok(s);
            }
            self.pos += 1;
        }
        Err(self.error("unterminated string"))
    }

    fn parse_tuple(&mut self) -> EchoResult<Vec<usize>> {
        self.expect(b'(')?;
        let mut dims = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(b')') {
                return Ok(dims);
            }
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric()) {
                self.pos += 1;
            }
            let digits = std::str::from_utf8(&self.text[start..self.pos]).unwrap_or("");
            // Python 2 writers suffix longs with 'L'.
            let digits = digits.strip_suffix('L').unwrap_or(digits);
            let dim = digits
                .parse::<usize>()
                .map_err(|_| self.error("shape fields must be non-negative integers"))?;
            dims.push(dim);
            self.skip_whitespace();
            if !self.eat(b',') {
                self.skip_whitespace();
                self.expect(b')')?;
                return Ok(dims);
            }
        }
    }

    fn keyword(&mut self, word: &str) -> EchoResult<()> {
        if self.text[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(())
        } else {
            Err(self.error("unknown identifier"))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: u8) -> EchoResult<()> {
        self.skip_whitespace();
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c as char)))
        }
    }

    fn error(&self, message: &str) -> EchoError {
        EchoError::format(format!("array header, byte {}: {}", self.pos, message))
    }
}
