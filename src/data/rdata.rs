//! Reader for R's `.rda` / `.RData` workspace files.
//!
//! Only the XDR (big-endian binary) serialization is understood, which is what
//! `save()` writes by default. The stream may be gzip, bzip2 or xz compressed.
//! Decoded objects are exposed as an [`RObject`] tree; data frames can be
//! converted to polars tables with [`RObject::to_data_frame`].

use crate::error::{ClaimBoostError, Result};
use polars::prelude::*;
use std::io::{Read, Write};

// SEXP type codes
const NILSXP: u8 = 0;
const SYMSXP: u8 = 1;
const LISTSXP: u8 = 2;
const CLOSXP: u8 = 3;
const ENVSXP: u8 = 4;
const PROMSXP: u8 = 5;
const LANGSXP: u8 = 6;
const SPECIALSXP: u8 = 7;
const BUILTINSXP: u8 = 8;
const CHARSXP: u8 = 9;
const LGLSXP: u8 = 10;
const INTSXP: u8 = 13;
const REALSXP: u8 = 14;
const CPLXSXP: u8 = 15;
const STRSXP: u8 = 16;
const DOTSXP: u8 = 17;
const VECSXP: u8 = 19;
const EXPRSXP: u8 = 20;
const BCODESXP: u8 = 21;
const EXTPTRSXP: u8 = 22;
const WEAKREFSXP: u8 = 23;
const RAWSXP: u8 = 24;
const S4SXP: u8 = 25;

// Serialization-only pseudo types
const ALTREP_SXP: u8 = 238;
const BASEENV_SXP: u8 = 241;
const EMPTYENV_SXP: u8 = 242;
const PERSISTSXP: u8 = 247;
const PACKAGESXP: u8 = 248;
const NAMESPACESXP: u8 = 249;
const BASENAMESPACE_SXP: u8 = 250;
const MISSINGARG_SXP: u8 = 251;
const UNBOUNDVALUE_SXP: u8 = 252;
const GLOBALENV_SXP: u8 = 253;
const NILVALUE_SXP: u8 = 254;
const REFSXP: u8 = 255;

const HAS_ATTR_BIT: u32 = 1 << 9;
const HAS_TAG_BIT: u32 = 1 << 10;
const LATIN1_MASK: u32 = 1 << 2;

const NA_INTEGER: i32 = i32::MIN;

/// Upper bound on the decompressed size of an RData stream
pub const MAX_DECOMPRESSED_SIZE: usize = 1 << 30;
/// Upper bound on the length of an expanded compact sequence
const MAX_SEQUENCE_LEN: usize = MAX_DECOMPRESSED_SIZE / 8;

/// Tagged entries of a pairlist
pub type Pairs = Vec<(Option<String>, RObject)>;

/// Payload of a decoded R object
#[derive(Debug, Clone, PartialEq)]
pub enum RValue {
    Null,
    Symbol(String),
    Pairlist(Pairs),
    /// Calls, closures, promises and `...` lists, kept as their cells
    Language(Pairs),
    Environment(Vec<(String, RObject)>),
    /// Well-known singletons such as the global environment
    Marker(&'static str),
    Namespace(Vec<Option<String>>),
    Char(Option<String>),
    Logical(Vec<Option<bool>>),
    Integer(Vec<Option<i32>>),
    Real(Vec<f64>),
    Complex(Vec<(f64, f64)>),
    Str(Vec<Option<String>>),
    List(Vec<RObject>),
    Expression(Vec<RObject>),
    Raw(Vec<u8>),
    S4,
    Builtin(String),
}

/// A decoded R object with its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct RObject {
    pub value: RValue,
    pub attributes: Vec<(String, RObject)>,
}

impl From<RValue> for RObject {
    fn from(value: RValue) -> Self {
        Self {
            value,
            attributes: Vec::new(),
        }
    }
}

impl RObject {
    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&RObject> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Non-missing strings of a character vector attribute
    fn string_attribute(&self, name: &str) -> Vec<String> {
        match self.attribute(name).map(|a| &a.value) {
            Some(RValue::Str(values)) => values.iter().flatten().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// The `class` attribute
    pub fn class(&self) -> Vec<String> {
        self.string_attribute("class")
    }

    /// Whether `class` contains `name`
    pub fn inherits(&self, name: &str) -> bool {
        self.class().iter().any(|c| c == name)
    }

    /// Number of elements for vector-like values
    pub fn len(&self) -> usize {
        match &self.value {
            RValue::Null => 0,
            RValue::Pairlist(v) | RValue::Language(v) => v.len(),
            RValue::Logical(v) => v.len(),
            RValue::Integer(v) => v.len(),
            RValue::Real(v) => v.len(),
            RValue::Complex(v) => v.len(),
            RValue::Str(v) => v.len(),
            RValue::List(v) | RValue::Expression(v) => v.len(),
            RValue::Raw(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert a `data.frame` object into a polars table
    pub fn to_data_frame(&self) -> Result<DataFrame> {
        if !self.inherits("data.frame") {
            return Err(ClaimBoostError::RDataError(format!(
                "object is not a data.frame (class: {:?})",
                self.class()
            )));
        }
        let RValue::List(columns) = &self.value else {
            return Err(ClaimBoostError::RDataError(
                "data.frame payload is not a list".to_string(),
            ));
        };

        let names = match self.attribute("names").map(|a| &a.value) {
            Some(RValue::Str(names)) if names.len() == columns.len() => names.clone(),
            _ => {
                return Err(ClaimBoostError::RDataError(
                    "data.frame has no usable names attribute".to_string(),
                ))
            }
        };

        let series = columns
            .iter()
            .zip(names)
            .enumerate()
            .map(|(i, (column, name))| {
                let name = name.unwrap_or_else(|| format!("V{}", i + 1));
                column_to_series(&name, column).map(Column::from)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DataFrame::new(series)?)
    }
}

fn column_to_series(name: &str, column: &RObject) -> Result<Series> {
    let series = match &column.value {
        RValue::Integer(codes) if column.inherits("factor") => {
            let levels = column.string_attribute("levels");
            let values: Vec<Option<String>> = codes
                .iter()
                .map(|code| {
                    code.and_then(|k| usize::try_from(k).ok())
                        .and_then(|k| k.checked_sub(1))
                        .and_then(|k| levels.get(k).cloned())
                })
                .collect();
            Series::new(name.into(), values)
        }
        RValue::Integer(values) => Series::new(name.into(), values.as_slice()),
        RValue::Real(values) => {
            let values: Vec<Option<f64>> = values
                .iter()
                .map(|&v| if v.is_nan() { None } else { Some(v) })
                .collect();
            Series::new(name.into(), values)
        }
        RValue::Logical(values) => Series::new(name.into(), values.as_slice()),
        RValue::Str(values) => Series::new(name.into(), values.as_slice()),
        other => {
            return Err(ClaimBoostError::RDataError(format!(
                "column '{}' has unsupported type {}",
                name,
                value_kind(other)
            )))
        }
    };
    Ok(series)
}

fn value_kind(value: &RValue) -> &'static str {
    match value {
        RValue::Null => "NULL",
        RValue::Symbol(_) => "symbol",
        RValue::Pairlist(_) => "pairlist",
        RValue::Language(_) => "language",
        RValue::Environment(_) | RValue::Marker(_) | RValue::Namespace(_) => "environment",
        RValue::Char(_) => "CHARSXP",
        RValue::Logical(_) => "logical",
        RValue::Integer(_) => "integer",
        RValue::Real(_) => "double",
        RValue::Complex(_) => "complex",
        RValue::Str(_) => "character",
        RValue::List(_) => "list",
        RValue::Expression(_) => "expression",
        RValue::Raw(_) => "raw",
        RValue::S4 => "S4",
        RValue::Builtin(_) => "builtin",
    }
}

/// Undo any gzip / bzip2 / xz compression of an RData file
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    decompress_with_limit(bytes, MAX_DECOMPRESSED_SIZE)
}

fn decompress_with_limit(bytes: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut sink = CappedBuffer::new(limit);
    if bytes.starts_with(&[0x1f, 0x8b]) {
        std::io::copy(&mut flate2::read::MultiGzDecoder::new(bytes), &mut sink)
            .map_err(|e| ClaimBoostError::RDataError(format!("gzip: {}", e)))?;
    } else if bytes.starts_with(b"BZh") {
        std::io::copy(&mut bzip2::read::BzDecoder::new(bytes), &mut sink)
            .map_err(|e| ClaimBoostError::RDataError(format!("bzip2: {}", e)))?;
    } else if bytes.starts_with(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]) {
        let mut input = bytes;
        lzma_rs::xz_decompress(&mut input, &mut sink)
            .map_err(|e| ClaimBoostError::RDataError(format!("xz: {:?}", e)))?;
    } else {
        sink.write_all(bytes)
            .map_err(|e| ClaimBoostError::RDataError(e.to_string()))?;
    }
    Ok(sink.into_inner())
}

/// Output buffer that refuses to grow past `limit` bytes
struct CappedBuffer {
    buf: Vec<u8>,
    limit: usize,
}

impl CappedBuffer {
    fn new(limit: usize) -> Self {
        Self { buf: Vec::new(), limit }
    }

    fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl Write for CappedBuffer {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        if self.buf.len().saturating_add(data.len()) > self.limit {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("decompressed data exceeds {} bytes", self.limit),
            ));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Decode an RData file (possibly compressed) into its named top-level objects
pub fn read_rdata(bytes: &[u8]) -> Result<Vec<(String, RObject)>> {
    let data = decompress(bytes)?;

    let payload = if let Some(rest) = data
        .strip_prefix(b"RDX2\n")
        .or_else(|| data.strip_prefix(b"RDX3\n"))
    {
        rest
    } else if data.starts_with(b"RDA") || data.starts_with(b"RDB") {
        return Err(ClaimBoostError::RDataError(
            "only XDR-serialized RData files are supported".to_string(),
        ));
    } else {
        return Err(ClaimBoostError::RDataError(
            "missing RData magic header".to_string(),
        ));
    };

    let mut reader = XdrReader::new(payload);
    reader.read_header()?;

    let root = reader.read_item()?;
    match root.value {
        RValue::Pairlist(entries) => Ok(entries
            .into_iter()
            .map(|(tag, value)| (tag.unwrap_or_default(), value))
            .collect()),
        RValue::Null => Ok(Vec::new()),
        other => Err(ClaimBoostError::RDataError(format!(
            "expected a pairlist of objects, found {}",
            value_kind(&other)
        ))),
    }
}

/// Decode `bytes` and convert the object called `name` into a table
pub fn read_data_frame(bytes: &[u8], name: &str) -> Result<DataFrame> {
    let objects = read_rdata(bytes)?;
    let available: Vec<&str> = objects.iter().map(|(n, _)| n.as_str()).collect();
    let object = objects
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, o)| o)
        .ok_or_else(|| {
            ClaimBoostError::RDataError(format!(
                "object '{}' not found (available: {:?})",
                name, available
            ))
        })?;
    object.to_data_frame()
}

struct Flags {
    sexp_type: u8,
    levels: u32,
    has_attr: bool,
    has_tag: bool,
    raw: u32,
}

impl Flags {
    fn unpack(raw: u32) -> Self {
        Self {
            sexp_type: (raw & 0xFF) as u8,
            levels: raw >> 12,
            has_attr: raw & HAS_ATTR_BIT != 0,
            has_tag: raw & HAS_TAG_BIT != 0,
            raw,
        }
    }
}

/// Cursor over an XDR serialization stream
pub(crate) struct XdrReader<'a> {
    data: &'a [u8],
    offset: usize,
    refs: Vec<RObject>,
}

impl<'a> XdrReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            refs: Vec::new(),
        }
    }

    fn ensure_available(&self, n: usize) -> Result<()> {
        if self.data.len().saturating_sub(self.offset) < n {
            return Err(ClaimBoostError::RDataError(format!(
                "unexpected end of data at byte {} (need {} more)",
                self.offset, n
            )));
        }
        Ok(())
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure_available(n)?;
        let data = self.data;
        let slice = &data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn read_i32(&mut self) -> Result<i32> {
        let b = self.read_bytes(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_f64(&mut self) -> Result<f64> {
        let b = self.read_bytes(8)?;
        Ok(f64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    fn read_length(&mut self) -> Result<usize> {
        match self.read_i32()? {
            -1 => {
                let upper = self.read_i32()? as u32 as u64;
                let lower = self.read_i32()? as u32 as u64;
                usize::try_from((upper << 32) | lower).map_err(|_| {
                    ClaimBoostError::RDataError("vector too long for this platform".to_string())
                })
            }
            n if n < 0 => Err(ClaimBoostError::RDataError(format!(
                "invalid vector length {}",
                n
            ))),
            n => Ok(n as usize),
        }
    }

    /// Length of a vector whose elements take `width` bytes each
    fn read_vector_length(&mut self, width: usize) -> Result<usize> {
        let len = self.read_length()?;
        self.ensure_available(len.saturating_mul(width))?;
        Ok(len)
    }

    fn read_header(&mut self) -> Result<()> {
        match self.read_bytes(2)? {
            b"X\n" => {}
            b"A\n" => {
                return Err(ClaimBoostError::RDataError(
                    "ASCII serialization is not supported".to_string(),
                ))
            }
            b"B\n" => {
                return Err(ClaimBoostError::RDataError(
                    "native binary serialization is not supported".to_string(),
                ))
            }
            other => {
                return Err(ClaimBoostError::RDataError(format!(
                    "unknown serialization format {:?}",
                    String::from_utf8_lossy(other)
                )))
            }
        }

        let version = self.read_i32()?;
        let _writer_version = self.read_i32()?;
        let _min_reader_version = self.read_i32()?;
        match version {
            2 => {}
            3 => {
                let nelen = self.read_length()?;
                let _native_encoding = self.read_bytes(nelen)?;
            }
            v => {
                return Err(ClaimBoostError::RDataError(format!(
                    "unsupported serialization version {}",
                    v
                )))
            }
        }
        Ok(())
    }

    fn add_ref(&mut self, object: RObject) {
        self.refs.push(object);
    }

    fn read_string_vec(&mut self) -> Result<Vec<Option<String>>> {
        if self.read_i32()? != 0 {
            return Err(ClaimBoostError::RDataError(
                "names in persistent strings are not supported".to_string(),
            ));
        }
        let len = self.read_vector_length(4)?;
        (0..len).map(|_| self.read_char()).collect()
    }

    /// Read an item that must be a CHARSXP
    fn read_char(&mut self) -> Result<Option<String>> {
        match self.read_item()?.value {
            RValue::Char(s) => Ok(s),
            other => Err(ClaimBoostError::RDataError(format!(
                "expected CHARSXP, found {}",
                value_kind(&other)
            ))),
        }
    }

    fn read_tag_name(&mut self) -> Result<Option<String>> {
        Ok(match self.read_item()?.value {
            RValue::Symbol(name) => Some(name),
            RValue::Char(name) => name,
            _ => None,
        })
    }

    fn read_attributes(&mut self) -> Result<Vec<(String, RObject)>> {
        Ok(pairs_to_attributes(self.read_item()?))
    }

    pub(crate) fn read_item(&mut self) -> Result<RObject> {
        let flags = Flags::unpack(self.read_i32()? as u32);

        match flags.sexp_type {
            NILVALUE_SXP => return Ok(RValue::Null.into()),
            EMPTYENV_SXP => return Ok(RValue::Marker("emptyenv").into()),
            BASEENV_SXP => return Ok(RValue::Marker("baseenv").into()),
            GLOBALENV_SXP => return Ok(RValue::Marker("globalenv").into()),
            UNBOUNDVALUE_SXP => return Ok(RValue::Marker("unbound").into()),
            MISSINGARG_SXP => return Ok(RValue::Marker("missingarg").into()),
            BASENAMESPACE_SXP => return Ok(RValue::Marker("basenamespace").into()),
            REFSXP => {
                let index = match (flags.raw >> 8) as usize {
                    0 => self.read_i32()? as usize,
                    i => i,
                };
                return index
                    .checked_sub(1)
                    .and_then(|i| self.refs.get(i))
                    .cloned()
                    .ok_or_else(|| {
                        ClaimBoostError::RDataError(format!("dangling reference {}", index))
                    });
            }
            PERSISTSXP => {
                let object: RObject = RValue::Str(self.read_string_vec()?).into();
                self.add_ref(object.clone());
                return Ok(object);
            }
            SYMSXP => {
                let name = self.read_char()?.unwrap_or_default();
                let object: RObject = RValue::Symbol(name).into();
                self.add_ref(object.clone());
                return Ok(object);
            }
            PACKAGESXP | NAMESPACESXP => {
                let object: RObject = RValue::Namespace(self.read_string_vec()?).into();
                self.add_ref(object.clone());
                return Ok(object);
            }
            ENVSXP => {
                let slot = self.refs.len();
                self.add_ref(RValue::Environment(Vec::new()).into());

                let _locked = self.read_i32()?;
                let _enclosure = self.read_item()?;
                let frame = self.read_item()?;
                let hashtab = self.read_item()?;
                let attributes = pairs_to_attributes(self.read_item()?);

                let mut bindings = pairs_to_attributes(frame);
                if let RValue::List(buckets) = hashtab.value {
                    for bucket in buckets {
                        bindings.extend(pairs_to_attributes(bucket));
                    }
                }
                let env = RObject {
                    value: RValue::Environment(bindings),
                    attributes,
                };
                self.refs[slot] = env.clone();
                return Ok(env);
            }
            LISTSXP | LANGSXP | CLOSXP | PROMSXP | DOTSXP => {
                let attributes = if flags.has_attr {
                    self.read_attributes()?
                } else {
                    Vec::new()
                };
                let tag = if flags.has_tag {
                    self.read_tag_name()?
                } else {
                    None
                };
                let car = self.read_item()?;
                let cdr = self.read_item()?;

                let mut cells = vec![(tag, car)];
                match cdr.value {
                    RValue::Pairlist(rest) | RValue::Language(rest) => cells.extend(rest),
                    RValue::Null => {}
                    value => cells.push((None, value.into())),
                }
                let value = if flags.sexp_type == LISTSXP {
                    RValue::Pairlist(cells)
                } else {
                    RValue::Language(cells)
                };
                return Ok(RObject { value, attributes });
            }
            ALTREP_SXP => return self.read_altrep(),
            _ => {}
        }

        let value = match flags.sexp_type {
            NILSXP => RValue::Null,
            CHARSXP => {
                let len = self.read_i32()?;
                if len == -1 {
                    RValue::Char(None)
                } else {
                    let len = usize::try_from(len).map_err(|_| {
                        ClaimBoostError::RDataError(format!("invalid CHARSXP length {}", len))
                    })?;
                    let bytes = self.read_bytes(len)?;
                    let text = if flags.levels & LATIN1_MASK != 0 {
                        bytes.iter().map(|&b| b as char).collect()
                    } else {
                        String::from_utf8_lossy(bytes).into_owned()
                    };
                    RValue::Char(Some(text))
                }
            }
            LGLSXP => {
                let len = self.read_vector_length(4)?;
                let values = (0..len)
                    .map(|_| {
                        self.read_i32()
                            .map(|v| if v == NA_INTEGER { None } else { Some(v != 0) })
                    })
                    .collect::<Result<_>>()?;
                RValue::Logical(values)
            }
            INTSXP => {
                let len = self.read_vector_length(4)?;
                let values = (0..len)
                    .map(|_| self.read_i32().map(|v| if v == NA_INTEGER { None } else { Some(v) }))
                    .collect::<Result<_>>()?;
                RValue::Integer(values)
            }
            REALSXP => {
                let len = self.read_vector_length(8)?;
                let values = (0..len).map(|_| self.read_f64()).collect::<Result<_>>()?;
                RValue::Real(values)
            }
            CPLXSXP => {
                let len = self.read_vector_length(16)?;
                let values = (0..len)
                    .map(|_| -> Result<(f64, f64)> { Ok((self.read_f64()?, self.read_f64()?)) })
                    .collect::<Result<_>>()?;
                RValue::Complex(values)
            }
            STRSXP => {
                let len = self.read_vector_length(4)?;
                let values = (0..len).map(|_| self.read_char()).collect::<Result<_>>()?;
                RValue::Str(values)
            }
            VECSXP | EXPRSXP => {
                let len = self.read_vector_length(4)?;
                let items = (0..len).map(|_| self.read_item()).collect::<Result<_>>()?;
                if flags.sexp_type == VECSXP {
                    RValue::List(items)
                } else {
                    RValue::Expression(items)
                }
            }
            RAWSXP => {
                let len = self.read_vector_length(1)?;
                RValue::Raw(self.read_bytes(len)?.to_vec())
            }
            S4SXP => RValue::S4,
            SPECIALSXP | BUILTINSXP => {
                let len = self.read_vector_length(1)?;
                RValue::Builtin(String::from_utf8_lossy(self.read_bytes(len)?).into_owned())
            }
            BCODESXP | EXTPTRSXP | WEAKREFSXP => {
                return Err(ClaimBoostError::RDataError(format!(
                    "unsupported SEXP type {} (bytecode, external pointer or weak reference)",
                    flags.sexp_type
                )))
            }
            other => {
                return Err(ClaimBoostError::RDataError(format!(
                    "unknown SEXP type {} at byte {}",
                    other, self.offset
                )))
            }
        };

        let attributes = if flags.has_attr {
            self.read_attributes()?
        } else {
            Vec::new()
        };
        Ok(RObject { value, attributes })
    }

    /// Expand an ALTREP object into its ordinary representation
    fn read_altrep(&mut self) -> Result<RObject> {
        let info = self.read_item()?;
        let state = self.read_item()?;
        let attributes = pairs_to_attributes(self.read_item()?);

        let class = match &info.value {
            RValue::Pairlist(cells) => match cells.first().map(|(_, o)| &o.value) {
                Some(RValue::Symbol(name)) => name.clone(),
                _ => String::new(),
            },
            _ => String::new(),
        };

        let value = match class.as_str() {
            "compact_intseq" => {
                let (n, start, step) = sequence_state(&state)?;
                RValue::Integer(
                    (0..n)
                        .map(|i| Some((start + step * i as f64) as i32))
                        .collect(),
                )
            }
            "compact_realseq" => {
                let (n, start, step) = sequence_state(&state)?;
                RValue::Real((0..n).map(|i| start + step * i as f64).collect())
            }
            "deferred_string" => {
                let source = first_cell(state)?;
                RValue::Str(match source.value {
                    RValue::Integer(values) => values
                        .into_iter()
                        .map(|v| v.map(|v| v.to_string()))
                        .collect(),
                    RValue::Real(values) => values
                        .into_iter()
                        .map(|v| if v.is_nan() { None } else { Some(format_real(v)) })
                        .collect(),
                    RValue::Str(values) => values,
                    other => {
                        return Err(ClaimBoostError::RDataError(format!(
                            "deferred_string over {}",
                            value_kind(&other)
                        )))
                    }
                })
            }
            name if name.starts_with("wrap_") => {
                let wrapped = first_cell(state)?;
                let mut attrs = wrapped.attributes;
                attrs.extend(attributes);
                return Ok(RObject {
                    value: wrapped.value,
                    attributes: attrs,
                });
            }
            other => {
                return Err(ClaimBoostError::RDataError(format!(
                    "unsupported ALTREP class '{}'",
                    other
                )))
            }
        };

        Ok(RObject { value, attributes })
    }
}

/// `(length, start, step)` of a compact sequence
fn sequence_state(state: &RObject) -> Result<(usize, f64, f64)> {
    match &state.value {
        RValue::Real(v) if v.len() == 3 && v[0] >= 0.0 && v[0].is_finite() => {
            if v[0] > MAX_SEQUENCE_LEN as f64 {
                return Err(ClaimBoostError::RDataError(format!(
                    "compact sequence of length {} exceeds the limit of {}",
                    v[0], MAX_SEQUENCE_LEN
                )));
            }
            Ok((v[0] as usize, v[1], v[2]))
        }
        _ => Err(ClaimBoostError::RDataError(
            "malformed compact sequence state".to_string(),
        )),
    }
}

fn first_cell(state: RObject) -> Result<RObject> {
    match state.value {
        RValue::Pairlist(cells) | RValue::Language(cells) => cells
            .into_iter()
            .next()
            .map(|(_, o)| o)
            .ok_or_else(|| ClaimBoostError::RDataError("empty ALTREP state".to_string())),
        RValue::List(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| ClaimBoostError::RDataError("empty ALTREP state".to_string())),
        _ => Err(ClaimBoostError::RDataError(
            "malformed ALTREP state".to_string(),
        )),
    }
}

fn format_real(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn pairs_to_attributes(object: RObject) -> Vec<(String, RObject)> {
    match object.value {
        RValue::Pairlist(cells) => cells
            .into_iter()
            .map(|(tag, value)| (tag.unwrap_or_default(), value))
            .collect(),
        _ => Vec::new(),
    }
}
