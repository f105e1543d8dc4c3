//! Bound-parameter buffer encoding
//!
//! Per-statement bound-parameter metadata is packed into three
//! immutable byte buffers - format codes, type codes, and raw values -
//! plus a parameter count, and handed to out-of-band consumers (such as
//! a statistics recorder) behind a shared handle. The format and type
//! buffers use a fixed one-byte-per-parameter stride; the value buffer
//! packs each raw value as a little-endian u32 length prefix followed
//! by the value bytes.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use crate::error::{Error, Result};
use std::io::Cursor;
use std::sync::Arc;

/// Semantic role of a parameter buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamBufKind {
    /// Wire format codes, one byte per parameter
    Format,
    /// Type codes, one byte per parameter
    Type,
    /// Length-prefixed raw values
    Value,
}

/// An immutable, length-tagged byte buffer with a semantic role.
///
/// The backing storage is reference counted, so the buffer outlives the
/// parameter set it was built for without copying. Construction
/// preserves the payload exactly - no validation, truncation, or
/// padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBuf {
    kind: ParamBufKind,
    data: Bytes,
}

impl ParamBuf {
    /// Construct a buffer from a payload
    pub fn new(kind: ParamBufKind, data: impl Into<Bytes>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Semantic role of this buffer
    pub fn kind(&self) -> ParamBufKind {
        self.kind
    }

    /// Payload length in bytes; always equals the payload size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only view of the payload
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// One logical bound parameter: its format code, type code, and raw value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParam {
    /// Wire format code
    pub format: u8,
    /// Type code
    pub type_code: u8,
    /// Raw value bytes
    pub value: Bytes,
}

impl BoundParam {
    /// Create a bound parameter
    pub fn new(format: u8, type_code: u8, value: impl Into<Bytes>) -> Self {
        Self {
            format,
            type_code,
            value: value.into(),
        }
    }
}

/// The three-buffer encoding of a statement's bound parameters.
///
/// Constructed as one unit and shared behind `Arc`; the buffers and the
/// count are never reassigned after construction, so concurrent readers
/// never observe a partial set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    format_buf: ParamBuf,
    type_buf: ParamBuf,
    value_buf: ParamBuf,
    param_count: usize,
}

impl QueryParams {
    /// Aggregate three pre-built buffers and a count into a shared set
    pub fn new(
        format_buf: ParamBuf,
        type_buf: ParamBuf,
        value_buf: ParamBuf,
        param_count: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            format_buf,
            type_buf,
            value_buf,
            param_count,
        })
    }

    /// Encode a list of bound parameters into the three-buffer layout.
    /// Fails if a value is too large for its u32 length prefix.
    pub fn encode(params: &[BoundParam]) -> Result<Arc<Self>> {
        let mut formats = Vec::with_capacity(params.len());
        let mut types = Vec::with_capacity(params.len());
        let mut values = Vec::new();

        for param in params {
            formats.push(param.format);
            types.push(param.type_code);
            let len = u32::try_from(param.value.len()).map_err(|_| {
                Error::InvalidParamBuffer(format!(
                    "parameter value of {} bytes exceeds the length prefix",
                    param.value.len()
                ))
            })?;
            // Infallible: writing to a Vec cannot fail.
            let _ = values.write_u32::<LittleEndian>(len);
            values.extend_from_slice(&param.value);
        }

        Ok(Self::new(
            ParamBuf::new(ParamBufKind::Format, formats),
            ParamBuf::new(ParamBufKind::Type, types),
            ParamBuf::new(ParamBufKind::Value, values),
            params.len(),
        ))
    }

    /// Decode the buffers back into (format, type, value) triples.
    /// Fails if any buffer is shorter or longer than `param_count`
    /// implies.
    pub fn decode(&self) -> Result<Vec<BoundParam>> {
        if self.format_buf.len() != self.param_count {
            return Err(Error::InvalidParamBuffer(format!(
                "format buffer has {} bytes for {} parameters",
                self.format_buf.len(),
                self.param_count
            )));
        }
        if self.type_buf.len() != self.param_count {
            return Err(Error::InvalidParamBuffer(format!(
                "type buffer has {} bytes for {} parameters",
                self.type_buf.len(),
                self.param_count
            )));
        }

        let mut cursor = Cursor::new(self.value_buf.as_slice());
        let mut params = Vec::with_capacity(self.param_count);

        for index in 0..self.param_count {
            let len = cursor.read_u32::<LittleEndian>().map_err(|_| {
                Error::InvalidParamBuffer(format!(
                    "value buffer truncated at parameter {}",
                    index
                ))
            })? as usize;

            let start = cursor.position() as usize;
            let end = start + len;
            if end > self.value_buf.len() {
                return Err(Error::InvalidParamBuffer(format!(
                    "value buffer truncated at parameter {}",
                    index
                )));
            }

            params.push(BoundParam {
                format: self.format_buf.as_slice()[index],
                type_code: self.type_buf.as_slice()[index],
                value: Bytes::copy_from_slice(&self.value_buf.as_slice()[start..end]),
            });
            cursor.set_position(end as u64);
        }

        if (cursor.position() as usize) != self.value_buf.len() {
            return Err(Error::InvalidParamBuffer(
                "value buffer has trailing bytes".to_string(),
            ));
        }

        Ok(params)
    }

    /// Format-code buffer
    pub fn format_buf(&self) -> &ParamBuf {
        &self.format_buf
    }

    /// Type-code buffer
    pub fn type_buf(&self) -> &ParamBuf {
        &self.type_buf
    }

    /// Raw-value buffer
    pub fn value_buf(&self) -> &ParamBuf {
        &self.value_buf
    }

    /// Number of logical parameters encoded across the buffers
    pub fn param_count(&self) -> usize {
        self.param_count
    }
}
