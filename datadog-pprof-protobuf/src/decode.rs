// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{varint, StringOffset, WireType};

/// Errors produced while decoding the in-wire protobuf format. These carry no
/// positional information; the caller knows which message it handed over.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("varint overflows 64 bits")]
    VarintOverflow,
    #[error("invalid field number 0")]
    InvalidField,
    #[error("unsupported wire type {0}")]
    InvalidWireType(u8),
    #[error("field encoded with unexpected wire type")]
    UnexpectedWireType,
    #[error("length prefix exceeds remaining input")]
    InvalidLength,
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("string table offset exceeds 32 bits")]
    OffsetOverflow,
}

/// A cursor over a single message's bytes. Fields are pulled off the front
/// one `(tag, payload)` record at a time; sub-messages hand out a sub-slice
/// to recurse on. Unknown fields of any of the four supported wire types can
/// be skipped; the two group wire types and the reserved ones are rejected.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Reads the next field's tag, or `None` at the end of the message.
    pub fn next_tag(&mut self) -> Result<Option<(u32, WireType)>, DecodeError> {
        if self.pos == self.buf.len() {
            return Ok(None);
        }
        let key = self.varint()?;
        let field = (key >> 3) as u32;
        if field == 0 || u64::from(field) != key >> 3 {
            return Err(DecodeError::InvalidField);
        }
        let wire_type = match key & 0x7 {
            0 => WireType::Varint,
            1 => WireType::Fixed64,
            2 => WireType::LengthDelimited,
            5 => WireType::Fixed32,
            other => return Err(DecodeError::InvalidWireType(other as u8)),
        };
        Ok(Some((field, wire_type)))
    }

    pub fn uint64(&mut self, wire_type: WireType) -> Result<u64, DecodeError> {
        if wire_type != WireType::Varint {
            return Err(DecodeError::UnexpectedWireType);
        }
        self.varint()
    }

    pub fn int64(&mut self, wire_type: WireType) -> Result<i64, DecodeError> {
        // Two's-complement varint, not zigzag.
        Ok(self.uint64(wire_type)? as i64)
    }

    pub fn boolean(&mut self, wire_type: WireType) -> Result<bool, DecodeError> {
        Ok(self.uint64(wire_type)? != 0)
    }

    pub fn string_offset(&mut self, wire_type: WireType) -> Result<StringOffset, DecodeError> {
        StringOffset::try_from(self.uint64(wire_type)?)
            .map_err(|_| DecodeError::OffsetOverflow)
    }

    /// Reads a length-delimited payload: the raw bytes of a sub-message, a
    /// string, or a packed scalar run.
    pub fn bytes(&mut self, wire_type: WireType) -> Result<&'a [u8], DecodeError> {
        if wire_type != WireType::LengthDelimited {
            return Err(DecodeError::UnexpectedWireType);
        }
        let len = usize::try_from(self.varint()?).map_err(|_| DecodeError::InvalidLength)?;
        let end = self.pos.checked_add(len).ok_or(DecodeError::InvalidLength)?;
        if end > self.buf.len() {
            return Err(DecodeError::InvalidLength);
        }
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn string(&mut self, wire_type: WireType) -> Result<String, DecodeError> {
        let bytes = self.bytes(wire_type)?;
        match std::str::from_utf8(bytes) {
            Ok(str) => Ok(str.to_owned()),
            Err(_) => Err(DecodeError::InvalidUtf8),
        }
    }

    /// Reads a packed repeated uint64 field, appending onto `out`. A
    /// conforming encoder packs, but parsers must also accept the singular
    /// varint encoding of the same field.
    pub fn packed_uint64(
        &mut self,
        wire_type: WireType,
        out: &mut Vec<u64>,
    ) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => {
                out.push(self.varint()?);
                Ok(())
            }
            WireType::LengthDelimited => {
                let bytes = self.bytes(wire_type)?;
                let mut pos = 0;
                while pos < bytes.len() {
                    out.push(varint::decode(bytes, &mut pos)?);
                }
                Ok(())
            }
            _ => Err(DecodeError::UnexpectedWireType),
        }
    }

    pub fn packed_int64(
        &mut self,
        wire_type: WireType,
        out: &mut Vec<i64>,
    ) -> Result<(), DecodeError> {
        let mut raw = Vec::new();
        self.packed_uint64(wire_type, &mut raw)?;
        out.extend(raw.into_iter().map(|v| v as i64));
        Ok(())
    }

    pub fn packed_string_offsets(
        &mut self,
        wire_type: WireType,
        out: &mut Vec<StringOffset>,
    ) -> Result<(), DecodeError> {
        let mut raw = Vec::new();
        self.packed_uint64(wire_type, &mut raw)?;
        for value in raw {
            out.push(StringOffset::try_from(value).map_err(|_| DecodeError::OffsetOverflow)?);
        }
        Ok(())
    }

    /// Skips over an unknown field's payload.
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => self.varint().map(drop),
            WireType::Fixed64 => self.advance(8),
            WireType::LengthDelimited => self.bytes(wire_type).map(drop),
            WireType::Fixed32 => self.advance(4),
        }
    }

    fn advance(&mut self, n: usize) -> Result<(), DecodeError> {
        let end = self.pos.checked_add(n).ok_or(DecodeError::UnexpectedEof)?;
        if end > self.buf.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        self.pos = end;
        Ok(())
    }

    fn varint(&mut self) -> Result<u64, DecodeError> {
        varint::decode(self.buf, &mut self.pos)
    }
}
