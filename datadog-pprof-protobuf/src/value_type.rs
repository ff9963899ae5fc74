// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Decoder, DecodeError, Record, StringOffset, Value, WireType, OPT_ZERO};
use std::io::{self, Write};

/// ValueType describes the semantics and measurement units of a value.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct ValueType {
    pub r#type: Record<StringOffset, 1, OPT_ZERO>,
    pub unit: Record<StringOffset, 2, OPT_ZERO>,
}

unsafe impl Value for ValueType {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.r#type.proto_len() + self.unit.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.r#type.encode(writer)?;
        self.unit.encode(writer)
    }
}

impl ValueType {
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut msg = Self::default();
        let mut decoder = Decoder::new(buf);
        while let Some((field, wire_type)) = decoder.next_tag()? {
            match field {
                1 => msg.r#type = decoder.string_offset(wire_type)?.into(),
                2 => msg.unit = decoder.string_offset(wire_type)?.into(),
                _ => decoder.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

#[cfg(feature = "prost_impls")]
impl From<ValueType> for crate::prost_impls::ValueType {
    fn from(value: ValueType) -> Self {
        Self::from(&value)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&ValueType> for crate::prost_impls::ValueType {
    fn from(value: &ValueType) -> Self {
        Self {
            r#type: value.r#type.value.into(),
            unit: value.unit.value.into(),
        }
    }
}
