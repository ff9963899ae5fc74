// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Decoder, DecodeError, Record, StringOffset, Value, WireType, OPT_ZERO};
use std::io::{self, Write};

/// Describes a function, which may be in any programming language.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Function {
    /// Unique nonzero id for the function.
    pub id: Record<u64, 1, OPT_ZERO>,
    /// Name of the function, in human-readable form if available.
    pub name: Record<StringOffset, 2, OPT_ZERO>,
    /// Name of the function, as identified by the system. For instance,
    /// it can be a C++ mangled name.
    pub system_name: Record<StringOffset, 3, OPT_ZERO>,
    /// Source file containing the function.
    pub filename: Record<StringOffset, 4, OPT_ZERO>,
    /// Line number in source file.
    pub start_line: Record<i64, 5, OPT_ZERO>,
}

unsafe impl Value for Function {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.id.proto_len()
            + self.name.proto_len()
            + self.system_name.proto_len()
            + self.filename.proto_len()
            + self.start_line.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.id.encode(writer)?;
        self.name.encode(writer)?;
        self.system_name.encode(writer)?;
        self.filename.encode(writer)?;
        self.start_line.encode(writer)
    }
}

impl Function {
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut msg = Self::default();
        let mut decoder = Decoder::new(buf);
        while let Some((field, wire_type)) = decoder.next_tag()? {
            match field {
                1 => msg.id = decoder.uint64(wire_type)?.into(),
                2 => msg.name = decoder.string_offset(wire_type)?.into(),
                3 => msg.system_name = decoder.string_offset(wire_type)?.into(),
                4 => msg.filename = decoder.string_offset(wire_type)?.into(),
                5 => msg.start_line = decoder.int64(wire_type)?.into(),
                _ => decoder.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

#[cfg(feature = "prost_impls")]
impl From<Function> for crate::prost_impls::Function {
    fn from(function: Function) -> Self {
        Self::from(&function)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&Function> for crate::prost_impls::Function {
    fn from(function: &Function) -> Self {
        Self {
            id: function.id.value,
            name: function.name.value.into(),
            system_name: function.system_name.value.into(),
            filename: function.filename.value.into(),
            start_line: function.start_line.value,
        }
    }
}

#[cfg(all(test, feature = "prost_impls"))]
mod tests {
    use super::*;
    use crate::prost_impls;
    use prost::Message;

    #[track_caller]
    fn test(function: &Function) {
        let prost_function = prost_impls::Function::from(function);

        let mut buffer = Vec::with_capacity(function.proto_len() as usize);
        function.encode(&mut buffer).unwrap();
        let roundtrip = prost_impls::Function::decode(buffer.as_slice()).unwrap();
        assert_eq!(prost_function, roundtrip);

        let mut buffer2 = Vec::with_capacity(prost_function.encoded_len());
        prost_function.encode(&mut buffer2).unwrap();
        let decoded = Function::decode(&buffer2).unwrap();
        assert_eq!(*function, decoded);
    }

    #[test]
    fn roundtrip() {
        bolero::check!().with_type::<Function>().for_each(test);
    }
}
