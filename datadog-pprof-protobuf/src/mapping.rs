// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Decoder, DecodeError, Record, StringOffset, Value, WireType, OPT_ZERO};
use std::io::{self, Write};

/// Describes the mapping of a binary in memory, including the address range
/// covered and the file from which it was loaded.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Mapping {
    /// Unique nonzero id for the mapping.
    pub id: Record<u64, 1, OPT_ZERO>,
    /// Address at which the binary (or DLL) is loaded into memory.
    pub memory_start: Record<u64, 2, OPT_ZERO>,
    /// The limit of the address range occupied by this mapping.
    pub memory_limit: Record<u64, 3, OPT_ZERO>,
    /// Offset in the binary that corresponds to the first mapped address.
    pub file_offset: Record<u64, 4, OPT_ZERO>,
    /// The object this entry is loaded from. This can be a filename on
    /// disk for the main binary and shared libraries, or virtual
    /// abstractions like "[vdso]".
    pub filename: Record<StringOffset, 5, OPT_ZERO>,
    /// A string that uniquely identifies a particular program version
    /// with high probability. E.g., for binaries generated by GNU tools,
    /// it could be the contents of the .note.gnu.build-id field.
    pub build_id: Record<StringOffset, 6, OPT_ZERO>,
    /// The following fields indicate the resolution of symbolic info.
    pub has_functions: Record<bool, 7, OPT_ZERO>,
    pub has_filenames: Record<bool, 8, OPT_ZERO>,
    pub has_line_numbers: Record<bool, 9, OPT_ZERO>,
    pub has_inline_frames: Record<bool, 10, OPT_ZERO>,
}

unsafe impl Value for Mapping {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.id.proto_len()
            + self.memory_start.proto_len()
            + self.memory_limit.proto_len()
            + self.file_offset.proto_len()
            + self.filename.proto_len()
            + self.build_id.proto_len()
            + self.has_functions.proto_len()
            + self.has_filenames.proto_len()
            + self.has_line_numbers.proto_len()
            + self.has_inline_frames.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.id.encode(writer)?;
        self.memory_start.encode(writer)?;
        self.memory_limit.encode(writer)?;
        self.file_offset.encode(writer)?;
        self.filename.encode(writer)?;
        self.build_id.encode(writer)?;
        self.has_functions.encode(writer)?;
        self.has_filenames.encode(writer)?;
        self.has_line_numbers.encode(writer)?;
        self.has_inline_frames.encode(writer)
    }
}

impl Mapping {
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut msg = Self::default();
        let mut decoder = Decoder::new(buf);
        while let Some((field, wire_type)) = decoder.next_tag()? {
            match field {
                1 => msg.id = decoder.uint64(wire_type)?.into(),
                2 => msg.memory_start = decoder.uint64(wire_type)?.into(),
                3 => msg.memory_limit = decoder.uint64(wire_type)?.into(),
                4 => msg.file_offset = decoder.uint64(wire_type)?.into(),
                5 => msg.filename = decoder.string_offset(wire_type)?.into(),
                6 => msg.build_id = decoder.string_offset(wire_type)?.into(),
                7 => msg.has_functions = decoder.boolean(wire_type)?.into(),
                8 => msg.has_filenames = decoder.boolean(wire_type)?.into(),
                9 => msg.has_line_numbers = decoder.boolean(wire_type)?.into(),
                10 => msg.has_inline_frames = decoder.boolean(wire_type)?.into(),
                _ => decoder.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

#[cfg(feature = "prost_impls")]
impl From<Mapping> for crate::prost_impls::Mapping {
    fn from(mapping: Mapping) -> Self {
        Self::from(&mapping)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&Mapping> for crate::prost_impls::Mapping {
    fn from(mapping: &Mapping) -> Self {
        Self {
            id: mapping.id.value,
            memory_start: mapping.memory_start.value,
            memory_limit: mapping.memory_limit.value,
            file_offset: mapping.file_offset.value,
            filename: mapping.filename.value.into(),
            build_id: mapping.build_id.value.into(),
            has_functions: mapping.has_functions.value,
            has_filenames: mapping.has_filenames.value,
            has_line_numbers: mapping.has_line_numbers.value,
            has_inline_frames: mapping.has_inline_frames.value,
        }
    }
}

#[cfg(all(test, feature = "prost_impls"))]
mod tests {
    use super::*;
    use crate::prost_impls;
    use prost::Message;

    #[track_caller]
    fn test(mapping: &Mapping) {
        let prost_mapping = prost_impls::Mapping::from(mapping);

        let mut buffer = Vec::with_capacity(mapping.proto_len() as usize);
        mapping.encode(&mut buffer).unwrap();
        let roundtrip = prost_impls::Mapping::decode(buffer.as_slice()).unwrap();
        assert_eq!(prost_mapping, roundtrip);

        let mut buffer2 = Vec::with_capacity(prost_mapping.encoded_len());
        prost_mapping.encode(&mut buffer2).unwrap();
        let decoded = Mapping::decode(&buffer2).unwrap();
        assert_eq!(*mapping, decoded);
    }

    #[test]
    fn roundtrip() {
        bolero::check!().with_type::<Mapping>().for_each(test);
    }
}
