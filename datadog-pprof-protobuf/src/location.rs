// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Decoder, DecodeError, Record, Value, WireType, NO_OPT_ZERO, OPT_ZERO};
use std::io::{self, Write};

/// Describes function and line table debug information.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Location {
    /// Unique nonzero id for the location. A profile could use instruction
    /// addresses or any integer sequence as ids.
    pub id: Record<u64, 1, OPT_ZERO>,
    /// The id of the corresponding profile.Mapping for this location.
    /// It can be unset if the mapping is unknown or not applicable for
    /// this profile type.
    pub mapping_id: Record<u64, 2, OPT_ZERO>,
    /// The instruction address for this location, if available. It should be
    /// within `Mapping.memory_start..Mapping.memory_limit` for the
    /// corresponding mapping. A non-leaf address may be in the middle of a
    /// call instruction. It is up to display tools to find the beginning of
    /// the instruction if necessary.
    pub address: Record<u64, 3, OPT_ZERO>,
    /// Multiple line indicates this location has inlined functions,
    /// where the last entry represents the caller into which the
    /// preceding entries were inlined.
    pub lines: Vec<Record<Line, 4, NO_OPT_ZERO>>,
}

/// Represents function and line number information.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Line {
    /// The id of the corresponding profile.Function for this line.
    pub function_id: Record<u64, 1, OPT_ZERO>,
    /// Line number in source code.
    pub line: Record<i64, 2, OPT_ZERO>,
}

unsafe impl Value for Line {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.function_id.proto_len() + self.line.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.function_id.encode(writer)?;
        self.line.encode(writer)
    }
}

impl Line {
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut msg = Self::default();
        let mut decoder = Decoder::new(buf);
        while let Some((field, wire_type)) = decoder.next_tag()? {
            match field {
                1 => msg.function_id = decoder.uint64(wire_type)?.into(),
                2 => msg.line = decoder.int64(wire_type)?.into(),
                _ => decoder.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

unsafe impl Value for Location {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.id.proto_len()
            + self.mapping_id.proto_len()
            + self.address.proto_len()
            + self.lines.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.id.encode(writer)?;
        self.mapping_id.encode(writer)?;
        self.address.encode(writer)?;
        self.lines.encode(writer)
    }
}

impl Location {
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut msg = Self::default();
        let mut decoder = Decoder::new(buf);
        while let Some((field, wire_type)) = decoder.next_tag()? {
            match field {
                1 => msg.id = decoder.uint64(wire_type)?.into(),
                2 => msg.mapping_id = decoder.uint64(wire_type)?.into(),
                3 => msg.address = decoder.uint64(wire_type)?.into(),
                4 => {
                    let line = Line::decode(decoder.bytes(wire_type)?)?;
                    msg.lines.push(line.into());
                }
                _ => decoder.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&Location> for crate::prost_impls::Location {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id.value,
            mapping_id: location.mapping_id.value,
            address: location.address.value,
            lines: location
                .lines
                .iter()
                .map(|record| crate::prost_impls::Line::from(record.value))
                .collect(),
        }
    }
}

#[cfg(feature = "prost_impls")]
impl From<Location> for crate::prost_impls::Location {
    fn from(location: Location) -> Self {
        Self::from(&location)
    }
}

#[cfg(feature = "prost_impls")]
impl From<Line> for crate::prost_impls::Line {
    fn from(line: Line) -> Self {
        Self {
            function_id: line.function_id.value,
            line: line.line.value,
        }
    }
}

#[cfg(all(test, feature = "prost_impls"))]
mod tests {
    use super::*;
    use crate::prost_impls;
    use prost::Message;

    #[track_caller]
    fn test(location: &Location) {
        let mut buffer = Vec::new();
        let prost_location = prost_impls::Location::from(location);

        location.encode(&mut buffer).unwrap();
        let roundtrip = prost_impls::Location::decode(buffer.as_slice()).unwrap();
        assert_eq!(prost_location, roundtrip);

        let mut buffer2 = Vec::new();
        prost_location.encode(&mut buffer2).unwrap();
        let decoded = Location::decode(&buffer2).unwrap();
        assert_eq!(*location, decoded);
    }

    #[test]
    fn basic() {
        let location = Location {
            id: Record::from(1),
            mapping_id: Record::default(),
            address: Record::default(),
            lines: vec![Record::from(Line {
                function_id: Record::from(1),
                line: Record::default(),
            })],
        };
        test(&location);
    }

    #[test]
    fn roundtrip() {
        bolero::check!().with_type::<Location>().for_each(test);
    }
}
