// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{
    varint, Decoder, DecodeError, Function, Location, Mapping, Record, Sample, StringOffset, Tag,
    Value, ValueType, WireType, NO_OPT_ZERO, OPT_ZERO,
};
use std::io::{self, Write};

/// The top-level profile message. Unlike the sub-messages it is not a
/// [`Value`]: it is never nested inside another message, so it encodes and
/// decodes through inherent methods instead.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Profile {
    /// A description of the samples associated with each Sample.value.
    /// For a cpu profile this might be:
    ///   \[\["cpu","nanoseconds"\]\] or \[\["wall","seconds"\]\] or \[\["syscall","count"\]\]
    /// For a heap profile, this might be:
    ///   \[\["allocations","count"\], \["space","bytes"\]\]
    pub sample_types: Vec<Record<ValueType, 1, NO_OPT_ZERO>>,
    /// The set of samples recorded in this profile.
    pub samples: Vec<Record<Sample, 2, NO_OPT_ZERO>>,
    /// Mapping from address ranges to the image/binary/library mapped
    /// into that address range.
    pub mappings: Vec<Record<Mapping, 3, NO_OPT_ZERO>>,
    /// Locations referenced by samples.
    pub locations: Vec<Record<Location, 4, NO_OPT_ZERO>>,
    /// Functions referenced by locations.
    pub functions: Vec<Record<Function, 5, NO_OPT_ZERO>>,
    /// A common table for strings referenced by various messages.
    /// string_table\[0\] must always be "".
    pub string_table: Vec<Record<String, 6, NO_OPT_ZERO>>,
    /// Frames with Function.name fully matching the following regexp will be
    /// dropped from the samples, along with their successors.
    pub drop_frames: Record<StringOffset, 7, OPT_ZERO>,
    /// Frames with Function.name fully matching the following regexp will be
    /// kept, even if matched by drop_frames.
    pub keep_frames: Record<StringOffset, 8, OPT_ZERO>,
    /// Time of collection (UTC) represented as nanoseconds past the epoch.
    pub time_nanos: Record<i64, 9, OPT_ZERO>,
    /// Duration of the profile, if a duration makes sense.
    pub duration_nanos: Record<i64, 10, OPT_ZERO>,
    /// The kind of events between sampled occurrences,
    /// e.g. \["cpu","cycles"\] or \["heap","bytes"\]
    pub period_type: Option<ValueType>,
    /// The number of events between sampled occurrences.
    pub period: Record<i64, 12, OPT_ZERO>,
    /// Free-form text associated with the profile. The text is displayed as is
    /// to the user by the tools that read profiles (e.g. by pprof). This field
    /// should not be used to store any machine-readable information, it is
    /// only for human-friendly content.
    pub comments: Record<Vec<StringOffset>, 13, OPT_ZERO>,
    /// Index into the string table of the type of the preferred sample value.
    /// If unset, clients should default to the last sample value.
    pub default_sample_type: Record<StringOffset, 14, OPT_ZERO>,
}

impl Profile {
    /// The number of bytes [`Profile::encode`] will write.
    pub fn encoded_len(&self) -> u64 {
        let mut len = self.sample_types.proto_len()
            + self.samples.proto_len()
            + self.mappings.proto_len()
            + self.locations.proto_len()
            + self.functions.proto_len()
            + self.string_table.proto_len()
            + self.drop_frames.proto_len()
            + self.keep_frames.proto_len()
            + self.time_nanos.proto_len()
            + self.duration_nanos.proto_len()
            + self.period.proto_len()
            + self.comments.proto_len()
            + self.default_sample_type.proto_len();
        if let Some(period_type) = &self.period_type {
            let proto_len = period_type.proto_len();
            len += Tag::new(11, WireType::LengthDelimited).proto_len()
                + proto_len.proto_len()
                + proto_len;
        }
        len
    }

    pub fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.sample_types.encode(writer)?;
        self.samples.encode(writer)?;
        self.mappings.encode(writer)?;
        self.locations.encode(writer)?;
        self.functions.encode(writer)?;
        self.string_table.encode(writer)?;
        self.drop_frames.encode(writer)?;
        self.keep_frames.encode(writer)?;
        self.time_nanos.encode(writer)?;
        self.duration_nanos.encode(writer)?;
        if let Some(period_type) = &self.period_type {
            Tag::new(11, WireType::LengthDelimited).encode(writer)?;
            varint::encode(period_type.proto_len(), writer)?;
            period_type.encode(writer)?;
        }
        self.period.encode(writer)?;
        self.comments.encode(writer)?;
        self.default_sample_type.encode(writer)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut msg = Self::default();
        let mut decoder = Decoder::new(buf);
        while let Some((field, wire_type)) = decoder.next_tag()? {
            match field {
                1 => {
                    let value_type = ValueType::decode(decoder.bytes(wire_type)?)?;
                    msg.sample_types.push(value_type.into());
                }
                2 => {
                    let sample = Sample::decode(decoder.bytes(wire_type)?)?;
                    msg.samples.push(sample.into());
                }
                3 => {
                    let mapping = Mapping::decode(decoder.bytes(wire_type)?)?;
                    msg.mappings.push(mapping.into());
                }
                4 => {
                    let location = Location::decode(decoder.bytes(wire_type)?)?;
                    msg.locations.push(location.into());
                }
                5 => {
                    let function = Function::decode(decoder.bytes(wire_type)?)?;
                    msg.functions.push(function.into());
                }
                6 => msg.string_table.push(decoder.string(wire_type)?.into()),
                7 => msg.drop_frames = decoder.string_offset(wire_type)?.into(),
                8 => msg.keep_frames = decoder.string_offset(wire_type)?.into(),
                9 => msg.time_nanos = decoder.int64(wire_type)?.into(),
                10 => msg.duration_nanos = decoder.int64(wire_type)?.into(),
                11 => {
                    let period_type = ValueType::decode(decoder.bytes(wire_type)?)?;
                    msg.period_type = Some(period_type);
                }
                12 => msg.period = decoder.int64(wire_type)?.into(),
                13 => decoder.packed_string_offsets(wire_type, &mut msg.comments.value)?,
                14 => msg.default_sample_type = decoder.string_offset(wire_type)?.into(),
                _ => decoder.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&Profile> for crate::prost_impls::Profile {
    fn from(profile: &Profile) -> Self {
        Self {
            sample_types: profile
                .sample_types
                .iter()
                .map(|record| crate::prost_impls::ValueType::from(record.value))
                .collect(),
            samples: profile
                .samples
                .iter()
                .map(|record| crate::prost_impls::Sample::from(&record.value))
                .collect(),
            mappings: profile
                .mappings
                .iter()
                .map(|record| crate::prost_impls::Mapping::from(record.value))
                .collect(),
            locations: profile
                .locations
                .iter()
                .map(|record| crate::prost_impls::Location::from(&record.value))
                .collect(),
            functions: profile
                .functions
                .iter()
                .map(|record| crate::prost_impls::Function::from(record.value))
                .collect(),
            string_table: profile
                .string_table
                .iter()
                .map(|record| record.value.clone())
                .collect(),
            drop_frames: profile.drop_frames.value.into(),
            keep_frames: profile.keep_frames.value.into(),
            time_nanos: profile.time_nanos.value,
            duration_nanos: profile.duration_nanos.value,
            period_type: profile
                .period_type
                .map(crate::prost_impls::ValueType::from),
            period: profile.period.value,
            comments: profile
                .comments
                .value
                .iter()
                .map(|offset| i64::from(*offset))
                .collect(),
            default_sample_type: profile.default_sample_type.value.into(),
        }
    }
}

#[cfg(all(test, feature = "prost_impls"))]
mod tests {
    use super::*;
    use crate::prost_impls;
    use prost::Message;

    #[track_caller]
    fn test(profile: &Profile) {
        let prost_profile = prost_impls::Profile::from(profile);

        let mut buffer = Vec::with_capacity(profile.encoded_len() as usize);
        profile.encode(&mut buffer).unwrap();
        assert_eq!(buffer.len() as u64, profile.encoded_len());
        let roundtrip = prost_impls::Profile::decode(buffer.as_slice()).unwrap();
        assert_eq!(prost_profile, roundtrip);

        let mut buffer2 = Vec::with_capacity(prost_profile.encoded_len());
        prost_profile.encode(&mut buffer2).unwrap();
        let decoded = Profile::decode(&buffer2).unwrap();
        assert_eq!(*profile, decoded);
    }

    #[test]
    fn empty() {
        test(&Profile::default());
    }

    #[test]
    fn roundtrip() {
        bolero::check!().with_type::<Profile>().for_each(test);
    }

    #[test]
    fn decode_own_encoding() {
        bolero::check!().with_type::<Profile>().for_each(|profile| {
            let mut buffer = Vec::with_capacity(profile.encoded_len() as usize);
            profile.encode(&mut buffer).unwrap();
            let decoded = Profile::decode(&buffer).unwrap();
            assert_eq!(*profile, decoded);
        });
    }
}
