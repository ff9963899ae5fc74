// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Decoder, DecodeError, Label, Record, Value, WireType, NO_OPT_ZERO, OPT_ZERO};
use std::io::{self, Write};

/// Each Sample records values encountered in some program context. The
/// program context is typically a stack trace, perhaps augmented with
/// auxiliary information like the thread-id, some indicator of a higher level
/// request being handled, etc.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Sample {
    /// The ids recorded here correspond to a Profile.location.id.
    /// The leaf is at location_id\[0\].
    pub location_ids: Record<Vec<u64>, 1, OPT_ZERO>,
    /// The type and unit of each value is defined by the corresponding entry
    /// in Profile.sample_type. All samples must have the same number of
    /// values, the same as the length of Profile.sample_type. When
    /// aggregating multiple samples into a single sample, the result has a
    /// list of values that is the element-wise sum of the original lists.
    pub values: Record<Vec<i64>, 2, OPT_ZERO>,
    /// NOTE: While possible, having multiple values for the same label key is
    /// strongly discouraged and should never be used. Most tools (e.g. pprof)
    /// do not have good (or any) support for multi-value labels. And an even
    /// more discouraged case is having a string label and a numeric label of
    /// the same name on a sample. Again, possible to express, but should not
    /// be used.
    pub labels: Vec<Record<Label, 3, NO_OPT_ZERO>>,
}

/// # Safety
/// The Default implementation will return all zero-representations.
unsafe impl Value for Sample {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.location_ids.proto_len() + self.values.proto_len() + self.labels.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.location_ids.encode(writer)?;
        self.values.encode(writer)?;
        self.labels.encode(writer)
    }
}

impl Sample {
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut msg = Self::default();
        let mut decoder = Decoder::new(buf);
        while let Some((field, wire_type)) = decoder.next_tag()? {
            match field {
                1 => decoder.packed_uint64(wire_type, &mut msg.location_ids.value)?,
                2 => decoder.packed_int64(wire_type, &mut msg.values.value)?,
                3 => {
                    let label = Label::decode(decoder.bytes(wire_type)?)?;
                    msg.labels.push(label.into());
                }
                _ => decoder.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&Sample> for crate::prost_impls::Sample {
    fn from(sample: &Sample) -> Self {
        Self {
            location_ids: sample.location_ids.value.clone(),
            values: sample.values.value.clone(),
            labels: sample
                .labels
                .iter()
                .map(|record| crate::prost_impls::Label::from(record.value))
                .collect(),
        }
    }
}

#[cfg(feature = "prost_impls")]
impl From<Sample> for crate::prost_impls::Sample {
    fn from(sample: Sample) -> Self {
        Self::from(&sample)
    }
}
