// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Decoder, DecodeError, Record, StringOffset, Value, WireType, OPT_ZERO};
use std::io::{self, Write};

/// Label includes additional context for this sample. It can include things
/// like a thread id, allocation size, etc.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Label {
    /// An annotation for a sample, e.g. "allocation_size".
    pub key: Record<StringOffset, 1, OPT_ZERO>,
    /// Exactly one of str and num should be used.
    pub str: Record<StringOffset, 2, OPT_ZERO>,
    /// Exactly one of str and num should be used.
    pub num: Record<i64, 3, OPT_ZERO>,
}

unsafe impl Value for Label {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn proto_len(&self) -> u64 {
        self.key.proto_len() + self.str.proto_len() + self.num.proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.key.encode(writer)?;
        self.str.encode(writer)?;
        self.num.encode(writer)
    }
}

impl Label {
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut msg = Self::default();
        let mut decoder = Decoder::new(buf);
        while let Some((field, wire_type)) = decoder.next_tag()? {
            match field {
                1 => msg.key = decoder.string_offset(wire_type)?.into(),
                2 => msg.str = decoder.string_offset(wire_type)?.into(),
                3 => msg.num = decoder.int64(wire_type)?.into(),
                _ => decoder.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

#[cfg(feature = "prost_impls")]
impl From<Label> for crate::prost_impls::Label {
    fn from(label: Label) -> Self {
        Self::from(&label)
    }
}

#[cfg(feature = "prost_impls")]
impl From<&Label> for crate::prost_impls::Label {
    fn from(label: &Label) -> Self {
        Self {
            key: label.key.value.into(),
            str: label.str.value.into(),
            num: label.num.value,
        }
    }
}

#[cfg(all(test, feature = "prost_impls"))]
mod tests {
    use super::*;
    use crate::prost_impls;
    use prost::Message;

    #[test]
    fn roundtrip() {
        fn test(label: &Label) {
            let mut buffer = Vec::new();
            let prost_label = prost_impls::Label::from(label);
            assert_eq!(i64::from(label.key.value), prost_label.key);
            assert_eq!(i64::from(label.str.value), prost_label.str);
            assert_eq!(label.num.value, prost_label.num);

            label.encode(&mut buffer).unwrap();
            let roundtrip = prost_impls::Label::decode(buffer.as_slice()).unwrap();
            assert_eq!(prost_label, roundtrip);

            let mut buffer2 = Vec::new();
            prost_label.encode(&mut buffer2).unwrap();
            let decoded = Label::decode(&buffer2).unwrap();
            assert_eq!(*label, decoded);
        }

        bolero::check!().with_type::<Label>().for_each(test);
    }
}
