// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Byte-stream entry points: gzip framing around the protobuf codec, plus
//! the pre-encode/post-decode bridges between the object model and the wire
//! representation.

pub(crate) mod decode;
pub(crate) mod encode;

use crate::legacy::LegacyRegistry;
use crate::{Profile, ProfileError};
use datadog_pprof_protobuf as wire;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Leading bytes of the RFC 1952 gzip format.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

impl Profile {
    /// Reads all of `reader` and parses a profile from it. The input may be
    /// a gzip-compressed encoded protobuf or one of the legacy formats a
    /// registered [`crate::legacy::LegacyParser`] understands.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Profile, ProfileError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::parse_data(&data)
    }

    /// Parses a profile from a buffer and checks it for validity.
    pub fn parse_data(data: &[u8]) -> Result<Profile, ProfileError> {
        Self::parse_data_with(data, &LegacyRegistry::default())
    }

    /// Like [`Profile::parse_data`], consulting `registry` for legacy
    /// formats when the input is not a valid protobuf profile.
    pub fn parse_data_with(
        data: &[u8],
        registry: &LegacyRegistry,
    ) -> Result<Profile, ProfileError> {
        let decompressed;
        let data = if data.starts_with(&GZIP_MAGIC) {
            decompressed = gunzip(data)?;
            decompressed.as_slice()
        } else {
            data
        };

        let profile = match Self::parse_uncompressed(data) {
            Ok(profile) => profile,
            Err(_) => registry.parse(data)?,
        };

        profile.check_valid()?;
        Ok(profile)
    }

    /// Parses an uncompressed protobuf into a profile. No gzip sniffing, no
    /// legacy fallback, and no validation.
    pub fn parse_uncompressed(data: &[u8]) -> Result<Profile, ProfileError> {
        let message = wire::Profile::decode(data)
            .map_err(|err| ProfileError::malformed(err.to_string()))?;
        decode::post_decode(message)
    }

    /// Writes the profile as a gzip-compressed marshaled protobuf.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), ProfileError> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        self.write_uncompressed(&mut encoder)?;
        encoder.try_finish()?;
        Ok(())
    }

    /// Writes the profile as a marshaled protobuf without compression.
    pub fn write_uncompressed<W: Write>(&self, writer: &mut W) -> Result<(), ProfileError> {
        let message = encode::pre_encode(self);
        let mut buffer = Vec::with_capacity(message.encoded_len() as usize);
        message.encode(&mut buffer)?;
        writer.write_all(&buffer)?;
        Ok(())
    }

    /// Makes a fully independent copy of the profile by round-tripping it
    /// through the codec.
    ///
    /// # Panics
    /// Panics if the round-trip fails, which on a valid profile indicates a
    /// bug in the codec.
    pub fn copy(&self) -> Profile {
        let message = encode::pre_encode(self);
        let mut buffer = Vec::with_capacity(message.encoded_len() as usize);
        message
            .encode(&mut buffer)
            .expect("encoding a profile into memory to succeed");
        let decoded = wire::Profile::decode(&buffer)
            .expect("decoding a freshly encoded profile to succeed");
        decode::post_decode(decoded).expect("re-linking a freshly decoded profile to succeed")
    }
}

fn gunzip(data: &[u8]) -> Result<Vec<u8>, ProfileError> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    match decoder.read_to_end(&mut decompressed) {
        Ok(_) => Ok(decompressed),
        Err(err) => Err(ProfileError::malformed(format!(
            "decompressing profile: {err}"
        ))),
    }
}
