// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Dispatch for pre-protobuf profile formats.
//!
//! The original pprof tooling accepts a handful of legacy text and binary
//! formats (CPU, heap, goroutine/threadcreate counts, thread, contention,
//! Java). This crate does not ship those parsers; it defines the capability
//! they conform to and tries each registered parser in order when the input
//! is not a valid protobuf profile. A parser is expected to synthesize
//! whatever mapping and function records its format needs for the profile to
//! validate; the dispatcher takes care of the mapping cleanup and validation
//! that every legacy format gets.

use crate::{Profile, ProfileError};

/// A decoder for one legacy profile format.
pub trait LegacyParser {
    /// Attempts to parse `data` as this format. Return
    /// [`ProfileError::Unrecognized`] when the bytes are not this format so
    /// the dispatcher moves on to the next parser; any other error aborts
    /// the whole chain.
    fn parse(&self, data: &[u8]) -> Result<Profile, ProfileError>;
}

/// An ordered chain of [`LegacyParser`]s, consulted by
/// [`Profile::parse_data_with`] after a failed protobuf parse. The default
/// registry is empty, so by default only protobuf profiles parse.
#[derive(Default)]
pub struct LegacyRegistry {
    parsers: Vec<Box<dyn LegacyParser + Send + Sync>>,
}

impl LegacyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parser to the chain. Order matters: ambiguous inputs go to
    /// the first parser that recognizes them.
    pub fn register(&mut self, parser: Box<dyn LegacyParser + Send + Sync>) {
        self.parsers.push(parser);
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    pub(crate) fn parse(&self, data: &[u8]) -> Result<Profile, ProfileError> {
        for parser in &self.parsers {
            match parser.parse(data) {
                Ok(mut profile) => {
                    profile.massage_mappings();
                    return Ok(profile);
                }
                Err(ProfileError::Unrecognized) => continue,
                Err(error) => return Err(error),
            }
        }
        Err(ProfileError::Unrecognized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mapping, Sample, ValueType};

    struct CountParser;

    impl LegacyParser for CountParser {
        fn parse(&self, data: &[u8]) -> Result<Profile, ProfileError> {
            if !data.starts_with(b"count:") {
                return Err(ProfileError::Unrecognized);
            }
            let count: i64 = std::str::from_utf8(&data[6..])
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .ok_or_else(|| ProfileError::malformed("bad count"))?;
            Ok(Profile {
                sample_types: vec![ValueType::new("goroutine", "count")],
                samples: vec![Sample {
                    values: vec![count],
                    ..Default::default()
                }],
                mappings: vec![
                    Mapping {
                        id: 1,
                        filename: "[runtime]".into(),
                        ..Default::default()
                    },
                    Mapping {
                        id: 2,
                        filename: "/bin/prog".into(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            })
        }
    }

    #[test]
    fn falls_back_in_registration_order() {
        let mut registry = LegacyRegistry::new();
        registry.register(Box::new(CountParser));

        let profile =
            Profile::parse_data_with(b"count: 12", &registry).expect("parse to succeed");
        assert_eq!(vec![12], profile.samples[0].values);
        // The dispatcher massaged the mappings: main binary first, dense ids.
        assert_eq!("/bin/prog", profile.mappings[0].filename);
        assert_eq!(1, profile.mappings[0].id);
    }

    #[test]
    fn hard_errors_abort_the_chain() {
        struct NeverReached;
        impl LegacyParser for NeverReached {
            fn parse(&self, _data: &[u8]) -> Result<Profile, ProfileError> {
                panic!("chain should have aborted");
            }
        }

        let mut registry = LegacyRegistry::new();
        registry.register(Box::new(CountParser));
        registry.register(Box::new(NeverReached));

        let err =
            Profile::parse_data_with(b"count: nope", &registry).expect_err("parse to fail");
        assert_eq!("malformed profile: bad count", err.to_string());
    }

    #[test]
    fn exhausted_chain_is_unrecognized() {
        let mut registry = LegacyRegistry::new();
        registry.register(Box::new(CountParser));

        let err = Profile::parse_data_with(b"not a profile", &registry).expect_err("parse to fail");
        assert!(matches!(err, ProfileError::Unrecognized));
    }
}
