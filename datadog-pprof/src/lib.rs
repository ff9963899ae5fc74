// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory representation of pprof profiles with methods to decode,
//! encode, validate, and transform them.
//!
//! The wire format is the gzip-framed `profile.proto` interchange format
//! produced and consumed by the pprof toolchain; the codec itself lives in
//! the `datadog-pprof-protobuf` crate. This crate layers the object model on
//! top: profiles own flat tables of samples, mappings, locations, and
//! functions, with cross-table references expressed as the same dense
//! 1-based ids the wire format uses. Strings are plain `String`s in memory
//! and are interned into the profile's string table on encode.
//!
//! ```no_run
//! use datadog_pprof::Profile;
//!
//! fn dump(data: &[u8]) -> Result<(), datadog_pprof::ProfileError> {
//!     let profile = Profile::parse_data(data)?;
//!     print!("{profile}");
//!     Ok(())
//! }
//! ```
//!
//! A `Profile` is not internally synchronized: share `&Profile` freely
//! across threads, serialize mutation externally.

mod codec;
mod datatypes;
mod error;
mod string_table;
mod transform;
mod validation;

pub mod legacy;

pub use datatypes::*;
pub use error::*;

use std::hash::BuildHasherDefault;

pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<rustc_hash::FxHasher>>;
pub type FxIndexSet<K> = indexmap::IndexSet<K, BuildHasherDefault<rustc_hash::FxHasher>>;
