// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// A program point: an instruction address, the mapping containing it, and
/// the source lines resolved for it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Location {
    /// Unique nonzero id within the owning profile.
    pub id: u64,
    /// Id of the mapping containing the address, or 0 if unknown or not
    /// applicable for this profile type.
    pub mapping_id: u64,
    /// The instruction address, if available. It should be within the
    /// corresponding mapping's `memory_start..memory_limit`.
    pub address: u64,
    /// Source line information, empty if unsymbolized. Multiple lines
    /// indicate inlined functions, where the last entry represents the
    /// caller into which the preceding entries were inlined.
    pub lines: Vec<Line>,
}

/// A (function, source line) pair resolved for a location.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Line {
    /// Id of the function this line belongs to, or 0 if unknown.
    pub function_id: u64,
    /// Line number in source code; 0 means unknown.
    pub line: i64,
}
