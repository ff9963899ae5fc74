// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Describes the mapping of a binary in memory: the address range covered
/// and the file it was loaded from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mapping {
    /// Unique nonzero id, dense from 1 within the owning profile.
    pub id: u64,
    /// Address at which the binary (or DLL) is loaded into memory.
    pub memory_start: u64,
    /// The limit of the address range occupied by this mapping.
    pub memory_limit: u64,
    /// Offset in the binary that corresponds to the first mapped address.
    pub file_offset: u64,
    /// The object this entry is loaded from. This can be a filename on disk
    /// for the main binary and shared libraries, or virtual abstractions
    /// like "\[vdso\]".
    pub filename: String,
    /// A string that uniquely identifies a particular program version with
    /// high probability, e.g. the contents of the .note.gnu.build-id field.
    pub build_id: String,
    /// The following fields declare which axes of symbolic info were already
    /// resolved for locations in this mapping.
    pub has_functions: bool,
    pub has_filenames: bool,
    pub has_line_numbers: bool,
    pub has_inline_frames: bool,
}
