// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// A symbolized routine.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Function {
    /// Unique nonzero id within the owning profile.
    pub id: u64,
    /// Name of the function, in human-readable form if available.
    pub name: String,
    /// Name of the function as identified by the system, e.g. a C++ mangled
    /// name.
    pub system_name: String,
    /// Source file containing the function.
    pub filename: String,
    /// Line number in the source file of the function's definition.
    pub start_line: i64,
}
