// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io;

/// Represents errors that occur while parsing, encoding, validating, or
/// transforming profiles.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The underlying reader or writer failed; surfaced unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// No known format matched the input. Legacy parsers also return this to
    /// tell the dispatcher to try the next format in the chain.
    #[error("unrecognized profile format")]
    Unrecognized,
    /// The input was syntactically or structurally invalid: truncated bytes,
    /// a bad tag, an unresolved or duplicate id, a string index out of
    /// range, and so on. No partial profile is returned.
    #[error("malformed profile: {0}")]
    Malformed(String),
    /// A caller-provided argument was rejected, e.g. `scale_n` with the
    /// wrong number of ratios.
    #[error("{0}")]
    InvalidArgument(String),
}

impl ProfileError {
    #[cold]
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
