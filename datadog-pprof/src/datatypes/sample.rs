// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::FxIndexMap;

/// Each Sample records values encountered in some program context. The
/// program context is typically a stack trace, perhaps augmented with
/// auxiliary information like the thread-id, some indicator of a higher
/// level request being handled, etc.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Sample {
    /// The call stack, as ids into the owning profile's location table.
    /// The leaf is at location_ids\[0\].
    pub location_ids: Vec<u64>,
    /// One value per entry in the profile's sample_types, in the same order.
    pub values: Vec<i64>,
    /// String-valued annotations, e.g. `"state" -> ["running"]`. On the wire
    /// these interleave with num_labels as Label records; in memory they are
    /// kept as separate multimaps. Insertion order is preserved and defines
    /// the encode order.
    pub labels: FxIndexMap<String, Vec<String>>,
    /// Integer-valued annotations, e.g. `"thread id" -> [12]`.
    pub num_labels: FxIndexMap<String, Vec<i64>>,
}
