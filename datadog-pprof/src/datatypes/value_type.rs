// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// ValueType describes the semantics and measurement units of a value, e.g.
/// `("cpu", "nanoseconds")` or `("space", "bytes")`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValueType {
    pub r#type: String,
    pub unit: String,
}

impl ValueType {
    pub fn new(r#type: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            r#type: r#type.into(),
            unit: unit.into(),
        }
    }
}
