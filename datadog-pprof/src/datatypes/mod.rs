// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod function;
mod location;
mod mapping;
mod profile;
mod sample;
mod value_type;

pub use function::*;
pub use location::*;
pub use mapping::*;
pub use profile::*;
pub use sample::*;
pub use value_type::*;
