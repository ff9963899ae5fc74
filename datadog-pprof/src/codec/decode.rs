// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{
    Function, FxIndexMap, FxIndexSet, Line, Location, Mapping, Profile, ProfileError, Sample,
    ValueType,
};
use datadog_pprof_protobuf as wire;
use datadog_pprof_protobuf::StringOffset;

/// Re-links a decoded wire message into the object model: string offsets are
/// resolved against the string table, label records are split back into the
/// string and numeric multimaps, and every id reference is checked against
/// the table it points into.
pub(crate) fn post_decode(message: wire::Profile) -> Result<Profile, ProfileError> {
    let strings: Vec<String> = message
        .string_table
        .into_iter()
        .map(|record| record.value)
        .collect();
    if let Some(first) = strings.first() {
        if !first.is_empty() {
            return Err(ProfileError::malformed("string_table[0] must be ''"));
        }
    }

    let mut mappings = Vec::with_capacity(message.mappings.len());
    let mut mapping_ids = FxIndexSet::default();
    for record in message.mappings {
        let mapping = record.value;
        let id = mapping.id.value;
        if id == 0 {
            return Err(ProfileError::malformed("mapping with reserved id 0"));
        }
        if !mapping_ids.insert(id) {
            return Err(ProfileError::malformed(format!("duplicate mapping id: {id}")));
        }
        mappings.push(Mapping {
            id,
            memory_start: mapping.memory_start.value,
            memory_limit: mapping.memory_limit.value,
            file_offset: mapping.file_offset.value,
            filename: fetch(&strings, mapping.filename.value)?,
            build_id: fetch(&strings, mapping.build_id.value)?,
            has_functions: mapping.has_functions.value,
            has_filenames: mapping.has_filenames.value,
            has_line_numbers: mapping.has_line_numbers.value,
            has_inline_frames: mapping.has_inline_frames.value,
        });
    }

    let mut functions = Vec::with_capacity(message.functions.len());
    let mut function_ids = FxIndexSet::default();
    for record in message.functions {
        let function = record.value;
        let id = function.id.value;
        if id == 0 {
            return Err(ProfileError::malformed("function with reserved id 0"));
        }
        if !function_ids.insert(id) {
            return Err(ProfileError::malformed(format!(
                "duplicate function id: {id}"
            )));
        }
        functions.push(Function {
            id,
            name: fetch(&strings, function.name.value)?,
            system_name: fetch(&strings, function.system_name.value)?,
            filename: fetch(&strings, function.filename.value)?,
            start_line: function.start_line.value,
        });
    }

    let mut locations = Vec::with_capacity(message.locations.len());
    let mut location_ids = FxIndexSet::default();
    for record in message.locations {
        let location = record.value;
        let id = location.id.value;
        if id == 0 {
            return Err(ProfileError::malformed("location with reserved id 0"));
        }
        if !location_ids.insert(id) {
            return Err(ProfileError::malformed(format!(
                "duplicate location id: {id}"
            )));
        }
        let mapping_id = location.mapping_id.value;
        if mapping_id != 0 && !mapping_ids.contains(&mapping_id) {
            return Err(ProfileError::malformed(format!(
                "location {id} references unknown mapping id: {mapping_id}"
            )));
        }
        let mut lines = Vec::with_capacity(location.lines.len());
        for line in location.lines {
            let function_id = line.value.function_id.value;
            if function_id != 0 && !function_ids.contains(&function_id) {
                return Err(ProfileError::malformed(format!(
                    "location {id} references unknown function id: {function_id}"
                )));
            }
            lines.push(Line {
                function_id,
                line: line.value.line.value,
            });
        }
        locations.push(Location {
            id,
            mapping_id,
            address: location.address.value,
            lines,
        });
    }

    let mut samples = Vec::with_capacity(message.samples.len());
    for record in message.samples {
        let sample = record.value;
        for location_id in &sample.location_ids.value {
            if !location_ids.contains(location_id) {
                return Err(ProfileError::malformed(format!(
                    "sample references unknown location id: {location_id}"
                )));
            }
        }
        let mut labels: FxIndexMap<String, Vec<String>> = FxIndexMap::default();
        let mut num_labels: FxIndexMap<String, Vec<i64>> = FxIndexMap::default();
        for record in sample.labels {
            let label = record.value;
            let key = fetch(&strings, label.key.value)?;
            match (!label.str.value.is_zero(), label.num.value != 0) {
                (true, false) => {
                    let value = fetch(&strings, label.str.value)?;
                    labels.entry(key).or_default().push(value);
                }
                (false, true) => {
                    num_labels.entry(key).or_default().push(label.num.value);
                }
                (true, true) => {
                    return Err(ProfileError::malformed("label has both str and num values"));
                }
                (false, false) => {
                    return Err(ProfileError::malformed(
                        "label has neither str nor num value",
                    ));
                }
            }
        }
        samples.push(Sample {
            location_ids: sample.location_ids.value,
            values: sample.values.value,
            labels,
            num_labels,
        });
    }

    let period_type = match message.period_type {
        Some(period_type) => Some(ValueType {
            r#type: fetch(&strings, period_type.r#type.value)?,
            unit: fetch(&strings, period_type.unit.value)?,
        }),
        None => None,
    };

    let mut sample_types = Vec::with_capacity(message.sample_types.len());
    for record in message.sample_types {
        sample_types.push(ValueType {
            r#type: fetch(&strings, record.value.r#type.value)?,
            unit: fetch(&strings, record.value.unit.value)?,
        });
    }

    let mut comments = Vec::with_capacity(message.comments.value.len());
    for offset in message.comments.value {
        comments.push(fetch(&strings, offset)?);
    }

    Ok(Profile {
        sample_types,
        default_sample_type: fetch(&strings, message.default_sample_type.value)?,
        samples,
        mappings,
        locations,
        functions,
        comments,
        drop_frames: fetch(&strings, message.drop_frames.value)?,
        keep_frames: fetch(&strings, message.keep_frames.value)?,
        time_nanos: message.time_nanos.value,
        duration_nanos: message.duration_nanos.value,
        period_type,
        period: message.period.value,
    })
}

/// Resolves a string table offset. Offset 0 is always the empty string,
/// even in a message that carries no string table at all.
fn fetch(strings: &[String], offset: StringOffset) -> Result<String, ProfileError> {
    if offset.is_zero() {
        return Ok(String::new());
    }
    let index = usize::from(offset);
    match strings.get(index) {
        Some(string) => Ok(string.clone()),
        None => Err(ProfileError::malformed(format!(
            "string table index out of range: {index}"
        ))),
    }
}
