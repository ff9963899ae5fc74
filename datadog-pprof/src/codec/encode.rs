// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::string_table::StringTable;
use crate::{Profile, ValueType};
use datadog_pprof_protobuf as wire;
use datadog_pprof_protobuf::Record;

/// Flattens the object graph into its wire representation: every string
/// field is interned into a fresh string table and replaced by its offset,
/// and the id fields copy straight through.
///
/// Strings are interned in a fixed walk order (sample types, samples,
/// mappings, locations, functions, drop/keep frames, period type, comments,
/// default sample type), so encoding the same profile twice yields the same
/// bytes.
pub(crate) fn pre_encode(profile: &Profile) -> wire::Profile {
    let mut strings = StringTable::new();

    let sample_types = profile
        .sample_types
        .iter()
        .map(|sample_type| value_type(sample_type, &mut strings).into())
        .collect();

    let samples = profile
        .samples
        .iter()
        .map(|sample| {
            let mut labels = Vec::new();
            for (key, values) in &sample.labels {
                for value in values {
                    labels.push(
                        wire::Label {
                            key: strings.intern(key).into(),
                            str: strings.intern(value).into(),
                            num: Record::default(),
                        }
                        .into(),
                    );
                }
            }
            for (key, nums) in &sample.num_labels {
                for num in nums {
                    labels.push(
                        wire::Label {
                            key: strings.intern(key).into(),
                            str: Record::default(),
                            num: (*num).into(),
                        }
                        .into(),
                    );
                }
            }
            wire::Sample {
                location_ids: sample.location_ids.clone().into(),
                values: sample.values.clone().into(),
                labels,
            }
            .into()
        })
        .collect();

    let mappings = profile
        .mappings
        .iter()
        .map(|mapping| {
            wire::Mapping {
                id: mapping.id.into(),
                memory_start: mapping.memory_start.into(),
                memory_limit: mapping.memory_limit.into(),
                file_offset: mapping.file_offset.into(),
                filename: strings.intern(&mapping.filename).into(),
                build_id: strings.intern(&mapping.build_id).into(),
                has_functions: mapping.has_functions.into(),
                has_filenames: mapping.has_filenames.into(),
                has_line_numbers: mapping.has_line_numbers.into(),
                has_inline_frames: mapping.has_inline_frames.into(),
            }
            .into()
        })
        .collect();

    let locations = profile
        .locations
        .iter()
        .map(|location| {
            wire::Location {
                id: location.id.into(),
                mapping_id: location.mapping_id.into(),
                address: location.address.into(),
                lines: location
                    .lines
                    .iter()
                    .map(|line| {
                        wire::Line {
                            function_id: line.function_id.into(),
                            line: line.line.into(),
                        }
                        .into()
                    })
                    .collect(),
            }
            .into()
        })
        .collect();

    let functions = profile
        .functions
        .iter()
        .map(|function| {
            wire::Function {
                id: function.id.into(),
                name: strings.intern(&function.name).into(),
                system_name: strings.intern(&function.system_name).into(),
                filename: strings.intern(&function.filename).into(),
                start_line: function.start_line.into(),
            }
            .into()
        })
        .collect();

    let drop_frames = strings.intern(&profile.drop_frames).into();
    let keep_frames = strings.intern(&profile.keep_frames).into();
    let period_type = profile
        .period_type
        .as_ref()
        .map(|period_type| value_type(period_type, &mut strings));
    let comments = profile
        .comments
        .iter()
        .map(|comment| strings.intern(comment))
        .collect::<Vec<_>>()
        .into();
    let default_sample_type = strings.intern(&profile.default_sample_type).into();

    let mut string_table = Vec::with_capacity(strings.len());
    string_table.extend(strings.into_strings().map(Record::from));

    wire::Profile {
        sample_types,
        samples,
        mappings,
        locations,
        functions,
        string_table,
        drop_frames,
        keep_frames,
        time_nanos: profile.time_nanos.into(),
        duration_nanos: profile.duration_nanos.into(),
        period_type,
        period: profile.period.into(),
        comments,
        default_sample_type,
    }
}

fn value_type(value_type: &ValueType, strings: &mut StringTable) -> wire::ValueType {
    wire::ValueType {
        r#type: strings.intern(&value_type.r#type).into(),
        unit: strings.intern(&value_type.unit).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Function, Sample};

    #[test]
    fn string_table_starts_empty_and_dedups() {
        let profile = Profile {
            sample_types: vec![ValueType::new("samples", "count")],
            functions: vec![
                Function {
                    id: 1,
                    name: "main".into(),
                    system_name: "main".into(),
                    filename: "main.c".into(),
                    start_line: 0,
                },
                Function {
                    id: 2,
                    name: "work".into(),
                    system_name: "work".into(),
                    filename: "main.c".into(),
                    start_line: 0,
                },
            ],
            ..Default::default()
        };

        let message = pre_encode(&profile);
        let table: Vec<&str> = message
            .string_table
            .iter()
            .map(|record| record.value.as_str())
            .collect();
        // First-use order, empty string first, each string exactly once.
        assert_eq!(
            vec!["", "samples", "count", "main", "main.c", "work"],
            table
        );

        // Every string-valued field has an offset inside the table.
        let len = table.len() as u64;
        for function in &message.functions {
            assert!(u64::from(function.value.name.value) < len);
            assert!(u64::from(function.value.filename.value) < len);
        }
    }

    #[test]
    fn pre_encode_is_idempotent() {
        let profile = Profile {
            sample_types: vec![ValueType::new("cpu", "nanoseconds")],
            samples: vec![Sample {
                values: vec![10],
                labels: [("state".to_owned(), vec!["running".to_owned()])]
                    .into_iter()
                    .collect(),
                num_labels: [("thread id".to_owned(), vec![42])].into_iter().collect(),
                ..Default::default()
            }],
            comments: vec!["collected by test".into()],
            default_sample_type: "cpu".into(),
            ..Default::default()
        };

        let mut first = Vec::new();
        pre_encode(&profile).encode(&mut first).unwrap();
        let mut second = Vec::new();
        pre_encode(&profile).encode(&mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn str_labels_precede_num_labels() {
        let profile = Profile {
            sample_types: vec![ValueType::new("samples", "count")],
            samples: vec![Sample {
                values: vec![1],
                labels: [("key".to_owned(), vec!["value".to_owned()])]
                    .into_iter()
                    .collect(),
                num_labels: [("key".to_owned(), vec![9])].into_iter().collect(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let message = pre_encode(&profile);
        let labels = &message.samples[0].value.labels;
        // A key present in both multimaps emits two separate records.
        assert_eq!(2, labels.len());
        assert!(!labels[0].value.str.value.is_zero());
        assert_eq!(0, labels[0].value.num.value);
        assert!(labels[1].value.str.value.is_zero());
        assert_eq!(9, labels[1].value.num.value);
    }
}
