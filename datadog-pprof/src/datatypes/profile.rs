// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Function, FxIndexMap, Location, Mapping, Sample, ValueType};
use std::fmt;

/// An in-memory representation of a pprof profile.
///
/// The profile owns four flat entity tables; samples refer to locations,
/// locations to mappings and (through lines) to functions, all by the dense
/// 1-based ids the wire format uses. An id of 0 always means "no reference".
/// The graph never points back up, so dropping a profile drops its entities
/// in any order.
///
/// All fields are public; after mutating, run [`Profile::check_valid`]
/// before encoding.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Profile {
    /// A description of the value columns carried by each sample. For a cpu
    /// profile this might be `[("cpu", "nanoseconds")]`; for a heap profile
    /// `[("allocations", "count"), ("space", "bytes")]`.
    pub sample_types: Vec<ValueType>,
    /// The type of the preferred sample value, or empty for the last one.
    pub default_sample_type: String,
    pub samples: Vec<Sample>,
    pub mappings: Vec<Mapping>,
    pub locations: Vec<Location>,
    pub functions: Vec<Function>,
    /// Free-form text associated with the profile, displayed as-is by tools
    /// that read profiles.
    pub comments: Vec<String>,
    /// Frames with function names fully matching this regexp will be
    /// dropped from the samples, along with their successors.
    pub drop_frames: String,
    /// Frames with function names fully matching this regexp will be kept,
    /// even if they match drop_frames.
    pub keep_frames: String,
    /// Time of collection (UTC) as nanoseconds past the epoch.
    pub time_nanos: i64,
    /// Duration of the profile, if a duration makes sense.
    pub duration_nanos: i64,
    /// The kind of events between sampled occurrences.
    pub period_type: Option<ValueType>,
    /// The number of events between sampled occurrences.
    pub period: i64,
}

impl Profile {
    pub(crate) fn mappings_by_id(&self) -> FxIndexMap<u64, &Mapping> {
        self.mappings.iter().map(|mapping| (mapping.id, mapping)).collect()
    }

    pub(crate) fn functions_by_id(&self) -> FxIndexMap<u64, &Function> {
        self.functions.iter().map(|function| (function.id, function)).collect()
    }
}

/// Dumps a text representation of a profile. Intended mainly for debugging.
impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(period_type) = &self.period_type {
            writeln!(f, "PeriodType: {} {}", period_type.r#type, period_type.unit)?;
        }
        writeln!(f, "Period: {}", self.period)?;
        if self.time_nanos != 0 {
            writeln!(f, "Time: {} ns since epoch", self.time_nanos)?;
        }
        if self.duration_nanos != 0 {
            writeln!(f, "Duration: {} ns", self.duration_nanos)?;
        }

        writeln!(f, "Samples:")?;
        let mut header = String::new();
        for sample_type in &self.sample_types {
            let dflt = if sample_type.r#type == self.default_sample_type {
                "[dflt]"
            } else {
                ""
            };
            header.push_str(&format!(
                "{}/{}{} ",
                sample_type.r#type, sample_type.unit, dflt
            ));
        }
        writeln!(f, "{}", header.trim_end())?;
        const LABEL_HEADER: &str = "                ";
        for sample in &self.samples {
            let mut line = String::new();
            for value in &sample.values {
                line.push_str(&format!(" {value:10}"));
            }
            line.push_str(": ");
            for location_id in &sample.location_ids {
                line.push_str(&format!("{location_id} "));
            }
            writeln!(f, "{line}")?;
            if !sample.labels.is_empty() {
                let mut line = String::from(LABEL_HEADER);
                for (key, values) in &sample.labels {
                    line.push_str(&format!("{key}:{values:?} "));
                }
                writeln!(f, "{line}")?;
            }
            if !sample.num_labels.is_empty() {
                let mut line = String::from(LABEL_HEADER);
                for (key, values) in &sample.num_labels {
                    line.push_str(&format!("{key}:{values:?} "));
                }
                writeln!(f, "{line}")?;
            }
        }

        writeln!(f, "Locations")?;
        let functions = self.functions_by_id();
        for location in &self.locations {
            let mut prefix = format!("{:6}: {:#x} ", location.id, location.address);
            if location.mapping_id != 0 {
                prefix.push_str(&format!("M={} ", location.mapping_id));
            }
            if location.lines.is_empty() {
                writeln!(f, "{prefix}")?;
            }
            for line in &location.lines {
                let info = match functions.get(&line.function_id) {
                    Some(function) => {
                        let mut info = format!(
                            "{} {}:{} s={}",
                            function.name, function.filename, line.line, function.start_line
                        );
                        if function.name != function.system_name {
                            info.push_str(&format!("({})", function.system_name));
                        }
                        info
                    }
                    None => "??".to_owned(),
                };
                writeln!(f, "{prefix}{info}")?;
                // Do not print location details past the first line.
                prefix = "             ".to_owned();
            }
        }

        writeln!(f, "Mappings")?;
        for mapping in &self.mappings {
            let mut bits = String::new();
            if mapping.has_functions {
                bits.push_str("[FN]");
            }
            if mapping.has_filenames {
                bits.push_str("[FL]");
            }
            if mapping.has_line_numbers {
                bits.push_str("[LN]");
            }
            if mapping.has_inline_frames {
                bits.push_str("[IN]");
            }
            writeln!(
                f,
                "{}: {:#x}/{:#x}/{:#x} {} {} {}",
                mapping.id,
                mapping.memory_start,
                mapping.memory_limit,
                mapping.file_offset,
                mapping.filename,
                mapping.build_id,
                bits
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Line;

    #[test]
    fn display_resolves_references() {
        let profile = Profile {
            sample_types: vec![ValueType::new("samples", "count")],
            samples: vec![Sample {
                location_ids: vec![1],
                values: vec![42],
                ..Default::default()
            }],
            mappings: vec![Mapping {
                id: 1,
                memory_start: 0x1000,
                memory_limit: 0x2000,
                filename: "/bin/prog".into(),
                has_functions: true,
                ..Default::default()
            }],
            locations: vec![Location {
                id: 1,
                mapping_id: 1,
                address: 0x1234,
                lines: vec![Line {
                    function_id: 1,
                    line: 7,
                }],
            }],
            functions: vec![Function {
                id: 1,
                name: "main".into(),
                system_name: "main".into(),
                filename: "main.c".into(),
                start_line: 5,
            }],
            period: 1,
            ..Default::default()
        };

        let text = profile.to_string();
        assert!(text.contains("samples/count"));
        assert!(text.contains("main main.c:7 s=5"));
        assert!(text.contains("1: 0x1000/0x2000/0x0 /bin/prog  [FN]"));
    }
}
