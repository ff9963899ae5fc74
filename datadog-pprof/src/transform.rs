// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-place structural transformations over a decoded profile.

use crate::{FxIndexMap, Profile, ProfileError};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Shared-library suffixes. Mappings whose filename matches are never
    /// picked as the main binary.
    static ref LIB_RX: Regex = Regex::new(r"([.]so$|[.]so[._][0-9]+)").unwrap();
}

impl Profile {
    /// Applies heuristic-based changes to the profile mappings to account
    /// for quirks of some environments. Adjacent mappings with contiguous
    /// address and file-offset ranges are merged, the entry that looks like
    /// the main binary is moved to the front, and mapping ids are
    /// renumbered to stay dense. Only the legacy-format path calls this;
    /// protobuf profiles are taken as-is.
    pub(crate) fn massage_mappings(&mut self) {
        // Merge adjacent regions with matching names, checking that the
        // offsets match.
        if self.mappings.len() > 1 {
            let mut merged: Vec<crate::Mapping> = Vec::with_capacity(self.mappings.len());
            for mapping in std::mem::take(&mut self.mappings) {
                if let Some(last) = merged.last_mut() {
                    let offset = last.file_offset + (last.memory_limit - last.memory_start);
                    if last.memory_limit == mapping.memory_start
                        && offset == mapping.file_offset
                        && (last.filename == mapping.filename || last.filename.is_empty())
                    {
                        if last.filename.is_empty() {
                            last.filename = mapping.filename;
                        }
                        last.memory_limit = mapping.memory_limit;
                        if last.build_id.is_empty() {
                            last.build_id = mapping.build_id;
                        }
                        let from = mapping.id;
                        let to = last.id;
                        for location in &mut self.locations {
                            if location.mapping_id == from {
                                location.mapping_id = to;
                            }
                        }
                        continue;
                    }
                }
                merged.push(mapping);
            }
            self.mappings = merged;
        }

        // Use heuristics to identify the main binary and move it to the
        // front of the list of mappings.
        for i in 0..self.mappings.len() {
            let file = self.mappings[i].filename.replace("(deleted)", "");
            let file = file.trim();
            if file.is_empty() {
                continue;
            }
            if LIB_RX.is_match(file) {
                continue;
            }
            if file.starts_with('[') {
                continue;
            }
            // Swap what we guess is main to position 0.
            self.mappings.swap(0, i);
            break;
        }

        // Keep the mapping ids neatly sorted.
        let renumbered: FxIndexMap<u64, u64> = self
            .mappings
            .iter()
            .enumerate()
            .map(|(i, mapping)| (mapping.id, i as u64 + 1))
            .collect();
        for (i, mapping) in self.mappings.iter_mut().enumerate() {
            mapping.id = i as u64 + 1;
        }
        for location in &mut self.locations {
            if let Some(&id) = renumbered.get(&location.mapping_id) {
                location.mapping_id = id;
            }
        }
    }

    /// Merges the locations in the profile into equivalence classes
    /// preserving the requested attributes. Each flag declares that its
    /// fidelity axis is to be kept; a cleared flag collapses that axis for
    /// every function, location, and mapping. A profile that never had an
    /// axis symbolized cannot gain it back, so mapping fidelity bits are
    /// ANDed with the flags.
    pub fn aggregate(
        &mut self,
        inline_frame: bool,
        function: bool,
        filename: bool,
        line_number: bool,
        address: bool,
    ) -> Result<(), ProfileError> {
        for mapping in &mut self.mappings {
            mapping.has_inline_frames &= inline_frame;
            mapping.has_functions &= function;
            mapping.has_filenames &= filename;
            mapping.has_line_numbers &= line_number;
        }

        // Aggregate functions
        if !function || !filename {
            for f in &mut self.functions {
                if !function {
                    f.name.clear();
                    f.system_name.clear();
                }
                if !filename {
                    f.filename.clear();
                }
            }
        }

        // Aggregate locations
        if !inline_frame || !address || !line_number {
            for location in &mut self.locations {
                if !inline_frame && location.lines.len() > 1 {
                    // Keep the innermost frame.
                    location.lines = location.lines.split_off(location.lines.len() - 1);
                }
                if !line_number {
                    for line in &mut location.lines {
                        line.line = 0;
                    }
                }
                if !address {
                    location.address = 0;
                }
            }
        }

        self.check_valid()
    }

    /// Multiplies all sample values by a constant. A ratio of 1 is a no-op.
    pub fn scale(&mut self, ratio: f64) {
        if ratio == 1.0 {
            return;
        }
        let ratios = vec![ratio; self.sample_types.len()];
        self.apply_scale(&ratios);
    }

    /// Multiplies each sample value column by its own ratio. Values are
    /// converted through f64 and truncated toward zero on the way back, so
    /// magnitudes above 2^53 lose precision.
    pub fn scale_n(&mut self, ratios: &[f64]) -> Result<(), ProfileError> {
        if self.sample_types.len() != ratios.len() {
            return Err(ProfileError::InvalidArgument(format!(
                "mismatched scale ratios, got {}, want {}",
                ratios.len(),
                self.sample_types.len()
            )));
        }
        if ratios.iter().all(|ratio| *ratio == 1.0) {
            return Ok(());
        }
        self.apply_scale(ratios);
        Ok(())
    }

    fn apply_scale(&mut self, ratios: &[f64]) {
        for sample in &mut self.samples {
            for (value, ratio) in sample.values.iter_mut().zip(ratios) {
                if *ratio != 1.0 {
                    *value = (*value as f64 * ratio) as i64;
                }
            }
        }
    }

    /// Determines if all locations in this profile have symbolized function
    /// information.
    pub fn has_functions(&self) -> bool {
        let mappings = self.mappings_by_id();
        self.locations.iter().all(|location| {
            match mappings.get(&location.mapping_id) {
                Some(mapping) => mapping.has_functions,
                None => true,
            }
        })
    }

    /// Determines if all locations in this profile have symbolized file and
    /// line number information.
    pub fn has_file_lines(&self) -> bool {
        let mappings = self.mappings_by_id();
        self.locations.iter().all(|location| {
            match mappings.get(&location.mapping_id) {
                Some(mapping) => mapping.has_filenames && mapping.has_line_numbers,
                None => true,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Line, Location, Mapping, Profile, ProfileError, Sample, ValueType};

    fn mapping(id: u64, start: u64, limit: u64, offset: u64, file: &str) -> Mapping {
        Mapping {
            id,
            memory_start: start,
            memory_limit: limit,
            file_offset: offset,
            filename: file.into(),
            ..Default::default()
        }
    }

    #[test]
    fn merges_adjacent_mappings() {
        let mut profile = Profile {
            mappings: vec![
                mapping(1, 0x0, 0x1000, 0, "a"),
                mapping(2, 0x1000, 0x2000, 0x1000, "a"),
                mapping(3, 0x3000, 0x4000, 0, "b"),
            ],
            locations: vec![
                Location {
                    id: 1,
                    mapping_id: 2,
                    ..Default::default()
                },
                Location {
                    id: 2,
                    mapping_id: 3,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        profile.massage_mappings();

        assert_eq!(2, profile.mappings.len());
        let first = &profile.mappings[0];
        assert_eq!((1, 0x0, 0x2000, 0, "a"), (
            first.id,
            first.memory_start,
            first.memory_limit,
            first.file_offset,
            first.filename.as_str()
        ));
        let second = &profile.mappings[1];
        assert_eq!((2, 0x3000, 0x4000, 0, "b"), (
            second.id,
            second.memory_start,
            second.memory_limit,
            second.file_offset,
            second.filename.as_str()
        ));
        // Both locations resolve to the surviving mappings.
        assert_eq!(1, profile.locations[0].mapping_id);
        assert_eq!(2, profile.locations[1].mapping_id);
        assert!(profile.check_valid().is_ok());
    }

    #[test]
    fn merge_adopts_names_from_unnamed_predecessor() {
        let mut profile = Profile {
            mappings: vec![
                mapping(1, 0x0, 0x1000, 0, ""),
                Mapping {
                    build_id: "abc123".into(),
                    ..mapping(2, 0x1000, 0x2000, 0x1000, "prog")
                },
            ],
            ..Default::default()
        };

        profile.massage_mappings();

        assert_eq!(1, profile.mappings.len());
        assert_eq!("prog", profile.mappings[0].filename);
        assert_eq!("abc123", profile.mappings[0].build_id);
    }

    #[test]
    fn moves_main_binary_to_front() {
        let mut profile = Profile {
            mappings: vec![
                mapping(1, 0x0, 0x1000, 0, "/lib/libc.so.6"),
                mapping(2, 0x2000, 0x3000, 0, "/bin/prog"),
                mapping(3, 0x4000, 0x5000, 0, "[vdso]"),
            ],
            locations: vec![Location {
                id: 1,
                mapping_id: 2,
                ..Default::default()
            }],
            ..Default::default()
        };

        profile.massage_mappings();

        let files: Vec<&str> = profile
            .mappings
            .iter()
            .map(|m| m.filename.as_str())
            .collect();
        assert_eq!(vec!["/bin/prog", "/lib/libc.so.6", "[vdso]"], files);
        let ids: Vec<u64> = profile.mappings.iter().map(|m| m.id).collect();
        assert_eq!(vec![1, 2, 3], ids);
        // The location follows its mapping to the new id.
        assert_eq!(1, profile.locations[0].mapping_id);
    }

    #[test]
    fn deleted_suffix_is_ignored_when_guessing_main() {
        let mut profile = Profile {
            mappings: vec![
                mapping(1, 0x0, 0x1000, 0, "[heap]"),
                mapping(2, 0x2000, 0x3000, 0, "/bin/prog (deleted)"),
            ],
            ..Default::default()
        };
        profile.massage_mappings();
        assert_eq!("/bin/prog (deleted)", profile.mappings[0].filename);

        // Versioned shared objects stay put.
        let mut profile = Profile {
            mappings: vec![
                mapping(1, 0x0, 0x1000, 0, "/lib/ld-2.31.so"),
                mapping(2, 0x2000, 0x3000, 0, "/lib/libm.so_2"),
            ],
            ..Default::default()
        };
        profile.massage_mappings();
        // Both match the library pattern, so the order is unchanged.
        assert_eq!("/lib/ld-2.31.so", profile.mappings[0].filename);
    }

    #[test]
    fn aggregate_collapses_inlined_frames_and_addresses() {
        let mut profile = Profile {
            sample_types: vec![ValueType::new("samples", "count")],
            functions: vec![
                crate::Function {
                    id: 1,
                    name: "inlined".into(),
                    ..Default::default()
                },
                crate::Function {
                    id: 2,
                    name: "caller".into(),
                    ..Default::default()
                },
            ],
            locations: vec![Location {
                id: 1,
                address: 0xabc,
                lines: vec![
                    Line {
                        function_id: 1,
                        line: 10,
                    },
                    Line {
                        function_id: 1,
                        line: 20,
                    },
                    Line {
                        function_id: 2,
                        line: 30,
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        };

        profile
            .aggregate(false, true, true, true, false)
            .expect("aggregate to succeed");

        let location = &profile.locations[0];
        assert_eq!(
            vec![Line {
                function_id: 2,
                line: 30,
            }],
            location.lines
        );
        assert_eq!(0, location.address);
        // Function names were requested, so they survive.
        assert_eq!("caller", profile.functions[1].name);
    }

    #[test]
    fn aggregate_clears_functions_and_fidelity_bits() {
        let mut profile = Profile {
            mappings: vec![Mapping {
                id: 1,
                has_functions: true,
                has_filenames: true,
                has_line_numbers: true,
                has_inline_frames: true,
                ..Default::default()
            }],
            functions: vec![crate::Function {
                id: 1,
                name: "main".into(),
                system_name: "main".into(),
                filename: "main.c".into(),
                start_line: 1,
            }],
            ..Default::default()
        };

        profile
            .aggregate(true, false, false, true, true)
            .expect("aggregate to succeed");

        let function = &profile.functions[0];
        assert_eq!("", function.name);
        assert_eq!("", function.system_name);
        assert_eq!("", function.filename);
        let mapping = &profile.mappings[0];
        assert!(!mapping.has_functions);
        assert!(!mapping.has_filenames);
        assert!(mapping.has_line_numbers);
        assert!(mapping.has_inline_frames);
    }

    #[test]
    fn scale_truncates_toward_zero() {
        let mut profile = Profile {
            sample_types: vec![ValueType::new("samples", "count")],
            samples: vec![
                Sample {
                    values: vec![7],
                    ..Default::default()
                },
                Sample {
                    values: vec![-7],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        profile.scale(0.5);
        assert_eq!(3, profile.samples[0].values[0]);
        assert_eq!(-3, profile.samples[1].values[0]);
    }

    #[test]
    fn scale_one_is_noop() {
        let mut profile = Profile {
            sample_types: vec![ValueType::new("samples", "count")],
            samples: vec![Sample {
                values: vec![9],
                ..Default::default()
            }],
            ..Default::default()
        };
        profile.scale(1.0);
        assert_eq!(9, profile.samples[0].values[0]);
    }

    #[test]
    fn scale_n_checks_arity() {
        let mut profile = Profile {
            sample_types: vec![
                ValueType::new("cpu", "nanoseconds"),
                ValueType::new("samples", "count"),
            ],
            samples: vec![Sample {
                values: vec![100, 10],
                ..Default::default()
            }],
            ..Default::default()
        };

        let err = profile.scale_n(&[2.0]).expect_err("scale_n to fail");
        assert!(matches!(err, ProfileError::InvalidArgument(_)));
        assert_eq!(
            "mismatched scale ratios, got 1, want 2",
            err.to_string()
        );

        profile
            .scale_n(&[2.0, 1.0])
            .expect("scale_n to succeed");
        assert_eq!(vec![200, 10], profile.samples[0].values);
    }

    #[test]
    fn symbolization_fidelity_queries() {
        let mut profile = Profile {
            mappings: vec![
                Mapping {
                    id: 1,
                    has_functions: true,
                    has_filenames: true,
                    has_line_numbers: true,
                    ..Default::default()
                },
                Mapping {
                    id: 2,
                    has_functions: false,
                    ..Default::default()
                },
            ],
            locations: vec![
                Location {
                    id: 1,
                    mapping_id: 1,
                    ..Default::default()
                },
                // No mapping; does not count against fidelity.
                Location {
                    id: 2,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        assert!(profile.has_functions());
        assert!(profile.has_file_lines());

        profile.locations.push(Location {
            id: 3,
            mapping_id: 2,
            ..Default::default()
        });
        assert!(!profile.has_functions());
        assert!(!profile.has_file_lines());
    }
}
