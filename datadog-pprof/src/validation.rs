// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{FxIndexSet, Profile, ProfileError};

impl Profile {
    /// Tests whether the profile is valid. Checks include, but are not
    /// limited to:
    /// - every sample has one value per declared sample type;
    /// - every mapping/location/function id is nonzero and unique within
    ///   its table;
    /// - every id reference resolves in the corresponding table.
    ///
    /// Runs automatically at the end of parsing and of
    /// [`Profile::aggregate`]; call it by hand after direct mutation,
    /// before encoding.
    pub fn check_valid(&self) -> Result<(), ProfileError> {
        let sample_len = self.sample_types.len();
        if sample_len == 0 && !self.samples.is_empty() {
            return Err(ProfileError::malformed("missing sample type information"));
        }
        for sample in &self.samples {
            if sample.values.len() != sample_len {
                return Err(ProfileError::malformed(format!(
                    "mismatch: sample has: {} values vs. {} types",
                    sample.values.len(),
                    sample_len
                )));
            }
        }

        let mut mapping_ids = FxIndexSet::default();
        for mapping in &self.mappings {
            if mapping.id == 0 {
                return Err(ProfileError::malformed("found mapping with reserved ID=0"));
            }
            if !mapping_ids.insert(mapping.id) {
                return Err(ProfileError::malformed(format!(
                    "multiple mappings with same id: {}",
                    mapping.id
                )));
            }
        }
        let mut function_ids = FxIndexSet::default();
        for function in &self.functions {
            if function.id == 0 {
                return Err(ProfileError::malformed("found function with reserved ID=0"));
            }
            if !function_ids.insert(function.id) {
                return Err(ProfileError::malformed(format!(
                    "multiple functions with same id: {}",
                    function.id
                )));
            }
        }
        let mut location_ids = FxIndexSet::default();
        for location in &self.locations {
            if location.id == 0 {
                return Err(ProfileError::malformed("found location with reserved id=0"));
            }
            if !location_ids.insert(location.id) {
                return Err(ProfileError::malformed(format!(
                    "multiple locations with same id: {}",
                    location.id
                )));
            }
            if location.mapping_id != 0 && !mapping_ids.contains(&location.mapping_id) {
                return Err(ProfileError::malformed(format!(
                    "inconsistent mapping reference: {}",
                    location.mapping_id
                )));
            }
            for line in &location.lines {
                if line.function_id != 0 && !function_ids.contains(&line.function_id) {
                    return Err(ProfileError::malformed(format!(
                        "inconsistent function reference: {}",
                        line.function_id
                    )));
                }
            }
        }
        for sample in &self.samples {
            for location_id in &sample.location_ids {
                if !location_ids.contains(location_id) {
                    return Err(ProfileError::malformed(format!(
                        "inconsistent location reference: {location_id}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Line, Location, Mapping, Profile, Sample, ValueType};

    fn base_profile() -> Profile {
        Profile {
            sample_types: vec![
                ValueType::new("cpu", "nanoseconds"),
                ValueType::new("samples", "count"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn empty_profile_is_valid() {
        assert!(Profile::default().check_valid().is_ok());
    }

    #[test]
    fn samples_without_types() {
        let profile = Profile {
            samples: vec![Sample::default()],
            ..Default::default()
        };
        assert_eq!(
            "malformed profile: missing sample type information",
            profile.check_valid().unwrap_err().to_string()
        );
    }

    #[test]
    fn sample_value_arity() {
        let mut profile = base_profile();
        profile.samples.push(Sample {
            values: vec![1],
            ..Default::default()
        });
        assert_eq!(
            "malformed profile: mismatch: sample has: 1 values vs. 2 types",
            profile.check_valid().unwrap_err().to_string()
        );
    }

    #[test]
    fn reserved_and_duplicate_ids() {
        let mut profile = base_profile();
        profile.mappings.push(Mapping::default());
        assert_eq!(
            "malformed profile: found mapping with reserved ID=0",
            profile.check_valid().unwrap_err().to_string()
        );

        let mut profile = base_profile();
        profile.locations.push(Location {
            id: 7,
            ..Default::default()
        });
        profile.locations.push(Location {
            id: 7,
            ..Default::default()
        });
        assert_eq!(
            "malformed profile: multiple locations with same id: 7",
            profile.check_valid().unwrap_err().to_string()
        );
    }

    #[test]
    fn dangling_references() {
        let mut profile = base_profile();
        profile.locations.push(Location {
            id: 1,
            mapping_id: 3,
            ..Default::default()
        });
        assert_eq!(
            "malformed profile: inconsistent mapping reference: 3",
            profile.check_valid().unwrap_err().to_string()
        );

        let mut profile = base_profile();
        profile.locations.push(Location {
            id: 1,
            lines: vec![Line {
                function_id: 4,
                line: 1,
            }],
            ..Default::default()
        });
        assert_eq!(
            "malformed profile: inconsistent function reference: 4",
            profile.check_valid().unwrap_err().to_string()
        );

        let mut profile = base_profile();
        profile.samples.push(Sample {
            location_ids: vec![9],
            values: vec![1, 2],
            ..Default::default()
        });
        assert_eq!(
            "malformed profile: inconsistent location reference: 9",
            profile.check_valid().unwrap_err().to_string()
        );
    }
}
