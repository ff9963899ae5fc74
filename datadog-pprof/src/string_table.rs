// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::FxIndexSet;
use datadog_pprof_protobuf::StringOffset;

/// Holds unique strings and provides [StringOffset]s that correspond to the
/// order that the strings were inserted. Offset 0 is always the empty
/// string; the wire format relies on that to make 0 mean "no string".
pub(crate) struct StringTable {
    strings: FxIndexSet<Box<str>>,
}

impl StringTable {
    /// Creates a new string table, which initially holds the empty string
    /// and no others.
    pub fn new() -> Self {
        let mut strings = FxIndexSet::default();
        strings.insert(Box::from(""));
        Self { strings }
    }

    /// Adds the string to the string table if it isn't present already, and
    /// returns a [StringOffset] that corresponds to the order that this
    /// string was originally inserted.
    ///
    /// # Panics
    /// Panics if the table would need more than u32::MAX entries. A profile
    /// with that many distinct strings exceeds the 2 GiB protobuf message
    /// limit long before the offsets run out.
    pub fn intern(&mut self, str: &str) -> StringOffset {
        let index = match self.strings.get_index_of(str) {
            Some(index) => index,
            None => {
                let (index, _inserted) = self.strings.insert_full(Box::from(str));
                index
            }
        };
        StringOffset::try_from(index).expect("string table to fit in 32-bit offsets")
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Consumes the table, yielding the strings in insertion order. This is
    /// the order they appear on the wire.
    pub fn into_strings(self) -> impl Iterator<Item = String> {
        self.strings.into_iter().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_offset_zero() {
        let mut table = StringTable::new();
        assert_eq!(1, table.len());
        assert_eq!(StringOffset::ZERO, table.intern(""));
        assert_eq!(1, table.len());
    }

    #[test]
    fn interning_dedups_and_preserves_order() {
        let mut table = StringTable::new();
        let samples = table.intern("samples");
        let count = table.intern("count");
        assert_eq!(StringOffset::new(1), samples);
        assert_eq!(StringOffset::new(2), count);

        // Re-interning returns the original offset without growing.
        assert_eq!(samples, table.intern("samples"));
        assert_eq!(3, table.len());

        let strings: Vec<String> = table.into_strings().collect();
        assert_eq!(vec!["", "samples", "count"], strings);
    }

}
