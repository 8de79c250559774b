use std::collections::{BTreeMap, BTreeSet};

/// The subset map: assigns new glyph IDs to the glyphs of a subset so that
/// they form a contiguous sequence starting at 0.
///
/// For example, let's say that we want to subset a font that only contains the
/// glyphs 0, 4, 9 and 16. In this case, the remapper could yield a remapping
/// that assigns the following glyph IDs:
/// 0 -> 0
/// 4 -> 1
/// 9 -> 2
/// 16 -> 3
///
/// New IDs are handed out in insertion order and a glyph keeps the ID it got
/// first, so the mapping is never rewritten, only extended. Glyphs that are
/// only needed because a requested composite glyph references them are
/// appended by [`close`](crate::close) after all requested glyphs.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct GlyphRemapper {
    /// A map from old glyph IDs to new glyph IDs.
    forward: BTreeMap<u16, u16>,
    /// The old glyph IDs, indexed by their new glyph ID.
    backward: Vec<u16>,
}

impl GlyphRemapper {
    /// Create a new, empty remapper.
    ///
    /// Note that nothing is requested implicitly, not even `.notdef`. Remap
    /// glyph 0 first if the subset should be a usable font on its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a remapper from an existing set of glyphs. The method
    /// will ensure that the mapping is monotonically increasing.
    pub fn new_from_glyphs(glyphs: &[u16]) -> Self {
        let mut map = Self::new();

        for glyph in BTreeSet::from_iter(glyphs) {
            map.remap(*glyph);
        }

        map
    }

    /// Remap a glyph ID, or return the existing mapping if the
    /// glyph ID has already been remapped before.
    pub fn remap(&mut self, old: u16) -> u16 {
        let next = self.backward.len();
        *self.forward.entry(old).or_insert_with(|| {
            self.backward.push(old);
            u16::try_from(next).expect("glyph remapper was overflowed")
        })
    }

    /// Get the mapping of a glyph ID, if it has been remapped before.
    pub fn get(&self, old: u16) -> Option<u16> {
        self.forward.get(&old).copied()
    }

    /// Whether the glyph ID has been remapped.
    pub fn contains(&self, old: u16) -> bool {
        self.forward.contains_key(&old)
    }

    /// The number of glyphs in the subset.
    pub fn len(&self) -> usize {
        self.backward.len()
    }

    /// Whether no glyph has been remapped yet.
    pub fn is_empty(&self) -> bool {
        self.backward.is_empty()
    }

    /// Return an iterator that yields the old glyphs, in ascending order that
    /// is defined by the remapping. For example, if we perform the following remappings:
    /// 3, 39, 8, 3, 10, 2
    /// Then the iterator will yield the following items in the order below. The order
    /// also implicitly defines the glyph IDs in the new mapping:
    /// 3 (0), 39 (1), 8 (2), 10 (3), 2 (4)
    pub fn remapped_gids(&self) -> impl Iterator<Item = u16> + '_ {
        self.backward.iter().copied()
    }

    /// Iterate over `(old, new)` pairs in ascending order of the old glyph ID.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.forward.iter().map(|(&old, &new)| (old, new))
    }
}

#[cfg(test)]
mod tests {
    use super::GlyphRemapper;

    #[test]
    fn remap_in_insertion_order() {
        let mut remapper = GlyphRemapper::new();
        assert!(remapper.is_empty());
        assert_eq!(remapper.remap(3), 0);
        assert_eq!(remapper.remap(39), 1);
        assert_eq!(remapper.remap(8), 2);
        assert_eq!(remapper.remap(3), 0);
        assert_eq!(remapper.remap(10), 3);
        assert_eq!(remapper.remap(2), 4);

        assert_eq!(remapper.len(), 5);
        assert_eq!(remapper.get(8), Some(2));
        assert_eq!(remapper.get(9), None);
        assert!(remapper.contains(39));
        assert_eq!(remapper.remapped_gids().collect::<Vec<_>>(), vec![3, 39, 8, 10, 2]);
        assert_eq!(
            remapper.iter().collect::<Vec<_>>(),
            vec![(2, 4), (3, 0), (8, 2), (10, 3), (39, 1)]
        );
    }

    #[test]
    fn from_glyphs_is_monotonic() {
        let remapper = GlyphRemapper::new_from_glyphs(&[16, 4, 0, 9, 4]);
        assert_eq!(remapper.iter().collect::<Vec<_>>(), vec![(0, 0), (4, 1), (9, 2), (16, 3)]);
    }
}
