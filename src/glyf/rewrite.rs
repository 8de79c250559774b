//! Rewriting the component references of composite glyphs so that they
//! point to the new glyph IDs.

use super::*;
use crate::stream::Patcher;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// Patches component glyph IDs into a copy of the font data.
pub(crate) struct Rewriter<'a, 'b> {
    table: &'b Table<'a>,
    mapper: &'b GlyphRemapper,
    /// The start offsets of component chains that were already rewritten.
    remapped: FxHashSet<usize>,
    patcher: Patcher,
}

impl<'a, 'b> Rewriter<'a, 'b> {
    pub fn new(table: &'b Table<'a>, mapper: &'b GlyphRemapper) -> Self {
        Self {
            table,
            mapper,
            remapped: FxHashSet::default(),
            patcher: Patcher::new(table.data),
        }
    }

    /// Rewrite the component chain of a composite glyph. Returns `false`
    /// without touching anything if the chain was rewritten before.
    ///
    /// Panics if a component isn't part of the subset, i.e. if the closure
    /// wasn't formed and allocated first.
    pub fn rewrite(&mut self, glyph: u16) -> Result<bool> {
        if !self.remapped.insert(self.table.chain_start(glyph)?) {
            return Ok(false);
        }

        for component in self.table.components(glyph)? {
            let component = component?;
            let new = self
                .mapper
                .get(component.glyph_id)
                .expect("component glyph is not part of the subset");

            self.patcher.write_at(component.glyph_id_offset(), new)?;
            log::trace!("glyph {glyph}: component {} -> {new}", component.glyph_id);
        }

        Ok(true)
    }

    /// Return the patched copy of the font data.
    pub fn finish(self) -> Patcher {
        self.patcher
    }
}

/// Rewrite all composite glyphs of the subset. The original data stays
/// untouched, the patched copy is returned.
pub(crate) fn rewrite(
    table: &Table,
    composites: &BTreeSet<u16>,
    mapper: &GlyphRemapper,
) -> Result<Vec<u8>> {
    let mut rewriter = Rewriter::new(table, mapper);
    for &glyph in composites {
        rewriter.rewrite(glyph)?;
    }

    let patcher = rewriter.finish();
    log::debug!(
        "rewrote {} composite glyphs, patching {} bytes",
        composites.len(),
        patcher.patched()
    );

    Ok(patcher.finish())
}
