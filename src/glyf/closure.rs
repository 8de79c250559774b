//! Forming the glyph closure of a subset.
//!
//! The references between composite glyphs and their components form a
//! graph. We walk it depth-first with an explicit stack, starting at every
//! glyph that is already part of the subset, and expand each composite glyph
//! at most once. Reaching a glyph that is still being expanded further up the
//! path means the font is cyclic, which is reported instead of followed.

use super::*;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// The glyphs found while walking the composite references of a subset.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub(crate) struct Discovery {
    /// Glyphs that are made up of other glyphs.
    pub composites: BTreeSet<u16>,
    /// Glyphs that are referenced by a composite glyph but were not part of
    /// the subset.
    pub added: BTreeSet<u16>,
}

enum Visit {
    /// Look at a glyph and, if it's a composite, queue its components.
    Enter(u16),
    /// All components of a composite glyph have been visited.
    Leave(u16),
}

/// Find all composite glyphs reachable from the subset and all glyphs they
/// need that aren't part of it yet.
pub(crate) fn discover(table: &Table, mapper: &GlyphRemapper) -> Result<Discovery> {
    let mut discovery = Discovery::default();
    // Composite glyphs whose components have been queued already.
    let mut expanded = FxHashSet::default();
    // Composite glyphs on the path from the current root.
    let mut path = FxHashSet::default();
    let mut stack = vec![];

    for (requested, _) in mapper.iter() {
        stack.push(Visit::Enter(requested));

        while let Some(visit) = stack.pop() {
            let glyph = match visit {
                Visit::Enter(glyph) => glyph,
                Visit::Leave(glyph) => {
                    path.remove(&glyph);
                    continue;
                }
            };

            if !mapper.contains(glyph) {
                discovery.added.insert(glyph);
            }

            if path.contains(&glyph) {
                return Err(Error::ComponentCycle(glyph));
            }

            if !expanded.insert(glyph) || !table.is_composite(glyph)? {
                continue;
            }

            let components = table
                .components(glyph)?
                .map(|component| component.map(|c| c.glyph_id))
                .collect::<Result<Vec<_>>>()?;

            log::trace!("glyph {glyph} is composed of {components:?}");

            discovery.composites.insert(glyph);
            path.insert(glyph);
            stack.push(Visit::Leave(glyph));
            // Reversed, so that components are entered in chain order.
            stack.extend(components.into_iter().rev().map(Visit::Enter));
        }
    }

    log::debug!(
        "{} requested glyphs reference {} composite glyphs and {} further glyphs",
        mapper.len(),
        discovery.composites.len(),
        discovery.added.len(),
    );

    Ok(discovery)
}

/// Give new glyph IDs to the glyphs that were added to the subset, in
/// ascending order of their old glyph ID.
pub(crate) fn allocate(added: &BTreeSet<u16>, mapper: &mut GlyphRemapper) {
    for &glyph in added {
        let new = mapper.remap(glyph);
        log::trace!("glyph {glyph} was added as {new}");
    }
}
