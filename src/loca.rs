//! The `loca` table stores, for each glyph, the offset of its description
//! relative to the start of the `glyf` table. The description of glyph `n`
//! spans from entry `n` up to entry `n + 1`, so a glyph whose two entries are
//! equal has no outline at all.

use super::*;
use std::ops::Range;

/// The location of every glyph description inside the `glyf` table.
#[derive(Debug, Clone, Copy)]
pub struct GlyphLocations<'a> {
    loca: &'a [u8],
    long: bool,
    num_glyphs: u16,
}

impl<'a> GlyphLocations<'a> {
    /// Wrap a `loca` table. `long` selects the format with 32-bit entries.
    pub fn new(loca: &'a [u8], long: bool, num_glyphs: u16) -> Result<Self> {
        let entry = if long { 4 } else { 2 };
        if loca.len() < (usize::from(num_glyphs) + 1) * entry {
            return Err(Error::MissingData);
        }

        Ok(Self { loca, long, num_glyphs })
    }

    /// The byte range of a glyph description, relative to the `glyf` table.
    pub fn range(&self, glyph: u16) -> Result<Range<usize>> {
        if glyph >= self.num_glyphs {
            return Err(Error::InvalidGlyph(glyph));
        }

        let start = self.entry(usize::from(glyph))?;
        let end = self.entry(usize::from(glyph) + 1)?;
        if end < start {
            return Err(Error::InvalidData);
        }

        Ok(start..end)
    }

    fn entry(&self, index: usize) -> Result<usize> {
        if self.long {
            u32::read_at(self.loca, index * 4).map(|offset| offset as usize)
        } else {
            // Short offsets are stored divided by two.
            u16::read_at(self.loca, index * 2).map(|offset| usize::from(offset) * 2)
        }
    }
}
