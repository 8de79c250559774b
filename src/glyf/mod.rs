//! The `glyf` table contains the main description of the glyphs. In order to
//! subset it, there are 4 things we need to do:
//! 1. We need to form the glyph closure. Glyphs can reference other glyphs, meaning that
//!    if a user for example requests the glyph 1, and this glyph references the glyph 2, then
//!    we need to include both of them in our subset.
//! 2. Glyphs that were only added because of such a reference get new glyph IDs after
//!    the ones that were requested.
//! 3. For composite glyphs, we need to rewrite their description so that they reference
//!    the new glyph ID of the glyphs they reference.
//! 4. We need to write the glyph descriptions in their new order, together with a
//!    new `loca` table.

mod closure;
mod component;
mod rewrite;

pub use component::{Component, ComponentFlag, ComponentFlags, Components, COMPONENT_FLAGS};

pub(crate) use closure::{allocate, discover, Discovery};
pub(crate) use rewrite::rewrite;

use super::*;
use crate::loca::GlyphLocations;
use component::GLYPH_HEADER_LEN;
use std::ops::Range;

/// A `glyf` table together with the locations of its glyphs.
///
/// All offsets handed out by the table are absolute offsets into the font
/// data, so they stay valid for a patched copy of the same data.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Table<'a> {
    /// The complete font data.
    data: &'a [u8],
    /// The absolute offset of the `glyf` table.
    offset: usize,
    /// The length of the `glyf` table.
    len: usize,
    locations: GlyphLocations<'a>,
}

impl<'a> Table<'a> {
    pub fn new(
        data: &'a [u8],
        offset: usize,
        len: usize,
        locations: GlyphLocations<'a>,
    ) -> Result<Self> {
        let end = offset.checked_add(len).ok_or(Error::InvalidOffset)?;
        if end > data.len() {
            return Err(Error::InvalidOffset);
        }

        Ok(Self { data, offset, len, locations })
    }

    /// Locate the `glyf` table of a face, using its `loca`, `head` and `maxp`
    /// tables.
    pub fn parse(face: &Face<'a>) -> Result<Self> {
        let Some(record) = face.record(Tag::GLYF) else {
            return Err(match face.record(Tag::CFF).or(face.record(Tag::CFF2)) {
                Some(_) => Error::Unimplemented,
                None => Error::MissingTable(Tag::GLYF),
            });
        };

        let head = face.expect_table(Tag::HEAD)?;
        let maxp = face.expect_table(Tag::MAXP)?;
        let loca = face.expect_table(Tag::LOCA)?;

        let locations =
            GlyphLocations::new(loca, head::long_loca(head)?, maxp::num_glyphs(maxp)?)?;

        Self::new(face.data, record.offset as usize, record.length as usize, locations)
    }

    /// The same table on top of another copy of the font data.
    pub fn with_data<'b>(&self, data: &'b [u8]) -> Result<Table<'b>>
    where
        'a: 'b,
    {
        Table::new(data, self.offset, self.len, self.locations)
    }

    /// The absolute byte range of a glyph description.
    pub fn glyph_range(&self, glyph: u16) -> Result<Range<usize>> {
        let range = self.locations.range(glyph)?;
        if range.end > self.len {
            return Err(Error::MissingData);
        }

        Ok(self.offset + range.start..self.offset + range.end)
    }

    /// The raw description of a glyph.
    pub fn glyph_data(&self, glyph: u16) -> Result<&'a [u8]> {
        let range = self.glyph_range(glyph)?;
        self.data.get(range).ok_or(Error::MissingData)
    }

    /// Whether the glyph is made up of other glyphs. Empty glyphs are not.
    pub fn is_composite(&self, glyph: u16) -> Result<bool> {
        let range = self.glyph_range(glyph)?;
        if range.is_empty() {
            return Ok(false);
        }

        let num_contours = i16::read_at(&self.data[..range.end], range.start)?;
        Ok(num_contours < 0)
    }

    /// The absolute offset of the first component record of a composite glyph.
    pub fn chain_start(&self, glyph: u16) -> Result<usize> {
        Ok(self.glyph_range(glyph)?.start + GLYPH_HEADER_LEN)
    }

    /// The component records of a composite glyph. Reads never go beyond the
    /// glyph's own description.
    pub fn components(&self, glyph: u16) -> Result<Components<'a>> {
        let range = self.glyph_range(glyph)?;
        let start = range.start + GLYPH_HEADER_LEN;
        Ok(Components::new(&self.data[..range.end], start))
    }
}

/// Write the glyph descriptions of the subset in their new order, together
/// with the matching `loca` table.
pub(crate) fn subset(ctx: &mut Context) -> Result<()> {
    let table = ctx.table.with_data(ctx.closure.data())?;

    let mut size = 0;
    let mut entries = Vec::with_capacity(ctx.mapper.len());
    for glyph in ctx.mapper.remapped_gids() {
        let entry = table.glyph_data(glyph)?;
        size += entry.len() + entry.len() % 2;
        entries.push(entry);
    }

    // Short offsets are stored divided by two, so they can address up to
    // twice the range of a u16.
    let long_loca = size > 2 * (u16::MAX as usize);

    let mut sub_glyf = Writer::with_capacity(size);
    let mut sub_loca = Writer::with_capacity((entries.len() + 1) * 4);

    let mut write_offset = |offset: usize| {
        if long_loca {
            sub_loca.write::<u32>(offset as u32);
        } else {
            sub_loca.write::<u16>((offset / 2) as u16);
        }
    };

    for entry in &entries {
        write_offset(sub_glyf.len());
        sub_glyf.extend(entry);

        if !long_loca {
            sub_glyf.align(2);
        }
    }

    // Write the final offset.
    write_offset(sub_glyf.len());

    log::debug!(
        "wrote {} glyphs with {} bytes of glyph data ({} loca)",
        entries.len(),
        sub_glyf.len(),
        if long_loca { "long" } else { "short" },
    );

    let (sub_glyf, sub_loca) = (sub_glyf.finish(), sub_loca.finish());
    ctx.long_loca = long_loca;
    ctx.push(Tag::LOCA, sub_loca);
    ctx.push(Tag::GLYF, sub_glyf);

    Ok(())
}
