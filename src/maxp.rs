//! The `maxp` table only needs a new glyph count. The maximum values of
//! version 1.0 tables are kept, they can only have gotten smaller.

use super::*;

/// The number of glyphs in the font.
pub(crate) fn num_glyphs(maxp: &[u8]) -> Result<u16> {
    u16::read_at(maxp, 4)
}

pub(crate) fn subset(ctx: &mut Context) -> Result<()> {
    let maxp = ctx.expect_table(Tag::MAXP)?;
    let mut r = Reader::new(maxp);
    let version = r.read::<u32>().ok_or(Error::MissingData)?;
    r.read::<u16>().ok_or(Error::MissingData)?;

    let mut sub_maxp = Writer::with_capacity(maxp.len());
    sub_maxp.write::<u32>(version);
    sub_maxp.write::<u16>(ctx.num_subset_glyphs());
    sub_maxp.extend(r.tail().unwrap_or_default());

    ctx.push(Tag::MAXP, sub_maxp.finish());
    Ok(())
}
