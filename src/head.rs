//! The `head` table mostly contains information that can be reused from the
//! old table, except for the `loca` format, which depends on the size of the
//! glyph data. The checksum will be recalculated in the very end.

use super::*;

/// The offset of the `indexToLocFormat` field.
const INDEX_TO_LOC_FORMAT: usize = 50;

/// Whether the `loca` table uses 32-bit offsets.
pub(crate) fn long_loca(head: &[u8]) -> Result<bool> {
    match i16::read_at(head, INDEX_TO_LOC_FORMAT)? {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(Error::InvalidData),
    }
}

pub(crate) fn subset(ctx: &mut Context) -> Result<()> {
    let mut head = ctx.expect_table(Tag::HEAD)?.to_vec();
    let format = i16::from(ctx.long_loca).to_be_bytes();
    head.get_mut(INDEX_TO_LOC_FORMAT..INDEX_TO_LOC_FORMAT + 2)
        .ok_or(Error::MissingData)?
        .copy_from_slice(&format);
    ctx.push(Tag::HEAD, head);
    Ok(())
}
