//! The horizontal metrics have to follow the new glyph order. The subsetted
//! `hmtx` table stores a full metric for every glyph, which is why `hhea`
//! needs a new `numberOfHMetrics` as well.

use super::*;

/// The offset of the `numberOfHMetrics` field in `hhea`.
const NUM_H_METRICS: usize = 34;

pub(crate) fn subset_hhea(ctx: &mut Context) -> Result<()> {
    let mut hhea = ctx.expect_table(Tag::HHEA)?.to_vec();
    let count = ctx.num_subset_glyphs().to_be_bytes();
    hhea.get_mut(NUM_H_METRICS..NUM_H_METRICS + 2)
        .ok_or(Error::MissingData)?
        .copy_from_slice(&count);
    ctx.push(Tag::HHEA, hhea);
    Ok(())
}

pub(crate) fn subset(ctx: &mut Context) -> Result<()> {
    let num_h_metrics = u16::read_at(ctx.expect_table(Tag::HHEA)?, NUM_H_METRICS)?;
    let metrics = Metrics { hmtx: ctx.expect_table(Tag::HMTX)?, num_h_metrics };

    let mut sub_hmtx = Writer::with_capacity(ctx.mapper.len() * 4);
    for glyph in ctx.mapper.remapped_gids() {
        let (advance, lsb) = metrics.get(glyph)?;
        sub_hmtx.write::<u16>(advance);
        sub_hmtx.write::<i16>(lsb);
    }

    ctx.push(Tag::HMTX, sub_hmtx.finish());
    Ok(())
}

/// An `hmtx` table: `num_h_metrics` pairs of advance width and left side
/// bearing, followed by just left side bearings that share the last advance.
struct Metrics<'a> {
    hmtx: &'a [u8],
    num_h_metrics: u16,
}

impl Metrics<'_> {
    fn get(&self, glyph: u16) -> Result<(u16, i16)> {
        if self.num_h_metrics == 0 {
            return Err(Error::InvalidData);
        }

        let long = usize::from(self.num_h_metrics);
        let index = usize::from(glyph);
        if index < long {
            let advance = u16::read_at(self.hmtx, index * 4)?;
            let lsb = i16::read_at(self.hmtx, index * 4 + 2)?;
            Ok((advance, lsb))
        } else {
            let advance = u16::read_at(self.hmtx, (long - 1) * 4)?;
            let lsb = i16::read_at(self.hmtx, long * 4 + (index - long) * 2)?;
            Ok((advance, lsb))
        }
    }
}
