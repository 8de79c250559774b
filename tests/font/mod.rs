//! Construction of small synthetic TrueType fonts.

use std::ops::Range;

use glyf_subset::ComponentFlags;

const ARGS_ARE_XY_VALUES: u16 = 0x0002;

/// A glyph description.
pub enum Glyph {
    /// No outline at all.
    Empty,
    /// A single closed contour through the given on-curve points.
    Simple(Vec<(i16, i16)>),
    /// A glyph made up of other glyphs.
    Composite(Vec<Part>),
}

/// A component of a composite glyph.
pub struct Part {
    pub glyph: u16,
    pub dx: i16,
    pub dy: i16,
    pub transform: Transform,
}

/// The transformation of a component, in F2Dot14 values.
pub enum Transform {
    None,
    Scale(i16),
    XyScale(i16, i16),
    TwoByTwo([i16; 4]),
}

impl Part {
    pub fn new(glyph: u16, dx: i16, dy: i16) -> Self {
        Self { glyph, dx, dy, transform: Transform::None }
    }

    pub fn with(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    fn write(&self, data: &mut Vec<u8>, more: bool) {
        let words = i8::try_from(self.dx).is_err() || i8::try_from(self.dy).is_err();

        let mut flags = ARGS_ARE_XY_VALUES;
        if words {
            flags |= ComponentFlags::ARG_1_AND_2_ARE_WORDS;
        }
        if more {
            flags |= ComponentFlags::MORE_COMPONENTS;
        }
        flags |= match self.transform {
            Transform::None => 0,
            Transform::Scale(_) => ComponentFlags::WE_HAVE_A_SCALE,
            Transform::XyScale(..) => ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE,
            Transform::TwoByTwo(_) => ComponentFlags::WE_HAVE_A_TWO_BY_TWO,
        };

        push_u16(data, flags);
        push_u16(data, self.glyph);
        if words {
            push_i16(data, self.dx);
            push_i16(data, self.dy);
        } else {
            data.push(self.dx as i8 as u8);
            data.push(self.dy as i8 as u8);
        }

        match self.transform {
            Transform::None => {}
            Transform::Scale(s) => push_i16(data, s),
            Transform::XyScale(x, y) => {
                push_i16(data, x);
                push_i16(data, y);
            }
            Transform::TwoByTwo(m) => m.iter().for_each(|&v| push_i16(data, v)),
        }
    }
}

impl Glyph {
    fn write(&self, data: &mut Vec<u8>) {
        match self {
            Glyph::Empty => {}
            Glyph::Simple(points) => {
                let xs = points.iter().map(|p| p.0);
                let ys = points.iter().map(|p| p.1);
                push_i16(data, 1);
                push_i16(data, xs.clone().min().unwrap_or(0));
                push_i16(data, ys.clone().min().unwrap_or(0));
                push_i16(data, xs.max().unwrap_or(0));
                push_i16(data, ys.max().unwrap_or(0));
                push_u16(data, points.len() as u16 - 1);
                // No instructions.
                push_u16(data, 0);
                // All points on curve, coordinates as 16-bit deltas.
                data.extend(std::iter::repeat(0x01).take(points.len()));
                let mut last = 0;
                for &(x, _) in points {
                    push_i16(data, x - last);
                    last = x;
                }
                let mut last = 0;
                for &(_, y) in points {
                    push_i16(data, y - last);
                    last = y;
                }
            }
            Glyph::Composite(parts) => {
                push_i16(data, -1);
                data.extend([0; 8]);
                for (i, part) in parts.iter().enumerate() {
                    part.write(data, i + 1 < parts.len());
                }
            }
        }
    }
}

/// A font with the given glyphs and `head`, `hhea`, `maxp`, `hmtx`, `loca`
/// and `glyf` tables.
pub struct FontBuilder {
    pub glyphs: Vec<Glyph>,
    pub long_loca: bool,
    pub magic: u32,
    /// Additional tables.
    pub tables: Vec<([u8; 4], Vec<u8>)>,
    /// Tables that should not be written.
    pub skip: Vec<[u8; 4]>,
}

/// A built font.
pub struct BuiltFont {
    pub data: Vec<u8>,
    /// The absolute byte range of every glyph description.
    pub glyphs: Vec<Range<usize>>,
}

impl BuiltFont {
    /// The glyph IDs referenced by a composite glyph, read from `data`.
    pub fn components(&self, data: &[u8], glyph: u16) -> Vec<u16> {
        let range = self.glyphs[glyph as usize].clone();
        glyf_subset::Components::new(&data[..range.end], range.start + 10)
            .map(|c| c.unwrap().glyph_id)
            .collect()
    }
}

impl FontBuilder {
    pub fn new(glyphs: Vec<Glyph>) -> Self {
        Self {
            glyphs,
            long_loca: false,
            magic: 0x00010000,
            tables: vec![],
            skip: vec![],
        }
    }

    pub fn build(&self) -> BuiltFont {
        self.build_at(0)
    }

    /// Build the font as if it started at `base` in a larger file.
    pub fn build_at(&self, base: usize) -> BuiltFont {
        let num_glyphs = self.glyphs.len() as u16;

        let mut glyf = vec![];
        let mut loca = vec![];
        let mut ranges = vec![];
        for glyph in &self.glyphs {
            let start = glyf.len();
            glyph.write(&mut glyf);
            ranges.push(start..glyf.len());
            while glyf.len() % 4 != 0 {
                glyf.push(0);
            }
        }

        let mut offsets: Vec<usize> = ranges.iter().map(|r| r.start).collect();
        offsets.push(glyf.len());
        for offset in offsets {
            if self.long_loca {
                push_u32(&mut loca, offset as u32);
            } else {
                push_u16(&mut loca, (offset / 2) as u16);
            }
        }

        let mut head = vec![];
        push_u32(&mut head, 0x00010000);
        push_u32(&mut head, 0x00010000);
        push_u32(&mut head, 0);
        push_u32(&mut head, 0x5F0F3CF5);
        push_u16(&mut head, 0);
        push_u16(&mut head, 1000);
        head.extend([0; 16]);
        head.extend([0; 8]);
        push_u16(&mut head, 0);
        push_u16(&mut head, 8);
        push_i16(&mut head, 2);
        push_i16(&mut head, self.long_loca as i16);
        push_i16(&mut head, 0);

        // The last glyph shares the advance of the one before it.
        let num_h_metrics = num_glyphs.saturating_sub(1).max(1);
        let mut hhea = vec![];
        push_u32(&mut hhea, 0x00010000);
        push_i16(&mut hhea, 800);
        push_i16(&mut hhea, -200);
        push_i16(&mut hhea, 0);
        hhea.extend([0; 24]);
        push_u16(&mut hhea, num_h_metrics);

        let mut hmtx = vec![];
        for i in 0..num_glyphs {
            if i < num_h_metrics {
                push_u16(&mut hmtx, 100 * (i + 1));
            }
            push_i16(&mut hmtx, i as i16);
        }

        let mut maxp = vec![];
        push_u32(&mut maxp, 0x00005000);
        push_u16(&mut maxp, num_glyphs);

        let mut tables = vec![
            (*b"head", head),
            (*b"hhea", hhea),
            (*b"maxp", maxp),
            (*b"hmtx", hmtx),
            (*b"loca", loca),
            (*b"glyf", glyf),
        ];
        tables.extend(self.tables.iter().cloned());
        tables.retain(|(tag, _)| !self.skip.contains(tag));
        tables.sort_by_key(|(tag, _)| *tag);

        let mut data = vec![];
        push_u32(&mut data, self.magic);
        push_u16(&mut data, tables.len() as u16);
        data.extend([0; 6]);

        let mut offset = base + 12 + 16 * tables.len();
        let mut glyf_offset = 0;
        for (tag, table) in &tables {
            if tag == b"glyf" {
                glyf_offset = offset;
            }
            data.extend(tag);
            push_u32(&mut data, 0);
            push_u32(&mut data, offset as u32);
            push_u32(&mut data, table.len() as u32);
            offset += (table.len() + 3) / 4 * 4;
        }

        for (_, table) in &tables {
            data.extend(table);
            while data.len() % 4 != 0 {
                data.push(0);
            }
        }

        let glyphs = ranges
            .into_iter()
            .map(|r| glyf_offset + r.start..glyf_offset + r.end)
            .collect();

        BuiltFont { data, glyphs }
    }
}

/// Build a font collection.
pub fn collection(fonts: &[FontBuilder]) -> (Vec<u8>, Vec<BuiltFont>) {
    let mut base = 12 + 4 * fonts.len();
    let mut built = vec![];
    for font in fonts {
        let font = font.build_at(base);
        base += font.data.len();
        built.push(font);
    }

    let mut data = vec![];
    data.extend(b"ttcf");
    push_u32(&mut data, 0x00010000);
    push_u32(&mut data, fonts.len() as u32);

    let mut offset = 12 + 4 * fonts.len();
    for font in &built {
        push_u32(&mut data, offset as u32);
        offset += font.data.len();
    }

    for font in &built {
        data.extend(&font.data);
    }

    (data, built)
}

fn push_u16(data: &mut Vec<u8>, value: u16) {
    data.extend(value.to_be_bytes());
}

fn push_i16(data: &mut Vec<u8>, value: i16) {
    data.extend(value.to_be_bytes());
}

fn push_u32(data: &mut Vec<u8>, value: u32) {
    data.extend(value.to_be_bytes());
}
