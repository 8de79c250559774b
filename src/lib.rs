/*!
Computes the composite glyph closure of a TrueType font subset and rewrites
component references so that the subset stays internally consistent.

A composite glyph in the `glyf` table doesn't have its own outline, it is
assembled from other glyphs that it references by glyph ID. When only some
glyphs of a font are embedded (for example in a PDF file), every glyph such a
composite glyph needs must be embedded as well, and since the subset uses new,
contiguous glyph IDs, the references have to be rewritten to match.

# Example
In the example below, we keep the glyphs 0, 68, 69 and 70. If any of them is a
composite glyph, the glyphs it is made of are kept as well and get new glyph
IDs after the requested ones.

```no_run
use glyf_subset::{subset, GlyphRemapper};

# fn main() -> Result<(), Box<dyn std::error::Error>> {
// Read the raw font data.
let data = std::fs::read("fonts/NotoSans-Regular.ttf")?;

// Request four glyphs. `.notdef` is requested first so that it
// stays glyph 0 in the subset.
let mut remapper = GlyphRemapper::new_from_glyphs(&[0, 68, 69, 70]);
let sub = subset(&data, 0, &mut remapper)?;

// The remapper now knows the new ID of every glyph in the subset.
for (old, new) in remapper.iter() {
    println!("{old} -> {new}");
}

// Write the resulting file.
std::fs::write("target/Noto-Small.ttf", sub)?;
# Ok(())
# }
```

If you only need the closure and the rewritten glyph descriptions, use
[`close`]. It leaves the layout of the font untouched and returns a patched
copy of the font data.
*/

#![deny(unsafe_code)]
#![deny(missing_docs)]

mod glyf;
mod head;
mod hmtx;
mod loca;
mod maxp;
mod remapper;
mod stream;

pub use crate::glyf::{Component, ComponentFlag, ComponentFlags, Components, COMPONENT_FLAGS};
pub use crate::remapper::GlyphRemapper;

use crate::stream::{Readable, Reader, Writeable, Writer};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::{self, Debug, Display, Formatter};

/// Form the composite glyph closure of a subset and rewrite the component
/// references of all composite glyphs in it.
///
/// - The `data` must be in the OpenType font format with TrueType outlines.
/// - The `index` is only relevant if the data contains a font collection
///   (`.ttc` file). Otherwise, it should be 0.
/// - The `remapper` holds the requested glyphs. Every glyph that is needed by
///   a composite glyph of the subset is added to it, in ascending order of
///   its glyph ID and after all glyphs that were already part of it.
///
/// If an error is returned, the remapper may have been extended partially and
/// should not be used any further.
pub fn close(data: &[u8], index: u32, remapper: &mut GlyphRemapper) -> Result<Closure> {
    let face = parse(data, index)?;
    let table = glyf::Table::parse(&face)?;
    close_table(&table, remapper)
}

/// Subset a font face to the glyphs of the remapper and all glyphs they need.
///
/// This runs [`close`] and then constructs a new TrueType font in which glyph
/// `n` is the `n`-th glyph of [`GlyphRemapper::remapped_gids`]. The new font
/// contains the `glyf`, `loca`, `head`, `maxp`, `hhea` and `hmtx` tables as
/// well as the `cvt `, `fpgm`, `prep` and `gasp` tables of the original font.
pub fn subset(data: &[u8], index: u32, remapper: &mut GlyphRemapper) -> Result<Vec<u8>> {
    let face = parse(data, index)?;
    let table = glyf::Table::parse(&face)?;
    let closure = close_table(&table, remapper)?;

    let mut ctx = Context {
        face,
        table,
        mapper: &*remapper,
        closure,
        tables: vec![],
        long_loca: true,
    };

    // LOCA will be handled by GLYF, and HEAD needs to know its format.
    ctx.process(Tag::GLYF)?;
    ctx.process(Tag::HEAD)?;
    ctx.process(Tag::HHEA)?;
    ctx.process(Tag::HMTX)?;
    ctx.process(Tag::MAXP)?;

    // Hinting data refers to glyphs only through their instructions.
    ctx.process(Tag::CVT)?;
    ctx.process(Tag::FPGM)?;
    ctx.process(Tag::PREP)?;
    ctx.process(Tag::GASP)?;

    Ok(construct(ctx))
}

fn close_table(table: &glyf::Table, remapper: &mut GlyphRemapper) -> Result<Closure> {
    let glyf::Discovery { composites, added } = glyf::discover(table, remapper)?;
    glyf::allocate(&added, remapper);
    let data = glyf::rewrite(table, &composites, remapper)?;
    Ok(Closure { composites, added, data })
}

/// The result of forming the closure of a subset.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Closure {
    composites: BTreeSet<u16>,
    added: BTreeSet<u16>,
    data: Vec<u8>,
}

impl Closure {
    /// The composite glyphs of the subset, in the original numbering.
    pub fn composites(&self) -> &BTreeSet<u16> {
        &self.composites
    }

    /// The glyphs that were added to the subset because a composite glyph
    /// references them, in the original numbering.
    pub fn added(&self) -> &BTreeSet<u16> {
        &self.added
    }

    /// A copy of the font data in which all composite glyphs of the subset
    /// reference their components by their new glyph ID.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Return the patched font data.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Parse a font face from OpenType data.
fn parse(data: &[u8], index: u32) -> Result<Face<'_>> {
    let mut r = Reader::new(data);
    let mut kind = r.read::<FontKind>().ok_or(Error::UnknownKind)?;

    // Parse font collection header if necessary.
    if kind == FontKind::Collection {
        let count = u32::read_at(data, 8)?;
        if index >= count {
            return Err(Error::InvalidOffset);
        }

        let offset = u32::read_at(data, 12 + 4 * (index as usize))? as usize;
        data.get(offset..).ok_or(Error::InvalidOffset)?;
        r = Reader::new_at(data, offset);
        kind = r.read::<FontKind>().ok_or(Error::UnknownKind)?;
        if kind == FontKind::Collection {
            return Err(Error::UnknownKind);
        }
    }

    // Read number of table records.
    let count = r.read::<u16>().ok_or(Error::MissingData)?;
    r.skip_bytes(6).ok_or(Error::MissingData)?;

    // Read table records.
    let mut records = vec![];
    for _ in 0..count {
        records.push(r.read::<TableRecord>().ok_or(Error::MissingData)?);
    }

    // Records should be sorted already, but lookups rely on it.
    records.sort_by_key(|record| record.tag);

    Ok(Face { data, records })
}

/// Construct a brand new font.
fn construct(mut ctx: Context) -> Vec<u8> {
    let mut w = Writer::new();
    w.write::<FontKind>(FontKind::TrueType);

    // Tables shall be sorted by tag.
    ctx.tables.sort_by_key(|&(tag, _)| tag);

    // Write table directory.
    let count = ctx.tables.len() as u16;
    let entry_selector = (count as f32).log2().floor() as u16;
    let search_range = 2u16.pow(u32::from(entry_selector)) * 16;
    let range_shift = count * 16 - search_range;
    w.write(count);
    w.write(search_range);
    w.write(entry_selector);
    w.write(range_shift);

    // This variable will hold the offset to the checksum adjustment field
    // in the head table, which we'll have to write in the end (after
    // checksumming the whole font).
    let mut checksum_adjustment_offset = None;

    // Write table records.
    let mut offset = 12 + ctx.tables.len() * 16;
    for (tag, data) in &mut ctx.tables {
        if *tag == Tag::HEAD {
            // Zero out checksum field in head table.
            data.to_mut()[8..12].fill(0);
            checksum_adjustment_offset = Some(offset + 8);
        }

        let len = data.len();
        w.write(TableRecord {
            tag: *tag,
            checksum: checksum(data),
            offset: offset as u32,
            length: len as u32,
        });

        log::trace!("{tag}: {len} bytes");

        // Increase offset, plus padding zeros to align to 4 bytes.
        offset += len;
        while offset % 4 != 0 {
            offset += 1;
        }
    }

    // Write tables.
    for (_, data) in &ctx.tables {
        // Write data plus padding zeros to align to 4 bytes.
        w.extend(data);
        w.align(4);
    }

    // Write checksum adjustment field in head table.
    let mut data = w.finish();
    if let Some(i) = checksum_adjustment_offset {
        let sum = checksum(&data);
        let val = 0xB1B0AFBA_u32.wrapping_sub(sum);
        data[i..i + 4].copy_from_slice(&val.to_be_bytes());
    }

    log::debug!("constructed a font with {} tables and {} bytes", count, data.len());

    data
}

/// Calculate a checksum over the sliced data as a sum of u32s. If the data
/// length is not a multiple of four, it is treated as if padded with zero to a
/// length that is a multiple of four.
fn checksum(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    for chunk in data.chunks(4) {
        let mut bytes = [0; 4];
        bytes[..chunk.len()].copy_from_slice(chunk);
        sum = sum.wrapping_add(u32::from_be_bytes(bytes));
    }
    sum
}

/// Subsetting context.
struct Context<'a> {
    /// Original face.
    face: Face<'a>,
    /// The `glyf` table of the original face.
    table: glyf::Table<'a>,
    /// The glyphs of the subset, including the ones added by the closure.
    mapper: &'a GlyphRemapper,
    /// The closure, with the rewritten composite glyphs.
    closure: Closure,
    /// Subsetted tables.
    tables: Vec<(Tag, Cow<'a, [u8]>)>,
    /// Whether the long loca format was chosen.
    long_loca: bool,
}

impl<'a> Context<'a> {
    /// Expect a table.
    fn expect_table(&self, tag: Tag) -> Result<&'a [u8]> {
        self.face.expect_table(tag)
    }

    /// Process a table.
    fn process(&mut self, tag: Tag) -> Result<()> {
        let data = match self.face.table(tag) {
            Some(data) => data,
            None => return Ok(()),
        };

        match tag {
            Tag::GLYF => glyf::subset(self)?,
            Tag::LOCA => panic!("handled by glyf"),
            Tag::HEAD => head::subset(self)?,
            Tag::HHEA => hmtx::subset_hhea(self)?,
            Tag::HMTX => hmtx::subset(self)?,
            Tag::MAXP => maxp::subset(self)?,
            _ => self.push(tag, data),
        }

        Ok(())
    }

    /// The number of glyphs in the subset.
    fn num_subset_glyphs(&self) -> u16 {
        // The remapper can't hand out more than 2^16 IDs and a font has at
        // most 2^16 - 1 glyphs.
        self.mapper.len() as u16
    }

    /// Push a subsetted table.
    fn push(&mut self, tag: Tag, table: impl Into<Cow<'a, [u8]>>) {
        debug_assert!(
            !self.tables.iter().any(|&(prev, _)| prev == tag),
            "duplicate {tag} table"
        );
        self.tables.push((tag, table.into()));
    }
}

/// A font face with OpenType tables.
struct Face<'a> {
    data: &'a [u8],
    records: Vec<TableRecord>,
}

impl<'a> Face<'a> {
    fn record(&self, tag: Tag) -> Option<&TableRecord> {
        let i = self.records.binary_search_by(|record| record.tag.cmp(&tag)).ok()?;
        self.records.get(i)
    }

    fn table(&self, tag: Tag) -> Option<&'a [u8]> {
        let record = self.record(tag)?;
        let start = record.offset as usize;
        let end = start.checked_add(record.length as usize)?;
        self.data.get(start..end)
    }

    fn expect_table(&self, tag: Tag) -> Result<&'a [u8]> {
        match self.record(tag) {
            Some(_) => self.table(tag).ok_or(Error::InvalidOffset),
            None => Err(Error::MissingTable(tag)),
        }
    }
}

/// What kind of contents the font has.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum FontKind {
    /// TrueType outlines.
    TrueType,
    /// CFF outlines
    Cff,
    /// A font collection.
    Collection,
}

impl Readable<'_> for FontKind {
    fn read(r: &mut Reader) -> Option<Self> {
        match r.read::<u32>()? {
            0x00010000 | 0x74727565 => Some(FontKind::TrueType),
            0x4F54544F => Some(FontKind::Cff),
            0x74746366 => Some(FontKind::Collection),
            _ => None,
        }
    }
}

impl Writeable for FontKind {
    fn write(&self, w: &mut Writer) {
        w.write::<u32>(match self {
            FontKind::TrueType => 0x00010000,
            FontKind::Cff => 0x4F54544F,
            FontKind::Collection => 0x74746366,
        })
    }
}

/// A 4-byte OpenType tag.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    // General tables.
    const HEAD: Self = Self(*b"head");
    const HHEA: Self = Self(*b"hhea");
    const HMTX: Self = Self(*b"hmtx");
    const MAXP: Self = Self(*b"maxp");

    // TrueType.
    const GLYF: Self = Self(*b"glyf");
    const LOCA: Self = Self(*b"loca");
    const PREP: Self = Self(*b"prep");
    const FPGM: Self = Self(*b"fpgm");
    const CVT: Self = Self(*b"cvt ");
    const GASP: Self = Self(*b"gasp");

    // CFF.
    const CFF: Self = Self(*b"CFF ");
    const CFF2: Self = Self(*b"CFF2");
}

impl Readable<'_> for Tag {
    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<[u8; 4]>().map(Self)
    }
}

impl Writeable for Tag {
    fn write(&self, w: &mut Writer) {
        w.write::<[u8; 4]>(self.0)
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(std::str::from_utf8(&self.0).unwrap_or("..."))
    }
}

/// Locates a table in the font file.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct TableRecord {
    tag: Tag,
    checksum: u32,
    offset: u32,
    length: u32,
}

impl Readable<'_> for TableRecord {
    fn read(r: &mut Reader) -> Option<Self> {
        Some(TableRecord {
            tag: r.read::<Tag>()?,
            checksum: r.read::<u32>()?,
            offset: r.read::<u32>()?,
            length: r.read::<u32>()?,
        })
    }
}

impl Writeable for TableRecord {
    fn write(&self, w: &mut Writer) {
        w.write::<Tag>(self.tag);
        w.write::<u32>(self.checksum);
        w.write::<u32>(self.offset);
        w.write::<u32>(self.length);
    }
}

/// The result type for everything.
pub type Result<T> = std::result::Result<T, Error>;

/// Parsing failed because the font face is malformed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// The file contains an unknown kind of font.
    UnknownKind,
    /// An offset pointed outside of the data.
    InvalidOffset,
    /// Parsing expected more data.
    MissingData,
    /// Parsed data was invalid.
    InvalidData,
    /// A table is missing.
    ///
    /// Only the tables that are needed to find the glyph descriptions
    /// (`glyf`, `loca`, `head` and `maxp`) are required. All other tables are
    /// left out of the subset if they are missing.
    MissingTable(Tag),
    /// A glyph ID, either requested or referenced by a composite glyph, is
    /// not smaller than the number of glyphs in the font.
    InvalidGlyph(u16),
    /// A composite glyph references itself, directly or through other
    /// composite glyphs. Holds the glyph at which the cycle was noticed.
    ComponentCycle(u16),
    /// The font has CFF outlines, which can't be subsetted by this crate.
    Unimplemented,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::UnknownKind => f.pad("unknown font kind"),
            Self::InvalidOffset => f.pad("invalid offset"),
            Self::MissingData => f.pad("missing more data"),
            Self::InvalidData => f.pad("invalid data"),
            Self::MissingTable(tag) => write!(f, "missing {tag} table"),
            Self::InvalidGlyph(glyph) => write!(f, "glyph {glyph} is not in the font"),
            Self::ComponentCycle(glyph) => {
                write!(f, "composite glyph {glyph} references itself")
            }
            Self::Unimplemented => f.pad("unimplemented feature in font"),
        }
    }
}

impl std::error::Error for Error {}
