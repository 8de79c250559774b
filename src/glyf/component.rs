//! Decoding of composite glyph component records.
//!
//! A composite glyph description starts with the usual 10 byte glyph header
//! followed by a chain of component records. Each record consists of a
//! 16-bit flag word, the 16-bit ID of the referenced glyph and then between
//! 2 and 12 bytes of arguments, whose size is determined by the flags.

use super::*;

/// The size of the glyph header: the contour count and the bounding box.
pub const GLYPH_HEADER_LEN: usize = 10;

/// The size of the flag word plus the glyph ID of a component record.
pub const COMPONENT_HEADER_LEN: usize = 4;

/// The meaning of a single bit in a component flag word.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ComponentFlag {
    /// The name used by the OpenType specification.
    pub name: &'static str,
    /// The bit position, counted from the least significant bit.
    pub bit: u8,
    /// The number of argument bytes the flag contributes when it is set.
    pub size_if_set: u8,
    /// The number of argument bytes the flag contributes when it is unset.
    pub size_if_unset: u8,
}

impl ComponentFlag {
    const fn new(name: &'static str, bit: u8, size_if_set: u8, size_if_unset: u8) -> Self {
        Self { name, bit, size_if_set, size_if_unset }
    }

    /// The mask of this flag within a flag word.
    pub const fn mask(&self) -> u16 {
        1 << self.bit
    }
}

/// All known component flags together with their influence on the record size.
pub const COMPONENT_FLAGS: [ComponentFlag; 13] = [
    ComponentFlag::new("ARG_1_AND_2_ARE_WORDS", 0, 4, 2),
    ComponentFlag::new("ARGS_ARE_XY_VALUES", 1, 0, 0),
    ComponentFlag::new("ROUND_XY_TO_GRID", 2, 0, 0),
    ComponentFlag::new("WE_HAVE_A_SCALE", 3, 2, 0),
    ComponentFlag::new("RESERVED", 4, 0, 0),
    ComponentFlag::new("MORE_COMPONENTS", 5, 0, 0),
    ComponentFlag::new("WE_HAVE_AN_X_AND_Y_SCALE", 6, 4, 0),
    ComponentFlag::new("WE_HAVE_A_TWO_BY_TWO", 7, 8, 0),
    ComponentFlag::new("WE_HAVE_INSTRUCTIONS", 8, 0, 0),
    ComponentFlag::new("USE_MY_METRICS", 9, 0, 0),
    ComponentFlag::new("OVERLAP_COMPOUND", 10, 0, 0),
    ComponentFlag::new("SCALED_COMPONENT_OFFSET", 11, 0, 0),
    ComponentFlag::new("UNSCALED_COMPONENT_OFFSET", 12, 0, 0),
];

/// The flag word of a component record.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ComponentFlags(pub u16);

impl ComponentFlags {
    /// The arguments are 16-bit instead of 8-bit values.
    pub const ARG_1_AND_2_ARE_WORDS: u16 = COMPONENT_FLAGS[0].mask();
    /// A single scale factor follows the arguments.
    pub const WE_HAVE_A_SCALE: u16 = COMPONENT_FLAGS[3].mask();
    /// Another component record follows this one.
    pub const MORE_COMPONENTS: u16 = COMPONENT_FLAGS[5].mask();
    /// Separate x and y scale factors follow the arguments.
    pub const WE_HAVE_AN_X_AND_Y_SCALE: u16 = COMPONENT_FLAGS[6].mask();
    /// A 2x2 transformation matrix follows the arguments.
    pub const WE_HAVE_A_TWO_BY_TWO: u16 = COMPONENT_FLAGS[7].mask();

    /// Whether another component record follows this one.
    pub fn has_more_components(self) -> bool {
        self.0 & Self::MORE_COMPONENTS != 0
    }

    /// The number of argument bytes that follow the flag word and glyph ID.
    ///
    /// Bits outside of the table, and combinations the format forbids (like
    /// a scale and a 2x2 matrix at once), are summed up all the same.
    pub fn offset_to_next_component(self) -> usize {
        COMPONENT_FLAGS
            .iter()
            .map(|flag| {
                if self.0 & flag.mask() != 0 {
                    flag.size_if_set
                } else {
                    flag.size_if_unset
                }
            })
            .map(usize::from)
            .sum()
    }

    /// The full length of the component record.
    pub fn record_len(self) -> usize {
        COMPONENT_HEADER_LEN + self.offset_to_next_component()
    }
}

/// A single parsed component record.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Component {
    /// The absolute offset of the record in the font data.
    pub offset: usize,
    /// The flags of the record.
    pub flags: ComponentFlags,
    /// The referenced glyph, in the original numbering.
    pub glyph_id: u16,
}

impl Component {
    /// The absolute offset of the glyph ID field.
    pub fn glyph_id_offset(&self) -> usize {
        self.offset + 2
    }
}

/// An iterator over the component records of a composite glyph.
///
/// The iterator stops after the first record without the `MORE_COMPONENTS`
/// bit, or after the first read error.
pub struct Components<'a> {
    /// The font data, cut off at the end of the glyph description.
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Components<'a> {
    /// Iterate over the component chain starting at the absolute `offset`.
    /// `data` must end where the glyph description ends.
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset, done: false }
    }

    fn read_component(&mut self) -> Result<Component> {
        let mut r = Reader::new_at(self.data, self.offset);
        let flags = ComponentFlags(r.read::<u16>().ok_or(Error::MissingData)?);
        let glyph_id = r.read::<u16>().ok_or(Error::MissingData)?;
        r.skip_bytes(flags.offset_to_next_component()).ok_or(Error::MissingData)?;

        let component = Component { offset: self.offset, flags, glyph_id };
        self.offset = r.offset();
        Ok(component)
    }
}

impl Iterator for Components<'_> {
    type Item = Result<Component>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let component = self.read_component();
        self.done = match &component {
            Ok(component) => !component.flags.has_more_components(),
            Err(_) => true,
        };

        Some(component)
    }
}
