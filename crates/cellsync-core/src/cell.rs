//! A single terminal grid position: codepoint, foreground/background color,
//! and attribute flags (§3.1).

use bitflags::bitflags;

bitflags! {
    /// The 8-bit attribute field of a [`Cell`]. The top bit is reserved by
    /// the wire format and always decodes/encodes as zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    pub struct CellAttrs: u8 {
        const BOLD          = 0b0000_0001;
        const ITALIC        = 0b0000_0010;
        const UNDERLINE     = 0b0000_0100;
        const INVERSE       = 0b0000_1000;
        const STRIKETHROUGH = 0b0001_0000;
        const DIM           = 0b0010_0000;
        const BLINK         = 0b0100_0000;
    }
}

/// Codepoints fit in 21 bits (covers the full Unicode range).
pub const CODEPOINT_MASK: u32 = 0x1F_FFFF;
/// Colors are packed 24-bit RGB.
pub const COLOR_MASK: u32 = 0xFF_FFFF;

/// One terminal cell: a codepoint plus foreground/background color and
/// attribute flags. Equality is bitwise on the full payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub codepoint: u32,
    pub fg: u32,
    pub bg: u32,
    pub attrs: CellAttrs,
}

impl Cell {
    pub fn new(codepoint: u32, fg: u32, bg: u32, attrs: CellAttrs) -> Self {
        Cell {
            codepoint: codepoint & CODEPOINT_MASK,
            fg: fg & COLOR_MASK,
            bg: bg & COLOR_MASK,
            attrs,
        }
    }

    /// A blank cell: a space, default colors, no attributes.
    pub fn blank() -> Self {
        Cell::new(b' ' as u32, 0, 0, CellAttrs::empty())
    }

    pub fn char(&self) -> Option<char> {
        char::from_u32(self.codepoint)
    }
}

/// A single `(x, y, cell)` diff asserting a new value at a grid position
/// (§3.2 glossary entry "Diff").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDiff {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}
