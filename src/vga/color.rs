use bit_field::BitField;
use core::fmt;

// The sixteen entries of the default VGA text-mode palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

// Returned when a raw palette index does not name one of the sixteen colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidColor(pub u8);

impl fmt::Display for InvalidColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a VGA palette index (0..=15)", self.0)
    }
}

impl core::error::Error for InvalidColor {}

impl TryFrom<u8> for Color {
    type Error = InvalidColor;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let color = match value {
            0 => Color::Black,
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Cyan,
            4 => Color::Red,
            5 => Color::Magenta,
            6 => Color::Brown,
            7 => Color::LightGray,
            8 => Color::DarkGray,
            9 => Color::LightBlue,
            10 => Color::LightGreen,
            11 => Color::LightCyan,
            12 => Color::LightRed,
            13 => Color::Pink,
            14 => Color::Yellow,
            15 => Color::White,
            other => return Err(InvalidColor(other)),
        };
        Ok(color)
    }
}

// The attribute byte stored next to every character in the buffer -
// 1. The low four bits define the foreground color
// 2. The high four bits define the background color
//
// Depending on the VGA mode register the top bit is either the fourth background bit or a blink
// flag. We never touch the mode register, so it is treated as part of the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    // Light gray on black, what the BIOS leaves behind.
    pub const DEFAULT: ColorCode = ColorCode::new(Color::LightGray, Color::Black);

    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }

    // Packs two raw palette indices without checking them. A foreground above 15 spills into the
    // background nibble and the high bits of a background above 15 fall off the byte.
    pub const fn from_raw_parts(foreground: u8, background: u8) -> ColorCode {
        ColorCode(background << 4 | foreground)
    }

    pub const fn from_bits(bits: u8) -> ColorCode {
        ColorCode(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn foreground_bits(self) -> u8 {
        self.0.get_bits(0..4)
    }

    pub fn background_bits(self) -> u8 {
        self.0.get_bits(4..8)
    }
}

impl From<ColorCode> for u8 {
    fn from(code: ColorCode) -> u8 {
        code.0
    }
}

#[test_case]
fn test_color_code_packing() {
    let code = ColorCode::new(Color::LightCyan, Color::Blue);
    assert_eq!(code.bits(), 0x1b);
    assert_eq!(code.foreground_bits(), Color::LightCyan as u8);
    assert_eq!(code.background_bits(), Color::Blue as u8);
    assert_eq!(ColorCode::DEFAULT.bits(), 0x07);
}

#[test_case]
fn test_color_code_out_of_range_parts() {
    // Foreground 0x1f leaks its fifth bit into the background nibble.
    assert_eq!(ColorCode::from_raw_parts(0x1f, 0).bits(), 0x1f);
    // Background 0x12 loses its high nibble when shifted into the byte.
    assert_eq!(ColorCode::from_raw_parts(0, 0x12).bits(), 0x20);
    assert_eq!(ColorCode::from_raw_parts(0xff, 0xff).bits(), 0xff);
}

#[test_case]
fn test_color_from_palette_index() {
    assert_eq!(Color::try_from(14), Ok(Color::Yellow));
    assert_eq!(Color::try_from(0), Ok(Color::Black));
    assert_eq!(Color::try_from(16), Err(InvalidColor(16)));

    for index in 0..16u8 {
        let color = Color::try_from(index).unwrap();
        assert_eq!(color as u8, index);
    }
}
