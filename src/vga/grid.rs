use volatile::Volatile;

use crate::vga::color::ColorCode;

// The VGA text buffer is a two-dimensional array with typically 25 rows and 80 columns, which is
// directly rendered to the screen.
pub const BUFFER_HEIGHT: usize = 25;
pub const BUFFER_WIDTH: usize = 80;

// Each VGA buffer character contains an ASCII and a color byte.
//
// Field ordering in default structs is undefined in Rust. repr(C) attribute guarantees that the
// struct’s fields are laid out exactly as a C struct. On a little endian machine this makes the
// cell read as a u16 with the character in the low byte and the color in the high byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Character {
    pub byte: u8,
    pub color_code: ColorCode,
}

impl Character {
    pub const fn new(byte: u8, color_code: ColorCode) -> Character {
        Character { byte, color_code }
    }

    pub const fn blank(color_code: ColorCode) -> Character {
        Character::new(b' ', color_code)
    }
}

impl From<Character> for u16 {
    fn from(character: Character) -> u16 {
        (character.color_code.bits() as u16) << 8 | character.byte as u16
    }
}

impl From<u16> for Character {
    fn from(cell: u16) -> Character {
        Character::new(cell as u8, ColorCode::from_bits((cell >> 8) as u8))
    }
}

// Anything the terminal can draw into. Rows and columns are always in range; implementations are
// free to panic otherwise.
pub trait CellGrid {
    fn read(&self, row: usize, column: usize) -> Character;
    fn write(&mut self, row: usize, column: usize, character: Character);
}

impl<G: CellGrid + ?Sized> CellGrid for &mut G {
    fn read(&self, row: usize, column: usize) -> Character {
        (**self).read(row, column)
    }

    fn write(&mut self, row: usize, column: usize, character: Character) {
        (**self).write(row, column, character)
    }
}

// The memory-mapped text buffer itself.
#[repr(transparent)]
pub struct VgaBuffer {
    // Volatile avoids any future Rust compiler optimizations that might assume the write to the
    // buffer is not necessary.
    chars: [[Volatile<Character>; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

impl VgaBuffer {
    // ## Safety
    // `address` must point to a mapped text buffer of BUFFER_WIDTH * BUFFER_HEIGHT cells that
    // nothing else writes to for the rest of the program.
    pub unsafe fn from_address(address: usize) -> &'static mut VgaBuffer {
        unsafe { &mut *(address as *mut VgaBuffer) }
    }
}

impl CellGrid for VgaBuffer {
    fn read(&self, row: usize, column: usize) -> Character {
        self.chars[row][column].read()
    }

    fn write(&mut self, row: usize, column: usize, character: Character) {
        self.chars[row][column].write(character);
    }
}

// A grid that lives in ordinary memory. Used to exercise the terminal without touching the screen.
pub struct MemoryGrid {
    chars: [[Character; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

impl MemoryGrid {
    // Starts out zeroed, like VGA memory that nobody has written yet.
    pub const fn new() -> MemoryGrid {
        MemoryGrid {
            chars: [[Character::new(0, ColorCode::from_bits(0)); BUFFER_WIDTH]; BUFFER_HEIGHT],
        }
    }

    pub fn row(&self, row: usize) -> &[Character; BUFFER_WIDTH] {
        &self.chars[row]
    }
}

impl Default for MemoryGrid {
    fn default() -> Self {
        MemoryGrid::new()
    }
}

impl CellGrid for MemoryGrid {
    fn read(&self, row: usize, column: usize) -> Character {
        self.chars[row][column]
    }

    fn write(&mut self, row: usize, column: usize, character: Character) {
        self.chars[row][column] = character;
    }
}

#[test_case]
fn test_character_cell_layout() {
    let character = Character::new(b'A', ColorCode::from_bits(0x1e));
    assert_eq!(u16::from(character), 0x1e41);
    assert_eq!(Character::from(0x1e41u16), character);
    assert_eq!(core::mem::size_of::<Character>(), 2);
    assert_eq!(
        core::mem::size_of::<VgaBuffer>(),
        BUFFER_WIDTH * BUFFER_HEIGHT * 2
    );
}

#[test_case]
fn test_memory_grid_read_write() {
    let mut grid = MemoryGrid::new();
    let character = Character::new(b'z', ColorCode::DEFAULT);

    grid.write(BUFFER_HEIGHT - 1, BUFFER_WIDTH - 1, character);

    assert_eq!(grid.read(BUFFER_HEIGHT - 1, BUFFER_WIDTH - 1), character);
    assert_eq!(grid.read(0, 0), Character::from(0u16));
    assert_eq!(grid.row(BUFFER_HEIGHT - 1)[BUFFER_WIDTH - 1], character);
}
