use core::ffi::CStr;
use core::fmt;

use crate::vga::color::{Color, ColorCode};
use crate::vga::grid::{CellGrid, Character, BUFFER_HEIGHT, BUFFER_WIDTH};

// Tabs advance the cursor to the next multiple of this many columns. Must be a power of two.
pub const TAB_STOP: usize = 4;

const NEW_LINE_CHARACTER: u8 = b'\n';
const TAB_CHARACTER: u8 = b'\t';

// A character-cell terminal on top of a grid.
//
// The cursor always points at the cell the next character lands in. Text runs left to right and
// wraps at the right edge. Once the cursor moves past the last row, every row shifts up by one
// and the oldest row is lost.
pub struct Terminal<G: CellGrid> {
    cursor_row: usize,
    cursor_column: usize,
    color_code: ColorCode,
    // None until initialize() binds a grid.
    grid: Option<G>,
}

impl<G: CellGrid> Terminal<G> {
    pub const fn new() -> Terminal<G> {
        Terminal {
            cursor_row: 0,
            cursor_column: 0,
            color_code: ColorCode::from_bits(0),
            grid: None,
        }
    }

    // Binds the grid, restores the default colors and blanks the screen.
    pub fn initialize(&mut self, grid: G) {
        self.grid = Some(grid);
        self.color_code = ColorCode::DEFAULT;
        self.clear();
        log::debug!(
            "terminal initialized ({}x{}, attribute {:#04x})",
            BUFFER_WIDTH,
            BUFFER_HEIGHT,
            self.color_code.bits()
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.grid.is_some()
    }

    // Only affects characters written from now on.
    pub fn set_color(&mut self, foreground: Color, background: Color) {
        self.color_code = ColorCode::new(foreground, background);
    }

    // Like set_color, but takes a packed attribute byte as is.
    pub fn set_attribute(&mut self, color_code: ColorCode) {
        self.color_code = color_code;
    }

    pub fn attribute(&self) -> ColorCode {
        self.color_code
    }

    // (row, column) of the next character.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_column)
    }

    pub fn grid(&self) -> Option<&G> {
        self.grid.as_ref()
    }

    // Fills the whole grid with blanks in the current color and homes the cursor.
    pub fn clear(&mut self) {
        let blank = Character::blank(self.color_code);
        let grid = self.bound_grid();

        for row in 0..BUFFER_HEIGHT {
            for column in 0..BUFFER_WIDTH {
                grid.write(row, column, blank);
            }
        }

        self.cursor_row = 0;
        self.cursor_column = 0;
    }

    pub fn put_character(&mut self, byte: u8) {
        // Fail on the first character rather than at the first scroll.
        self.bound_grid();

        match byte {
            NEW_LINE_CHARACTER => self.new_line(),
            TAB_CHARACTER => {
                self.cursor_column = (self.cursor_column + TAB_STOP) & !(TAB_STOP - 1);
                if self.cursor_column >= BUFFER_WIDTH {
                    self.new_line();
                }
            }
            byte => {
                let (row, column) = (self.cursor_row, self.cursor_column);
                let character = Character::new(byte, self.color_code);
                self.bound_grid().write(row, column, character);

                self.cursor_column += 1;
                if self.cursor_column == BUFFER_WIDTH {
                    self.new_line();
                }
            }
        }
    }

    // Bytes are written verbatim, including ones without a glyph.
    pub fn write(&mut self, data: &[u8]) {
        for &byte in data {
            self.put_character(byte);
        }
    }

    // Writes everything before the terminating NUL.
    pub fn write_text(&mut self, text: &CStr) {
        self.write(text.to_bytes());
    }

    fn new_line(&mut self) {
        self.cursor_column = 0;
        self.cursor_row += 1;
        if self.cursor_row == BUFFER_HEIGHT {
            self.scroll();
        }
    }

    // Moves every row up by one, dropping the top row, and blanks the bottom row. The column is
    // left alone, callers have already reset it.
    fn scroll(&mut self) {
        let blank = Character::blank(self.color_code);
        let grid = self.bound_grid();

        for row in 1..BUFFER_HEIGHT {
            for column in 0..BUFFER_WIDTH {
                let character = grid.read(row, column);
                grid.write(row - 1, column, character);
            }
        }

        for column in 0..BUFFER_WIDTH {
            grid.write(BUFFER_HEIGHT - 1, column, blank);
        }

        self.cursor_row = BUFFER_HEIGHT - 1;
        log::trace!("terminal scrolled");
    }

    fn bound_grid(&mut self) -> &mut G {
        match self.grid.as_mut() {
            Some(grid) => grid,
            None => panic!("terminal used before initialize()"),
        }
    }
}

impl<G: CellGrid> Default for Terminal<G> {
    fn default() -> Self {
        Terminal::new()
    }
}

impl<G: CellGrid> fmt::Write for Terminal<G> {
    fn write_str(&mut self, message: &str) -> fmt::Result {
        self.write(message.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vga::grid::MemoryGrid;

    fn terminal() -> Terminal<MemoryGrid> {
        let mut terminal = Terminal::new();
        terminal.initialize(MemoryGrid::new());
        terminal
    }

    fn cell(terminal: &Terminal<MemoryGrid>, row: usize, column: usize) -> Character {
        terminal.grid().unwrap().read(row, column)
    }

    fn blank_row(terminal: &Terminal<MemoryGrid>, row: usize, color_code: ColorCode) -> bool {
        (0..BUFFER_WIDTH).all(|column| cell(terminal, row, column) == Character::blank(color_code))
    }

    // Labels every row with a distinct letter so that moved rows can be recognized.
    fn fill_rows(terminal: &mut Terminal<MemoryGrid>) {
        for row in 0..BUFFER_HEIGHT {
            terminal.write(&[b'a' + row as u8; BUFFER_WIDTH]);
        }
    }

    #[test_case]
    fn test_initialize_blanks_grid() {
        let terminal = terminal();

        assert!(terminal.is_initialized());
        assert_eq!(terminal.cursor(), (0, 0));
        assert_eq!(terminal.attribute(), ColorCode::new(Color::LightGray, Color::Black));
        for row in 0..BUFFER_HEIGHT {
            assert!(blank_row(&terminal, row, ColorCode::DEFAULT));
        }
    }

    #[test_case]
    fn test_new_terminal_is_unbound() {
        let terminal: Terminal<MemoryGrid> = Terminal::new();

        assert!(!terminal.is_initialized());
        assert!(terminal.grid().is_none());
        assert_eq!(terminal.cursor(), (0, 0));
        assert_eq!(terminal.attribute().bits(), 0);
    }

    #[test_case]
    fn test_put_character_writes_one_cell() {
        let mut terminal = terminal();
        terminal.put_character(b'A');
        terminal.put_character(b'B');

        terminal.set_color(Color::Yellow, Color::Blue);
        terminal.put_character(b'C');

        let color_code = ColorCode::new(Color::Yellow, Color::Blue);
        assert_eq!(cell(&terminal, 0, 2), Character::new(b'C', color_code));
        assert_eq!(terminal.cursor(), (0, 3));
        for column in 3..BUFFER_WIDTH {
            assert_eq!(cell(&terminal, 0, column), Character::blank(ColorCode::DEFAULT));
        }
        for row in 1..BUFFER_HEIGHT {
            assert!(blank_row(&terminal, row, ColorCode::DEFAULT));
        }
    }

    #[test_case]
    fn test_write_with_trailing_new_line() {
        let mut terminal = terminal();
        terminal.write(b"AB\n");

        assert_eq!(cell(&terminal, 0, 0), Character::new(b'A', ColorCode::DEFAULT));
        assert_eq!(cell(&terminal, 0, 1), Character::new(b'B', ColorCode::DEFAULT));
        assert_eq!(terminal.cursor(), (1, 0));
    }

    #[test_case]
    fn test_new_line_does_not_touch_cells() {
        let mut terminal = terminal();
        terminal.write(b"abc");
        terminal.set_color(Color::Red, Color::White);
        terminal.put_character(b'\n');

        assert_eq!(terminal.cursor(), (1, 0));
        assert_eq!(cell(&terminal, 0, 3), Character::blank(ColorCode::DEFAULT));
        assert!(blank_row(&terminal, 1, ColorCode::DEFAULT));
    }

    #[test_case]
    fn test_new_line_on_last_row_scrolls() {
        let mut terminal = terminal();
        for _ in 0..BUFFER_HEIGHT - 1 {
            terminal.put_character(b'\n');
        }
        assert_eq!(terminal.cursor(), (BUFFER_HEIGHT - 1, 0));
        terminal.write(b"last");

        terminal.put_character(b'\n');

        assert_eq!(terminal.cursor(), (BUFFER_HEIGHT - 1, 0));
        assert_eq!(cell(&terminal, BUFFER_HEIGHT - 2, 0), Character::new(b'l', ColorCode::DEFAULT));
        assert!(blank_row(&terminal, BUFFER_HEIGHT - 1, ColorCode::DEFAULT));
    }

    #[test_case]
    fn test_tab_stops() {
        let mut terminal = terminal();

        terminal.put_character(b'\t');
        assert_eq!(terminal.cursor(), (0, 4));

        terminal.write(b"x\t");
        assert_eq!(terminal.cursor(), (0, 8));

        terminal.write(b"abc\t");
        assert_eq!(terminal.cursor(), (0, 12));

        // Tabs never write a cell.
        for column in [0, 1, 2, 3, 5, 6, 7, 11] {
            assert_eq!(cell(&terminal, 0, column), Character::blank(ColorCode::DEFAULT));
        }
    }

    #[test_case]
    fn test_tab_wraps_at_right_edge() {
        let mut terminal = terminal();
        terminal.write(&[b'-'; BUFFER_WIDTH - 2]);
        assert_eq!(terminal.cursor(), (0, BUFFER_WIDTH - 2));

        terminal.put_character(b'\t');

        assert_eq!(terminal.cursor(), (1, 0));
        assert_eq!(cell(&terminal, 0, BUFFER_WIDTH - 1), Character::blank(ColorCode::DEFAULT));
    }

    #[test_case]
    fn test_tab_on_last_row_scrolls() {
        let mut terminal = terminal();
        fill_rows(&mut terminal);
        // Filling every row scrolled once, the cursor sits on the fresh bottom row.
        assert_eq!(terminal.cursor(), (BUFFER_HEIGHT - 1, 0));
        terminal.write(&[b'#'; BUFFER_WIDTH - 1]);

        terminal.put_character(b'\t');

        assert_eq!(terminal.cursor(), (BUFFER_HEIGHT - 1, 0));
        assert_eq!(cell(&terminal, BUFFER_HEIGHT - 2, 0), Character::new(b'#', ColorCode::DEFAULT));
        assert!(blank_row(&terminal, BUFFER_HEIGHT - 1, ColorCode::DEFAULT));
    }

    #[test_case]
    fn test_full_row_wraps_without_scrolling() {
        let mut terminal = terminal();
        terminal.write(&[b'A'; BUFFER_WIDTH]);

        assert_eq!(terminal.cursor(), (1, 0));
        for column in 0..BUFFER_WIDTH {
            assert_eq!(cell(&terminal, 0, column), Character::new(b'A', ColorCode::DEFAULT));
        }
        assert!(blank_row(&terminal, 1, ColorCode::DEFAULT));
    }

    #[test_case]
    fn test_last_cell_writes_then_scrolls() {
        let mut terminal = terminal();
        fill_rows(&mut terminal);
        terminal.write(&[b'z'; BUFFER_WIDTH - 1]);
        assert_eq!(terminal.cursor(), (BUFFER_HEIGHT - 1, BUFFER_WIDTH - 1));
        let first_row_before = *terminal.grid().unwrap().row(0);

        terminal.set_color(Color::Green, Color::Black);
        terminal.put_character(b'!');

        // The character lands in the last cell first, then the wrap scrolls it up with its row.
        assert_eq!(terminal.cursor(), (BUFFER_HEIGHT - 1, 0));
        let green = ColorCode::new(Color::Green, Color::Black);
        assert_eq!(cell(&terminal, BUFFER_HEIGHT - 2, BUFFER_WIDTH - 1), Character::new(b'!', green));
        assert_eq!(cell(&terminal, BUFFER_HEIGHT - 2, 0), Character::new(b'z', ColorCode::DEFAULT));
        assert!(blank_row(&terminal, BUFFER_HEIGHT - 1, green));
        assert!(*terminal.grid().unwrap().row(0) != first_row_before);
    }

    #[test_case]
    fn test_scroll_shifts_rows_up_by_one() {
        let mut terminal = terminal();
        fill_rows(&mut terminal);

        // The first pass scrolled once: row 'a' is gone, 'b' is on top.
        assert_eq!(cell(&terminal, 0, 0), Character::new(b'b', ColorCode::DEFAULT));
        for row in 0..BUFFER_HEIGHT - 1 {
            let expected = Character::new(b'b' + row as u8, ColorCode::DEFAULT);
            for column in 0..BUFFER_WIDTH {
                assert_eq!(cell(&terminal, row, column), expected);
            }
        }
        assert!(blank_row(&terminal, BUFFER_HEIGHT - 1, ColorCode::DEFAULT));

        terminal.set_attribute(ColorCode::from_bits(0x4f));
        terminal.put_character(b'\n');

        assert_eq!(cell(&terminal, 0, 0), Character::new(b'c', ColorCode::DEFAULT));
        assert_eq!(
            cell(&terminal, BUFFER_HEIGHT - 3, 0),
            Character::new(b'a' + BUFFER_HEIGHT as u8 - 1, ColorCode::DEFAULT)
        );
        assert!(blank_row(&terminal, BUFFER_HEIGHT - 2, ColorCode::DEFAULT));
        assert!(blank_row(&terminal, BUFFER_HEIGHT - 1, ColorCode::from_bits(0x4f)));
        assert_eq!(terminal.cursor(), (BUFFER_HEIGHT - 1, 0));
    }

    #[test_case]
    fn test_set_color_is_not_retroactive() {
        let mut terminal = terminal();
        terminal.set_color(Color::LightCyan, Color::Black);
        terminal.write(b"old");
        terminal.set_color(Color::White, Color::Red);
        terminal.write(b"new");

        let old = ColorCode::new(Color::LightCyan, Color::Black);
        let new = ColorCode::new(Color::White, Color::Red);
        assert_eq!(cell(&terminal, 0, 0), Character::new(b'o', old));
        assert_eq!(cell(&terminal, 0, 2), Character::new(b'd', old));
        assert_eq!(cell(&terminal, 0, 3), Character::new(b'n', new));
        assert_eq!(terminal.attribute().bits(), 0x4f);
    }

    #[test_case]
    fn test_clear_uses_current_color() {
        let mut terminal = terminal();
        terminal.write(b"some text\nmore");
        terminal.set_color(Color::Black, Color::Cyan);

        terminal.clear();

        let color_code = ColorCode::new(Color::Black, Color::Cyan);
        assert!(terminal.is_initialized());
        assert_eq!(terminal.cursor(), (0, 0));
        for row in 0..BUFFER_HEIGHT {
            assert!(blank_row(&terminal, row, color_code));
        }
    }

    #[test_case]
    fn test_raw_bytes_are_written_verbatim() {
        let mut terminal = terminal();
        terminal.write(&[0x00, 0x01, 0xdb, 0xff, b'\r']);

        assert_eq!(cell(&terminal, 0, 0).byte, 0x00);
        assert_eq!(cell(&terminal, 0, 1).byte, 0x01);
        assert_eq!(cell(&terminal, 0, 2).byte, 0xdb);
        assert_eq!(cell(&terminal, 0, 3).byte, 0xff);
        assert_eq!(cell(&terminal, 0, 4).byte, b'\r');
        assert_eq!(terminal.cursor(), (0, 5));
    }

    #[test_case]
    fn test_out_of_range_attribute() {
        let mut terminal = terminal();
        terminal.set_attribute(ColorCode::from_raw_parts(0x13, 0x21));
        terminal.put_character(b'q');

        assert_eq!(cell(&terminal, 0, 0), Character::new(b'q', ColorCode::from_bits(0x13)));
        assert_eq!(terminal.cursor(), (0, 1));
    }

    #[test_case]
    fn test_write_text_stops_at_nul() {
        let mut terminal = terminal();
        let text = CStr::from_bytes_until_nul(b"hi\tthere\0ignored").unwrap();

        terminal.write_text(text);

        assert_eq!(cell(&terminal, 0, 0).byte, b'h');
        assert_eq!(cell(&terminal, 0, 1).byte, b'i');
        assert_eq!(cell(&terminal, 0, 4).byte, b't');
        assert_eq!(cell(&terminal, 0, 8).byte, b'e');
        assert_eq!(terminal.cursor(), (0, 9));

        terminal.write_text(c"");
        assert_eq!(terminal.cursor(), (0, 9));
    }

    #[test_case]
    fn test_formatted_write() {
        use core::fmt::Write;

        let mut terminal = terminal();
        write!(terminal, "{}+{}={}", 2, 2, 4).unwrap();

        assert_eq!(cell(&terminal, 0, 3).byte, b'=');
        assert_eq!(terminal.cursor(), (0, 5));
    }

    #[test_case]
    fn test_terminal_over_borrowed_grid() {
        let mut grid = MemoryGrid::new();
        {
            let mut terminal = Terminal::new();
            terminal.initialize(&mut grid);
            terminal.write(b"borrowed");
        }

        assert_eq!(grid.read(0, 0), Character::new(b'b', ColorCode::DEFAULT));
        assert_eq!(grid.read(0, 8), Character::blank(ColorCode::DEFAULT));
    }
}
