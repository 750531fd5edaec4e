use core::fmt;
use lazy_static::lazy_static;
use spin::Mutex;

pub mod color;
pub mod grid;
pub mod terminal;

pub use color::{Color, ColorCode};
pub use grid::{CellGrid, Character, MemoryGrid, VgaBuffer, BUFFER_HEIGHT, BUFFER_WIDTH};
pub use terminal::{Terminal, TAB_STOP};

// The VGA buffer is accessible via memory-mapped I/O to the address 0xb8000.
pub const VGA_BUFFER_ADDRESS: usize = 0xb8000;

// In Rust static variables are initialized at compile-time as opposed to run-time. The lazy static
// defers construction to the first access and guarantees it happens exactly once.
//
// The terminal starts out unbound. Nothing is drawn until init() hands it the hardware buffer.
// A spinlock provides the interior mutability.
lazy_static! {
    pub static ref TERMINAL: Mutex<Terminal<&'static mut VgaBuffer>> = Mutex::new(Terminal::new());
}

// Binds the global terminal to the text buffer and clears the screen. Must run once, before any
// print! call.
pub fn init() {
    let mut terminal = TERMINAL.lock();
    if terminal.is_initialized() {
        log::warn!("vga terminal already initialized, keeping the current screen");
        return;
    }

    // The bootloader identity maps the text buffer and nothing else in the kernel touches it.
    let buffer = unsafe { VgaBuffer::from_address(VGA_BUFFER_ADDRESS) };
    terminal.initialize(buffer);
}

// Prints to the VGA text buffer.
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::vga::_print(format_args!($($arg)*)));
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    // Writing to the terminal never fails.
    let _ = TERMINAL.lock().write_fmt(args);
}

#[test_case]
fn test_println() {
    init();
    println!("Testing println!");
}

#[test_case]
fn test_println_many() {
    init();
    for num in 0..210 {
        println!("Printing statement number: {}", num);
    }
    assert_eq!(TERMINAL.lock().cursor(), (BUFFER_HEIGHT - 1, 0));
}

#[test_case]
fn test_column_wrap_around() {
    init();
    let buffer = [b'A'; 150];
    TERMINAL.lock().write(&buffer);
    println!();
}

#[test_case]
fn test_println_output() {
    init();
    let test_string = "This is a test string";
    println!("{}", test_string);

    let terminal = TERMINAL.lock();
    // Whatever was on screen before, the string ends up on the row above the cursor.
    let (row, column) = terminal.cursor();
    assert_eq!(column, 0);
    let grid = terminal.grid().unwrap();
    for (i, character) in test_string.bytes().enumerate() {
        let vga_output = grid.read(row - 1, i);
        assert_eq!(character, vga_output.byte);
    }
}
