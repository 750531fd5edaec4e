// The no_std attribute allows us to Rust code on the bare metal without an
// underlying operating system. This means we cannot use threads, files, heap
// memory, the network, random numbers, standard output, or any other features
// requiring OS abstractions or specific hardware.
#![no_std]
// Freestanding Rust executables do not have access to the Rust runtime. Hence,
// we need to remove the main function and provide a new entry point
// (the _start function defined below).
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(movrax::test_runner)]
#![reexport_test_harness_main = "run_tests"]

use core::fmt::Write;
use core::panic::PanicInfo;

use movrax::banner::show_banner;
use movrax::vga::{self, Color, TERMINAL};

// This function is called on panic.
//
// The panic may have happened with the terminal lock held, in which case the
// message only goes to the serial log.
#[cfg(not(test))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    log::error!("{}", info);
    if let Some(mut terminal) = TERMINAL.try_lock() {
        if terminal.is_initialized() {
            terminal.set_color(Color::White, Color::Red);
            let _ = write!(terminal, "\nKERNEL PANIC: {}\n", info);
        }
    }
    movrax::hlt()
}

#[cfg(test)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    movrax::test_panic_handler(info)
}

// Rust uses name mangling by default. We do not want the Rust compiler to
// change the name of the _start function, the bootloader jumps to it by name.
#[unsafe(no_mangle)]
pub extern "C" fn _start() -> ! {
    movrax::logger::init_logger();
    vga::init();

    #[cfg(test)]
    run_tests();

    {
        let mut terminal = TERMINAL.lock();
        show_banner(&mut *terminal);
    }
    log::info!("banner printed, halting");

    movrax::hlt()
}
