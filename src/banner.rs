use crate::vga::{CellGrid, Color, Terminal};

// Boot screen: title, a short description of the persistent memory model, and the roadmap.
pub fn show_banner<G: CellGrid>(terminal: &mut Terminal<G>) {
    terminal.set_color(Color::LightCyan, Color::Black);
    terminal.write_text(c"========================================\n");
    terminal.write_text(c"  MOVRAX - Mini Persistent Memory OS - v0.1\n");
    terminal.write_text(c"========================================\n\n");

    terminal.set_color(Color::LightGray, Color::Black);
    terminal.write_text(c"Kernel loaded successfully!\n\n");

    terminal.set_color(Color::LightGreen, Color::Black);
    terminal.write_text(c"Concept:\n");
    terminal.set_color(Color::LightGray, Color::Black);
    terminal.write_text(c"This OS uses a persistent memory model where\n");
    terminal.write_text(c"RAM and filesystem are unified. Files are just\n");
    terminal.write_text(c"memory-mapped regions - no explicit save/load!\n\n");

    phase(terminal, c"Phase 1: ", Color::White, c"Bootable Kernel ");
    terminal.set_color(Color::LightGreen, Color::Black);
    terminal.write_text(c"[COMPLETE]\n");

    phase(terminal, c"Phase 2: ", Color::DarkGray, c"Memory Management [TODO]\n");
    phase(terminal, c"Phase 3: ", Color::DarkGray, c"Persistent Filesystem [TODO]\n");
    phase(terminal, c"Phase 4: ", Color::DarkGray, c"Text Editor [TODO]\n\n");

    terminal.set_color(Color::LightCyan, Color::Black);
    terminal.write_text(c"System halted. Press Ctrl+C in QEMU to exit.\n");
}

fn phase<G: CellGrid>(
    terminal: &mut Terminal<G>,
    label: &core::ffi::CStr,
    color: Color,
    description: &core::ffi::CStr,
) {
    terminal.set_color(Color::Yellow, Color::Black);
    terminal.write_text(label);
    terminal.set_color(color, Color::Black);
    terminal.write_text(description);
}
