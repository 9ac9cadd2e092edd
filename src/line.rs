//! Fixed-width text lines for the display and the printer

use core::fmt::{self, Write};

use heapless::String;

/// Width of the operator display and of the printer paper, in characters
pub const LINE_WIDTH: usize = 20;

/// One display or printer line
pub type Line = String<LINE_WIDTH>;

/// Formats `args` into a line.
///
/// # Panics
/// Panics if the text does not fit in [`LINE_WIDTH`] characters. Every line the monitor produces
/// has a bounded length, so this only trips on a programming error.
pub fn format_line(args: fmt::Arguments<'_>) -> Line {
    let mut line = Line::new();
    let fits = line.write_fmt(args).is_ok();
    assert!(fits, "line longer than {LINE_WIDTH} characters");
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_short_lines() {
        assert_eq!(format_line(format_args!("Tank {}: {} gls.", 3, 65535)).as_str(), "Tank 3: 65535 gls.");
    }

    #[test]
    #[should_panic(expected = "line longer than 20 characters")]
    fn rejects_long_lines() {
        let _ = format_line(format_args!("{}", "this line is far too long"));
    }
}
