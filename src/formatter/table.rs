//! Column alignment for table output
//!
//! Cells are separated by tabs. Every column but the last is padded to the
//! widest cell in it plus [`PADDING`], never narrower than [`MIN_WIDTH`].

use std::io::{self, Write};
use tabwriter::TabWriter;

const MIN_WIDTH: usize = 10;
const PADDING: usize = 3;

/// Align tab-separated lines into columns, one output line per input line
pub fn align<S: AsRef<str>>(lines: &[S]) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        // The writer's minimum width does not include the padding
        let mut tw = TabWriter::new(&mut buf)
            .minwidth(MIN_WIDTH - PADDING)
            .padding(PADDING);
        for line in lines {
            writeln!(tw, "{}", line.as_ref())?;
        }
        tw.flush()?;
    }
    Ok(buf)
}
