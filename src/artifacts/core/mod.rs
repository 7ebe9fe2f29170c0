//! Shared output helpers
//!
//! Long command output (history) can be routed through the `minus` pager.
//! Paging only happens when stdout is a terminal and `NO_PAGER` is unset;
//! otherwise output goes straight to stdout. Colors follow the same terminal
//! check.

use derive_new::new;
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::{self, Write};

pub const NO_PAGER_ENV: &str = "NO_PAGER";

/// Adapts the `minus` pager to `std::io::Write`
///
/// ```ignore
/// let pager = Pager::new();
/// let mut writer = PagerWriter::new(pager.clone());
/// writeln!(writer, "Some long output...")?;
/// minus::page_all(pager)?;
/// ```
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.pager.push_str(s).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Styled output only makes sense on a terminal
pub fn colors_enabled() -> bool {
    io::stdout().is_terminal()
}

pub fn paging_enabled() -> bool {
    std::env::var_os(NO_PAGER_ENV).is_none() && io::stdout().is_terminal()
}

/// Run `produce` against a pager when paging is enabled, stdout otherwise
pub fn with_pager<F>(produce: F) -> anyhow::Result<()>
where
    F: FnOnce(Box<dyn Write>) -> anyhow::Result<()>,
{
    if !paging_enabled() {
        return produce(Box::new(io::stdout()));
    }

    let pager = Pager::new();
    produce(Box::new(PagerWriter::new(pager.clone())))?;
    minus::page_all(pager)?;

    Ok(())
}
