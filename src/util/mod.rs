//! Utility module
//!
//! Byte rendering helpers used by the packet dumps, and logging setup.

use std::fmt::Write;

use tracing_subscriber::EnvFilter;

/// Renders bytes as space separated hex, 16 bytes per line.
///
/// `start` is the frame offset of the first byte, so a payload dump wraps on
/// the same columns as a full packet dump.
pub fn hex_lines(bytes: &[u8], start: usize) -> String {
    let mut out = String::new();
    for (i, b) in bytes.iter().enumerate() {
        if (start + i) % 16 == 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:02x} ", b);
    }
    out
}

/// Renders printable ASCII as-is and everything else as `0x..`
pub fn printable(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b.is_ascii_graphic() || b == b' ' {
            out.push(b as char);
        } else {
            let _ = write!(out, "0x{:x}", b);
        }
    }
    out
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs a fmt subscriber writing to stderr, filtered by `RUST_LOG` and
/// falling back to `default_level`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Like [`init_tracing`], but routes output through the test harness capture
pub fn init_test_tracing(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_test_writer()
        .try_init();
}
