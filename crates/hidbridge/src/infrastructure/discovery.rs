//! Automatic serial-port discovery for the micro:bit.
//!
//! Candidates are tried in order of confidence:
//!
//! 1. An explicitly configured port always wins, unverified.
//! 2. USB vendor/product ID match (the DAPLink interface chip carries the
//!    same IDs on every board revision).
//! 3. Port description keyword match (`microbit`, `micro:bit`, `mbed`).
//! 4. Platform-specific well-known device names, verified by a probe open.
//!
//! When every tier comes up empty the caller gets
//! [`DiscoveryError::NoDeviceFound`] and reports it; discovery failure is
//! never a panic.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::serial::{list_ports, PortDescriptor};

/// USB `(vendor, product)` IDs of the micro:bit's DAPLink interface:
/// `0x0204` on v1 boards, `0x0206` on v2.
pub const MICROBIT_USB_IDS: [(u16, u16); 2] = [(0x0D28, 0x0204), (0x0D28, 0x0206)];

/// Lowercased substrings that identify the board in a port description.
pub const DESCRIPTION_KEYWORDS: [&str; 3] = ["microbit", "micro:bit", "mbed"];

/// Baud rate used for probe opens of fallback candidates. Probing only
/// checks that the port exists and is openable; the session reopens it at
/// the configured baud.
pub const PROBE_BAUD: u32 = 115_200;

const PROBE_TIMEOUT: Duration = Duration::from_millis(200);

/// Error type for device discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The OS port enumeration itself failed.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[from] serialport::Error),

    /// Every tier was exhausted without finding a device.
    #[error("no micro:bit serial device found; pass --port to select one explicitly")]
    NoDeviceFound,
}

// ── Platform fallback candidates ──────────────────────────────────────────────

/// Host platform, as far as fallback device naming is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(Platform::Windows)
        } else if cfg!(target_os = "linux") {
            Some(Platform::Linux)
        } else if cfg!(target_os = "macos") {
            Some(Platform::MacOs)
        } else {
            None
        }
    }
}

/// One fallback candidate: either an exact device name or a glob over a
/// device directory (macOS enumerates modem devices with unpredictable
/// numeric suffixes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortCandidate {
    Literal(&'static str),
    Glob(&'static str),
}

/// Well-known device names to probe when enumeration finds nothing.
pub fn fallback_candidates(platform: Platform) -> Vec<PortCandidate> {
    use PortCandidate::{Glob, Literal};
    match platform {
        Platform::Windows => vec![
            Literal("COM3"),
            Literal("COM4"),
            Literal("COM5"),
            Literal("COM6"),
        ],
        Platform::Linux => vec![Literal("/dev/ttyACM0"), Literal("/dev/ttyUSB0")],
        Platform::MacOs => vec![Glob("/dev/tty.usbmodem*"), Glob("/dev/cu.usbmodem*")],
    }
}

// ── Port selection ────────────────────────────────────────────────────────────

/// Picks the best match out of an enumerated port list: USB ID matches
/// beat description-keyword matches, and within a tier the first
/// enumerated port wins.
pub fn select_port(ports: &[PortDescriptor]) -> Option<&PortDescriptor> {
    if let Some(port) = ports
        .iter()
        .find(|p| p.usb_id.is_some_and(|id| MICROBIT_USB_IDS.contains(&id)))
    {
        return Some(port);
    }
    ports.iter().find(|p| {
        p.description.as_deref().is_some_and(|d| {
            let lowered = d.to_ascii_lowercase();
            DESCRIPTION_KEYWORDS.iter().any(|kw| lowered.contains(kw))
        })
    })
}

/// Resolves the serial port to bridge over.
///
/// # Errors
///
/// Returns [`DiscoveryError::Enumerate`] if the OS cannot list ports at all,
/// and [`DiscoveryError::NoDeviceFound`] when all tiers come up empty.
pub fn find_port(configured: Option<&str>) -> Result<String, DiscoveryError> {
    // Tier 1: an explicit port is trusted as-is.
    if let Some(port) = configured {
        info!(port, "using configured serial port");
        return Ok(port.to_string());
    }

    // Tiers 2 and 3: enumerate and match.
    let ports = list_ports()?;
    debug!(count = ports.len(), "enumerated serial ports");
    if let Some(port) = select_port(&ports) {
        info!(
            port = %port.device,
            description = port.description.as_deref().unwrap_or("?"),
            "discovered micro:bit"
        );
        return Ok(port.device.clone());
    }

    // Tier 4: probe well-known device names for this platform.
    if let Some(platform) = Platform::current() {
        for candidate in fallback_candidates(platform) {
            for device in expand_candidate(candidate) {
                if probe_open(&device) {
                    info!(port = %device, "found device via platform fallback");
                    return Ok(device);
                }
            }
        }
    }

    Err(DiscoveryError::NoDeviceFound)
}

/// Expands a candidate into concrete device paths, in sorted order for
/// deterministic probing.
fn expand_candidate(candidate: PortCandidate) -> Vec<String> {
    match candidate {
        PortCandidate::Literal(name) => vec![name.to_string()],
        PortCandidate::Glob(pattern) => {
            let Some((dir, file_pattern)) = pattern.rsplit_once('/') else {
                return Vec::new();
            };
            let Ok(entries) = std::fs::read_dir(Path::new(dir)) else {
                return Vec::new();
            };
            let mut matches: Vec<String> = entries
                .flatten()
                .filter_map(|entry| {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    glob_match(file_pattern, &name).then(|| format!("{dir}/{name}"))
                })
                .collect();
            matches.sort();
            matches
        }
    }
}

/// Minimal glob matcher supporting `*` only, which is all the fallback
/// patterns use.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn matches(pattern: &[u8], text: &[u8]) -> bool {
        match pattern.split_first() {
            None => text.is_empty(),
            Some((b'*', rest)) => {
                (0..=text.len()).any(|skip| matches(rest, &text[skip..]))
            }
            Some((&p, rest)) => text.split_first().is_some_and(|(&t, text_rest)| {
                p == t && matches(rest, text_rest)
            }),
        }
    }
    matches(pattern.as_bytes(), text.as_bytes())
}

/// Checks whether a device path exists and can be opened as a serial port.
fn probe_open(device: &str) -> bool {
    match serialport::new(device, PROBE_BAUD)
        .timeout(PROBE_TIMEOUT)
        .open()
    {
        Ok(_) => true,
        Err(e) => {
            debug!(device, error = %e, "fallback probe failed");
            false
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
