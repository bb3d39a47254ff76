//! Network discovery and device selection.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use log::{debug, warn};

use crate::client::UpnpClient;
use crate::errors::SelectError;
use crate::mapping;
use crate::store::SelectionStore;

/// Default SSDP search window.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// A device that qualifies as a target: it advertises WANIPConn1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Description document URL; the value persisted on selection.
    pub location: String,
    /// Human-readable device name.
    pub friendly_name: String,
    /// Number of mappings currently present on the device.
    pub mapping_count: usize,
}

/// Search the network and keep the devices exposing the WAN IP connection
/// service.
///
/// Devices without it are dropped silently. A failed search is folded into
/// an empty result: discovery is best-effort and never fatal.
pub fn find_candidates(client: &dyn UpnpClient, timeout: Duration) -> Vec<Candidate> {
    let devices = match client.discover(timeout) {
        Ok(devices) => devices,
        Err(err) => {
            warn!("discovery failed: {}", err);
            Vec::new()
        }
    };

    let mut candidates = Vec::new();
    for device in &devices {
        let conn = match device.wan_connection() {
            Some(conn) => conn,
            None => {
                debug!("{} does not expose WANIPConn1, skipping", device.location());
                continue;
            }
        };
        let mapping_count = mapping::mappings(conn.as_ref()).count();
        candidates.push(Candidate {
            location: device.location(),
            friendly_name: device.friendly_name(),
            mapping_count,
        });
    }
    candidates
}

/// Persist the selection dictated by the candidate list.
///
/// Zero candidates selects nothing. A single candidate is selected
/// automatically. With more than one, the user is asked for an index on
/// `input` until a valid one comes in; end of input aborts without
/// selecting anything. Returns the index that was persisted, if any.
pub fn select_device<R: BufRead, W: Write>(
    store: &SelectionStore,
    candidates: &[Candidate],
    input: &mut R,
    output: &mut W,
) -> Result<Option<usize>, SelectError> {
    let index = match candidates.len() {
        0 => return Ok(None),
        1 => 0,
        count => prompt_index(count, input, output).map_err(SelectError::Prompt)?,
    };
    store.select(&candidates[index].location)?;
    Ok(Some(index))
}

/// Ask for a candidate index until the answer parses and is in range.
fn prompt_index<R: BufRead, W: Write>(
    count: usize,
    input: &mut R,
    output: &mut W,
) -> io::Result<usize> {
    loop {
        write!(output, "Select device index: ")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // End of input is the user walking away, not a bad answer.
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no device index entered",
            ));
        }
        match line.trim().parse::<usize>() {
            Ok(index) if index < count => return Ok(index),
            _ => writeln!(output, "Please select a valid device index (0-{})", count - 1)?,
        }
    }
}
