use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use log::debug;

use crate::client::WanConnection;
use crate::errors::InvalidProtocol;

/// Represents the protocols available for port mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortMappingProtocol {
    /// TCP protocol
    TCP,
    /// UDP protocol
    UDP,
}

impl fmt::Display for PortMappingProtocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            PortMappingProtocol::TCP => "TCP",
            PortMappingProtocol::UDP => "UDP",
        })
    }
}

impl FromStr for PortMappingProtocol {
    type Err = InvalidProtocol;

    /// Case-insensitive; anything but TCP or UDP is rejected before any
    /// network call gets a chance to happen.
    fn from_str(s: &str) -> Result<PortMappingProtocol, InvalidProtocol> {
        if s.eq_ignore_ascii_case("tcp") {
            Ok(PortMappingProtocol::TCP)
        } else if s.eq_ignore_ascii_case("udp") {
            Ok(PortMappingProtocol::UDP)
        } else {
            Err(InvalidProtocol(s.to_string()))
        }
    }
}

/// One port mapping entry as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMappingEntry {
    /// Remote host the mapping is restricted to. Empty means any.
    pub remote_host: String,
    /// The external port of the mapping.
    pub external_port: u16,
    /// The protocol of the mapping.
    pub protocol: PortMappingProtocol,
    /// The internal (local) port.
    pub internal_port: u16,
    /// Address or host name the traffic is forwarded to.
    pub internal_client: String,
    /// Whether the mapping is currently enabled.
    pub enabled: bool,
    /// Free-text description attached to the mapping.
    pub description: String,
    /// Lease duration in seconds. 0 means infinite.
    pub lease_duration: u32,
}

/// Parameters of a mapping creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRequest {
    /// The protocol to map.
    pub protocol: PortMappingProtocol,
    /// The external port to open.
    pub external_port: u16,
    /// The internal port the traffic is sent to.
    pub internal_port: u16,
    /// The internal host the traffic is sent to.
    pub internal_client: Ipv4Addr,
    /// Free-text description attached to the mapping.
    pub description: String,
    /// Lease duration in seconds. 0 means infinite.
    pub lease_duration: u32,
}

/// Lazy enumeration of the mappings present on a connection.
///
/// The gateway signals the end of its table by failing the per-index query,
/// so the first failure ends the sequence instead of surfacing as an error.
pub struct PortMappings<'a> {
    conn: &'a dyn WanConnection,
    index: u32,
    done: bool,
}

/// Enumerate the mappings on `conn` starting at index 0.
pub fn mappings(conn: &dyn WanConnection) -> PortMappings<'_> {
    PortMappings {
        conn,
        index: 0,
        done: false,
    }
}

impl Iterator for PortMappings<'_> {
    type Item = PortMappingEntry;

    fn next(&mut self) -> Option<PortMappingEntry> {
        if self.done {
            return None;
        }
        match self.conn.mapping_entry(self.index) {
            Ok(entry) => {
                self.index += 1;
                Some(entry)
            }
            Err(err) => {
                debug!("mapping enumeration ended at index {}: {}", self.index, err);
                self.done = true;
                None
            }
        }
    }
}

/// Collect every mapping currently present on `conn`, in index order.
pub fn list(conn: &dyn WanConnection) -> Vec<PortMappingEntry> {
    mappings(conn).collect()
}
