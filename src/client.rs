use std::net::Ipv4Addr;
use std::time::Duration;

use crate::errors::RequestError;
use crate::mapping::{MappingRequest, PortMappingEntry, PortMappingProtocol};

/// Service identifier a device must advertise to qualify as a usable gateway.
pub const WANIP_CONN_SERVICE_ID: &str = "urn:upnp-org:serviceId:WANIPConn1";

/// A UPnP control point able to find devices on the network and to resolve
/// already-known ones by their description URL.
///
/// The production implementation lives in [`crate::upnp`]; operations take
/// this trait so they can be exercised against fakes.
pub trait UpnpClient {
    /// Search the local network for devices, waiting at most `timeout`.
    ///
    /// Discovery is best-effort: absence of a response does not imply
    /// absence of a device, and responders that cannot be probed are
    /// dropped by the implementation rather than failing the search.
    fn discover(&self, timeout: Duration) -> Result<Vec<Box<dyn GatewayDevice>>, RequestError>;

    /// Fetch and parse the description document at `location`.
    fn resolve(&self, location: &str) -> Result<Box<dyn GatewayDevice>, RequestError>;
}

/// One discovered or resolved device.
pub trait GatewayDevice {
    /// Human-readable name from the description document.
    fn friendly_name(&self) -> String;

    /// URL of the description document. This is the value the selection
    /// store persists.
    fn location(&self) -> String;

    /// Probe for the WAN IP connection capability.
    ///
    /// `None` means the device does not advertise
    /// [`WANIP_CONN_SERVICE_ID`] and is not a usable gateway for this tool.
    /// That outcome is ordinary and carries no error.
    fn wan_connection(&self) -> Option<Box<dyn WanConnection + '_>>;
}

/// The WANIPConnection service of a gateway.
pub trait WanConnection {
    /// Fetch the mapping entry at `index`.
    ///
    /// Gateways report "no more entries" by failing this call; on the wire
    /// running past the end is indistinguishable from a transport error.
    /// [`crate::mapping::PortMappings`] turns that into an explicit end of
    /// sequence.
    fn mapping_entry(&self, index: u32) -> Result<PortMappingEntry, RequestError>;

    /// Create a port mapping. The remote host is left unrestricted and the
    /// mapping is requested enabled.
    fn add_mapping(&self, request: &MappingRequest) -> Result<(), RequestError>;

    /// Delete the mapping identified by `(external_port, protocol)`.
    ///
    /// The protocol offers no finer deletion key: two mappings sharing
    /// external port and protocol cannot be told apart here.
    fn delete_mapping(
        &self,
        protocol: PortMappingProtocol,
        external_port: u16,
    ) -> Result<(), RequestError>;

    /// Query the external IP address of the gateway.
    fn external_ip(&self) -> Result<Ipv4Addr, RequestError>;
}
