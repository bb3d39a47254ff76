//! Manage NAT port mappings on UPnP Internet Gateway Devices.
//!
//! The crate splits into a small synchronous core — device selection,
//! discovery flow and mapping operations written against the [`client`]
//! capability traits — and one production implementation of those traits
//! in [`upnp`], backed by the `rupnp` control point library.

// collaborator capability interface
pub use crate::client::GatewayDevice;
pub use crate::client::UpnpClient;
pub use crate::client::WanConnection;
pub use crate::client::WANIP_CONN_SERVICE_ID;

// mapping operations
pub use crate::mapping::{list, mappings};
pub use crate::mapping::{MappingRequest, PortMappingEntry, PortMappingProtocol, PortMappings};

// device selection
pub use crate::store::{active_device, SelectionStore, DEVICE_ENV_VAR};

// discovery flow
pub use crate::discover::{find_candidates, select_device, Candidate, DEFAULT_TIMEOUT};

// production collaborator
pub use crate::upnp::RupnpClient;

// error types
pub use crate::errors::{
    ActiveDeviceError, InvalidProtocol, RequestError, SelectError, StoreError,
};

pub mod client;
pub mod discover;
pub mod errors;
pub mod mapping;
pub mod messages;
pub mod parsing;
pub mod store;
pub mod upnp;
