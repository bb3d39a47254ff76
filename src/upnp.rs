//! Production collaborator backed by the `rupnp` control point library.
//!
//! `rupnp` owns the SSDP transport, description fetching and SOAP encoding;
//! nothing in this crate touches raw sockets or XML. The library is async,
//! so every call is driven to completion on a current-thread runtime and
//! callers stay synchronous and blocking throughout.

use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::rc::Rc;
use std::time::Duration;

use futures::pin_mut;
use futures::stream::StreamExt;
use http::Uri;
use log::debug;
use rupnp::ssdp::SearchTarget;
use rupnp::{Device, Service};
use tokio::runtime::{Builder, Runtime};

use crate::client::{GatewayDevice, UpnpClient, WanConnection, WANIP_CONN_SERVICE_ID};
use crate::errors::RequestError;
use crate::mapping::{MappingRequest, PortMappingEntry, PortMappingProtocol};
use crate::{messages, parsing};

/// UPnP control point talking to real devices.
pub struct RupnpClient {
    runtime: Rc<Runtime>,
}

impl RupnpClient {
    /// Create a client with its own single-threaded runtime.
    pub fn new() -> io::Result<RupnpClient> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(RupnpClient {
            runtime: Rc::new(runtime),
        })
    }

    fn wrap(&self, device: Device) -> Box<dyn GatewayDevice> {
        Box::new(RupnpDevice {
            runtime: self.runtime.clone(),
            device,
        })
    }
}

impl UpnpClient for RupnpClient {
    fn discover(&self, timeout: Duration) -> Result<Vec<Box<dyn GatewayDevice>>, RequestError> {
        let devices = self.runtime.block_on(async {
            let stream = rupnp::discover(&SearchTarget::RootDevice, timeout).await?;
            pin_mut!(stream);
            let mut devices = Vec::new();
            while let Some(found) = stream.next().await {
                match found {
                    Ok(device) => devices.push(device),
                    // Anything SSDP-speaking may answer the search;
                    // responders that cannot be probed are dropped.
                    Err(err) => debug!("dropping responder that failed to probe: {}", err),
                }
            }
            Ok::<_, rupnp::Error>(devices)
        })?;
        Ok(devices.into_iter().map(|device| self.wrap(device)).collect())
    }

    fn resolve(&self, location: &str) -> Result<Box<dyn GatewayDevice>, RequestError> {
        let url: Uri = location.parse()?;
        let device = self.runtime.block_on(Device::from_url(url))?;
        Ok(self.wrap(device))
    }
}

struct RupnpDevice {
    runtime: Rc<Runtime>,
    device: Device,
}

impl GatewayDevice for RupnpDevice {
    fn friendly_name(&self) -> String {
        self.device.friendly_name().to_string()
    }

    fn location(&self) -> String {
        self.device.url().to_string()
    }

    fn wan_connection(&self) -> Option<Box<dyn WanConnection + '_>> {
        // WANIPConn1 usually sits on a nested WANConnectionDevice, hence
        // the walk over all services instead of the root service list.
        let service = self
            .device
            .services_iter()
            .find(|service| service.service_id() == WANIP_CONN_SERVICE_ID)?;
        Some(Box::new(RupnpWanConnection {
            runtime: &self.runtime,
            url: self.device.url(),
            service,
        }))
    }
}

struct RupnpWanConnection<'a> {
    runtime: &'a Runtime,
    url: &'a Uri,
    service: &'a Service,
}

impl RupnpWanConnection<'_> {
    fn action(&self, name: &str, args: &str) -> Result<HashMap<String, String>, RequestError> {
        let response = self
            .runtime
            .block_on(self.service.action(self.url, name, args))?;
        Ok(response)
    }
}

impl WanConnection for RupnpWanConnection<'_> {
    fn mapping_entry(&self, index: u32) -> Result<PortMappingEntry, RequestError> {
        let response = self.action(
            messages::GET_GENERIC_PORT_MAPPING_ENTRY,
            &messages::format_mapping_entry_args(index),
        )?;
        parsing::parse_mapping_entry(&response)
    }

    fn add_mapping(&self, request: &MappingRequest) -> Result<(), RequestError> {
        self.action(
            messages::ADD_PORT_MAPPING,
            &messages::format_add_mapping_args(request),
        )?;
        Ok(())
    }

    fn delete_mapping(
        &self,
        protocol: PortMappingProtocol,
        external_port: u16,
    ) -> Result<(), RequestError> {
        self.action(
            messages::DELETE_PORT_MAPPING,
            &messages::format_delete_mapping_args(protocol, external_port),
        )?;
        Ok(())
    }

    fn external_ip(&self) -> Result<Ipv4Addr, RequestError> {
        let response = self.action(messages::GET_EXTERNAL_IP_ADDRESS, "")?;
        parsing::parse_external_ip(&response)
    }
}
