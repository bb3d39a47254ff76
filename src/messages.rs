//! Action names and argument payloads for the WANIPConnection service.
//!
//! Payloads are the argument fragments handed to the UPnP library, which
//! wraps them in the SOAP envelope itself. Argument order follows the
//! service definition; some gateways reject reordered arguments.

use crate::mapping::{MappingRequest, PortMappingProtocol};

pub const GET_GENERIC_PORT_MAPPING_ENTRY: &str = "GetGenericPortMappingEntry";

pub const ADD_PORT_MAPPING: &str = "AddPortMapping";

pub const DELETE_PORT_MAPPING: &str = "DeletePortMapping";

pub const GET_EXTERNAL_IP_ADDRESS: &str = "GetExternalIPAddress";

pub fn format_mapping_entry_args(index: u32) -> String {
    format!("<NewPortMappingIndex>{}</NewPortMappingIndex>", index)
}

pub fn format_add_mapping_args(request: &MappingRequest) -> String {
    format!(
        "<NewRemoteHost></NewRemoteHost>
<NewExternalPort>{}</NewExternalPort>
<NewProtocol>{}</NewProtocol>
<NewInternalPort>{}</NewInternalPort>
<NewInternalClient>{}</NewInternalClient>
<NewEnabled>1</NewEnabled>
<NewPortMappingDescription>{}</NewPortMappingDescription>
<NewLeaseDuration>{}</NewLeaseDuration>",
        request.external_port,
        request.protocol,
        request.internal_port,
        request.internal_client,
        xml_escape(&request.description),
        request.lease_duration,
    )
}

pub fn format_delete_mapping_args(protocol: PortMappingProtocol, external_port: u16) -> String {
    format!(
        "<NewRemoteHost></NewRemoteHost>
<NewExternalPort>{}</NewExternalPort>
<NewProtocol>{}</NewProtocol>",
        external_port, protocol,
    )
}

// The description is the only free-text argument; everything else is
// numeric or an address.
fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn add_args_carry_every_field() {
        let request = MappingRequest {
            protocol: PortMappingProtocol::UDP,
            external_port: 6881,
            internal_port: 6882,
            internal_client: Ipv4Addr::new(192, 168, 1, 10),
            description: "seed box".to_string(),
            lease_duration: 3600,
        };
        let args = format_add_mapping_args(&request);
        assert!(args.contains("<NewExternalPort>6881</NewExternalPort>"));
        assert!(args.contains("<NewProtocol>UDP</NewProtocol>"));
        assert!(args.contains("<NewInternalPort>6882</NewInternalPort>"));
        assert!(args.contains("<NewInternalClient>192.168.1.10</NewInternalClient>"));
        assert!(args.contains("<NewPortMappingDescription>seed box</NewPortMappingDescription>"));
        assert!(args.contains("<NewLeaseDuration>3600</NewLeaseDuration>"));
        assert!(args.contains("<NewEnabled>1</NewEnabled>"));
    }

    #[test]
    fn description_is_escaped() {
        let request = MappingRequest {
            protocol: PortMappingProtocol::TCP,
            external_port: 80,
            internal_port: 80,
            internal_client: Ipv4Addr::new(10, 0, 0, 2),
            description: "web <& \"proxy\">".to_string(),
            lease_duration: 0,
        };
        let args = format_add_mapping_args(&request);
        assert!(args.contains("web &lt;&amp; &quot;proxy&quot;&gt;"));
    }

    #[test]
    fn delete_args_hold_port_and_protocol() {
        let args = format_delete_mapping_args(PortMappingProtocol::TCP, 8080);
        assert!(args.contains("<NewExternalPort>8080</NewExternalPort>"));
        assert!(args.contains("<NewProtocol>TCP</NewProtocol>"));
    }
}
