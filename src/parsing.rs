//! Decoding of WANIPConnection action responses.
//!
//! The UPnP library hands back responses as flat maps of argument name to
//! raw text; these helpers turn them into typed values, field by field.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::errors::RequestError;
use crate::mapping::{PortMappingEntry, PortMappingProtocol};

type Response = HashMap<String, String>;

fn field<'a>(response: &'a Response, name: &'static str) -> Result<&'a str, RequestError> {
    response
        .get(name)
        .map(String::as_str)
        .ok_or(RequestError::MissingField(name))
}

fn parse_field<T: FromStr>(response: &Response, name: &'static str) -> Result<T, RequestError> {
    let value = field(response, name)?;
    value.parse().map_err(|_| RequestError::InvalidField {
        field: name,
        value: value.to_string(),
    })
}

pub fn parse_mapping_entry(response: &Response) -> Result<PortMappingEntry, RequestError> {
    let enabled = match field(response, "NewEnabled")? {
        "1" => true,
        "0" => false,
        other => {
            return Err(RequestError::InvalidField {
                field: "NewEnabled",
                value: other.to_string(),
            })
        }
    };
    Ok(PortMappingEntry {
        // Routers routinely leave these two out for unrestricted mappings.
        remote_host: response.get("NewRemoteHost").cloned().unwrap_or_default(),
        external_port: parse_field(response, "NewExternalPort")?,
        protocol: parse_field::<PortMappingProtocol>(response, "NewProtocol")?,
        internal_port: parse_field(response, "NewInternalPort")?,
        internal_client: field(response, "NewInternalClient")?.to_string(),
        enabled,
        description: response
            .get("NewPortMappingDescription")
            .cloned()
            .unwrap_or_default(),
        lease_duration: parse_field(response, "NewLeaseDuration")?,
    })
}

pub fn parse_external_ip(response: &Response) -> Result<Ipv4Addr, RequestError> {
    parse_field(response, "NewExternalIPAddress")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(pairs: &[(&str, &str)]) -> Response {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_entry() -> Response {
        response(&[
            ("NewRemoteHost", ""),
            ("NewExternalPort", "8080"),
            ("NewProtocol", "TCP"),
            ("NewInternalPort", "80"),
            ("NewInternalClient", "192.168.1.5"),
            ("NewEnabled", "1"),
            ("NewPortMappingDescription", "web server"),
            ("NewLeaseDuration", "0"),
        ])
    }

    #[test]
    fn parse_entry_ok() {
        let entry = parse_mapping_entry(&full_entry()).unwrap();
        assert_eq!(entry.external_port, 8080);
        assert_eq!(entry.protocol, PortMappingProtocol::TCP);
        assert_eq!(entry.internal_port, 80);
        assert_eq!(entry.internal_client, "192.168.1.5");
        assert!(entry.enabled);
        assert_eq!(entry.description, "web server");
        assert_eq!(entry.lease_duration, 0);
    }

    #[test]
    fn parse_entry_tolerates_absent_optional_fields() {
        let mut resp = full_entry();
        resp.remove("NewRemoteHost");
        resp.remove("NewPortMappingDescription");
        let entry = parse_mapping_entry(&resp).unwrap();
        assert_eq!(entry.remote_host, "");
        assert_eq!(entry.description, "");
    }

    #[test]
    fn parse_entry_missing_port_is_an_error() {
        let mut resp = full_entry();
        resp.remove("NewExternalPort");
        match parse_mapping_entry(&resp) {
            Err(RequestError::MissingField("NewExternalPort")) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parse_entry_rejects_bad_enabled_flag() {
        let mut resp = full_entry();
        resp.insert("NewEnabled".to_string(), "yes".to_string());
        match parse_mapping_entry(&resp) {
            Err(RequestError::InvalidField { field: "NewEnabled", .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parse_external_ip_ok() {
        let resp = response(&[("NewExternalIPAddress", "203.0.113.7")]);
        assert_eq!(parse_external_ip(&resp).unwrap(), Ipv4Addr::new(203, 0, 113, 7));
    }

    #[test]
    fn parse_external_ip_garbage_is_an_error() {
        let resp = response(&[("NewExternalIPAddress", "not-an-ip")]);
        assert!(parse_external_ip(&resp).is_err());
    }
}
