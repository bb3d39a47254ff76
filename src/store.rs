//! Persistence of the selected device.
//!
//! The record is a two-line file: the device description URL and a fixed
//! signature marker. It is re-read on every invocation; nothing is cached,
//! and concurrent invocations against the same file are assumed not to
//! happen.

use std::env;
use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::client::{GatewayDevice, UpnpClient};
use crate::errors::{ActiveDeviceError, StoreError};

/// Environment variable consulted when no record file exists.
pub const DEVICE_ENV_VAR: &str = "UPNP_DEVICE";

/// Marker written on the second line of the record file.
pub const FILE_SIGNATURE: &str = "selected device record written by igdctl";

const RECORD_FILE: &str = ".upnpDevice";

/// File-backed record of the currently selected device URL.
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    /// Store at the per-user configuration path.
    pub fn open() -> Result<SelectionStore, StoreError> {
        let dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(SelectionStore::at(dir.join(RECORD_FILE)))
    }

    /// Store backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> SelectionStore {
        SelectionStore { path: path.into() }
    }

    /// URL of the selected device, if any.
    ///
    /// An existing record file wins over the environment variable, even
    /// when its first line is empty. The signature line is informational
    /// and not validated; a surprising second line is only reported at
    /// debug level.
    pub fn selected_url(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let mut lines = contents.lines();
                let url = lines.next().unwrap_or("").trim();
                if let Some(signature) = lines.next() {
                    if signature != FILE_SIGNATURE {
                        debug!(
                            "unexpected signature line in {}: {:?}",
                            self.path.display(),
                            signature
                        );
                    }
                }
                if url.is_empty() {
                    None
                } else {
                    Some(url.to_string())
                }
            }
            Err(_) => {
                let url = env::var(DEVICE_ENV_VAR).ok()?;
                let url = url.trim();
                if url.is_empty() {
                    None
                } else {
                    Some(url.to_string())
                }
            }
        }
    }

    /// Overwrite the record with `url`.
    pub fn select(&self, url: &str) -> Result<(), StoreError> {
        fs::write(&self.path, format!("{}\n{}", url, FILE_SIGNATURE))?;
        Ok(())
    }
}

/// Resolve the device an operation should target.
///
/// An explicit `override_url` wins over the persisted record. The resolved
/// handle is handed to operations by the caller; no global state ever
/// holds it.
pub fn active_device(
    client: &dyn UpnpClient,
    store: &SelectionStore,
    override_url: Option<&str>,
) -> Result<Box<dyn GatewayDevice>, ActiveDeviceError> {
    let location = match override_url {
        Some(url) => url.to_string(),
        None => store.selected_url().ok_or(ActiveDeviceError::NotSelected)?,
    };
    client
        .resolve(&location)
        .map_err(|source| ActiveDeviceError::Resolve { location, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WanConnection;
    use crate::errors::RequestError;
    use std::time::Duration;

    struct ResolveAnything;

    struct ResolvedDevice {
        location: String,
    }

    impl GatewayDevice for ResolvedDevice {
        fn friendly_name(&self) -> String {
            "fake gateway".to_string()
        }

        fn location(&self) -> String {
            self.location.clone()
        }

        fn wan_connection(&self) -> Option<Box<dyn WanConnection + '_>> {
            None
        }
    }

    impl UpnpClient for ResolveAnything {
        fn discover(
            &self,
            _timeout: Duration,
        ) -> Result<Vec<Box<dyn GatewayDevice>>, RequestError> {
            Ok(Vec::new())
        }

        fn resolve(&self, location: &str) -> Result<Box<dyn GatewayDevice>, RequestError> {
            Ok(Box::new(ResolvedDevice {
                location: location.to_string(),
            }))
        }
    }

    fn temp_store() -> (tempfile::TempDir, SelectionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SelectionStore::at(dir.path().join(RECORD_FILE));
        (dir, store)
    }

    #[test]
    fn round_trip() {
        let (_dir, store) = temp_store();
        store.select("http://192.168.1.1:5000/rootDesc.xml").unwrap();
        assert_eq!(
            store.selected_url().as_deref(),
            Some("http://192.168.1.1:5000/rootDesc.xml")
        );
    }

    #[test]
    fn signature_is_written_and_ignored_on_read() {
        let (dir, store) = temp_store();
        store.select("http://192.168.1.1:5000/rootDesc.xml").unwrap();
        let contents = fs::read_to_string(dir.path().join(RECORD_FILE)).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("http://192.168.1.1:5000/rootDesc.xml"));
        assert_eq!(lines.next(), Some(FILE_SIGNATURE));

        // A foreign signature does not invalidate the record.
        fs::write(
            dir.path().join(RECORD_FILE),
            "http://192.168.1.1:5000/rootDesc.xml\nsomething else entirely",
        )
        .unwrap();
        assert_eq!(
            store.selected_url().as_deref(),
            Some("http://192.168.1.1:5000/rootDesc.xml")
        );
    }

    #[test]
    fn select_overwrites_previous_record() {
        let (_dir, store) = temp_store();
        store.select("http://192.168.1.1:5000/rootDesc.xml").unwrap();
        store.select("http://10.0.0.1:49152/desc.xml").unwrap();
        assert_eq!(
            store.selected_url().as_deref(),
            Some("http://10.0.0.1:49152/desc.xml")
        );
    }

    #[test]
    fn env_var_is_the_fallback_when_no_file_exists() {
        let (_dir, store) = temp_store();
        env::remove_var(DEVICE_ENV_VAR);
        assert_eq!(store.selected_url(), None);

        env::set_var(DEVICE_ENV_VAR, "http://10.0.0.1:49152/desc.xml");
        assert_eq!(
            store.selected_url().as_deref(),
            Some("http://10.0.0.1:49152/desc.xml")
        );
        env::remove_var(DEVICE_ENV_VAR);
    }

    #[test]
    fn resolves_persisted_selection() {
        let (_dir, store) = temp_store();
        store.select("http://192.168.1.1:5000/rootDesc.xml").unwrap();
        let device = active_device(&ResolveAnything, &store, None).unwrap();
        assert_eq!(device.location(), "http://192.168.1.1:5000/rootDesc.xml");
    }

    #[test]
    fn override_wins_over_record() {
        let (_dir, store) = temp_store();
        store.select("http://192.168.1.1:5000/rootDesc.xml").unwrap();
        let device =
            active_device(&ResolveAnything, &store, Some("http://10.0.0.1:49152/desc.xml"))
                .unwrap();
        assert_eq!(device.location(), "http://10.0.0.1:49152/desc.xml");
    }

    #[test]
    fn empty_record_reports_nothing_selected() {
        let (dir, store) = temp_store();
        // An existing but empty record wins over the environment.
        fs::write(dir.path().join(RECORD_FILE), "").unwrap();
        match active_device(&ResolveAnything, &store, None) {
            Err(ActiveDeviceError::NotSelected) => {}
            other => panic!("unexpected result: {:?}", other.map(|d| d.location())),
        }
    }
}
