use std::error;
use std::fmt;
use std::io;

/// Errors that can occur when talking to a device through the UPnP library.
#[derive(Debug)]
pub enum RequestError {
    /// The UPnP library failed to carry out the request.
    Upnp(rupnp::Error),
    /// The device location could not be parsed as a URL.
    InvalidLocation(http::uri::InvalidUri),
    /// The response was missing a required field.
    MissingField(&'static str),
    /// A response field held a value that could not be parsed.
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value as returned by the device.
        value: String,
    },
}

impl From<rupnp::Error> for RequestError {
    fn from(err: rupnp::Error) -> RequestError {
        RequestError::Upnp(err)
    }
}

impl From<http::uri::InvalidUri> for RequestError {
    fn from(err: http::uri::InvalidUri) -> RequestError {
        RequestError::InvalidLocation(err)
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RequestError::Upnp(ref e) => write!(f, "UPnP request failed: {}", e),
            RequestError::InvalidLocation(ref e) => write!(f, "invalid device URL: {}", e),
            RequestError::MissingField(field) => write!(f, "response is missing field {}", field),
            RequestError::InvalidField { field, ref value } => {
                write!(f, "response field {} has invalid value {:?}", field, value)
            }
        }
    }
}

impl error::Error for RequestError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            RequestError::Upnp(ref e) => Some(e),
            RequestError::InvalidLocation(ref e) => Some(e),
            RequestError::MissingField(..) => None,
            RequestError::InvalidField { .. } => None,
        }
    }
}

/// Errors raised by the device selection store.
#[derive(Debug)]
pub enum StoreError {
    /// No per-user configuration directory could be determined.
    NoConfigDir,
    /// Reading or writing the record file failed.
    Io(io::Error),
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> StoreError {
        StoreError::Io(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StoreError::NoConfigDir => write!(f, "no per-user configuration directory available"),
            StoreError::Io(ref e) => write!(f, "device record access failed: {}", e),
        }
    }
}

impl error::Error for StoreError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            StoreError::NoConfigDir => None,
            StoreError::Io(ref e) => Some(e),
        }
    }
}

/// Errors resolving the device an operation should target.
#[derive(Debug)]
pub enum ActiveDeviceError {
    /// Neither an override, the record file nor the environment named a device.
    NotSelected,
    /// The selected URL could not be resolved into a live device.
    Resolve {
        /// URL that was being resolved.
        location: String,
        /// Failure reported while resolving it.
        source: RequestError,
    },
}

impl fmt::Display for ActiveDeviceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ActiveDeviceError::NotSelected => {
                write!(f, "no device selected; run `igdctl discover` or pass --device")
            }
            ActiveDeviceError::Resolve { ref location, ref source } => {
                write!(f, "failed to resolve device {:?}: {}", location, source)
            }
        }
    }
}

impl error::Error for ActiveDeviceError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            ActiveDeviceError::NotSelected => None,
            ActiveDeviceError::Resolve { ref source, .. } => Some(source),
        }
    }
}

/// Errors raised while persisting an interactive device selection.
#[derive(Debug)]
pub enum SelectError {
    /// The prompt input stream failed or ended before a valid index came in.
    Prompt(io::Error),
    /// Writing the selection to the store failed.
    Store(StoreError),
}

impl From<StoreError> for SelectError {
    fn from(err: StoreError) -> SelectError {
        SelectError::Store(err)
    }
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SelectError::Prompt(ref e) => write!(f, "device selection aborted: {}", e),
            SelectError::Store(ref e) => write!(f, "failed to persist device selection: {}", e),
        }
    }
}

impl error::Error for SelectError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            SelectError::Prompt(ref e) => Some(e),
            SelectError::Store(ref e) => Some(e),
        }
    }
}

/// The protocol argument was neither TCP nor UDP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProtocol(pub String);

impl fmt::Display for InvalidProtocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "protocol must be TCP or UDP, not {:?}", self.0)
    }
}

impl error::Error for InvalidProtocol {}
