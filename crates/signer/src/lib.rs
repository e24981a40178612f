pub mod client;
pub mod config;
pub mod encoding;
pub mod error;
pub mod params;
pub mod request;
pub mod signing;
pub mod transport;

pub use client::{ApiClient, SDK_VERSION};
pub use config::{ClientProfile, Credential, HttpProfile, ServiceDescriptor};
pub use encoding::ContentType;
pub use error::{ClientError, ErrorKind, Result};
pub use params::{CanonicalParams, flatten, flatten_value};
pub use request::RequestDescriptor;
pub use signing::{LegacySigner, RequestSigner, SignatureMethod, SigningContext, Tc3Signer};
pub use transport::{HyperTransport, Transport, TransportResponse};
