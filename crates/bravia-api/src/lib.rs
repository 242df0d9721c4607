// bravia-api: Async request executor for Sony Bravia REST and IRCC endpoints

pub mod auth;
pub mod error;
pub mod outcome;
pub mod request;
pub mod soap;
pub mod transport;

pub use reqwest::header;

pub use auth::{AuthStrategy, Credentials, PinSession};
pub use error::Error;
pub use outcome::{ErrorOutcome, VendorError, classify};
pub use request::{JsonBody, RequestBody, RequestExecutor, Response, ResponseBody};
pub use transport::{TlsMode, TransportConfig};
