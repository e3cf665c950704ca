pub mod outcome;
pub mod request;

pub use outcome::{Credentials, FailureInfo, Outcome, ProvisioningResult, Row};
pub use request::{ConnectionOptions, ProvisionRequest, Statement, DEFAULT_DATABASE};
