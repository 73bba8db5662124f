pub mod error;
pub mod types;

pub use error::{EcosortError, EcosortResult};
pub use types::ServiceInfo;
