mod client;
pub use client::{PRESHARED_KEY_HEADER, PlatformClient, PlatformConfig};

mod error;
pub use error::PlatformError;

mod payload;
pub use payload::{FileUpload, OutputPayload};

mod platform;
pub use platform::Platform;

pub mod routes;
