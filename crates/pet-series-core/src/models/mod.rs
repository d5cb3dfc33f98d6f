//! Domain models for PET series management.

mod legacy;
mod measurement;
mod transport;

pub use legacy::*;
pub use measurement::*;
pub use transport::*;
