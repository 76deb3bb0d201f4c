pub mod clinic;
pub mod status;

pub use clinic::Clinic;
pub use status::{StatusLabel, StatusResult};
