pub mod convert;
pub mod health;
pub mod home;

pub use convert::convert_to_pdf;
pub use health::{health_check, metrics_endpoint};
pub use home::home;
