pub mod app;

pub use app::{health_check, index, metrics_endpoint};
