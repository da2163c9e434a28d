//! Greeting service with a load-balancer health probe.
pub mod config;
pub mod handlers;
pub mod startup;
