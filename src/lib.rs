//! Order Settlement - payment webhook intake and settlement pipeline
//!
//! This crate turns payment-provider checkout events into exactly-once order
//! records, splits settled funds between the platform and the vendor, and
//! dispatches push notifications to the devices of everyone involved.

pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
