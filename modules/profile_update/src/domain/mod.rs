pub mod error;
pub mod events;
pub mod fields;
pub mod ports;
pub mod repo;
pub mod service;
