pub mod auth;
pub mod error;
pub mod geocode;
pub mod rest;
pub mod session;
pub mod telemetry;
