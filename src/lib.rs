pub mod aws;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod service;

pub use error::BootstrapError;
pub use handlers::bootstrap::{BootstrapResponse, Bootstrapper};
