pub mod bootstrap;

pub use bootstrap::{BootstrapResponse, Bootstrapper};
