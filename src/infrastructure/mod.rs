pub mod core;
pub mod factory;
pub mod mock;
pub mod raw_log;
pub mod store;
pub mod weather;

pub use factory::{ServiceFactory, Services};
