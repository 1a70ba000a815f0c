pub(crate) mod config;
pub(crate) mod loader;
pub(crate) mod store;
