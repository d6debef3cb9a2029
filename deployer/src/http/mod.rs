//! Platform HTTP API

pub mod client;
pub mod customization;

#[cfg(test)]
pub(crate) mod test_server;
