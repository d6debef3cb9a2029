//! custdeploy library
//!
//! Deploys customization packages to a platform instance through its
//! Customization API: login, ordered uploads, publish, status polling, logout.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod storage;
pub mod utils;
