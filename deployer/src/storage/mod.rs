//! Settings and package storage

pub mod layout;
pub mod settings;
