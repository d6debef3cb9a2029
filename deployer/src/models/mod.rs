//! Wire models

pub mod customization;
