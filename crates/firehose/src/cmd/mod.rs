//! Command implementations for the firehose CLI

pub mod check;
pub mod smoke;
