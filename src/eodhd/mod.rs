//! EODHD client for downloading daily FX history

mod client;
mod types;

pub use client::{ClientConfig, EodhdClient, EODHD_API_BASE};
pub use types::*;
