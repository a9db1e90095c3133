// src/lib.rs

pub mod alias;
pub mod calc;
pub mod chart;
pub mod cli;
pub mod core;
pub mod error;
pub mod file;
pub mod params;
pub mod store;
pub mod timer;

pub use chart::{Entry, Options};
pub use error::{Error, Result};
pub use store::{Freshness, Store};
