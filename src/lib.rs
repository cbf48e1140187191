#![warn(rust_2018_idioms)]

pub use util;

pub mod error;
pub mod relay;

pub use error::{Error, Result};
