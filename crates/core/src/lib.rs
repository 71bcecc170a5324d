#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod captures;
pub mod compiler;
pub mod config;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
