#[cfg(test)]
pub mod fake;
mod http;

pub use http::*;
