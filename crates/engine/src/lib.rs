pub mod cut;
pub mod error;
pub mod fcpxml;
pub mod parser;

pub use cut::*;
pub use error::*;
