#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod duration;
mod int_or_string;
pub mod policy;

pub use self::{duration::Duration, int_or_string::IntOrString};
