#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod document;
pub mod log;
#[allow(clippy::module_name_repetitions)]
pub mod memory;
