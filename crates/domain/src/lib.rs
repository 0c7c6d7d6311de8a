#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
mod leaderboard;
mod plate;
mod progress;
mod service;
mod settings;
mod statistics;
mod streak;
mod user;
mod workout;

pub use error::*;
pub use exercise::*;
pub use leaderboard::*;
pub use plate::*;
pub use progress::*;
pub use service::*;
pub use settings::*;
pub use statistics::*;
pub use streak::*;
pub use user::*;
pub use workout::*;
