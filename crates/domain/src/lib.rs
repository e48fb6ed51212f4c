#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod catalog;

mod backup;
mod error;
mod exercise;
mod filter;
mod health;
mod id;
mod name;
mod personal_stats;
mod service;
mod statistics;
mod template;
mod user;
mod workout;

pub use backup::*;
pub use error::*;
pub use exercise::*;
pub use filter::*;
pub use health::*;
pub use id::*;
pub use name::*;
pub use personal_stats::*;
pub use service::*;
pub use statistics::*;
pub use template::*;
pub use user::*;
pub use workout::*;
