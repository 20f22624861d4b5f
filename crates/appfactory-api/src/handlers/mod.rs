//! API request handlers.

pub mod apps;
pub mod chat;
pub mod status;

pub use apps::*;
pub use chat::*;
pub use status::*;
