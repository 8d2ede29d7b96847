mod types;
mod commands;
mod handlers;
mod error;
mod state;
mod keyboard;
mod config;
mod api;
mod quiz;

pub use types::*;
pub use commands::*;
pub use handlers::*;
pub use error::*;
pub use state::*;
pub use keyboard::*;
pub use config::*;
pub use api::*;
pub use quiz::*;
