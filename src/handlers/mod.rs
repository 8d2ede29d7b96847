mod callback;
mod command;
mod countdown;
mod render;

pub use callback::*;
pub use command::*;
pub use countdown::*;
pub use render::*;
