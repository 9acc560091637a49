//! Wire types for the Telegram Bot API.

mod keyboard;
mod send;
mod update;

pub use keyboard::*;
pub use send::*;
pub use update::*;
