mod error;
mod game;
mod recording;
pub use error::*;
pub use game::*;
pub use recording::*;
