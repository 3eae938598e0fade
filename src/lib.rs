pub mod arena;
pub mod board;
pub mod bot;
pub mod dice;
pub mod game;
pub mod player;

pub use arena::*;
pub use board::Square;
pub use bot::*;
pub use dice::*;
pub use game::*;
pub use player::*;
