use crate::board::{self, Square, TOKENS_PER_PLAYER};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Green, Color::Yellow, Color::Blue];

    pub fn for_seat(index: usize) -> Color {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn name(&self) -> &str {
        match self {
            Color::Red => "Red",
            Color::Green => "Green",
            Color::Yellow => "Yellow",
            Color::Blue => "Blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub owner: usize,
    pub index: usize,
    square: Square,
}

impl Token {
    pub fn new(owner: usize, index: usize) -> Self {
        Token {
            owner,
            index,
            square: Square::Yard,
        }
    }

    pub fn square(&self) -> Square {
        self.square
    }

    pub fn is_in_yard(&self) -> bool {
        self.square.is_yard()
    }

    pub fn is_finished(&self) -> bool {
        self.square.is_finished()
    }

    /// On the shared track or in the private stretch
    pub fn is_in_play(&self) -> bool {
        !self.is_in_yard() && !self.is_finished()
    }

    /// Only the engine moves tokens. Leaving `Finished` is not allowed.
    pub(crate) fn set_square(&mut self, square: Square) {
        debug_assert!(!self.is_finished(), "finished tokens never move");
        self.square = square;
    }

    /// Human readable status used by the console prompt
    pub fn describe(&self) -> String {
        match self.square {
            Square::Yard => "Yard".to_string(),
            Square::Finished => "Finished".to_string(),
            Square::Track(pos) => format!("Pos:{}", pos),
            Square::Stretch(rel) => format!("Home:{}", rel),
        }
    }
}

/// Roster entry collected during setup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerSetup {
    pub name: Option<String>,
    pub automated: bool,
}

impl PlayerSetup {
    pub fn human() -> Self {
        PlayerSetup {
            name: None,
            automated: false,
        }
    }

    pub fn cpu() -> Self {
        PlayerSetup {
            name: None,
            automated: true,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    index: usize,
    name: String,
    color: Color,
    automated: bool,
    tokens: [Token; TOKENS_PER_PLAYER],
}

impl Player {
    pub fn new(index: usize, setup: &PlayerSetup) -> Self {
        let name = setup
            .name
            .clone()
            .unwrap_or_else(|| format!("Player-{}", index + 1));
        Player {
            index,
            name,
            color: Color::for_seat(index),
            automated: setup.automated,
            tokens: std::array::from_fn(|i| Token::new(index, i)),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_automated(&self) -> bool {
        self.automated
    }

    pub fn start_square(&self) -> u8 {
        board::start_square(self.index)
    }

    pub fn entry_square(&self) -> u8 {
        board::entry_square(self.index)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub(crate) fn token_mut(&mut self, index: usize) -> Option<&mut Token> {
        self.tokens.get_mut(index)
    }

    pub fn tokens_in_yard(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_in_yard()).count()
    }

    pub fn tokens_in_play(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_in_play()).count()
    }

    pub fn tokens_finished(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_finished()).count()
    }

    pub fn all_finished(&self) -> bool {
        self.tokens_finished() == TOKENS_PER_PLAYER
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.color)
    }
}
