use crate::board::{self, Square, TOKENS_PER_PLAYER};
use crate::game::{GameState, MoveRecord};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::io::{self, BufRead, Write};

/// Trait that every decision policy implements
pub trait Bot {
    /// Get the name of the bot
    fn name(&self) -> &str;

    /// Pick one of the `movable` tokens of the current player, or `None` to pass.
    /// `movable` is never empty and every entry can legally move `roll`.
    /// An error means the seat can no longer answer and ends the game.
    fn choose_token(&mut self, state: &GameState, roll: u8, movable: &[usize]) -> io::Result<Option<usize>>;

    /// Notified when the game starts
    fn game_start(&mut self, _seat: usize) {}

    /// Notified when a move is made (by any player)
    fn notify_move(&mut self, _mv: &MoveRecord) {}

    /// Notified when the game ends
    fn game_end(&mut self) {}
}

/// Fixed-priority heuristic for CPU seats: finish, capture, leave the yard,
/// then push the most advanced token.
pub struct GreedyBot {
    name: String,
}

impl GreedyBot {
    pub fn new(name: String) -> Self {
        GreedyBot { name }
    }

    fn finishes(state: &GameState, seat: usize, token: usize, roll: u8) -> bool {
        state.destination(seat, token, roll) == Some(Square::Finished)
    }

    fn pick(state: &GameState, roll: u8, movable: &[usize]) -> Option<usize> {
        let seat = state.current_player();
        let player = state.player(seat)?;
        let square = |token: usize| player.token(token).map(|t| t.square());

        if let Some(&t) = movable.iter().find(|&&t| Self::finishes(state, seat, t, roll)) {
            return Some(t);
        }
        if let Some(&t) = movable.iter().find(|&&t| Self::captures(state, seat, t, roll)) {
            return Some(t);
        }
        if let Some(&t) = movable.iter().find(|&&t| square(t) == Some(Square::Yard)) {
            return Some(t);
        }

        // Highest coordinate wins, the earlier token on ties
        let mut best: Option<(usize, i16)> = None;
        for &t in movable {
            let coordinate = square(t).map_or(-1, |s| s.coordinate());
            if best.is_none_or(|(_, c)| coordinate > c) {
                best = Some((t, coordinate));
            }
        }
        best.map(|(t, _)| t)
    }

    fn captures(state: &GameState, seat: usize, token: usize, roll: u8) -> bool {
        match state.destination(seat, token, roll) {
            Some(dest @ Square::Track(pos)) => {
                !board::is_safe_for(dest, seat) && !state.opponents_on(pos, seat).is_empty()
            }
            _ => false,
        }
    }
}

impl Bot for GreedyBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_token(&mut self, state: &GameState, roll: u8, movable: &[usize]) -> io::Result<Option<usize>> {
        Ok(Self::pick(state, roll, movable))
    }
}

/// Moves a uniformly chosen movable token
pub struct RandomBot {
    name: String,
    rng: StdRng,
}

impl RandomBot {
    pub fn new(name: String) -> Self {
        RandomBot {
            name,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(name: String, seed: u64) -> Self {
        RandomBot {
            name,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Bot for RandomBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_token(&mut self, _state: &GameState, _roll: u8, movable: &[usize]) -> io::Result<Option<usize>> {
        Ok(movable.choose(&mut self.rng).copied())
    }
}

/// Source of answers for console prompts
pub trait LineInput {
    /// Append the next line to `buf`, returning 0 at end of input
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

// Stdin locks per call, so several human seats can share the terminal
impl LineInput for io::Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        io::Stdin::read_line(self, buf)
    }
}

impl<T: AsRef<[u8]>> LineInput for io::Cursor<T> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// Human seat driven through a line-oriented prompt.
///
/// Keeps asking until it gets a legal token or `p`. End of input is an
/// `UnexpectedEof` error, since nobody is left to answer.
pub struct ConsoleBot<R, W> {
    name: String,
    input: R,
    output: W,
}

impl<R: LineInput, W: Write> ConsoleBot<R, W> {
    pub fn new(name: String, input: R, output: W) -> Self {
        ConsoleBot {
            name,
            input,
            output,
        }
    }

    fn prompt(&mut self, state: &GameState, roll: u8) -> io::Result<Option<usize>> {
        let seat = state.current_player();
        let Some(player) = state.player(seat) else {
            return Ok(None);
        };

        writeln!(self.output, "Choose token to move for {} (roll={}):", player.name(), roll)?;
        for token in player.tokens() {
            let marker = if state.can_advance(seat, token.index, roll) {
                " (can move)"
            } else {
                ""
            };
            writeln!(self.output, "  [{}] {}{}", token.index, token.describe(), marker)?;
        }

        loop {
            write!(self.output, "Enter token index to move (or 'p' to pass): ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
            }

            let choice = line.trim();
            if choice.eq_ignore_ascii_case("p") {
                return Ok(None);
            }
            let Ok(index) = choice.parse::<usize>() else {
                writeln!(self.output, "Invalid input. Type a number.")?;
                continue;
            };
            if index >= TOKENS_PER_PLAYER {
                writeln!(self.output, "Invalid index.")?;
                continue;
            }
            if !state.can_advance(seat, index, roll) {
                writeln!(self.output, "That token cannot be moved with this roll.")?;
                continue;
            }
            return Ok(Some(index));
        }
    }
}

impl<R: LineInput, W: Write> Bot for ConsoleBot<R, W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_token(&mut self, state: &GameState, roll: u8, _movable: &[usize]) -> io::Result<Option<usize>> {
        self.prompt(state, roll)
    }
}
