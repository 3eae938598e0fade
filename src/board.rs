use std::fmt;

/// Board geometry constants
pub const TRACK_LENGTH: u8 = 52;
pub const STRETCH_LENGTH: u8 = 6;
pub const TOKENS_PER_PLAYER: usize = 4;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// The only roll that brings a token out of the yard. It also grants an extra turn.
pub const EXIT_ROLL: u8 = 6;

/// Distance between the start squares of neighbouring seats
pub const START_SPACING: u8 = TRACK_LENGTH / MAX_PLAYERS as u8;

/// Squares on the shared track where no token can be captured
pub const SAFE_SQUARES: [u8; 8] = [0, 8, 13, 21, 26, 34, 39, 47];

/// Where a token currently is.
///
/// `Stretch(i)` holds an index into the owner's private stretch, always below
/// `STRETCH_LENGTH - 1`. Landing on the last stretch index is `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Square {
    Yard,
    Track(u8),
    Stretch(u8),
    Finished,
}

impl Square {
    /// Linear coordinate: yard is -1, the shared track is 0..52 and the
    /// private stretch continues from 52 up to the finish square.
    pub fn coordinate(&self) -> i16 {
        match *self {
            Square::Yard => -1,
            Square::Track(pos) => pos as i16,
            Square::Stretch(rel) => TRACK_LENGTH as i16 + rel as i16,
            Square::Finished => TRACK_LENGTH as i16 + STRETCH_LENGTH as i16 - 1,
        }
    }

    pub fn is_yard(&self) -> bool {
        matches!(self, Square::Yard)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Square::Finished)
    }

}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Square::Yard => write!(f, "Y"),
            Square::Track(pos) => write!(f, "{}", pos),
            Square::Stretch(rel) => write!(f, "H{}", rel),
            Square::Finished => write!(f, "F"),
        }
    }
}

/// Square where a player's tokens enter the shared track
pub fn start_square(player: usize) -> u8 {
    player as u8 * START_SPACING
}

/// Last shared-track square before the player turns into their private stretch
pub fn entry_square(player: usize) -> u8 {
    (start_square(player) + TRACK_LENGTH - 1) % TRACK_LENGTH
}

pub fn is_globally_safe(pos: u8) -> bool {
    SAFE_SQUARES.contains(&pos)
}

/// Safe squares protect against capture: the fixed safe set plus the player's own start.
pub fn is_safe_for(square: Square, player: usize) -> bool {
    match square {
        Square::Track(pos) => is_globally_safe(pos) || pos == start_square(player),
        _ => false,
    }
}

/// Steps left on the shared track before the private stretch, counted circularly.
pub fn distance_to_entry(player: usize, square: Square) -> u8 {
    let Square::Track(pos) = square else {
        return 0;
    };
    let entry = entry_square(player);
    if pos <= entry {
        entry - pos
    } else {
        TRACK_LENGTH - (pos - entry)
    }
}

/// Where a token on `square` lands with `roll`, or `None` if it cannot move.
///
/// This is the only place legality is decided: a roll that would carry a token
/// past the last stretch square is illegal, never clamped.
pub fn destination(player: usize, square: Square, roll: u8) -> Option<Square> {
    match square {
        Square::Yard => (roll == EXIT_ROLL).then(|| Square::Track(start_square(player))),
        Square::Track(pos) => {
            let to_entry = distance_to_entry(player, square);
            if roll <= to_entry {
                Some(Square::Track((pos + roll) % TRACK_LENGTH))
            } else {
                stretch_square(roll - to_entry - 1)
            }
        }
        Square::Stretch(rel) => stretch_square(rel.saturating_add(roll)),
        Square::Finished => None,
    }
}

pub fn can_advance(player: usize, square: Square, roll: u8) -> bool {
    destination(player, square, roll).is_some()
}

fn stretch_square(rel: u8) -> Option<Square> {
    match rel {
        r if r == STRETCH_LENGTH - 1 => Some(Square::Finished),
        r if r < STRETCH_LENGTH - 1 => Some(Square::Stretch(r)),
        _ => None,
    }
}
