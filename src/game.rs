use crate::board::{self, EXIT_ROLL, MAX_PLAYERS, MIN_PLAYERS, Square};
use crate::bot::Bot;
use crate::dice::{DIE_FACES, Dice};
use crate::player::{Player, PlayerSetup};
use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Ludo needs 2-4 players, got {0}")]
    InvalidRosterSize(usize),
    #[error("Invalid die roll: {0}")]
    InvalidRoll(u8),
    #[error("No such token: {0}")]
    NoSuchToken(usize),
    #[error("Token {token} of player {player} cannot move {roll}")]
    IllegalMove {
        player: usize,
        token: usize,
        roll: u8,
    },
    #[error("No decision policy seated for player {0}")]
    MissingBot(usize),
    #[error("Player {player} could not answer: {kind}")]
    Input { player: usize, kind: io::ErrorKind },
    #[error("Game already over")]
    GameOver,
}

/// A move that was applied to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub player: usize,
    pub token: usize,
    pub roll: u8,
    pub from: Square,
    pub to: Square,
    /// Opposing tokens sent back to their yard, as (player, token)
    pub captured: Vec<(usize, usize)>,
}

impl MoveRecord {
    pub fn finished_token(&self) -> bool {
        self.to.is_finished()
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token {}: {} -> {}", self.token, self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    NoLegalMove,
    Passed,
    Moved(MoveRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub seat: usize,
    pub roll: u8,
    pub outcome: TurnOutcome,
    pub extra_turn: bool,
    /// Set when this turn completed the seat's whole fleet
    pub ranked: bool,
    pub game_over: bool,
}

/// Read-only snapshot for renderers
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub turn: usize,
    pub current_player: usize,
    pub players: Vec<PlayerStatus>,
    pub ranking: Vec<String>,
    pub game_over: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStatus {
    pub index: usize,
    pub name: String,
    pub color: String,
    pub automated: bool,
    pub tokens: Vec<String>,
    pub in_yard: usize,
    pub in_play: usize,
    pub finished: usize,
}

#[derive(Debug, Clone)]
pub struct GameState {
    players: Vec<Player>,
    current: usize,
    /// Seats in the order they finished their fleet
    ranking: Vec<usize>,
    turn_count: usize,
}

impl GameState {
    /// Seat a new game with every token in its yard
    pub fn new(roster: &[PlayerSetup]) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&roster.len()) {
            return Err(GameError::InvalidRosterSize(roster.len()));
        }

        let players = roster
            .iter()
            .enumerate()
            .map(|(i, setup)| Player::new(i, setup))
            .collect();

        Ok(GameState {
            players,
            current: 0,
            ranking: Vec::new(),
            turn_count: 0,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    /// Seat whose turn it is
    pub fn current_player(&self) -> usize {
        self.current
    }

    pub fn ranking(&self) -> &[usize] {
        &self.ranking
    }

    pub fn is_ranked(&self, seat: usize) -> bool {
        self.ranking.contains(&seat)
    }

    pub fn is_game_over(&self) -> bool {
        self.ranking.len() == self.players.len()
    }

    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    /// Where the token would land with `roll`, without touching the board
    pub fn destination(&self, player: usize, token: usize, roll: u8) -> Option<Square> {
        let square = self.players.get(player)?.token(token)?.square();
        board::destination(player, square, roll)
    }

    pub fn can_advance(&self, player: usize, token: usize, roll: u8) -> bool {
        self.destination(player, token, roll).is_some()
    }

    /// Tokens of the current player that may move with `roll`
    pub fn movable_tokens(&self, roll: u8) -> Vec<usize> {
        let seat = self.current;
        self.players[seat]
            .tokens()
            .iter()
            .filter(|t| self.can_advance(seat, t.index, roll))
            .map(|t| t.index)
            .collect()
    }

    /// Opposing tokens on track square `pos`, as (player, token)
    pub fn opponents_on(&self, pos: u8, mover: usize) -> Vec<(usize, usize)> {
        self.players
            .iter()
            .filter(|p| p.index() != mover)
            .flat_map(|p| p.tokens())
            .filter(|t| t.square() == Square::Track(pos))
            .map(|t| (t.owner, t.index))
            .collect()
    }

    /// Skip finished seats, roll for the current one and resolve the turn
    pub fn play_turn(
        &mut self,
        dice: &mut dyn Dice,
        bots: &mut [Box<dyn Bot>],
    ) -> Result<TurnReport, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        self.skip_ranked_seat();

        let seat = self.current;
        let bot = bots.get_mut(seat).ok_or(GameError::MissingBot(seat))?;
        let roll = dice.roll();
        self.resolve_roll(roll, bot.as_mut())
    }

    /// Resolve one turn of the current seat for an already rolled die
    pub fn resolve_roll(&mut self, roll: u8, bot: &mut dyn Bot) -> Result<TurnReport, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        if !(1..=DIE_FACES).contains(&roll) {
            return Err(GameError::InvalidRoll(roll));
        }
        self.skip_ranked_seat();

        let seat = self.current;
        let movable = self.movable_tokens(roll);

        let outcome = if movable.is_empty() {
            TurnOutcome::NoLegalMove
        } else {
            let choice = bot
                .choose_token(self, roll, &movable)
                .map_err(|e| GameError::Input {
                    player: seat,
                    kind: e.kind(),
                })?;
            match choice {
                Some(token) => TurnOutcome::Moved(self.apply_move(token, roll)?),
                None => TurnOutcome::Passed,
            }
        };

        let ranked = self.players[seat].all_finished() && !self.is_ranked(seat);
        if ranked {
            self.rank(seat);
        }

        let extra_turn = roll == EXIT_ROLL;
        if !extra_turn {
            self.advance_cursor();
        }
        self.turn_count += 1;

        Ok(TurnReport {
            seat,
            roll,
            outcome,
            extra_turn,
            ranked,
            game_over: self.is_game_over(),
        })
    }

    fn apply_move(&mut self, token: usize, roll: u8) -> Result<MoveRecord, GameError> {
        let seat = self.current;
        let from = self.players[seat]
            .token(token)
            .ok_or(GameError::NoSuchToken(token))?
            .square();
        let to = board::destination(seat, from, roll).ok_or(GameError::IllegalMove {
            player: seat,
            token,
            roll,
        })?;

        if let Some(t) = self.players[seat].token_mut(token) {
            t.set_square(to);
        }

        let captured = self.resolve_captures(to, seat);

        Ok(MoveRecord {
            player: seat,
            token,
            roll,
            from,
            to,
            captured,
        })
    }

    fn resolve_captures(&mut self, landed: Square, mover: usize) -> Vec<(usize, usize)> {
        let Square::Track(pos) = landed else {
            return Vec::new();
        };
        if board::is_safe_for(landed, mover) {
            return Vec::new();
        }

        let captured = self.opponents_on(pos, mover);
        for &(player, token) in &captured {
            if let Some(t) = self.players[player].token_mut(token) {
                t.set_square(Square::Yard);
            }
        }
        captured
    }

    fn rank(&mut self, seat: usize) {
        if !self.is_ranked(seat) {
            self.ranking.push(seat);
        }

        // The last seat standing finishes last without playing on
        if self.ranking.len() + 1 == self.players.len() {
            let last = (0..self.players.len()).find(|s| !self.is_ranked(*s));
            self.ranking.extend(last);
        }
    }

    fn skip_ranked_seat(&mut self) {
        let seat = self.current;
        if self.players[seat].all_finished() && !self.is_ranked(seat) {
            self.rank(seat);
        }
        if self.is_ranked(self.current) && !self.is_game_over() {
            self.advance_cursor();
        }
    }

    /// Next seat in roster order that still plays
    fn advance_cursor(&mut self) {
        let n = self.players.len();
        let next = (1..=n)
            .map(|step| (self.current + step) % n)
            .find(|s| !self.is_ranked(*s));
        if let Some(next) = next {
            self.current = next;
        }
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            turn: self.turn_count,
            current_player: self.current,
            players: self
                .players
                .iter()
                .map(|p| PlayerStatus {
                    index: p.index(),
                    name: p.name().to_string(),
                    color: p.color().to_string(),
                    automated: p.is_automated(),
                    tokens: p.tokens().iter().map(|t| t.square().to_string()).collect(),
                    in_yard: p.tokens_in_yard(),
                    in_play: p.tokens_in_play(),
                    finished: p.tokens_finished(),
                })
                .collect(),
            ranking: self
                .ranking
                .iter()
                .map(|&s| self.players[s].name().to_string())
                .collect(),
            game_over: self.is_game_over(),
        }
    }

    /// Get a string representation of the board
    pub fn display_board(&self) -> String {
        let mut result = String::from("===== BOARD STATE =====\n");
        for p in &self.players {
            let tokens: Vec<String> = p.tokens().iter().map(|t| t.square().to_string()).collect();
            result.push_str(&format!(
                "{}: {}  | Finished: {}\n",
                p,
                tokens.join(", "),
                p.tokens_finished()
            ));
        }
        result.push_str("=======================\n");
        result
    }

    /// Put a token from its yard anywhere on the board
    #[cfg(test)]
    pub(crate) fn place_token(&mut self, player: usize, token: usize, square: Square) {
        if let Some(t) = self.players[player].token_mut(token) {
            t.set_square(square);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::GreedyBot;

    /// Always moves the given token, legal or not
    struct Pick(usize);

    impl Bot for Pick {
        fn name(&self) -> &str {
            "Pick"
        }

        fn choose_token(&mut self, _state: &GameState, _roll: u8, _movable: &[usize]) -> io::Result<Option<usize>> {
            Ok(Some(self.0))
        }
    }

    struct Pass;

    impl Bot for Pass {
        fn name(&self) -> &str {
            "Pass"
        }

        fn choose_token(&mut self, _state: &GameState, _roll: u8, _movable: &[usize]) -> io::Result<Option<usize>> {
            Ok(None)
        }
    }

    /// Seat whose terminal is gone
    struct Gone;

    impl Bot for Gone {
        fn name(&self) -> &str {
            "Gone"
        }

        fn choose_token(&mut self, _state: &GameState, _roll: u8, _movable: &[usize]) -> io::Result<Option<usize>> {
            Err(io::ErrorKind::UnexpectedEof.into())
        }
    }

    fn create_game(players: usize) -> GameState {
        GameState::new(&vec![PlayerSetup::cpu(); players]).unwrap()
    }

    fn place(state: &mut GameState, player: usize, token: usize, square: Square) {
        state.place_token(player, token, square);
    }

    fn square_of(state: &GameState, player: usize, token: usize) -> Square {
        state.players[player].token(token).unwrap().square()
    }

    #[test]
    fn test_roster_size_is_validated() {
        assert_eq!(
            GameState::new(&[PlayerSetup::cpu()]).unwrap_err(),
            GameError::InvalidRosterSize(1)
        );
        assert_eq!(
            GameState::new(&vec![PlayerSetup::cpu(); 5]).unwrap_err(),
            GameError::InvalidRosterSize(5)
        );
        for n in 2..=4 {
            let game = create_game(n);
            assert_eq!(game.players().len(), n);
            assert_eq!(game.current_player(), 0);
            assert!(game.ranking().is_empty());
        }
    }

    #[test]
    fn test_invalid_roll_rejected() {
        let mut game = create_game(2);
        assert_eq!(game.resolve_roll(0, &mut Pass).unwrap_err(), GameError::InvalidRoll(0));
        assert_eq!(game.resolve_roll(7, &mut Pass).unwrap_err(), GameError::InvalidRoll(7));
        assert_eq!(game.turn_count(), 0);
    }

    #[test]
    fn test_no_legal_move_without_six() {
        let mut game = create_game(2);
        for roll in 1..6 {
            assert!(game.movable_tokens(roll).is_empty());
        }

        let report = game.resolve_roll(4, &mut Pick(0)).unwrap();
        assert_eq!(report.outcome, TurnOutcome::NoLegalMove);
        assert!(!report.extra_turn);
        assert_eq!(game.current_player(), 1);
        assert!(square_of(&game, 0, 0).is_yard());
    }

    #[test]
    fn test_six_without_legal_move_grants_extra_turn() {
        let mut game = create_game(2);
        for token in 0..4 {
            place(&mut game, 0, token, Square::Stretch(1));
        }
        // A six overshoots from stretch index 1
        let report = game.resolve_roll(6, &mut Pick(0)).unwrap();
        assert_eq!(report.outcome, TurnOutcome::NoLegalMove);
        assert!(report.extra_turn);
        assert_eq!(game.current_player(), 0);
    }

    #[test]
    fn test_pass_on_six_keeps_turn() {
        let mut game = create_game(2);
        let report = game.resolve_roll(6, &mut Pass).unwrap();
        assert_eq!(report.outcome, TurnOutcome::Passed);
        assert!(report.extra_turn);
        assert_eq!(game.current_player(), 0);

        let report = game.resolve_roll(6, &mut Pick(0)).unwrap();
        assert!(matches!(report.outcome, TurnOutcome::Moved(_)));
        let report = game.resolve_roll(2, &mut Pass).unwrap();
        assert_eq!(report.outcome, TurnOutcome::Passed);
        assert_eq!(game.current_player(), 1);
    }

    #[test]
    fn test_illegal_choice_is_an_error() {
        let mut game = create_game(2);
        place(&mut game, 0, 0, Square::Track(10));

        let err = game.resolve_roll(3, &mut Pick(1)).unwrap_err();
        assert_eq!(
            err,
            GameError::IllegalMove {
                player: 0,
                token: 1,
                roll: 3
            }
        );
        assert!(square_of(&game, 0, 1).is_yard());

        let err = game.resolve_roll(3, &mut Pick(9)).unwrap_err();
        assert_eq!(err, GameError::NoSuchToken(9));
    }

    #[test]
    fn test_failed_answer_leaves_turn_untouched() {
        let mut game = create_game(2);

        let err = game.resolve_roll(6, &mut Gone).unwrap_err();
        assert_eq!(
            err,
            GameError::Input {
                player: 0,
                kind: io::ErrorKind::UnexpectedEof
            }
        );
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.turn_count(), 0);
        assert!(square_of(&game, 0, 0).is_yard());
    }

    #[test]
    fn test_capture_sends_opponent_to_yard() {
        let mut game = create_game(2);
        place(&mut game, 1, 2, Square::Track(5));
        place(&mut game, 0, 0, Square::Track(2));

        let report = game.resolve_roll(3, &mut Pick(0)).unwrap();
        let TurnOutcome::Moved(record) = report.outcome else {
            panic!("expected a move");
        };
        assert_eq!(record.to, Square::Track(5));
        assert_eq!(record.captured, vec![(1, 2)]);
        assert!(square_of(&game, 1, 2).is_yard());
        assert_eq!(square_of(&game, 0, 0), Square::Track(5));
        assert!(!game.player(0).unwrap().token(0).unwrap().is_finished());
    }

    #[test]
    fn test_capture_takes_whole_stack() {
        let mut game = create_game(3);
        place(&mut game, 1, 0, Square::Track(20));
        place(&mut game, 1, 3, Square::Track(20));
        place(&mut game, 2, 1, Square::Track(20));
        place(&mut game, 0, 0, Square::Track(16));

        game.resolve_roll(4, &mut Pick(0)).unwrap();
        assert!(square_of(&game, 1, 0).is_yard());
        assert!(square_of(&game, 1, 3).is_yard());
        assert!(square_of(&game, 2, 1).is_yard());
    }

    #[test]
    fn test_no_capture_on_safe_square() {
        let mut game = create_game(2);
        place(&mut game, 1, 0, Square::Track(8));
        place(&mut game, 0, 0, Square::Track(5));

        let report = game.resolve_roll(3, &mut Pick(0)).unwrap();
        let TurnOutcome::Moved(record) = report.outcome else {
            panic!("expected a move");
        };
        assert!(record.captured.is_empty());
        assert_eq!(square_of(&game, 1, 0), Square::Track(8));
        assert_eq!(square_of(&game, 0, 0), Square::Track(8));
    }

    #[test]
    fn test_no_capture_on_own_start_square() {
        let mut game = create_game(2);
        // Player 1 sits on player 0's start square
        place(&mut game, 1, 0, Square::Track(0));
        game.resolve_roll(6, &mut Pick(0)).unwrap();

        assert_eq!(square_of(&game, 0, 0), Square::Track(0));
        assert_eq!(square_of(&game, 1, 0), Square::Track(0));
    }

    #[test]
    fn test_tokens_in_stretch_are_never_captured() {
        let mut game = create_game(2);
        place(&mut game, 1, 0, Square::Stretch(0));
        place(&mut game, 0, 0, Square::Track(3));
        game.resolve_roll(2, &mut Pick(0)).unwrap();
        assert_eq!(square_of(&game, 1, 0), Square::Stretch(0));
    }

    #[test]
    fn test_finishing_exactly() {
        let mut game = create_game(2);
        place(&mut game, 0, 0, Square::Stretch(3));

        // One short of the end is legal and not finished
        game.resolve_roll(1, &mut Pick(0)).unwrap();
        assert_eq!(square_of(&game, 0, 0), Square::Stretch(4));

        // Player 1 has nothing to do with a 2
        game.resolve_roll(2, &mut Pass).unwrap();

        // Overshoot is not offered
        assert!(game.movable_tokens(3).is_empty());
        game.resolve_roll(3, &mut Pick(0)).unwrap();
        assert_eq!(square_of(&game, 0, 0), Square::Stretch(4));

        game.resolve_roll(4, &mut Pass).unwrap();
        let report = game.resolve_roll(1, &mut Pick(0)).unwrap();
        let TurnOutcome::Moved(record) = report.outcome else {
            panic!("expected a move");
        };
        assert!(record.finished_token());
        assert!(game.player(0).unwrap().token(0).unwrap().is_finished());
        assert!(!report.ranked);
    }

    #[test]
    fn test_ranking_and_game_end_two_players() {
        let mut game = create_game(2);
        for token in 0..3 {
            place(&mut game, 0, token, Square::Finished);
        }
        place(&mut game, 0, 3, Square::Stretch(4));

        let report = game.resolve_roll(1, &mut Pick(3)).unwrap();
        assert!(report.ranked);
        assert!(report.game_over);
        assert_eq!(game.ranking(), &[0, 1]);
        assert!(game.is_game_over());

        assert_eq!(game.resolve_roll(1, &mut Pass).unwrap_err(), GameError::GameOver);
    }

    #[test]
    fn test_ranked_seat_is_skipped() {
        let mut game = create_game(3);
        for token in 0..3 {
            place(&mut game, 0, token, Square::Finished);
        }
        place(&mut game, 0, 3, Square::Track(51));

        // A six from the entry square finishes the fleet and keeps the cursor
        let report = game.resolve_roll(6, &mut Pick(3)).unwrap();
        assert!(report.ranked);
        assert!(report.extra_turn);
        assert!(!report.game_over);
        assert_eq!(game.ranking(), &[0]);
        assert_eq!(game.current_player(), 0);

        // The finished seat never takes the extra turn
        let report = game.resolve_roll(2, &mut Pass).unwrap();
        assert_eq!(report.seat, 1);
        assert_eq!(game.current_player(), 2);

        // Seat 0 is skipped on the way round
        game.resolve_roll(3, &mut Pass).unwrap();
        assert_eq!(game.current_player(), 1);
        assert_eq!(game.ranking(), &[0]);
    }

    #[test]
    fn test_cursor_rules() {
        let mut game = create_game(4);
        for roll in [1, 2, 3, 4, 5] {
            let before = game.current_player();
            game.resolve_roll(roll, &mut Pass).unwrap();
            assert_eq!(game.current_player(), (before + 1) % 4);
        }
        let before = game.current_player();
        game.resolve_roll(6, &mut Pass).unwrap();
        assert_eq!(game.current_player(), before);
    }

    #[test]
    fn test_two_sixes_then_pass_turn() {
        let mut game = create_game(2);
        let mut bot = GreedyBot::new("cpu".to_string());

        let report = game.resolve_roll(6, &mut bot).unwrap();
        assert_eq!(report.seat, 0);
        assert!(report.extra_turn);
        assert_eq!(square_of(&game, 0, 0), Square::Track(0));
        assert_eq!(game.current_player(), 0);

        let report = game.resolve_roll(6, &mut bot).unwrap();
        assert!(report.extra_turn);
        assert_eq!(square_of(&game, 0, 1), Square::Track(0));
        assert_eq!(game.player(0).unwrap().tokens_in_yard(), 2);

        let report = game.resolve_roll(3, &mut bot).unwrap();
        assert!(!report.extra_turn);
        assert_eq!(game.current_player(), 1);
        assert!(game.ranking().is_empty());
    }

    #[test]
    fn test_play_turn_uses_seated_bot() {
        let mut game = create_game(2);
        let mut bots: Vec<Box<dyn Bot>> = vec![Box::new(Pick(0)), Box::new(Pass)];
        let mut dice = crate::dice::ScriptedDice::new([6, 2, 4]);

        let report = game.play_turn(&mut dice, &mut bots).unwrap();
        assert_eq!(report.seat, 0);
        assert_eq!(square_of(&game, 0, 0), Square::Track(0));

        let report = game.play_turn(&mut dice, &mut bots).unwrap();
        assert_eq!(report.seat, 0);
        assert_eq!(square_of(&game, 0, 0), Square::Track(2));

        let report = game.play_turn(&mut dice, &mut bots).unwrap();
        assert_eq!(report.seat, 1);
        assert_eq!(report.outcome, TurnOutcome::NoLegalMove);
    }

    #[test]
    fn test_play_turn_missing_bot() {
        let mut game = create_game(3);
        let mut bots: Vec<Box<dyn Bot>> = vec![Box::new(Pass)];
        let mut dice = crate::dice::ScriptedDice::new([1]);
        game.play_turn(&mut dice, &mut bots).unwrap();
        assert_eq!(
            game.play_turn(&mut dice, &mut bots).unwrap_err(),
            GameError::MissingBot(1)
        );
    }

    #[test]
    fn test_status_report() {
        let mut game = create_game(2);
        place(&mut game, 0, 0, Square::Track(12));
        place(&mut game, 0, 1, Square::Stretch(3));
        place(&mut game, 0, 2, Square::Finished);

        let status = game.status();
        assert_eq!(status.players.len(), 2);
        assert_eq!(status.players[0].tokens, vec!["12", "H3", "F", "Y"]);
        assert_eq!(status.players[0].in_yard, 1);
        assert_eq!(status.players[0].in_play, 2);
        assert_eq!(status.players[0].finished, 1);
        assert_eq!(status.players[1].color, "Green");
        assert!(status.ranking.is_empty());

        let board = game.display_board();
        assert!(board.contains("Player-1 (Red): 12, H3, F, Y  | Finished: 1"));
        assert!(board.contains("Player-2 (Green): Y, Y, Y, Y  | Finished: 0"));
    }
}
