use crate::bot::Bot;
use crate::dice::{Dice, RandomDice};
use crate::game::{GameError, GameState, TurnOutcome, TurnReport};
use crate::player::PlayerSetup;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Failed to encode status: {0}")]
    Status(#[from] serde_json::Error),
    #[error("Failed to write status: {0}")]
    Io(#[from] std::io::Error),
}

pub struct MatchConfig {
    /// Safety cap on the number of turns before the match is called off
    pub max_turns: usize,
    /// Print turn-by-turn commentary
    pub verbose: bool,
    /// Emit a JSON status line after every turn
    pub json_status: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            max_turns: 10_000,
            verbose: true,
            json_status: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// Every seat is ranked, first to last
    Completed { standings: Vec<String>, turns: usize },
    TurnLimitReached { ranked: Vec<String>, turns: usize },
}

impl MatchResult {
    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchResult::Completed { standings, .. } => standings.first().map(String::as_str),
            MatchResult::TurnLimitReached { ranked, .. } => ranked.first().map(String::as_str),
        }
    }
}

pub struct Match {
    config: MatchConfig,
    state: GameState,
    bots: Vec<Box<dyn Bot>>,
    dice: Box<dyn Dice>,
    status_out: Box<dyn Write>,
}

impl Match {
    /// One bot per seat, in roster order
    pub fn new(
        roster: &[PlayerSetup],
        bots: Vec<Box<dyn Bot>>,
        config: MatchConfig,
    ) -> Result<Self, ArenaError> {
        Self::with_dice(roster, bots, config, Box::new(RandomDice::new()))
    }

    pub fn with_dice(
        roster: &[PlayerSetup],
        bots: Vec<Box<dyn Bot>>,
        config: MatchConfig,
        dice: Box<dyn Dice>,
    ) -> Result<Self, ArenaError> {
        let state = GameState::new(roster)?;
        if bots.len() != roster.len() {
            return Err(GameError::MissingBot(bots.len().min(roster.len())).into());
        }
        Ok(Match {
            config,
            state,
            bots,
            dice,
            status_out: Box::new(std::io::stdout()),
        })
    }

    /// Send JSON status lines somewhere other than stdout
    pub fn with_status_output(mut self, out: Box<dyn Write>) -> Self {
        self.status_out = out;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn play(&mut self) -> Result<MatchResult, ArenaError> {
        for (seat, bot) in self.bots.iter_mut().enumerate() {
            bot.game_start(seat);
        }

        if self.config.verbose {
            println!("Match starting:");
            for (player, bot) in self.state.players().iter().zip(&self.bots) {
                println!("  {}: {}", player, bot.name());
            }
            println!("\n{}", self.state.display_board());
        }

        while !self.state.is_game_over() && self.state.turn_count() < self.config.max_turns {
            let report = self.state.play_turn(self.dice.as_mut(), &mut self.bots)?;
            self.handle_turn_report(&report)?;
        }

        for bot in self.bots.iter_mut() {
            bot.game_end();
        }

        let turns = self.state.turn_count();
        let names: Vec<String> = self
            .state
            .ranking()
            .iter()
            .filter_map(|&s| self.state.player(s))
            .map(|p| p.name().to_string())
            .collect();

        if self.state.is_game_over() {
            if self.config.verbose {
                println!("\n=== GAME OVER ===");
                println!("Final standings:");
                for (i, name) in names.iter().enumerate() {
                    println!(" {}. {}", i + 1, name);
                }
            }
            Ok(MatchResult::Completed {
                standings: names,
                turns,
            })
        } else {
            if self.config.verbose {
                println!("\nMax turns ({}) reached - match abandoned", self.config.max_turns);
            }
            Ok(MatchResult::TurnLimitReached {
                ranked: names,
                turns,
            })
        }
    }

    fn handle_turn_report(&mut self, report: &TurnReport) -> Result<(), ArenaError> {
        if let TurnOutcome::Moved(mv) = &report.outcome {
            for bot in self.bots.iter_mut() {
                bot.notify_move(mv);
            }
        }

        if self.config.verbose {
            self.log_turn(report);
        }

        if self.config.json_status {
            let line = serde_json::to_string(&self.state.status())?;
            writeln!(self.status_out, "{}", line)?;
        }
        Ok(())
    }

    fn log_turn(&self, report: &TurnReport) {
        let Some(player) = self.state.player(report.seat) else {
            return;
        };

        println!("-- {}'s turn --", player);
        println!("{} rolled a {}", player.name(), report.roll);
        match &report.outcome {
            TurnOutcome::NoLegalMove => println!("No moves available."),
            TurnOutcome::Passed => println!("{} chose not to move any token.", player.name()),
            TurnOutcome::Moved(mv) => {
                println!("{} moved {}", player.name(), mv);
                for &(victim, token) in &mv.captured {
                    if let Some(p) = self.state.player(victim) {
                        println!("Captured token {} of {}", token, p.name());
                    }
                }
                if mv.finished_token() {
                    println!("Token {} reached home!", mv.token);
                }
            }
        }
        if report.ranked {
            println!("{} has finished all tokens!", player.name());
        }
        if report.extra_turn && !report.game_over {
            println!("Rolled a 6: extra turn granted.");
        }
        println!("{}", self.state.display_board());
    }
}
