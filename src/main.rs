use ludo_arena::board::{MAX_PLAYERS, MIN_PLAYERS};
use ludo_arena::*;
use std::io::{self, Write};

#[derive(Debug, Default, PartialEq)]
struct Options {
    seed: Option<u64>,
    quiet: bool,
    json: bool,
    max_turns: Option<usize>,
    all_cpu: Option<usize>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--quiet" => options.quiet = true,
            "--json" => options.json = true,
            "--seed" => options.seed = Some(parse_value(&arg, args.next())?),
            "--max-turns" => options.max_turns = Some(parse_value(&arg, args.next())?),
            "--all-cpu" => {
                let n = parse_value(&arg, args.next())?;
                if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
                    return Err(format!("--all-cpu needs {}-{} players", MIN_PLAYERS, MAX_PLAYERS));
                }
                options.all_cpu = Some(n);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(options)
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))
}

/// Ask for the roster the way the terminal game always has
fn prompt_setup<R: LineInput, W: Write>(input: &mut R, output: &mut W) -> io::Result<Vec<PlayerSetup>> {
    writeln!(output, "Set up the Ludo game")?;

    let count = loop {
        let answer = ask(input, output, "Enter number of players (2-4) [default 4]: ")?;
        let Some(answer) = answer.filter(|a| !a.is_empty()) else {
            break MAX_PLAYERS;
        };
        match answer.parse::<usize>() {
            Ok(n) if (MIN_PLAYERS..=MAX_PLAYERS).contains(&n) => break n,
            Ok(_) => writeln!(output, "Enter 2, 3 or 4")?,
            Err(_) => writeln!(output, "Enter a number 2-4.")?,
        }
    };

    let mut roster = Vec::with_capacity(count);
    for i in 0..count {
        let automated = loop {
            let question = format!("Is Player-{} a CPU? (y/n) [n]: ", i + 1);
            let Some(answer) = ask(input, output, &question)? else {
                break false;
            };
            match answer.to_lowercase().as_str() {
                "" | "n" | "no" => break false,
                "y" | "yes" => break true,
                _ => writeln!(output, "Enter y or n")?,
            }
        };
        roster.push(PlayerSetup {
            name: None,
            automated,
        });
    }

    for (i, setup) in roster.iter_mut().enumerate() {
        if setup.automated {
            continue;
        }
        let question = format!("Enter name for Player-{} (or press Enter to keep): ", i + 1);
        if let Some(name) = ask(input, output, &question)?.filter(|n| !n.is_empty()) {
            setup.name = Some(name);
        }
    }

    Ok(roster)
}

/// `None` at end of input
fn ask<R: LineInput, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<Option<String>> {
    write!(output, "{}", question)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// CPU seats get the greedy policy, everyone else answers at the terminal
fn seat_bots(roster: &[PlayerSetup]) -> Vec<Box<dyn Bot>> {
    roster
        .iter()
        .enumerate()
        .map(|(i, setup)| -> Box<dyn Bot> {
            let name = setup.name.clone().unwrap_or_else(|| format!("Player-{}", i + 1));
            if setup.automated {
                Box::new(GreedyBot::new(format!("{} (CPU)", name)))
            } else {
                Box::new(ConsoleBot::new(name, io::stdin(), io::stdout()))
            }
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = parse_args(std::env::args().skip(1))?;

    println!("Welcome to Terminal Ludo!");
    println!(
        "Rules: Roll a 6 to bring a token out. Capture by landing on an opponent's token (not on safe squares). Finish when all your tokens reach home.\n"
    );

    let roster = match options.all_cpu {
        Some(n) => vec![PlayerSetup::cpu(); n],
        None => prompt_setup(&mut io::stdin(), &mut io::stdout())?,
    };

    let config = MatchConfig {
        max_turns: options.max_turns.unwrap_or(MatchConfig::default().max_turns),
        verbose: !options.quiet,
        json_status: options.json,
    };
    let dice: Box<dyn Dice> = match options.seed {
        Some(seed) => Box::new(RandomDice::seeded(seed)),
        None => Box::new(RandomDice::new()),
    };

    println!("Starting game...\n");
    let mut game = Match::with_dice(&roster, seat_bots(&roster), config, dice)?;
    let result = game.play()?;

    println!("\n========================================");
    match result {
        MatchResult::Completed { standings, turns } => {
            println!("Game finished after {} turns", turns);
            for (i, name) in standings.iter().enumerate() {
                println!("  {}. {}", i + 1, name);
            }
        }
        MatchResult::TurnLimitReached { ranked, turns } => {
            println!("Stopped after {} turns without a full ranking", turns);
            for (i, name) in ranked.iter().enumerate() {
                println!("  {}. {}", i + 1, name);
            }
        }
    }
    println!("========================================");
    Ok(())
}
