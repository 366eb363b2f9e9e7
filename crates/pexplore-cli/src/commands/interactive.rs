//! Interactive session
//!
//! Reads one command per line from stdin. Replenishments triggered by
//! `more` are applied as they arrive, between commands.

use pexplore::{Completion, DisplayOptions, Explorer, SolverConfig};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::common::{connect, parse_order, render_solutions, render_summary};

const HELP: &str = "\
Commands:
  build <formula>    build an automaton from formula text
  load <path>        build from a formula file
  more               reveal another example
  move <from> <to>   drag variable at position <from> to <to> (1-based)
  order <a b c>      switch to the given variable order
  show               print summary and examples
  dot                print the diagram
  export <dir>       write automaton.dot and automaton.mata
  help               show this help
  quit               leave";

/// Configuration for the interactive command
#[derive(Debug, Clone)]
pub struct InteractiveCmdConfig {
    pub solver: SolverConfig,
    pub display: DisplayOptions,
    pub file: Option<PathBuf>,
}

/// What the loop should do after a command
enum Flow {
    Continue,
    Quit,
}

/// Run interactive command
pub async fn run_interactive(config: InteractiveCmdConfig) -> anyhow::Result<()> {
    let mut explorer = connect(config.solver, config.display)?;

    if let Some(path) = &config.file {
        match explorer.build_from_file(path).await {
            Ok(_) => show(&explorer),
            Err(err) => eprintln!("Error: {}", err),
        }
    }
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Flow::Quit = handle(&mut explorer, line.trim()).await {
                    break;
                }
            }
            Some(result) = explorer.next_completion(), if explorer.in_flight() > 0 => {
                match result {
                    Ok(Completion::Applied) => {
                        tracing::debug!(
                            buffered = explorer.session().solutions().buffered_len(),
                            "More examples ready"
                        );
                    }
                    Ok(Completion::Stale) => {}
                    Err(err) => eprintln!("Error: {}", err),
                }
            }
        }
    }

    Ok(())
}

fn show(explorer: &Explorer) {
    println!("{}", render_summary(explorer.session()));
    println!("{}", render_solutions(explorer.session()));
}

fn report(explorer: &Explorer, result: pexplore::Result<Completion>) {
    match result {
        Ok(_) => show(explorer),
        Err(err) => eprintln!("Error: {}", err),
    }
}

async fn handle(explorer: &mut Explorer, line: &str) -> Flow {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "quit" | "exit" => return Flow::Quit,
        "help" => println!("{}", HELP),
        "build" => {
            let result = explorer.build(rest).await;
            report(explorer, result);
        }
        "load" => {
            let result = explorer.build_from_file(rest).await;
            report(explorer, result);
        }
        "more" => {
            if explorer.session().is_reveal_disabled() {
                // Nothing to show until the outstanding fetch lands
                if let Some(Err(err)) = explorer.next_completion().await {
                    eprintln!("Error: {}", err);
                }
            }
            explorer.reveal_next();
            println!("{}", render_solutions(explorer.session()));
        }
        "move" => match parse_positions(rest) {
            Some((from, to)) => {
                let result = explorer.move_variable(from, to).await;
                report(explorer, result);
            }
            None => eprintln!("usage: move <from> <to>"),
        },
        "order" => {
            let result = explorer.reorder(parse_order(rest)).await;
            report(explorer, result);
        }
        "show" => show(explorer),
        "dot" => match explorer.session().automaton() {
            Some(automaton) => println!("{}", automaton.dot),
            None => eprintln!("No automaton built"),
        },
        "export" => {
            let dir = if rest.is_empty() { "." } else { rest };
            match explorer.export(dir).await {
                Ok(written) => println!(
                    "Exported to {} and {}",
                    written.dot.display(),
                    written.mata.display()
                ),
                Err(err) => eprintln!("Error: {}", err),
            }
        }
        other => eprintln!("Unknown command: {} (try 'help')", other),
    }
    Flow::Continue
}

/// Parse 1-based `<from> <to>` positions into 0-based indices
fn parse_positions(input: &str) -> Option<(usize, usize)> {
    let mut parts = input.split_whitespace().map(str::parse::<usize>);
    let from = parts.next()?.ok()?;
    let to = parts.next()?.ok()?;
    if parts.next().is_some() || from == 0 || to == 0 {
        return None;
    }
    Some((from - 1, to - 1))
}
