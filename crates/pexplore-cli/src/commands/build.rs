//! Build command implementation

use pexplore::{DisplayOptions, SolverConfig};
use std::path::PathBuf;

use super::common::{connect, render_solutions, render_summary};

/// Configuration for the build command
#[derive(Debug, Clone)]
pub struct BuildCmdConfig {
    pub solver: SolverConfig,
    pub display: DisplayOptions,
    pub formula: Option<String>,
    pub file: Option<PathBuf>,
    pub examples: usize,
    pub order: Option<Vec<String>>,
    pub export: Option<PathBuf>,
    pub print_dot: bool,
}

/// Run build command
pub async fn run_build(config: BuildCmdConfig) -> anyhow::Result<()> {
    let mut explorer = connect(config.solver, config.display)?;

    match (&config.file, &config.formula) {
        (Some(path), _) => explorer.build_from_file(path).await?,
        (None, Some(formula)) => explorer.build(formula).await?,
        (None, None) => anyhow::bail!("either a formula or --file is required"),
    };

    if let Some(order) = config.order {
        explorer.reorder(order).await?;
    }

    for _ in 0..config.examples {
        if explorer.session().is_reveal_disabled() {
            if let Some(Err(err)) = explorer.next_completion().await {
                eprintln!("Error: {}", err);
                break;
            }
        }
        explorer.reveal_next();
    }
    if let Err(err) = explorer.settle().await {
        eprintln!("Error: {}", err);
    }

    println!("{}", render_summary(explorer.session()));
    println!("{}", render_solutions(explorer.session()));

    if config.print_dot {
        if let Some(automaton) = explorer.session().automaton() {
            println!("{}", automaton.dot);
        }
    }

    if let Some(dir) = config.export {
        let written = explorer.export(&dir).await?;
        println!(
            "Exported to {} and {}",
            written.dot.display(),
            written.mata.display()
        );
    }

    Ok(())
}
