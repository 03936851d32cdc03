use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::Context;
use gogo_agent::AgentPlayer;
use gogo_engine::{Action, Game, GameState, Player, ScriptedPlayer};
use gogo_training::{Entity, Population, snapshot::GameSnapshot};

use crate::util::{self, Output, read_population_file};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Opponent {
    /// Another agent of the population
    #[default]
    Agent,
    /// A player that always passes
    Pass,
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Population snapshot to take the agents from
    population: PathBuf,
    /// Rank of the agent playing black by the fitness of its parent (0 is the best)
    #[arg(long, default_value_t = 0)]
    black: usize,
    /// Rank of the agent playing white by the fitness of its parent
    #[arg(long, default_value_t = 1)]
    white: usize,
    /// Who plays white
    #[arg(long, default_value = "agent")]
    opponent: Opponent,
    /// Finish the game after this many accepted turns
    #[arg(long)]
    max_moves: Option<usize>,
    /// Print the board after every accepted turn
    #[arg(long)]
    verbose: bool,
    /// Save the game record to this file, or to stdout with `-`
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        population,
        black,
        white,
        opponent,
        max_moves,
        verbose,
        output,
    } = arg;

    let snapshot = read_population_file(population)?;
    let population = snapshot.population;
    let dimension = population.dimension();

    let black_player = AgentPlayer::new(pick(&population, *black)?.agent(), dimension)
        .context("Black agent does not fit the board")?;
    let white_player: Box<dyn Player + '_> = match opponent {
        Opponent::Agent => Box::new(
            AgentPlayer::new(pick(&population, *white)?.agent(), dimension)
                .context("White agent does not fit the board")?,
        ),
        Opponent::Pass => Box::new(ScriptedPlayer::new([])),
    };

    let mut game = Game::new(dimension, Box::new(black_player), white_player)
        .with_max_moves(*max_moves);
    // game JSON on stdout moves the board display to stderr
    let json_to_stdout = output.as_deref().is_some_and(util::is_stdout_path);
    let mut console: Box<dyn io::Write> = if json_to_stdout {
        Box::new(io::stderr().lock())
    } else {
        Box::new(io::stdout().lock())
    };

    let mut shown = 0;
    loop {
        let status = game.step();
        if *verbose && game.history().len() > shown {
            shown = game.history().len();
            let turn = game.history()[shown - 1];
            match turn.action {
                Action::Pass => writeln!(console, "#{shown}: {} passes", turn.stone)?,
                Action::Place(coord) => writeln!(console, "#{shown}: {} plays {coord}", turn.stone)?,
            }
            writeln!(console, "{}", game.state().board())?;
        }
        if status.is_finished() {
            break;
        }
    }

    let record = game.into_record();
    let score = record.score();
    writeln!(console, "{}", record.final_board())?;
    writeln!(console, "Moves:  {}", record.moves())?;
    if let Some(reason) = record.end_reason() {
        writeln!(console, "Ended:  {reason}")?;
    }
    writeln!(console, "Score:  {score:+.1} (white's view)")?;
    writeln!(console, "Winner: {}", GameState::winner(score))?;
    console.flush()?;
    drop(console);

    if let Some(path) = output {
        let name = format!("play_{}_{black}_{white}", population.age());
        let target = (!json_to_stdout).then(|| path.clone());
        Output::save_json(&GameSnapshot::now(name, record), target)?;
        if !json_to_stdout {
            eprintln!("Saved game to {}", path.display());
        }
    }
    Ok(())
}

/// Entity at `rank` in [`Population::ranked`] order.
fn pick(population: &Population, rank: usize) -> anyhow::Result<&Entity> {
    let ranked = population.ranked();
    ranked.get(rank).copied().with_context(|| {
        format!(
            "Population of {} agents has no agent at rank {rank}",
            ranked.len()
        )
    })
}

#[cfg(test)]
mod tests {
    use gogo_agent::{Activation, AgentParams};
    use gogo_training::RoundSettings;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_pick_follows_parent_fitness() {
        let params = AgentParams {
            activation: Activation::Sigmoid,
            hidden_layers: vec![4],
            mutation_rate: 0.9,
            stabilization_rate: 0.0,
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let mut population = Population::random(3, 4, &params, &mut rng);
        let settings = RoundSettings {
            groups: 2,
            keep_best: 1,
            recombination: gogo_training::Recombination::Asexual,
            max_moves: Some(30),
        };
        let report = population.play_round(&settings, &mut rng).unwrap();

        let first = pick(&population, 0).unwrap();
        assert_eq!(first.parent_fitness(), report.fitness.max);
        let last = pick(&population, 3).unwrap();
        assert!(last.parent_fitness() <= first.parent_fitness());
        assert!(pick(&population, 4).is_err());
    }
}
