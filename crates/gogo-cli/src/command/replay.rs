use std::path::PathBuf;

use anyhow::{Context, ensure};
use gogo_engine::{Action, GameState};

use crate::util::read_game_file;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Game snapshot written by `train` or `play`
    game: PathBuf,
    /// Print the board after every turn
    #[arg(long)]
    steps: bool,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg { game, steps } = arg;
    let snapshot = read_game_file(game)?;
    let record = &snapshot.record;
    println!(
        "{} ({}x{}, saved at {})",
        snapshot.name,
        record.dimension(),
        record.dimension(),
        snapshot.saved_at
    );

    if *steps {
        let mut state = GameState::new(record.dimension());
        for (index, turn) in record.turns().iter().enumerate() {
            state
                .apply(*turn)
                .with_context(|| format!("Turn #{} cannot be applied", index + 1))?;
            match turn.action {
                Action::Pass => println!("#{}: {} passes", index + 1, turn.stone),
                Action::Place(coord) => println!("#{}: {} plays {coord}", index + 1, turn.stone),
            }
            println!("{}", state.board());
        }
    }

    let state = record
        .replay()
        .with_context(|| format!("Failed to replay game: {}", game.display()))?;
    ensure!(
        state.board() == record.final_board(),
        "Replayed board differs from the recorded one"
    );
    ensure!(
        state.move_count() == record.moves(),
        "Replay took {} moves but {} were recorded",
        state.move_count(),
        record.moves()
    );
    ensure!(
        (state.score() - record.score()).abs() <= f32::EPSILON,
        "Replayed score {} differs from the recorded {}",
        state.score(),
        record.score()
    );

    println!("{}", state.board());
    println!("Moves:  {}", record.moves());
    if let Some(reason) = record.end_reason() {
        println!("Ended:  {reason}");
    }
    println!("Score:  {:+.1} (white's view)", state.score());
    println!("Winner: {}", GameState::winner(state.score()));
    Ok(())
}
