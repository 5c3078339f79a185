use crate::backends::{ReplayModelLoader, SyntheticCamera};
use crate::config::CliConfig;
use anyhow::Context as _;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use dialoguer::Select;
use handsign_core::{
    Frame, GameConfig, GameEvent, GameSession, HistoryEntry, MatchPhase, Move, Score,
};
use handsign_lottery::{NumberSet, NumberSetGenerator, Theme};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

fn new_table(theme: Theme) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    if theme.is_dark() {
        table.apply_modifier(UTF8_ROUND_CORNERS);
    }
    table
}

fn score_table(theme: Theme, score: &Score) -> Table {
    let mut table = new_table(theme);
    table.set_header(vec!["You", "Computer", "Ties", "Rounds"]);
    table.add_row(vec![
        score.user_wins.to_string(),
        score.computer_wins.to_string(),
        score.ties.to_string(),
        score.total().to_string(),
    ]);
    table
}

fn history_table(theme: Theme, history: &[HistoryEntry]) -> Table {
    let mut table = new_table(theme);
    table.set_header(vec!["Time", "You", "Computer", "Result"]);
    for entry in history {
        table.add_row(vec![
            entry.recorded_at.format("%H:%M:%S").to_string(),
            entry.outcome.user_move.to_string(),
            entry.outcome.computer_move.to_string(),
            entry.summary.clone(),
        ]);
    }
    table
}

fn print_board(theme: Theme, session: &GameSession) {
    println!("{}", score_table(theme, &session.score()));
    let history = session.history();
    if !history.is_empty() {
        println!("Recent rounds:");
        println!("{}", history_table(theme, &history));
    }
}

fn open_session(game: GameConfig) -> anyhow::Result<(GameSession, UnboundedReceiver<GameEvent>)> {
    Ok(GameSession::new(
        game,
        Arc::new(ReplayModelLoader),
        Arc::new(SyntheticCamera),
    )?)
}

fn with_script(mut game: GameConfig, script: &Path) -> GameConfig {
    let script = script.to_string_lossy().to_string();
    game.model.model_url = script.clone();
    game.model.metadata_url = script;
    game
}

/// Print what the player should see; true once a match has ended
fn show_event(event: &GameEvent) -> bool {
    match event {
        GameEvent::Status(msg) => println!("{}", msg),
        GameEvent::WebcamStarted => println!("Camera on"),
        GameEvent::WebcamStopped => println!("Camera off"),
        GameEvent::Predictions(predictions) => {
            tracing::trace!("Predictions: {:?}", predictions);
        }
        GameEvent::Detected(Some(m)) => println!("Detected: {}", m),
        GameEvent::Detected(None) => println!("Detected: nothing"),
        GameEvent::MatchStarted {
            match_id,
            total_rounds,
        } => println!("Match {} started: {} rounds", match_id, total_rounds),
        GameEvent::Countdown { round, remaining } if *remaining > 0 => {
            println!("Round {}: {}...", round, remaining)
        }
        GameEvent::Phase(MatchPhase::AwaitingSnapshot { round }) => {
            println!("Round {}: show your hand!", round)
        }
        GameEvent::RoundRetry { round, attempt } => {
            println!("Round {}: no gesture, retry #{}", round, attempt)
        }
        GameEvent::RoundResolved {
            round,
            outcome,
            message,
        } => {
            match round {
                Some(r) => println!("Round {}: {}", r, outcome.summary()),
                None => println!("{}", outcome.summary()),
            }
            println!("  {}", message);
        }
        GameEvent::MatchFinished { score, .. } => {
            println!(
                "Match over! You {} - {} Computer ({} ties)",
                score.user_wins, score.computer_wins, score.ties
            );
            return true;
        }
        GameEvent::MatchAborted { reason, .. } => {
            println!("Match abandoned: {}", reason);
            return true;
        }
        _ => {}
    }
    false
}

fn drain_events(rx: &mut UnboundedReceiver<GameEvent>) {
    while let Ok(event) = rx.try_recv() {
        show_event(&event);
    }
}

fn numbers_table(theme: Theme, sets: &[NumberSet]) -> Table {
    let mut table = new_table(theme);
    table.set_header(vec!["Lucky numbers"]);
    for line in NumberSetGenerator::render(sets) {
        table.add_row(vec![line]);
    }
    table
}

pub fn show_numbers(config: &CliConfig) -> anyhow::Result<()> {
    let sets = handsign_lottery::quick_pick()?;
    println!("{}", numbers_table(config.theme, &sets));
    Ok(())
}

pub async fn toggle_theme(data_dir: &Path, config: &mut CliConfig) -> anyhow::Result<()> {
    config.theme = config.theme.toggle();
    config.save(data_dir).await?;

    let name = if config.theme.is_dark() { "dark" } else { "light" };
    println!("Theme switched to {}", name);
    Ok(())
}

pub async fn play(config: &CliConfig, user_move: Option<Move>) -> anyhow::Result<()> {
    let (session, mut rx) = open_session(config.game_config())?;

    if let Some(user_move) = user_move {
        session.play(user_move)?;
        drain_events(&mut rx);
        return Ok(());
    }

    let items = ["Rock", "Paper", "Scissors", "Reset score", "Quit"];
    loop {
        let choice = Select::new()
            .with_prompt("Your move")
            .items(&items)
            .default(0)
            .interact()?;

        match choice {
            0..=2 => {
                let outcome = session.play(Move::ALL[choice])?;
                tracing::debug!("Round played: {:?}", outcome);
            }
            3 => session.reset(),
            _ => break,
        }

        drain_events(&mut rx);
        print_board(config.theme, &session);
    }

    Ok(())
}

/// Wrap an image file's encoded bytes without decoding them.
///
/// Width and height stay 0 because the pixels are never decoded; the replay
/// model answers from its script and does not look at the frame contents.
fn encoded_still(bytes: Vec<u8>) -> Frame {
    Frame::still(0, 0, bytes)
}

pub async fn classify(config: &CliConfig, script: &Path, image: &Path) -> anyhow::Result<()> {
    let (session, mut rx) = open_session(with_script(config.game_config(), script))?;

    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read image {}", image.display()))?;
    let frame = encoded_still(bytes);

    let played = session.play_image(&frame).await;
    drain_events(&mut rx);

    match played? {
        Some(_) => print_board(config.theme, &session),
        None => println!("Nothing was played"),
    }
    Ok(())
}

pub async fn run_match(
    config: &CliConfig,
    script: &Path,
    rounds: Option<u32>,
) -> anyhow::Result<()> {
    let mut game = with_script(config.game_config(), script);
    if let Some(rounds) = rounds {
        game.total_rounds = rounds;
    }
    let (session, mut rx) = open_session(game)?;

    session.start_webcam().await?;
    session.start_match()?;

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => {
                    if show_event(&event) {
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                session.reset();
                drain_events(&mut rx);
                return Ok(());
            }
        }
    }

    session.stop_webcam();
    drain_events(&mut rx);
    print_board(config.theme, &session);
    Ok(())
}
