//! src/main.rs
//! Line-driven demo of the completion engine.
//!
//! Each stdin line replaces the input text; lines starting with `:` are
//! control commands (`:up`, `:down`, `:pgup`, `:pgdn`, `:accept`,
//! `:dismiss`, `:clear`, `:invalidate <path>`, `:quit`).

#![allow(clippy::print_stdout, reason = "stdout is the demo surface")]

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use quickpath_core::{
    CompletionEngine, CompletionEvent, EngineHandle, Logger,
    config::{Config, ConfigSource},
    controller::EngineCommand,
};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let (config, source) = Config::load()
        .await
        .context("Failed to load configuration")?;

    let _guard =
        Logger::init_tracing(&config.logging).context("Failed to initialize logging")?;
    info!("Starting quickpath demo");
    match &source {
        ConfigSource::Loaded(path) => info!(path = %path.display(), "Configuration loaded"),
        ConfigSource::Created(path) => {
            info!(path = %path.display(), "Wrote default configuration");
        }
    }

    let (handle, mut events, engine_task) = CompletionEngine::spawn(config.completion);

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match parse_line(&line) {
            Some(EngineCommand::Shutdown) => break,
            Some(command) => dispatch(&handle, command)?,
            None => warn!(line = %line, "Unknown command"),
        }
    }

    handle.shutdown()?;
    engine_task.await.context("Engine task panicked")?;
    // The event sender died with the engine, so this drains and returns.
    printer.await.context("Printer task panicked")?;

    let stats = handle.cache().stats();
    info!(?stats, hit_rate = stats.hit_rate(), "Exiting");
    Ok(())
}

fn dispatch(handle: &EngineHandle, command: EngineCommand) -> Result<()> {
    handle
        .send(command)
        .context("Completion engine stopped unexpectedly")
}

fn parse_line(line: &str) -> Option<EngineCommand> {
    let Some(rest) = line.strip_prefix(':') else {
        return Some(EngineCommand::TextChanged(line.to_string()));
    };

    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    let command = match name {
        "up" => EngineCommand::NavigateSelection(-1),
        "down" => EngineCommand::NavigateSelection(1),
        "pgup" => EngineCommand::NavigateSelection(-10),
        "pgdn" => EngineCommand::NavigateSelection(10),
        "accept" => EngineCommand::Accept,
        "dismiss" => EngineCommand::Dismiss,
        "clear" => EngineCommand::ClearAll,
        "invalidate" if !arg.is_empty() => EngineCommand::InvalidatePrefix(arg.to_string()),
        "quit" | "q" => EngineCommand::Shutdown,
        _ => return None,
    };

    Some(command)
}

fn print_event(event: &CompletionEvent) {
    match event {
        CompletionEvent::ResultsAvailable {
            results,
            generation,
        } => {
            println!("-- results (generation {generation}) --");
            for (i, item) in results.iter().enumerate() {
                println!("{i:>3}  {item}");
            }
        }
        CompletionEvent::ResultsCleared => println!("-- cleared --"),
        CompletionEvent::SelectionChanged { index } => match index {
            Some(i) => println!("-- selected {i} --"),
            None => println!("-- no selection --"),
        },
        CompletionEvent::TextReplaced(text) => println!("-- text: {text}"),
    }
}
