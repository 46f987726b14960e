use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use gemini_api::GeminiApiConfig;
use gemini_chat::app::{PASTE_MIME_TYPE, PASTE_SOURCE_NAME};
use gemini_chat::config::{config_file_path, CONFIG_DIR_NAME};
use gemini_chat::{
    classify_inputs, logging, resolve, App, ChatConfig, ChatHost, Cli, EnvConfig, FileConfig,
    GeminiHost, KeySource, TurnOutcome,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use session_store::SessionStore;

const HISTORY_FILE_NAME: &str = "history.txt";

fn main() -> ExitCode {
    logging::init();
    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_dir = dirs::config_dir();

    let file = config_dir
        .as_deref()
        .map(|dir| FileConfig::load_or_default(&config_file_path(dir)))
        .unwrap_or_default();
    let config = resolve(file, EnvConfig::from_env(), &cli);

    let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
    let mut host = build_host(&config, interactive)?;

    let base_dir = std::env::current_dir().context("could not determine the working directory")?;
    let sessions = match SessionStore::under_config_dir(config_dir.as_deref()) {
        Ok(store) => Some(store),
        Err(error) => {
            tracing::warn!(%error, "named sessions are unavailable");
            None
        }
    };
    let mut app = App::new(config.settings.clone())
        .with_base_dir(base_dir)
        .with_session_store(sessions)
        .with_streaming(config.streaming);

    let startup = classify_inputs(&cli.inputs, |path| path.exists());
    for path in &startup.history_files {
        app.import_history(path, &mut host);
    }
    for path in &startup.attachments {
        app.attach_file(&path.to_string_lossy(), &mut host);
    }

    if !interactive {
        return run_once(&mut app, &mut host, &startup.prompt);
    }

    for line in app.banner_lines() {
        host.notice(&line);
    }
    if !app.conversation().pending().is_empty() {
        host.notice("Initial attachments loaded. Enter your prompt to send them.");
    }
    host.notice("Interactive session started. Type '/help' for commands, '/exit' or '/quit' to end.");

    if !startup.prompt.is_empty() {
        host.notice("Initial prompt provided. Sending request...");
        app.send_turn(&startup.prompt, &mut host);
    }

    run_interactive(&mut app, &mut host, config_dir.map(|dir| dir.join(CONFIG_DIR_NAME)))?;
    Ok(ExitCode::SUCCESS)
}

fn build_host(config: &ChatConfig, interactive: bool) -> Result<GeminiHost> {
    let Some(api_key) = config.api_key.clone() else {
        bail!(
            "no API key found; set GEMINI_API_KEY or add \"api_key\" to {}",
            dirs::config_dir()
                .map(|dir| config_file_path(&dir).display().to_string())
                .unwrap_or_else(|| "the config file".to_string())
        );
    };

    if interactive {
        match config.key_source {
            Some(KeySource::Environment) => eprintln!("API Key loaded from environment variable."),
            Some(KeySource::ConfigFile) => eprintln!("API Key loaded from configuration file."),
            None => {}
        }
    }

    let mut api_config = GeminiApiConfig::new(api_key);
    if let Some(origin) = &config.origin {
        api_config = api_config.with_origin(origin.clone());
    }
    GeminiHost::new(api_config)
}

/// Piped mode: stdin becomes an attachment and exactly one request is sent.
fn run_once(app: &mut App, host: &mut GeminiHost, prompt: &str) -> Result<ExitCode> {
    if !io::stdin().is_terminal() {
        let stdin = io::stdin();
        app.attach_reader(stdin.lock(), PASTE_SOURCE_NAME, PASTE_MIME_TYPE, host);
    }

    Ok(match app.send_turn(prompt, host) {
        TurnOutcome::Completed => ExitCode::SUCCESS,
        TurnOutcome::Empty => {
            host.notice("Nothing to send: give a prompt or pipe input.");
            ExitCode::FAILURE
        }
        TurnOutcome::RolledBack => ExitCode::FAILURE,
    })
}

fn run_interactive(app: &mut App, host: &mut GeminiHost, state_dir: Option<PathBuf>) -> Result<()> {
    let mut rl = DefaultEditor::new().context("failed to initialise line editor")?;
    let history_path = state_dir.map(|dir| dir.join(HISTORY_FILE_NAME));
    if let Some(path) = &history_path {
        if let Err(error) = rl.load_history(path) {
            tracing::debug!(%error, "no line history loaded");
        }
    }

    while !app.should_exit {
        match rl.readline(&app.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                app.submit_line(&line, host);
            }
            Err(ReadlineError::Interrupted) => {
                host.notice("Interrupted. Type '/exit' or press Ctrl+D to quit.");
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(error) => return Err(error).context("failed to read input"),
        }
    }

    if let Some(path) = &history_path {
        let saved = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .map_err(ReadlineError::from)
            .and_then(|()| rl.save_history(path));
        if let Err(error) = saved {
            tracing::debug!(%error, "line history not saved");
        }
    }
    Ok(())
}
