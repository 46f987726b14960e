use std::fmt::Display;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use conversation::{Conversation, ConversationError, ExchangeOutcome, SessionSettings};
use gemini_api::{
    build_count_tokens_request, build_generate_request, CountTokensRequest, GeminiApiError,
    GenerateContentRequest,
};
use session_store::{
    load_from_path, save_to_path, validate_relative_path, LoadedSession, SessionStore,
    SessionStoreError,
};

use crate::commands::{
    parse_slash_command, AttachmentsCommand, HistoryCommand, SessionCommand, SlashCommand,
    HELP_TEXT,
};
use crate::mime::mime_type_for;

pub const UNSAVED_SESSION_NAME: &str = "[unsaved]";
pub const PASTE_SOURCE_NAME: &str = "stdin";
pub const PASTE_MIME_TYPE: &str = "text/plain";

/// Everything the session loop needs from the outside world.
pub trait ChatHost {
    /// Sends one generation request. When `streaming` is set the host echoes
    /// fragments as they arrive; either way the full reply text is returned.
    fn generate(
        &mut self,
        model: &str,
        request: &GenerateContentRequest,
        streaming: bool,
    ) -> Result<String, GeminiApiError>;

    fn count_tokens(&mut self, model: &str, request: &CountTokensRequest)
        -> Result<u64, GeminiApiError>;

    /// Model output.
    fn emit(&mut self, text: &str);

    /// One status or diagnostic line.
    fn notice(&mut self, line: &str);

    /// Reader for `/paste`, consumed until EOF.
    fn paste_source(&mut self) -> Box<dyn Read + '_>;
}

/// How a submitted turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// No prompt and no pending attachments; nothing was sent.
    Empty,
    Completed,
    RolledBack,
}

#[derive(Debug)]
pub struct App {
    pub settings: SessionSettings,
    /// Stream replies instead of waiting for the whole body.
    pub streaming: bool,
    pub should_exit: bool,
    conversation: Conversation,
    last_response: Option<String>,
    session_name: String,
    base_dir: PathBuf,
    sessions: Option<SessionStore>,
}

impl App {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            streaming: true,
            should_exit: false,
            conversation: Conversation::new(),
            last_response: None,
            session_name: UNSAVED_SESSION_NAME.to_string(),
            base_dir: PathBuf::from("."),
            sessions: None,
        }
    }

    /// Directory that relative file arguments resolve against.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    #[must_use]
    pub fn with_session_store(mut self, sessions: Option<SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    #[must_use]
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn prompt(&self) -> String {
        format!("({})>: ", self.session_name)
    }

    pub fn banner_lines(&self) -> Vec<String> {
        let settings = &self.settings;
        vec![
            format!(
                "Using model: {}, Temperature: {:.2}, Seed: {}",
                settings.model, settings.temperature, settings.seed
            ),
            format!("Max Output Tokens: {}", settings.max_output_tokens),
            format!("Thinking Budget: {}", settings.thinking_budget()),
            format!("Google grounding: {}", on_off(settings.google_grounding)),
            format!("URL Context: {}", on_off(settings.url_context)),
        ]
    }

    /// Handles one line of user input: a slash command or a prompt.
    pub fn submit_line(&mut self, line: &str, host: &mut dyn ChatHost) {
        let line = line.trim();
        if line.is_empty() && self.conversation.pending().is_empty() {
            return;
        }

        match parse_slash_command(line) {
            Some(command) => self.run_command(command, host),
            None => {
                self.send_turn(line, host);
            }
        }
    }

    /// Folds pending attachments and `prompt` into a user turn and sends it.
    ///
    /// The user turn stays in history only if a model reply is appended after it.
    pub fn send_turn(&mut self, prompt: &str, host: &mut dyn ChatHost) -> TurnOutcome {
        let exchange = match self.conversation.commit_turn(prompt) {
            Ok(Some(exchange)) => exchange,
            Ok(None) => return TurnOutcome::Empty,
            Err(error) => {
                report(host, "Error", error);
                return TurnOutcome::RolledBack;
            }
        };

        let request = build_generate_request(&self.settings, exchange.history(), None);
        let reply = match host.generate(&self.settings.model, &request, self.streaming) {
            Ok(reply) => reply,
            Err(error) => {
                tracing::debug!(
                    transport = error.is_transport(),
                    protocol = error.is_protocol(),
                    "generation failed"
                );
                report(host, "API request failed", error);
                exchange.roll_back();
                return TurnOutcome::RolledBack;
            }
        };

        if !self.streaming {
            host.emit(&reply);
        }
        host.emit("\n");

        match exchange.complete(reply.clone()) {
            Ok(ExchangeOutcome::Completed) => {
                self.last_response = Some(reply);
                TurnOutcome::Completed
            }
            Ok(ExchangeOutcome::RolledBack) => TurnOutcome::RolledBack,
            Err(error) => {
                report(host, "Error", error);
                TurnOutcome::RolledBack
            }
        }
    }

    /// Stages a file; relative paths resolve against the base directory.
    pub fn attach_file(&mut self, file: &str, host: &mut dyn ChatHost) -> bool {
        let path = self.resolve(file);
        let source = match File::open(&path) {
            Ok(source) => source,
            Err(error) => {
                report(host, &format!("Error opening file '{file}'"), error);
                return false;
            }
        };
        let mime_type = mime_type_for(&path);
        let result = self
            .conversation
            .begin_pending_attachment(source, file, &mime_type);
        self.report_attached(result, host)
    }

    pub fn attach_reader<R: Read>(
        &mut self,
        source: R,
        source_name: &str,
        mime_type: &str,
        host: &mut dyn ChatHost,
    ) -> bool {
        let result = self
            .conversation
            .begin_pending_attachment(source, source_name, mime_type);
        self.report_attached(result, host)
    }

    /// Replaces history from a session file given on the command line.
    pub fn import_history(&mut self, path: &Path, host: &mut dyn ChatHost) -> bool {
        let resolved = self.resolve_path(path);
        match load_from_path(&resolved) {
            Ok(loaded) => {
                self.apply_loaded(loaded, host);
                host.notice(&format!("Conversation history loaded from {}", path.display()));
                true
            }
            Err(error) => {
                report(host, "Error loading history", error);
                false
            }
        }
    }

    fn run_command(&mut self, command: SlashCommand, host: &mut dyn ChatHost) {
        match command {
            SlashCommand::Help => {
                for line in HELP_TEXT.lines() {
                    host.notice(line);
                }
            }
            SlashCommand::Exit => self.should_exit = true,
            SlashCommand::Clear => self.clear_session(host),
            SlashCommand::Stats => self.show_stats(host),
            SlashCommand::System(None) => match &self.settings.system_instruction {
                Some(text) => host.notice(&format!("System prompt is: {text}")),
                None => host.notice("System prompt is empty."),
            },
            SlashCommand::System(Some(text)) => {
                host.notice(&format!("System prompt set to: '{text}'"));
                self.settings.system_instruction = Some(text);
            }
            SlashCommand::ClearSystem => match self.settings.system_instruction.take() {
                Some(_) => host.notice("System prompt cleared."),
                None => host.notice("No system prompt was set."),
            },
            SlashCommand::Budget(None) => host.notice(&format!(
                "Thinking budget: {}.",
                self.settings.thinking_budget()
            )),
            SlashCommand::Budget(Some(budget)) => {
                self.settings.set_thinking_budget(budget);
                host.notice(&format!(
                    "Thinking budget set to {}.",
                    self.settings.thinking_budget()
                ));
            }
            SlashCommand::MaxTokens(None) => host.notice(&format!(
                "Max output tokens: {} tokens.",
                self.settings.max_output_tokens
            )),
            SlashCommand::MaxTokens(Some(tokens)) => {
                self.settings.max_output_tokens = tokens;
                host.notice(&format!("Max output tokens set to {tokens}."));
            }
            SlashCommand::Temperature(None) => {
                host.notice(&format!("Temperature: {:.2}.", self.settings.temperature))
            }
            SlashCommand::Temperature(Some(temperature)) => {
                self.settings.temperature = temperature;
                host.notice(&format!("Temperature set to {temperature:.2}."));
            }
            SlashCommand::Attach { file, prompt } => {
                if let Err(error) = validate_relative_path(&file) {
                    report(host, "Error", error);
                    return;
                }
                if self.attach_file(&file, host) && !prompt.is_empty() {
                    self.send_turn(&prompt, host);
                }
            }
            SlashCommand::Paste => {
                host.notice("Pasting content. Press Ctrl+D when done.");
                let result = {
                    let source = host.paste_source();
                    self.conversation
                        .begin_pending_attachment(source, PASTE_SOURCE_NAME, PASTE_MIME_TYPE)
                };
                self.report_attached(result, host);
            }
            SlashCommand::SaveLast(file) => self.save_last_response(&file, host),
            SlashCommand::Save(file) => self.export_history(&file, host),
            SlashCommand::Load(file) => {
                if let Err(error) = validate_relative_path(&file) {
                    report(host, "Error", error);
                    return;
                }
                self.import_history(Path::new(&file), host);
            }
            SlashCommand::Attachments(command) => self.run_attachments_command(command, host),
            SlashCommand::History(command) => self.run_history_command(command, host),
            SlashCommand::Session(command) => self.run_session_command(command, host),
            SlashCommand::Usage(usage) => host.notice(&format!("Usage: {usage}")),
            SlashCommand::Invalid(message) => host.notice(&format!("Error: {message}.")),
            SlashCommand::Unknown(command) => host.notice(&format!(
                "Unknown command: {command}. Type '/help' for a list of commands."
            )),
        }
    }

    fn clear_session(&mut self, host: &mut dyn ChatHost) {
        self.conversation.clear();
        self.settings.system_instruction = None;
        self.last_response = None;
        self.session_name = UNSAVED_SESSION_NAME.to_string();
        host.notice("New session started.");
    }

    fn show_stats(&self, host: &mut dyn ChatHost) {
        let history = self.conversation.history();
        let pending = self.conversation.pending();
        let settings = &self.settings;

        host.notice("--- Session Stats ---");
        host.notice(&format!("Model: {}", settings.model));
        host.notice(&format!("Temperature: {:.2}", settings.temperature));
        host.notice(&format!("Seed: {}", settings.seed));
        host.notice(&format!("Max Output Tokens: {}", settings.max_output_tokens));
        host.notice(&format!("Thinking Budget: {}", settings.thinking_budget()));
        host.notice(&format!(
            "System Prompt: {}",
            settings.system_instruction.as_deref().unwrap_or("Not set")
        ));
        host.notice(&format!("Messages in history: {}", history.len()));
        host.notice(&format!("Pending attachments: {}", pending.len()));

        if !history.is_empty() || !pending.is_empty() {
            let extra = self.conversation.preview_turn("");
            let request = build_count_tokens_request(settings, history, extra.as_ref());
            match host.count_tokens(&settings.model, &request) {
                Ok(tokens) => {
                    host.notice(&format!("Total tokens in context (incl. pending): {tokens}"))
                }
                Err(error) => report(host, "Could not retrieve token count", error),
            }
        }
        host.notice("---------------------");
    }

    fn save_last_response(&mut self, file: &str, host: &mut dyn ChatHost) {
        let Some(text) = &self.last_response else {
            host.notice("No last response to save.");
            return;
        };
        if let Err(error) = validate_relative_path(file) {
            report(host, "Error", error);
            return;
        }
        match fs::write(self.resolve(file), text) {
            Ok(()) => host.notice(&format!("Last response saved to {file}")),
            Err(error) => report(host, "Failed to save last response", error),
        }
    }

    fn export_history(&mut self, file: &str, host: &mut dyn ChatHost) {
        if let Err(error) = validate_relative_path(file) {
            report(host, "Error", error);
            return;
        }
        let path = self.resolve(file);
        match save_to_path(
            &path,
            self.conversation.history(),
            self.settings.system_instruction.as_deref(),
        ) {
            Ok(()) => host.notice(&format!("Conversation history saved to {file}")),
            Err(error) => report(host, "Error saving history", error),
        }
    }

    fn run_attachments_command(&mut self, command: AttachmentsCommand, host: &mut dyn ChatHost) {
        match command {
            AttachmentsCommand::List => {
                let pending = self.conversation.pending();
                if pending.is_empty() {
                    host.notice("No pending attachments.");
                    return;
                }
                host.notice("Pending Attachments:");
                for (index, attachment) in pending.iter().enumerate() {
                    host.notice(&format!(
                        "  [{index}] {} (MIME: {})",
                        attachment.display_name(),
                        attachment.mime_type
                    ));
                }
            }
            AttachmentsCommand::Remove(index) => {
                match self.conversation.pending_mut().remove(index) {
                    Ok(removed) => {
                        host.notice(&format!("Removing attachment: {}", removed.display_name()))
                    }
                    Err(error) => report(host, "Error", error),
                }
            }
            AttachmentsCommand::Clear => {
                self.conversation.pending_mut().clear();
                host.notice("All pending attachments cleared.");
            }
            AttachmentsCommand::Unknown(other) => host.notice(&format!(
                "Unknown attachments command: '{other}'. Use list, remove, or clear."
            )),
        }
    }

    fn run_history_command(&mut self, command: HistoryCommand, host: &mut dyn ChatHost) {
        match command {
            HistoryCommand::ListAttachments => {
                host.notice("--- Attachments in History ---");
                let mut found = false;
                for entry in self.conversation.history().attachments() {
                    if !found {
                        host.notice("  ID      | Role  | Filename / Description");
                        host.notice("----------|-------|----------------------------------------");
                        found = true;
                    }
                    host.notice(&format!(
                        "  [{:<2}:{:<2}] | {:<5} | {} (MIME: {})",
                        entry.turn_index,
                        entry.part_index,
                        entry.role.as_str(),
                        entry.attachment.display_name(),
                        entry.attachment.mime_type
                    ));
                }
                if !found {
                    host.notice("  (No file attachments found in history)");
                }
                host.notice("------------------------------");
            }
            HistoryCommand::RemoveAttachment {
                turn_index,
                part_index,
            } => match self
                .conversation
                .history_mut()
                .remove_attachment(turn_index, part_index)
            {
                Ok(removed) => host.notice(&format!(
                    "Removing attachment [{turn_index}:{part_index}]: {}",
                    removed.display_name()
                )),
                Err(error) => report(host, "Error", error),
            },
            HistoryCommand::Unknown(_) => host.notice(
                "Unknown command for '/history'. Try '/history attachments list' or '/history attachments remove <t:p>'.",
            ),
        }
    }

    fn run_session_command(&mut self, command: SessionCommand, host: &mut dyn ChatHost) {
        if let SessionCommand::New = command {
            self.clear_session(host);
            return;
        }
        if let SessionCommand::Unknown(other) = &command {
            host.notice(&format!(
                "Unknown session command: '{other}'. Use '/help' to see options."
            ));
            return;
        }

        let Some(store) = self.sessions.clone() else {
            report(host, "Error", SessionStoreError::NoSessionRoot);
            return;
        };

        match command {
            SessionCommand::List => match store.list() {
                Ok(sessions) if sessions.is_empty() => host.notice("No saved sessions found."),
                Ok(sessions) => {
                    host.notice("Saved sessions:");
                    for session in sessions {
                        match session.modified {
                            Some(modified) => {
                                host.notice(&format!("  {:<24} {modified}", session.name))
                            }
                            None => host.notice(&format!("  {}", session.name)),
                        }
                    }
                }
                Err(error) => report(host, "Error listing sessions", error),
            },
            SessionCommand::Save(name) => match store.save(
                &name,
                self.conversation.history(),
                self.settings.system_instruction.as_deref(),
            ) {
                Ok(path) => {
                    host.notice(&format!("Conversation history saved to {}", path.display()));
                    self.session_name = name;
                }
                Err(error) => report(host, "Error saving session", error),
            },
            SessionCommand::Load(name) => match store.load(&name) {
                Ok(loaded) => {
                    self.apply_loaded(loaded, host);
                    host.notice(&format!("Session '{name}' loaded."));
                    self.session_name = name;
                }
                Err(error) => report(host, "Error loading session", error),
            },
            SessionCommand::Delete(name) => match store.delete(&name) {
                Ok(()) => host.notice(&format!("Session '{name}' deleted.")),
                Err(error) => report(host, "Error deleting session", error),
            },
            SessionCommand::New | SessionCommand::Unknown(_) => {}
        }
    }

    /// History is replaced; the system instruction only when the file has one.
    fn apply_loaded(&mut self, loaded: LoadedSession, host: &mut dyn ChatHost) {
        for skipped in &loaded.skipped {
            host.notice(&format!(
                "Warning: skipped history entry {}: {}",
                skipped.index, skipped.reason
            ));
        }
        self.conversation.replace_history(loaded.history);
        if let Some(system) = loaded.system_instruction {
            self.settings.system_instruction = Some(system);
        }
    }

    fn report_attached(
        &self,
        result: Result<(), ConversationError>,
        host: &mut dyn ChatHost,
    ) -> bool {
        match result {
            Ok(()) => {
                if let Some(attachment) = self.conversation.pending().as_slice().last() {
                    host.notice(&format!(
                        "Attached {} (MIME: {}, Size: {} bytes)",
                        attachment.display_name(),
                        attachment.mime_type,
                        attachment.byte_len()
                    ));
                }
                true
            }
            Err(error) => {
                report(host, "Error attaching", error);
                false
            }
        }
    }

    fn resolve(&self, file: &str) -> PathBuf {
        self.resolve_path(Path::new(file))
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

fn report(host: &mut dyn ChatHost, context: &str, error: impl Display) {
    host.notice(&format!("{context}: {error}"));
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}
