use conversation::ThinkingBudget;

pub const HELP_TEXT: &str = "\
Commands:
  /help                      - Show this help message.
  /exit, /quit               - Exit the program.
  /clear                     - Clear history and attachments for a new chat.
  /stats                     - Show session statistics (tokens, model, etc.).
  /system [prompt]           - Set/show the system prompt for the conversation.
  /clear_system              - Remove the system prompt.
  /budget [tokens]           - Set/show the thinking budget (0 = automatic).
  /maxtokens [tokens]        - Set/show the max output tokens for the response.
  /temp [temperature]        - Set/show the temperature for the response.
  /attach <file> [prompt]    - Attach a file. Optionally send a prompt with it.
  /paste                     - Paste text from stdin as an attachment.
  /savelast <file.txt>       - Save the last model response to a text file.
  /save <file.json>          - (Export) Save history to a relative file path.
  /load <file.json>          - (Import) Load history from a relative file path.

History Management:
  /history attachments list          - List file attachments in the conversation history.
  /history attachments remove <t:p>  - Remove an attachment from history (e.g., 2:1).

Attachment Management:
  /attachments list           - List pending attachments for the next prompt.
  /attachments remove <index> - Remove a pending attachment by its index.
  /attachments clear          - Remove all pending attachments.

Session Management:
  /session new                - Start a new, unsaved session (same as /clear).
  /session list               - List saved sessions.
  /session save <name>        - Save the current chat to a named session.
  /session load <name>        - Load a named session.
  /session delete <name>      - Delete a named session.";

#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    Help,
    Exit,
    Clear,
    Stats,
    System(Option<String>),
    ClearSystem,
    Budget(Option<ThinkingBudget>),
    MaxTokens(Option<u32>),
    Temperature(Option<f32>),
    Attach { file: String, prompt: String },
    Paste,
    SaveLast(String),
    Save(String),
    Load(String),
    Attachments(AttachmentsCommand),
    History(HistoryCommand),
    Session(SessionCommand),
    /// Required argument missing; carries the usage line.
    Usage(&'static str),
    /// Argument present but not acceptable.
    Invalid(String),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentsCommand {
    List,
    Remove(usize),
    Clear,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommand {
    ListAttachments,
    RemoveAttachment { turn_index: usize, part_index: usize },
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    New,
    List,
    Save(String),
    Load(String),
    Delete(String),
    Unknown(String),
}

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, args) = match trimmed.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim()),
        None => (trimmed, ""),
    };

    let parsed = match command {
        "/help" => SlashCommand::Help,
        "/exit" | "/quit" => SlashCommand::Exit,
        "/clear" => SlashCommand::Clear,
        "/stats" => SlashCommand::Stats,
        "/system" => SlashCommand::System(non_empty(args)),
        "/clear_system" => SlashCommand::ClearSystem,
        "/budget" => parse_budget(args),
        "/maxtokens" => parse_max_tokens(args),
        "/temp" => parse_temperature(args),
        "/attach" => parse_attach(args),
        "/paste" => SlashCommand::Paste,
        "/savelast" => with_path(args, "/savelast <file.txt>", SlashCommand::SaveLast),
        "/save" => with_path(args, "/save <file.json>", SlashCommand::Save),
        "/load" => with_path(args, "/load <file.json>", SlashCommand::Load),
        "/attachments" => parse_attachments(args),
        "/history" => parse_history(args),
        "/session" => parse_session(args),
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}

fn non_empty(args: &str) -> Option<String> {
    (!args.is_empty()).then(|| args.to_string())
}

fn with_path(args: &str, usage: &'static str, build: fn(String) -> SlashCommand) -> SlashCommand {
    match non_empty(args) {
        Some(path) => build(path),
        None => SlashCommand::Usage(usage),
    }
}

fn parse_budget(args: &str) -> SlashCommand {
    if args.is_empty() {
        return SlashCommand::Budget(None);
    }
    match args.parse::<i64>() {
        Ok(value) if value >= 0 => SlashCommand::Budget(Some(ThinkingBudget::from_raw(value))),
        _ => SlashCommand::Invalid(format!("invalid budget value '{args}'")),
    }
}

fn parse_max_tokens(args: &str) -> SlashCommand {
    if args.is_empty() {
        return SlashCommand::MaxTokens(None);
    }
    match args.parse::<u32>() {
        Ok(value) if value > 0 => SlashCommand::MaxTokens(Some(value)),
        _ => SlashCommand::Invalid(format!("invalid max tokens value '{args}'")),
    }
}

fn parse_temperature(args: &str) -> SlashCommand {
    if args.is_empty() {
        return SlashCommand::Temperature(None);
    }
    match args.parse::<f32>() {
        Ok(value) if value.is_finite() && value > 0.0 => SlashCommand::Temperature(Some(value)),
        _ => SlashCommand::Invalid(format!("invalid temperature value '{args}'")),
    }
}

fn parse_attach(args: &str) -> SlashCommand {
    if args.is_empty() {
        return SlashCommand::Usage("/attach <filename> [prompt...]");
    }
    let (file, prompt) = match args.split_once(char::is_whitespace) {
        Some((file, prompt)) => (file, prompt.trim()),
        None => (args, ""),
    };
    SlashCommand::Attach {
        file: file.to_string(),
        prompt: prompt.to_string(),
    }
}

fn parse_attachments(args: &str) -> SlashCommand {
    let mut words = args.split_whitespace();
    let command = match words.next() {
        None | Some("list") => AttachmentsCommand::List,
        Some("clear") => AttachmentsCommand::Clear,
        Some("remove") => match words.next() {
            None => return SlashCommand::Usage("/attachments remove <index>"),
            Some(index) => match index.parse::<usize>() {
                Ok(index) => AttachmentsCommand::Remove(index),
                Err(_) => return SlashCommand::Invalid(format!("invalid attachment index '{index}'")),
            },
        },
        Some(other) => AttachmentsCommand::Unknown(other.to_string()),
    };
    SlashCommand::Attachments(command)
}

fn parse_history(args: &str) -> SlashCommand {
    let mut words = args.split_whitespace();
    if words.next() != Some("attachments") {
        return SlashCommand::History(HistoryCommand::Unknown(args.to_string()));
    }

    let command = match words.next() {
        None | Some("list") => HistoryCommand::ListAttachments,
        Some("remove") => match words.next() {
            None => return SlashCommand::Usage("/history attachments remove <msg_idx:part_idx>"),
            Some(id) => match parse_part_id(id) {
                Some((turn_index, part_index)) => HistoryCommand::RemoveAttachment {
                    turn_index,
                    part_index,
                },
                None => {
                    return SlashCommand::Invalid(format!(
                        "invalid ID format '{id}', use <msg_idx:part_idx>"
                    ))
                }
            },
        },
        Some(other) => HistoryCommand::Unknown(other.to_string()),
    };
    SlashCommand::History(command)
}

/// Parses `turn:part` coordinates such as `2:1`.
pub fn parse_part_id(id: &str) -> Option<(usize, usize)> {
    let (turn, part) = id.split_once(':')?;
    Some((turn.trim().parse().ok()?, part.trim().parse().ok()?))
}

fn parse_session(args: &str) -> SlashCommand {
    let mut words = args.split_whitespace();
    let sub = words.next().unwrap_or_default();
    let name = words.next().map(str::to_string);

    let command = match (sub, name) {
        ("new", _) => SessionCommand::New,
        ("list", _) => SessionCommand::List,
        ("save", Some(name)) => SessionCommand::Save(name),
        ("load", Some(name)) => SessionCommand::Load(name),
        ("delete", Some(name)) => SessionCommand::Delete(name),
        ("save", None) => return SlashCommand::Usage("/session save <name>"),
        ("load", None) => return SlashCommand::Usage("/session load <name>"),
        ("delete", None) => return SlashCommand::Usage("/session delete <name>"),
        (other, _) => SessionCommand::Unknown(other.to_string()),
    };
    SlashCommand::Session(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_commands_show_when_bare_and_reject_bad_values() {
        assert_eq!(parse_slash_command("/budget"), Some(SlashCommand::Budget(None)));
        assert_eq!(
            parse_slash_command("/budget 0"),
            Some(SlashCommand::Budget(Some(ThinkingBudget::Automatic)))
        );
        assert_eq!(
            parse_slash_command("/budget 2048"),
            Some(SlashCommand::Budget(Some(ThinkingBudget::Tokens(2048))))
        );
        assert!(matches!(parse_slash_command("/budget -5"), Some(SlashCommand::Invalid(_))));
        assert!(matches!(parse_slash_command("/budget 12x"), Some(SlashCommand::Invalid(_))));

        assert!(matches!(parse_slash_command("/maxtokens 0"), Some(SlashCommand::Invalid(_))));
        assert_eq!(
            parse_slash_command("/maxtokens 1024"),
            Some(SlashCommand::MaxTokens(Some(1024)))
        );

        assert!(matches!(parse_slash_command("/temp 0"), Some(SlashCommand::Invalid(_))));
        assert!(matches!(parse_slash_command("/temp nan"), Some(SlashCommand::Invalid(_))));
        assert_eq!(
            parse_slash_command("/temp 0.5"),
            Some(SlashCommand::Temperature(Some(0.5)))
        );
    }

    #[test]
    fn part_ids_need_both_coordinates() {
        assert_eq!(parse_part_id("2:1"), Some((2, 1)));
        assert_eq!(parse_part_id("2"), None);
        assert_eq!(parse_part_id("-1:0"), None);
        assert_eq!(parse_part_id("a:b"), None);
    }
}
