use std::path::{Path, PathBuf};

use clap::Parser;

/// Terminal chat client for the Gemini API.
///
/// Runs interactively when attached to a terminal. When input is piped, the
/// piped text is attached to the prompt, a single reply is printed and the
/// process exits.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "gemini-chat", version)]
pub struct Cli {
    /// Model name, e.g. gemini-2.5-pro.
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Generation temperature.
    #[arg(short = 't', long = "temp")]
    pub temperature: Option<f32>,

    /// Generation seed for reproducible outputs.
    #[arg(short = 's', long)]
    pub seed: Option<i32>,

    /// Maximum number of tokens in the response.
    #[arg(short = 'o', long = "max-tokens")]
    pub max_tokens: Option<u32>,

    /// Thinking token budget; 0 disables thinking, negative means automatic.
    #[arg(short = 'b', long = "budget", allow_negative_numbers = true)]
    pub budget: Option<i64>,

    /// Disable Google Search grounding.
    #[arg(long)]
    pub no_grounding: bool,

    /// Disable the URL context tool.
    #[arg(long)]
    pub no_url_context: bool,

    /// Wait for the whole reply instead of streaming it.
    #[arg(long)]
    pub no_stream: bool,

    /// Prompt words, files to attach, or a `.json` history to load.
    pub inputs: Vec<String>,
}

/// Positional inputs sorted by what they refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupInputs {
    pub history_files: Vec<PathBuf>,
    pub attachments: Vec<PathBuf>,
    pub prompt: String,
}

/// `*.json` loads history, an existing path is attached, anything else is prompt text.
pub fn classify_inputs<F>(inputs: &[String], exists: F) -> StartupInputs
where
    F: Fn(&Path) -> bool,
{
    let mut startup = StartupInputs::default();
    let mut words = Vec::new();

    for input in inputs {
        if input.len() > ".json".len() && input.ends_with(".json") {
            startup.history_files.push(PathBuf::from(input));
        } else if exists(Path::new(input)) {
            startup.attachments.push(PathBuf::from(input));
        } else {
            words.push(input.as_str());
        }
    }

    startup.prompt = words.join(" ");
    startup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_split_into_history_attachments_and_prompt() {
        let inputs: Vec<String> = ["summarize", "main.rs", "chat.json", "briefly", ".json"]
            .into_iter()
            .map(String::from)
            .collect();

        let startup = classify_inputs(&inputs, |path| path == Path::new("main.rs"));
        assert_eq!(startup.history_files, vec![PathBuf::from("chat.json")]);
        assert_eq!(startup.attachments, vec![PathBuf::from("main.rs")]);
        assert_eq!(startup.prompt, "summarize briefly .json");
    }

    #[test]
    fn flags_parse_with_negative_budget() {
        let cli = Cli::parse_from([
            "gemini-chat",
            "-m",
            "gemini-2.5-flash",
            "-b",
            "-1",
            "--no-grounding",
            "hello",
        ]);
        assert_eq!(cli.model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(cli.budget, Some(-1));
        assert!(cli.no_grounding);
        assert!(!cli.no_url_context);
        assert_eq!(cli.inputs, vec!["hello".to_string()]);
    }
}
