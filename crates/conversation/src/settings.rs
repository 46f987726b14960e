use std::fmt;

pub const DEFAULT_MODEL_NAME: &str = "gemini-2.5-pro";
pub const DEFAULT_TEMPERATURE: f32 = 0.75;
pub const DEFAULT_SEED: i32 = 42;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 65_536;

/// Thinking budget ceiling for the lightweight ("flash") model family.
pub const LIGHTWEIGHT_THINKING_BUDGET_CAP: u32 = 16_384;
/// Wire value requesting automatic thinking budget sizing.
pub const AUTOMATIC_THINKING_BUDGET: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThinkingBudget {
    #[default]
    Automatic,
    Tokens(u32),
}

impl ThinkingBudget {
    /// Interprets a raw numeric budget; anything below 1 means automatic.
    pub fn from_raw(raw: i64) -> Self {
        if raw < 1 {
            Self::Automatic
        } else {
            Self::Tokens(u32::try_from(raw).unwrap_or(u32::MAX))
        }
    }

    /// Interprets a budget given at startup: negative means automatic, 0 disables thinking.
    pub fn from_literal(raw: i64) -> Self {
        if raw < 0 {
            Self::Automatic
        } else {
            Self::Tokens(u32::try_from(raw).unwrap_or(u32::MAX))
        }
    }

    /// Numeric form sent on the wire; automatic is still emitted.
    pub fn wire_value(&self) -> i64 {
        match self {
            Self::Automatic => AUTOMATIC_THINKING_BUDGET,
            Self::Tokens(tokens) => i64::from(*tokens),
        }
    }
}

impl fmt::Display for ThinkingBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automatic => f.write_str("automatic"),
            Self::Tokens(tokens) => write!(f, "{tokens} tokens"),
        }
    }
}

/// Generation parameters for the session. Not versioned; mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub model: String,
    pub temperature: f32,
    pub seed: i32,
    pub max_output_tokens: u32,
    thinking_budget: ThinkingBudget,
    pub google_grounding: bool,
    pub url_context: bool,
    pub system_instruction: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL_NAME.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            seed: DEFAULT_SEED,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            thinking_budget: ThinkingBudget::Automatic,
            google_grounding: true,
            url_context: true,
            system_instruction: None,
        }
    }
}

impl SessionSettings {
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self.apply_model_limits();
        self
    }

    #[must_use]
    pub fn with_thinking_budget(mut self, budget: ThinkingBudget) -> Self {
        self.set_thinking_budget(budget);
        self
    }

    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn with_tools(mut self, google_grounding: bool, url_context: bool) -> Self {
        self.google_grounding = google_grounding;
        self.url_context = url_context;
        self
    }

    pub fn thinking_budget(&self) -> ThinkingBudget {
        self.thinking_budget
    }

    pub fn set_thinking_budget(&mut self, budget: ThinkingBudget) {
        self.thinking_budget = budget;
        self.apply_model_limits();
    }

    /// Both server-side tools are sent together or not at all.
    pub fn tools_enabled(&self) -> bool {
        self.google_grounding && self.url_context
    }

    pub fn is_lightweight_model(&self) -> bool {
        self.model.contains("flash")
    }

    /// Caps the thinking budget for the lightweight model family.
    pub fn apply_model_limits(&mut self) {
        if let ThinkingBudget::Tokens(tokens) = self.thinking_budget {
            if self.is_lightweight_model() && tokens > LIGHTWEIGHT_THINKING_BUDGET_CAP {
                tracing::debug!(
                    model = %self.model,
                    requested = tokens,
                    cap = LIGHTWEIGHT_THINKING_BUDGET_CAP,
                    "clamping thinking budget"
                );
                self.thinking_budget = ThinkingBudget::Tokens(LIGHTWEIGHT_THINKING_BUDGET_CAP);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lightweight_model_budget_is_clamped() {
        let settings = SessionSettings::default()
            .with_model("gemini-2.5-flash")
            .with_thinking_budget(ThinkingBudget::Tokens(50_000));
        assert_eq!(
            settings.thinking_budget(),
            ThinkingBudget::Tokens(LIGHTWEIGHT_THINKING_BUDGET_CAP)
        );
    }

    #[test]
    fn clamp_applies_when_model_changes_after_budget() {
        let settings = SessionSettings::default()
            .with_thinking_budget(ThinkingBudget::Tokens(50_000))
            .with_model("gemini-2.5-flash-lite");
        assert_eq!(settings.thinking_budget().wire_value(), 16_384);
    }

    #[test]
    fn pro_model_budget_is_untouched() {
        let settings = SessionSettings::default().with_thinking_budget(ThinkingBudget::Tokens(50_000));
        assert_eq!(settings.thinking_budget(), ThinkingBudget::Tokens(50_000));
    }

    #[test]
    fn raw_budget_below_one_is_automatic() {
        assert_eq!(ThinkingBudget::from_raw(0), ThinkingBudget::Automatic);
        assert_eq!(ThinkingBudget::from_raw(-1), ThinkingBudget::Automatic);
        assert_eq!(ThinkingBudget::from_raw(128), ThinkingBudget::Tokens(128));
        assert_eq!(ThinkingBudget::Automatic.wire_value(), -1);
    }

    #[test]
    fn tools_require_both_toggles() {
        assert!(SessionSettings::default().tools_enabled());
        assert!(!SessionSettings::default().with_tools(true, false).tools_enabled());
        assert!(!SessionSettings::default().with_tools(false, true).tools_enabled());
    }

    #[test]
    fn literal_zero_budget_disables_thinking() {
        assert_eq!(ThinkingBudget::from_literal(0).wire_value(), 0);
        assert_eq!(ThinkingBudget::from_literal(-5), ThinkingBudget::Automatic);
        assert_eq!(ThinkingBudget::from_literal(512), ThinkingBudget::Tokens(512));
    }
}
