//! Configuration types for the chat assistant.
//!
//! This module provides CLI argument parsing via `arrrg`, an optional YAML
//! configuration file, and the resolved [`ChatConfig`].  Precedence is
//! defaults, then the file, then the command line.

use std::fs;
use std::path::Path;
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{GenerationConfig, KnownModel, Model};

/// The instruction every assistant session is created with.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"You are 'Kizazi AI', the virtual assistant for Kizazi Technologies, a leading Malawian technology company.
Motto: "Innovations for Generations".

Your goal is to help visitors understand Kizazi's services, values, and projects.
Be professional, futuristic, yet friendly and approachable.
Keep responses concise (under 100 words unless asked for detail).

Company Info:
- Location: Blantyre, Malawi.
- Contact: info@kizazitech.mw, +265 993 909 120.

Core Values:
- Innovation (Creativity), Integrity (Trust), Excellence (Quality), Empowerment (Talent Development), Sustainability.

Services:
1. AI & Automation (Machine learning, Chatbots, Predictive analytics).
2. Software & App Dev (Mobile apps, Web apps, UX/UI).
3. Digital Transformation (Cloud, IT Consulting, Cybersecurity).
4. Innovation (R&D, Tech incubation, AI literacy).

Key Projects (Portfolio):
1. Zoko: A beauty and wellness platform connecting beauticians to clients.
2. AgriSmart IoT: A mobile app and sensor network for real-time soil moisture monitoring for farmers.
3. FinData Analytics: AI-powered dashboard for financial data visualization and prediction.

If asked about prices, say that solutions are tailored and suggest contacting the sales team via the contact form or email."#;

/// The assistant's opening line.
pub const DEFAULT_GREETING: &str =
    "Greetings. I am Kizazi AI. How may I assist with your digital transformation today?";

/// Command-line arguments for the kizazi-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-2.5-flash)", "MODEL")]
    pub model: Option<String>,

    /// Replacement system instruction.
    #[arrrg(optional, "System instruction for the assistant", "PROMPT")]
    pub system: Option<String>,

    /// YAML configuration file.
    #[arrrg(optional, "YAML configuration file", "FILE")]
    pub config: Option<String>,

    /// Replacement greeting.
    #[arrrg(optional, "Opening message from the assistant", "TEXT")]
    pub greeting: Option<String>,

    /// Start without a greeting.
    #[arrrg(flag, "Do not show an opening message")]
    pub no_greeting: bool,

    /// API base URL.
    #[arrrg(optional, "Gemini API base URL", "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECONDS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// On-disk configuration.  Every field is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    model: Option<String>,
    system_instruction: Option<String>,
    greeting: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    use_color: Option<bool>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

/// Configuration for the chat assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Instruction every session is created with.
    pub system_instruction: String,

    /// Opening assistant message, if any.
    pub greeting: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// API base URL override.
    pub base_url: Option<String>,

    /// Per-request timeout override.
    pub timeout: Option<Duration>,

    /// Optional sampling temperature.
    pub temperature: Option<f32>,

    /// Optional reply length limit.
    pub max_output_tokens: Option<u32>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-2.5-flash
    /// - System instruction: the Kizazi AI prompt
    /// - Greeting: the Kizazi AI greeting
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::Known(KnownModel::Gemini25Flash),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            use_color: true,
            base_url: None,
            timeout: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Resolve command-line arguments, reading the config file they name.
    pub fn resolve(args: ChatArgs) -> Result<Self> {
        let base = match args.config.as_deref() {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::new(),
        };
        base.apply_args(args)
    }

    /// Load a YAML config file on top of the defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            Error::io(format!("failed to read config {}", path.display()), err)
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse YAML config text on top of the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(text)?;
        let mut config = Self::new();
        if let Some(model) = file.model {
            config.model = parse_model(&model)?;
        }
        if let Some(instruction) = file.system_instruction {
            config.system_instruction = instruction;
        }
        if let Some(greeting) = file.greeting {
            config.greeting = Some(greeting).filter(|g| !g.trim().is_empty());
        }
        if let Some(use_color) = file.use_color {
            config.use_color = use_color;
        }
        config.base_url = file.base_url.or(config.base_url);
        config.timeout = file.timeout_secs.map(Duration::from_secs).or(config.timeout);
        config.temperature = file.temperature;
        config.max_output_tokens = file.max_output_tokens;
        config.validate()?;
        Ok(config)
    }

    fn apply_args(mut self, args: ChatArgs) -> Result<Self> {
        if let Some(model) = args.model {
            self.model = parse_model(&model)?;
        }
        if let Some(system) = args.system {
            self.system_instruction = system;
        }
        if let Some(greeting) = args.greeting {
            self.greeting = Some(greeting);
        }
        if args.no_greeting {
            self.greeting = None;
        }
        if let Some(base_url) = args.base_url {
            self.base_url = Some(base_url);
        }
        if let Some(timeout) = args.timeout {
            self.timeout = Some(Duration::from_secs(timeout));
        }
        if args.no_color {
            self.use_color = false;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.system_instruction.trim().is_empty() {
            return Err(Error::validation(
                "system instruction must not be empty",
                Some("system_instruction".to_string()),
            ));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(Error::validation(
                "timeout must be at least one second",
                Some("timeout".to_string()),
            ));
        }
        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(Error::validation(
                "temperature must be between 0.0 and 2.0",
                Some("temperature".to_string()),
            ));
        }
        Ok(())
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Sets or clears the greeting.
    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sampling controls derived from this config.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            ..GenerationConfig::default()
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_model(model: &str) -> Result<Model> {
    model
        .parse::<Model>()
        .map_err(|err| Error::validation(err, Some("model".to_string())))
}
