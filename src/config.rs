use crate::error::Error;
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub llm: Llm,
    #[serde(default)]
    pub retry: Retry,
    #[serde(default)]
    pub concurrency: Concurrency,
    #[serde(default)]
    pub extract: Extract,
    #[serde(default)]
    pub scrutiny: Scrutiny,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Loads `user` when given, else `./proofread.toml` when present, else defaults.
    pub fn resolve(user: Option<&Path>) -> Result<Self> {
        if let Some(p) = user {
            return Self::load(p);
        }
        let default = Path::new("proofread.toml");
        if default.exists() {
            Self::load(default)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Global {
    pub print_summary: bool,
    pub show_corrected_pages: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: false,
            show_corrected_pages: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_input_file_bytes: u64,
    pub max_input_pages: u32,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 512 * 1024 * 1024,
            max_input_pages: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Llm {
    pub api_key_env: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}
impl Default for Llm {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".into(),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Retry {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}
impl Default for Retry {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Concurrency {
    pub max_parallel_pages: usize,
}
impl Default for Concurrency {
    fn default() -> Self {
        Self {
            max_parallel_pages: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Extract {
    pub sanitize: bool,
    pub normalize_unicode: bool,
}
impl Default for Extract {
    fn default() -> Self {
        Self {
            sanitize: true,
            normalize_unicode: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scrutiny {
    pub continue_on_error: bool,
    pub skip_empty_pages: bool,
    pub clean_sentinel: String,
    /// Also treat replies like "No issues found on page 2." as clean.
    pub accept_clean_phrasing: bool,
}
impl Default for Scrutiny {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            skip_empty_pages: true,
            clean_sentinel: "NO ISSUES".into(),
            accept_clean_phrasing: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub format: OutputFormat,
    pub dir: String,
    pub pdf_filename: String,
    pub text_prefix: String,
    pub font_size: u32,
    pub margin_pt: u32,
    pub line_height_pt: u32,
    pub write_report_json: bool,
    pub report_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pdf,
            dir: "corrected_pdfs".into(),
            pdf_filename: "corrected_document.pdf".into(),
            text_prefix: "corrected_text".into(),
            font_size: 12,
            margin_pt: 42,
            line_height_pt: 14,
            write_report_json: false,
            report_filename: "report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

/// The LLM credential, resolved once from the environment by the entry point.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn from_env(llm: &Llm) -> Result<Self, Error> {
        Self::from_lookup(llm, |name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        llm: &Llm,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Error> {
        let name = llm.api_key_env.trim();
        if name.is_empty() {
            return Err(Error::Configuration("llm.api_key_env is empty".into()));
        }
        match lookup(name) {
            Some(v) if !v.trim().is_empty() => Ok(Self {
                api_key: v.trim().to_string(),
            }),
            _ => Err(Error::Configuration(format!(
                "environment variable {name} is not set"
            ))),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
