//! Run configuration.
//!
//! Settings come from the environment (see [`Config::from_env`]); the CLI
//! overrides the per-run options from its flags.

use crate::error::{Error, Result};
use crate::variant::{Variant, DEFAULT_SCORE_THRESHOLD};
use std::path::{Path, PathBuf};

/// Environment variable holding the text service key.
pub const ENV_AI_KEY: &str = "OPEN_AI";
/// Accepted fallback for [`ENV_AI_KEY`].
pub const ENV_AI_KEY_FALLBACK: &str = "OPENAI_API_KEY";
/// Environment variable holding the image service key.
pub const ENV_IMAGE_KEY: &str = "UNSPLASH_API_KEY";

pub const ENV_AI_URL: &str = "DECKFILL_AI_URL";
pub const ENV_AI_MODEL: &str = "DECKFILL_AI_MODEL";
pub const ENV_IMAGE_URL: &str = "DECKFILL_IMAGE_URL";
pub const ENV_TIMEOUT: &str = "DECKFILL_TIMEOUT_SECS";

pub const DEFAULT_AI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_IMAGE_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TEMPLATE: &str = "template.pptx";

/// Cream background used by `--solid-bg`.
pub const SOLID_BACKGROUND: &str = "FFFDD0";

/// Text service settings.
#[derive(Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_AI_URL.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Image service settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_IMAGE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for ImageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Input template
    pub template: PathBuf,
    /// Output file; derived from the template name when unset
    pub output: Option<PathBuf>,
    /// Optional subject the generated deck should be about
    pub topic: Option<String>,
    /// Number of slides to ask for; the template's slide count when unset
    pub slides: Option<usize>,
    /// Minimum importance score kept by the trimmed variant (1-10)
    pub threshold: u8,
    /// Solid `RRGGBB` background for every slide
    pub background: Option<String>,
    pub ai: AiConfig,
    pub images: ImageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: PathBuf::from(DEFAULT_TEMPLATE),
            output: None,
            topic: None,
            slides: None,
            threshold: DEFAULT_SCORE_THRESHOLD,
            background: None,
            ai: AiConfig::default(),
            images: ImageConfig::default(),
        }
    }
}

impl Config {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// Empty values count as unset. Keys are not checked here; see
    /// [`Config::validate`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = match get(ENV_TIMEOUT) {
            Some(value) => value.parse::<u64>().ok().filter(|&t| t > 0).ok_or_else(|| {
                Error::InvalidConfig(format!("{} must be a positive number, got {:?}", ENV_TIMEOUT, value))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let ai = AiConfig {
            api_key: get(ENV_AI_KEY).or_else(|| get(ENV_AI_KEY_FALLBACK)),
            api_url: get(ENV_AI_URL).unwrap_or_else(|| DEFAULT_AI_URL.to_string()),
            model: get(ENV_AI_MODEL).unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            timeout_secs,
        };
        let images = ImageConfig {
            api_key: get(ENV_IMAGE_KEY),
            api_url: get(ENV_IMAGE_URL).unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
            timeout_secs,
        };

        Ok(Self {
            ai,
            images,
            ..Self::default()
        })
    }

    /// Check that the run can start: keys present for the services the
    /// variant uses, options in range, template on disk.
    ///
    /// Runs before any network call.
    pub fn validate(&self, variant: Variant) -> Result<()> {
        if self.ai.api_key.is_none() {
            return Err(Error::MissingApiKey(ENV_AI_KEY));
        }
        if variant.policy().images && self.images.api_key.is_none() {
            return Err(Error::MissingApiKey(ENV_IMAGE_KEY));
        }
        if !(1..=10).contains(&self.threshold) {
            return Err(Error::InvalidConfig(format!(
                "threshold must be between 1 and 10, got {}",
                self.threshold
            )));
        }
        if self.slides == Some(0) {
            return Err(Error::InvalidConfig("slide count must be at least 1".to_string()));
        }
        if let Some(rgb) = &self.background {
            if rgb.len() != 6 || !rgb.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::InvalidConfig(format!(
                    "background must be an RRGGBB hex colour, got {:?}",
                    rgb
                )));
            }
        }
        if !self.template.is_file() {
            return Err(Error::TemplateNotFound(self.template.display().to_string()));
        }
        Ok(())
    }

    /// Where the deck for `variant` is written.
    pub fn output_path(&self, variant: Variant) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => default_output(&self.template, variant),
        }
    }
}

/// `<dir>/<stem>_<variant>.pptx` next to the template.
///
/// Always `.pptx`: the writer turns `.potx` and `.pptm` templates into
/// plain presentations.
pub fn default_output(template: &Path, variant: Variant) -> PathBuf {
    let stem = template
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "presentation".to_string());
    template.with_file_name(format!("{}_{}.pptx", stem, variant.name()))
}
