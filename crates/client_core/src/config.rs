use std::{collections::HashSet, fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use shared::domain::{default_voices, find_voice, VoiceId, VoiceOption, MAX_CHARS};
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_ENDPOINT_URL: &str =
    "https://hccnofpsj9.execute-api.us-east-2.amazonaws.com/prod/generate-audio";
pub const DEFAULT_SETTINGS_FILE: &str = "narrator.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct NarratorSettings {
    pub endpoint_url: String,
    pub default_voice: VoiceId,
    pub max_chars: usize,
    pub voices: Vec<VoiceOption>,
}

impl Default for NarratorSettings {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.into(),
            default_voice: VoiceId::default(),
            max_chars: MAX_CHARS,
            voices: default_voices(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    endpoint_url: Option<String>,
    default_voice: Option<String>,
    max_chars: Option<usize>,
    voices: Option<Vec<FileVoice>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileVoice {
    id: String,
    name: Option<String>,
    #[serde(default)]
    description: String,
}

impl From<FileVoice> for VoiceOption {
    fn from(value: FileVoice) -> Self {
        let name = value.name.unwrap_or_else(|| value.id.clone());
        Self {
            id: VoiceId::new(value.id),
            name,
            description: value.description,
        }
    }
}

impl NarratorSettings {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_toml_str(raw)?;
        Ok(settings)
    }

    fn apply_toml_str(&mut self, raw: &str) -> Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw).context("invalid settings file")?;

        if let Some(v) = file_cfg.endpoint_url {
            self.endpoint_url = v;
        }
        if let Some(v) = file_cfg.default_voice {
            self.default_voice = VoiceId::new(v);
        }
        if let Some(v) = file_cfg.max_chars {
            self.max_chars = v;
        }
        if let Some(voices) = file_cfg.voices {
            self.voices = voices.into_iter().map(VoiceOption::from).collect();
        }

        Ok(())
    }

    /// `APP__*` names win over the `NARRATOR_*` ones when both are set.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("NARRATOR_ENDPOINT_URL") {
            self.endpoint_url = v;
        }
        if let Some(v) = lookup("APP__ENDPOINT_URL") {
            self.endpoint_url = v;
        }

        if let Some(v) = lookup("NARRATOR_DEFAULT_VOICE") {
            self.default_voice = VoiceId::new(v);
        }
        if let Some(v) = lookup("APP__DEFAULT_VOICE") {
            self.default_voice = VoiceId::new(v);
        }

        if let Some(v) = lookup("APP__MAX_CHARS") {
            match v.parse::<usize>() {
                Ok(parsed) => self.max_chars = parsed,
                Err(err) => warn!("ignoring APP__MAX_CHARS={v:?}: {err}"),
            }
        }
    }

    pub fn with_endpoint_override(mut self, endpoint_url: Option<String>) -> Self {
        if let Some(url) = endpoint_url {
            self.endpoint_url = url;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(self.endpoint_url.trim())
            .with_context(|| format!("invalid endpoint url '{}'", self.endpoint_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "endpoint url '{}' must use http or https",
                self.endpoint_url
            );
        }

        if self.max_chars == 0 {
            bail!("max_chars must be greater than zero");
        }

        if self.voices.is_empty() {
            bail!("voice table must contain at least one voice");
        }

        let mut seen = HashSet::new();
        for voice in &self.voices {
            if voice.id.as_str().trim().is_empty() {
                bail!("voice ids must not be empty");
            }
            if !seen.insert(voice.id.as_str()) {
                bail!("duplicate voice id '{}'", voice.id);
            }
        }

        if find_voice(&self.voices, self.default_voice.as_str()).is_none() {
            return Err(anyhow!(
                "default voice '{}' is not in the voice table",
                self.default_voice
            ));
        }

        Ok(())
    }
}

/// Defaults, then the settings file, then environment overrides.
///
/// An explicit `path` must exist; the implicit `narrator.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<NarratorSettings> {
    let mut settings = NarratorSettings::default();

    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
            settings
                .apply_toml_str(&raw)
                .with_context(|| format!("failed to load settings file '{}'", path.display()))?;
            info!("loaded settings from {}", path.display());
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_SETTINGS_FILE) {
                if let Err(err) = settings.apply_toml_str(&raw) {
                    warn!("ignoring {DEFAULT_SETTINGS_FILE}: {err:#}");
                }
            }
        }
    }

    settings.apply_env_from(|name| std::env::var(name).ok());
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
