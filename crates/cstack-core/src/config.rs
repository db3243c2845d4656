use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::Path;

use crate::mailbox::AppendOptions;
use crate::plan::PlanOptions;
use crate::stack::StackDir;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub plan: PlanConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Keep `## Header` lines of non-task sections in the plan notes.
    #[serde(default)]
    pub notes_headers: bool,
}

impl PlanConfig {
    #[must_use]
    pub const fn options(&self) -> PlanOptions {
        PlanOptions {
            notes_headers: self.notes_headers,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// `fsync` message logs after every append.
    #[serde(default)]
    pub durable: bool,
    /// Sender used when `--from` is not given.
    #[serde(default)]
    pub default_from: Option<String>,
}

impl MessagesConfig {
    #[must_use]
    pub const fn append_options(&self) -> AppendOptions {
        AppendOptions {
            durable: self.durable,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

pub fn load_project_config(workspace: &Path) -> Result<ProjectConfig> {
    let path = StackDir::new(workspace).config_path();
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("cstack/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn resolve_config(workspace: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(workspace)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(
        cli_json,
        user.output.clone(),
        env_format,
        std::io::stdout().is_terminal(),
    );

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if is_tty {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}
