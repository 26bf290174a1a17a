use crate::config::RunConfig;
use crate::core::ParameterSource;
use crate::domain::model::WriteMode;
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run parameters stored in a file, e.g.
///
/// ```toml
/// [search]
/// location = "Austin, TX"
/// categories = ["kebab", "sushi"]
/// limit = 50
///
/// [output]
/// path = "restaurants.csv"
/// mode = "a"
///
/// [source]
/// api_key = "${API_KEY}"
/// timeout_seconds = 5.0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub search: SearchSection,
    pub output: OutputSection,
    pub source: SourceSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub location: Option<String>,
    pub categories: Option<Vec<String>>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub path: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<f64>,
    pub api_key: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// The key from `[source]`, unless it is empty or an unresolved `${VAR}`.
    pub fn api_key(&self) -> Option<&str> {
        self.source
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty() && !key.starts_with("${"))
    }
}

impl ParameterSource for TomlConfig {
    fn collect(&mut self) -> Result<RunConfig> {
        let mut config = RunConfig::default();

        if let Some(location) = &self.search.location {
            config.location = location.clone();
        }
        if let Some(categories) = &self.search.categories {
            config.extra_categories = categories
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }
        if let Some(limit) = self.search.limit {
            config.limit = limit;
        }
        if let Some(path) = &self.output.path {
            config.output_path = path.clone();
        }
        if let Some(mode) = &self.output.mode {
            config.write_mode = WriteMode::from_flag(mode);
        }
        if let Some(endpoint) = &self.source.endpoint {
            config.api_endpoint = endpoint.clone();
        }
        if self.source.timeout_seconds.is_some() {
            config.timeout_seconds = self.source.timeout_seconds;
        }

        Ok(config)
    }
}
