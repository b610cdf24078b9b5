//! Configuração do `editorial` carregada a partir de `editorial.toml`.
//!
//! A struct [`EditorialConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `EDITORIAL_API_TOKEN` tem precedência sobre o arquivo.

use serde::Deserialize;
use std::path::Path;

use crate::error::EditorialError;

pub const CONFIG_FILE: &str = "editorial.toml";
pub const TOKEN_ENV: &str = "EDITORIAL_API_TOKEN";

/// Formato das linhas de log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuração de nível superior carregada de `editorial.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EditorialConfig {
    /// URL base da API REST do back office.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Token bearer enviado à API.
    #[serde(default)]
    pub api_token: String,

    /// Arquivo JSON usado pelo store local no modo `--offline`.
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Intervalo entre consultas do `watch`, em milissegundos.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Timeout de cada requisição HTTP, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,
}

// Valor padrão da URL da API: servidor local de desenvolvimento.
fn default_api_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_store_path() -> String {
    "editorial-store.json".to_string()
}

// Valor padrão do intervalo de polling: 5s.
fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for EditorialConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_token: String::new(),
            store_path: default_store_path(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            log_format: LogFormat::default(),
        }
    }
}

impl EditorialConfig {
    /// Carrega a configuração de `editorial.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self, EditorialError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Carrega a configuração de um caminho explícito.
    pub fn load_from(path: &Path) -> Result<Self, EditorialError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<EditorialConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração para o token.
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                config.api_token = token;
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), EditorialError> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(EditorialError::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(EditorialError::Config(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
