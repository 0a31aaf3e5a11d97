//! Envoi du rapport vers l'API distante.
//!
//! Un échec d'envoi n'invalide jamais le rapport : il est journalisé puis
//! ignoré par [`deliver`].

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lotofacil_engine::report::Report;

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Configuration API incomplète : {0} manquant")]
    MissingConfig(&'static str),

    #[error("Erreur HTTP : {0}")]
    Http(#[from] reqwest::Error),

    #[error("Aucun jeton d'accès dans la réponse de connexion")]
    MissingToken,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(rename = "accessToken", default)]
    access_token: Option<String>,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    email: String,
    password: String,
}

impl ApiClient {
    pub fn from_config(config: &ApiConfig) -> Result<Self, DeliveryError> {
        let base_url = config.url.as_deref().ok_or(DeliveryError::MissingConfig("API_URL"))?;
        let email = config.email.as_deref().ok_or(DeliveryError::MissingConfig("API_EMAIL"))?;
        let password = config
            .password
            .as_deref()
            .ok_or(DeliveryError::MissingConfig("API_PASSWORD"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    fn login_url(&self) -> String {
        format!("{}/auth/login", self.base_url)
    }

    fn report_url(&self) -> String {
        format!("{}/lotofacil/analisys", self.base_url)
    }

    pub fn login(&self) -> Result<String, DeliveryError> {
        let response: LoginResponse = self
            .client
            .post(self.login_url())
            .json(&LoginRequest {
                email: &self.email,
                password: &self.password,
            })
            .send()?
            .error_for_status()?
            .json()?;

        response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(DeliveryError::MissingToken)
    }

    pub fn send_report(&self, report: &Report) -> Result<u16, DeliveryError> {
        let token = self.login()?;
        let response = self
            .client
            .post(self.report_url())
            .bearer_auth(token)
            .json(report)
            .send()?
            .error_for_status()?;
        Ok(response.status().as_u16())
    }
}

/// Connexion puis envoi. Retourne `true` si l'API a accepté le rapport.
pub fn deliver(report: &Report, config: &ApiConfig) -> bool {
    let result = ApiClient::from_config(config).and_then(|client| client.send_report(report));
    match result {
        Ok(status) => {
            tracing::info!(status, "rapport envoyé à l'API");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "échec de l'envoi du rapport");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotofacil_engine::heuristic::seeded_rng;
    use lotofacil_engine::make_test_draws;
    use lotofacil_engine::report::{assemble_report, ReportSettings};

    fn api(url: &str) -> ApiConfig {
        ApiConfig {
            url: Some(url.to_string()),
            email: Some("user@example.com".to_string()),
            password: Some("secret".to_string()),
            timeout_seconds: 2,
        }
    }

    fn small_report() -> Report {
        let draws = make_test_draws(20);
        assemble_report(&draws, &ReportSettings::default(), &mut seeded_rng(Some(1)))
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let client = ApiClient::from_config(&api("https://api.example.com/")).unwrap();
        assert_eq!(client.login_url(), "https://api.example.com/auth/login");
        assert_eq!(client.report_url(), "https://api.example.com/lotofacil/analisys");
    }

    #[test]
    fn test_missing_config() {
        let mut config = api("https://api.example.com");
        config.password = None;
        let err = ApiClient::from_config(&config).err().unwrap();
        assert!(matches!(err, DeliveryError::MissingConfig("API_PASSWORD")));

        assert!(!deliver(&small_report(), &ApiConfig::default()));
    }

    #[test]
    fn test_unreachable_server_is_swallowed() {
        assert!(!deliver(&small_report(), &api("http://127.0.0.1:9")));
    }

    #[test]
    fn test_login_response_token() {
        let parsed: LoginResponse = serde_json::from_str(r#"{"accessToken": "abc"}"#).unwrap();
        assert_eq!(parsed.access_token.as_deref(), Some("abc"));
        let parsed: LoginResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(parsed.access_token.is_none());
    }
}
