use crate::{
    Config, WeatherError, WeatherQuery, WeatherResult,
    provider::openweather::{OPENWEATHER_BASE_URL, OpenWeatherProvider},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch conditions (and the forecast, if the query asks for it). Each request is sent once.
    async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError>;
}

/// Construct the OpenWeather provider, resolving the API key from `env_value` or the config.
pub fn provider_from_config(
    config: &Config,
    env_value: Option<&str>,
) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    provider_with_base_url(config, env_value, OPENWEATHER_BASE_URL)
}

/// Same as [`provider_from_config`] against a different endpoint root.
pub fn provider_with_base_url(
    config: &Config,
    env_value: Option<&str>,
    base_url: &str,
) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let api_key = config.resolve_api_key(env_value)?;
    let provider = OpenWeatherProvider::builder(api_key).base_url(base_url).build()?;

    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::any};

    #[tokio::test]
    async fn missing_credential_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = provider_with_base_url(&Config::default(), None, &server.uri()).unwrap_err();
        assert!(matches!(err, WeatherError::MissingCredential));
    }

    #[test]
    fn provider_from_config_works_when_key_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY");

        assert!(provider_from_config(&cfg, None).is_ok());
    }
}
