use thiserror::Error;

/// Every way a single lookup can fail. None of them are retried.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "No OpenWeather API key found.\n\
         Hint: set OPENWEATHER_API_KEY or run `skycast configure` to store one."
    )]
    MissingCredential,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("City '{city}' was not found by the weather provider")]
    InvalidCity { city: String },

    #[error("Network error while {action}")]
    Network {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed response from weather provider: {0}")]
    MalformedResponse(String),

    #[error("The weather provider rejected the API key. Please check OPENWEATHER_API_KEY")]
    InvalidApiKey,

    #[error("Weather provider request failed with status {status}: {message}")]
    Provider { status: u16, message: String },
}

impl WeatherError {
    /// Process exit status reported by the binary for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            WeatherError::MissingCredential | WeatherError::InvalidQuery(_) => 2,
            WeatherError::InvalidCity { .. } => 3,
            WeatherError::Network { .. } => 4,
            WeatherError::MalformedResponse(_) => 5,
            WeatherError::InvalidApiKey | WeatherError::Provider { .. } => 6,
        }
    }
}
