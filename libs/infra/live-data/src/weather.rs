// [libs/infra/live-data/src/weather.rs]
//! `weather_fetcher` (spec S4.5). `entity_hint` is `"lat,lon"`, e.g.
//! "48.8566,2.3522"; absent or unparsable hints default to Paris.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use novaos_evidence::{CapabilityProvider, SelectorInput};
use novaos_models::{CapabilityName, ProviderResult};
use novaos_secure_transport::SecureTransport;

use crate::errors::LiveDataError;
use crate::fetch::fetch_json;

const DEFAULT_LAT: f64 = 48.8566;
const DEFAULT_LON: f64 = 2.3522;

fn parse_coordinates(hint: Option<&str>) -> (f64, f64) {
    hint.and_then(|h| h.split_once(','))
        .and_then(|(lat, lon)| Some((lat.trim().parse::<f64>().ok()?, lon.trim().parse::<f64>().ok()?)))
        .unwrap_or((DEFAULT_LAT, DEFAULT_LON))
}

pub struct WeatherFetcher {
    transport: Arc<SecureTransport>,
}

impl WeatherFetcher {
    pub fn new(transport: Arc<SecureTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CapabilityProvider for WeatherFetcher {
    fn name(&self) -> CapabilityName {
        CapabilityName::WeatherFetcher
    }

    async fn execute(&self, input: &SelectorInput) -> Result<Option<ProviderResult>, String> {
        let (lat, lon) = parse_coordinates(input.entity_hint.as_deref());
        let url = format!("https://api.open-meteo.com/v1/forecast?latitude={lat}&longitude={lon}&current_weather=true");
        let rate_limit_key = format!("live-data:weather:{lat},{lon}");

        let payload = fetch_json(&self.transport, &url, &rate_limit_key).await.map_err(|e| e.to_string())?;
        let temperature = payload
            .get("current_weather")
            .and_then(|v| v.get("temperature"))
            .and_then(|v| v.as_f64())
            .ok_or(LiveDataError::MissingField("current_weather.temperature"))
            .map_err(|e| e.to_string())?;

        Ok(Some(ProviderResult {
            capability: CapabilityName::WeatherFetcher,
            category: "weather".to_string(),
            entity: Some(format!("{lat},{lon}")),
            value: temperature,
            unit: Some("celsius".to_string()),
            display: format!("{temperature:.1}\u{b0}C"),
            fetched_at: Utc::now(),
            citation: url,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::transport_with_json_response;

    #[tokio::test]
    async fn parses_current_temperature() {
        let transport = transport_with_json_response("api.open-meteo.com", r#"{"current_weather":{"temperature":22.4,"windspeed":11.0}}"#);
        let fetcher = WeatherFetcher::new(Arc::new(transport));
        let input = SelectorInput { normalized_message: "weather in paris".to_string(), entity_hint: Some("48.8566,2.3522".to_string()) };

        let result = fetcher.execute(&input).await.unwrap().unwrap();
        assert_eq!(result.value, 22.4);
        assert_eq!(result.display, "22.4\u{b0}C");
    }

    #[test]
    fn unparsable_hint_falls_back_to_the_default_coordinates() {
        assert_eq!(parse_coordinates(Some("nowhere")), (DEFAULT_LAT, DEFAULT_LON));
        assert_eq!(parse_coordinates(None), (DEFAULT_LAT, DEFAULT_LON));
    }
}
