//! National Weather Service hourly forecast client.
//!
//! Two hops: `/points/{lat},{lng}` yields the hourly forecast URL for the
//! grid cell, which lists forecast periods. The period covering one hour from
//! now is used, or the first period when none covers it.

use crate::domain::errors::ServiceError;
use crate::domain::observation::WeatherReading;
use crate::domain::ports::WeatherProvider;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

const POINTS: &str = "look up forecast grid";
const HOURLY: &str = "download hourly forecast";

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    #[serde(rename = "forecastHourly")]
    forecast_hourly: String,
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    properties: HourlyProperties,
}

#[derive(Debug, Deserialize)]
struct HourlyProperties {
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuantitativeValue {
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub temperature: f64,
    pub temperature_unit: String,
    #[serde(default)]
    pub relative_humidity: Option<QuantitativeValue>,
    pub wind_speed: String,
}

impl ForecastPeriod {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_time <= at && at <= self.end_time
    }

    pub fn to_reading(&self) -> Result<WeatherReading, ServiceError> {
        Ok(WeatherReading::new(
            to_celsius(self.temperature, &self.temperature_unit),
            self.relative_humidity
                .as_ref()
                .and_then(|h| h.value)
                .unwrap_or(0.0),
            parse_wind_speed(&self.wind_speed)?,
        ))
    }
}

/// First period enclosing `at`, else the first period.
pub fn select_period(periods: &[ForecastPeriod], at: DateTime<Utc>) -> Option<&ForecastPeriod> {
    periods.iter().find(|p| p.contains(at)).or_else(|| {
        if !periods.is_empty() {
            warn!("No forecast period covers {}, using the first one", at);
        }
        periods.first()
    })
}

pub fn to_celsius(temperature: f64, unit: &str) -> f64 {
    if unit.eq_ignore_ascii_case("F") {
        (temperature - 32.0) * 5.0 / 9.0
    } else {
        temperature
    }
}

/// Leading number of a textual speed such as `"5 mph"` or `"5 to 10 mph"`.
pub fn parse_wind_speed(raw: &str) -> Result<f64, ServiceError> {
    raw.split_whitespace()
        .next()
        .and_then(|token| token.parse::<f64>().ok())
        .ok_or_else(|| ServiceError::InvalidWindSpeed {
            raw: raw.to_string(),
        })
}

pub struct NwsWeatherClient {
    client: Client,
    base_url: String,
}

impl NwsWeatherClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Weather for the period covering `now + 1h`.
    pub async fn fetch_at(
        &self,
        lat: f64,
        lng: f64,
        now: DateTime<Utc>,
    ) -> Result<WeatherReading, ServiceError> {
        let points_url = format!("{}/points/{:.4},{:.4}", self.base_url, lat, lng);
        let points: PointsResponse = self.get_json(&points_url, POINTS).await?;
        let hourly: HourlyResponse = self
            .get_json(&points.properties.forecast_hourly, HOURLY)
            .await?;

        let target = now + Duration::hours(1);
        let period = select_period(&hourly.properties.periods, target)
            .ok_or(ServiceError::NoForecastPeriods)?;
        let reading = period.to_reading()?;

        info!(
            "Weather for {}: {:.1}°C, {:.0}% humidity, {:.1} mph wind",
            period.start_time, reading.temp_celsius, reading.humidity_pct, reading.windspeed_mph
        );
        Ok(reading)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        operation: &'static str,
    ) -> Result<T, ServiceError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/geo+json")
            .send()
            .await
            .map_err(|source| ServiceError::Transport { operation, source })?;

        if !response.status().is_success() {
            return Err(ServiceError::UnexpectedStatus {
                operation,
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport { operation, source })?;
        serde_json::from_slice(&body).map_err(|e| ServiceError::Decode {
            operation,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for NwsWeatherClient {
    async fn fetch(&self, lat: f64, lng: f64) -> Result<WeatherReading, ServiceError> {
        self.fetch_at(lat, lng, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn period(start_hour: u32, temp: f64, unit: &str, wind: &str) -> ForecastPeriod {
        let start = Utc
            .with_ymd_and_hms(2024, 7, 1, start_hour, 0, 0)
            .unwrap()
            .fixed_offset();
        ForecastPeriod {
            start_time: start,
            end_time: start + Duration::hours(1),
            temperature: temp,
            temperature_unit: unit.to_string(),
            relative_humidity: Some(QuantitativeValue { value: Some(60.0) }),
            wind_speed: wind.to_string(),
        }
    }

    #[test]
    fn test_fahrenheit_is_converted_exactly() {
        assert_eq!(to_celsius(68.0, "F"), 20.0);
        assert_eq!(to_celsius(32.0, "F"), 0.0);
        assert_eq!(to_celsius(21.5, "C"), 21.5);
    }

    #[test]
    fn test_wind_speed_leading_token() {
        assert_eq!(parse_wind_speed("5 mph").unwrap(), 5.0);
        assert_eq!(parse_wind_speed("10 to 15 mph").unwrap(), 10.0);
        assert_eq!(parse_wind_speed("7.5").unwrap(), 7.5);
        assert!(matches!(
            parse_wind_speed("calm"),
            Err(ServiceError::InvalidWindSpeed { .. })
        ));
        assert!(parse_wind_speed("").is_err());
    }

    #[test]
    fn test_select_period_enclosing_target() {
        let periods = vec![
            period(10, 60.0, "F", "1 mph"),
            period(11, 61.0, "F", "2 mph"),
            period(12, 62.0, "F", "3 mph"),
        ];
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 12, 30, 0).unwrap();

        let chosen = select_period(&periods, at).unwrap();
        assert_eq!(chosen.temperature, 62.0);
    }

    #[test]
    fn test_select_period_falls_back_to_first() {
        let periods = vec![period(10, 60.0, "F", "1 mph"), period(11, 61.0, "F", "2 mph")];
        let at = Utc.with_ymd_and_hms(2024, 7, 2, 0, 0, 0).unwrap();

        assert_eq!(select_period(&periods, at).unwrap().temperature, 60.0);
        assert!(select_period(&[], at).is_none());
    }

    #[test]
    fn test_period_reading_handles_missing_humidity() {
        let mut p = period(10, 68.0, "F", "4 mph");
        p.relative_humidity = Some(QuantitativeValue { value: None });

        let reading = p.to_reading().unwrap();
        assert_eq!(reading, WeatherReading::new(20.0, 0.0, 4.0));
    }

    #[test]
    fn test_period_deserializes_from_nws_shape() {
        let json = r#"{
            "number": 1,
            "startTime": "2024-07-01T10:00:00-07:00",
            "endTime": "2024-07-01T11:00:00-07:00",
            "temperature": 68,
            "temperatureUnit": "F",
            "relativeHumidity": {"unitCode": "wmoUnit:percent", "value": 55},
            "windSpeed": "5 mph",
            "windDirection": "W"
        }"#;

        let p: ForecastPeriod = serde_json::from_str(json).unwrap();
        assert_eq!(p.to_reading().unwrap(), WeatherReading::new(20.0, 55.0, 5.0));
    }
}
