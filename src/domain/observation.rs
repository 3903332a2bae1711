use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Entries/exits counted by the edge device during one cadence tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawActivity {
    #[serde(rename = "x")]
    pub entries: u32,
    #[serde(rename = "y")]
    pub exits: u32,
}

impl RawActivity {
    pub fn new(entries: u32, exits: u32) -> Self {
        Self { entries, exits }
    }

    pub fn as_pair(&self) -> [f64; 2] {
        [f64::from(self.entries), f64::from(self.exits)]
    }
}

/// Weather at the device location, in Celsius, percent and mph.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherReading {
    #[serde(rename = "temp")]
    pub temp_celsius: f64,
    #[serde(rename = "humidity")]
    pub humidity_pct: f64,
    #[serde(rename = "windspeed")]
    pub windspeed_mph: f64,
}

impl WeatherReading {
    pub fn new(temp_celsius: f64, humidity_pct: f64, windspeed_mph: f64) -> Self {
        Self {
            temp_celsius,
            humidity_pct,
            windspeed_mph,
        }
    }

    pub fn as_triple(&self) -> [f64; 3] {
        [self.temp_celsius, self.humidity_pct, self.windspeed_mph]
    }
}

/// Model estimate of the next activity pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "x")]
    pub entries: f64,
    #[serde(rename = "y")]
    pub exits: f64,
}

impl Prediction {
    pub fn new(entries: f64, exits: f64) -> Self {
        Self { entries, exits }
    }
}

impl From<[f64; 2]> for Prediction {
    fn from(label: [f64; 2]) -> Self {
        Self::new(label[0], label[1])
    }
}

/// One stored record of the monitored population, as held by the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "time", with = "iso8601")]
    pub timestamp: DateTime<FixedOffset>,
    pub raw_activity: RawActivity,
    pub weather: WeatherReading,
    #[serde(
        rename = "prediction_activity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub prediction: Option<Prediction>,
    #[serde(
        rename = "last_prediction_deviation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deviation: Option<f64>,
}

impl Observation {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        raw_activity: RawActivity,
        weather: WeatherReading,
    ) -> Self {
        Self {
            timestamp,
            raw_activity,
            weather,
            prediction: None,
            deviation: None,
        }
    }
}

/// Timestamps written by older firmware carry no offset; those are read as UTC.
pub(crate) mod iso8601 {
    use super::*;

    pub fn parse(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).or_else(|rfc_err| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc().fixed_offset())
                .map_err(|_| rfc_err)
        })
    }

    pub fn serialize<S>(value: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
