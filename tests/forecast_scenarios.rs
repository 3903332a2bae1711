use chrono::{FixedOffset, TimeZone, Utc};
use hivecast::application::ml::ModelParameters;
use hivecast::application::{ForecastOrchestrator, ReportingCycle};
use hivecast::config::Config;
use hivecast::domain::forecast::{HistoryFetch, HistoryWindow};
use hivecast::domain::observation::{Observation, RawActivity, WeatherReading};
use hivecast::infrastructure::Services;
use hivecast::infrastructure::mock::{
    InMemoryRawLogger, MockHistoryProvider, MockWeatherProvider, RecordingUploadSink,
};
use std::sync::Arc;

fn config() -> Config {
    Config::from_lookup(&|key: &str| match key {
        "SDP_SERVER_BASE_URL" => Some("http://store.invalid/api/data/serial".to_string()),
        "SDP_DEVICE_SERIAL" => Some("123".to_string()),
        "SDP_DEVICE_Lat" => Some("37.3018".to_string()),
        "SDP_DEVICE_Lang" => Some("-122.0432".to_string()),
        "SDP_MODEL_SEED" => Some("3".to_string()),
        _ => None,
    })
    .expect("test config")
}

fn scenario_a_history() -> HistoryFetch {
    let points = [
        ((1, 1), (20.0, 50.0, 5.0)),
        ((2, 2), (21.0, 51.0, 6.0)),
        ((3, 3), (22.0, 52.0, 7.0)),
    ];
    let observations = points
        .iter()
        .enumerate()
        .map(|(i, &((entries, exits), (t, h, w)))| {
            let ts = Utc
                .with_ymd_and_hms(2024, 5, 1, 8 + i as u32, 0, 0)
                .unwrap()
                .fixed_offset();
            Observation::new(ts, RawActivity::new(entries, exits), WeatherReading::new(t, h, w))
        })
        .collect();
    HistoryFetch::from_window(HistoryWindow::new(observations, 24))
}

struct Harness {
    history: Arc<MockHistoryProvider>,
    upload: Arc<RecordingUploadSink>,
    raw_log: Arc<InMemoryRawLogger>,
    cycle: ReportingCycle,
}

fn harness(
    history: MockHistoryProvider,
    upload: RecordingUploadSink,
    raw_log: InMemoryRawLogger,
) -> Harness {
    let history = Arc::new(history);
    let upload = Arc::new(upload);
    let raw_log = Arc::new(raw_log);
    let services = Services {
        history: history.clone(),
        weather: Arc::new(MockWeatherProvider::new(WeatherReading::new(22.0, 52.0, 7.0))),
        upload: upload.clone(),
        raw_log: raw_log.clone(),
    };
    Harness {
        cycle: ReportingCycle::new(&config(), services),
        history,
        upload,
        raw_log,
    }
}

fn now() -> chrono::DateTime<FixedOffset> {
    FixedOffset::west_opt(7 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .unwrap()
}

#[test]
fn scenario_a_orchestrator_scores_against_last_stored_point() {
    let orchestrator = ForecastOrchestrator::new(ModelParameters::default().with_seed(Some(1)));

    let result = orchestrator
        .forecast(
            RawActivity::new(4, 4),
            &WeatherReading::new(22.0, 52.0, 7.0),
            &scenario_a_history(),
        )
        .unwrap();

    let prediction = result.prediction.expect("full pipeline yields a prediction");
    assert!(prediction.entries.is_finite());
    assert!(prediction.exits.is_finite());
    assert!((result.deviation.unwrap() - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn scenario_a_full_cycle_uploads_prediction() {
    let h = harness(
        MockHistoryProvider::new(scenario_a_history()),
        RecordingUploadSink::new(),
        InMemoryRawLogger::new(),
    );

    let report = h.cycle.run_at(now(), RawActivity::new(4, 4)).await.unwrap();

    assert_eq!(h.history.requested_limits(), vec![24]);
    let uploads = h.upload.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0], report.payload);
    assert!(uploads[0].prediction_activity.is_some());
    assert!((uploads[0].last_prediction_deviation.unwrap() - 100.0).abs() < 1e-9);
    assert_eq!(h.raw_log.entries(), vec![(now(), RawActivity::new(4, 4))]);
}

#[tokio::test]
async fn scenario_b_empty_history_uploads_raw_values_only() {
    let h = harness(
        MockHistoryProvider::new(HistoryFetch::from_window(HistoryWindow::default())),
        RecordingUploadSink::new(),
        InMemoryRawLogger::new(),
    );

    let report = h.cycle.run_at(now(), RawActivity::new(4, 4)).await.unwrap();

    assert!(report.result.prediction.is_none());
    assert!(report.result.deviation.is_none());

    let uploads = h.upload.uploads();
    assert_eq!(uploads.len(), 1);
    let json = serde_json::to_value(&uploads[0]).unwrap();
    let object = json.as_object().unwrap();
    assert!(!object.contains_key("prediction_activity"));
    assert!(!object.contains_key("last_prediction_deviation"));
    assert_eq!(json["raw_activity"]["x"], 4);
    assert_eq!(json["weather"]["temp"], 22.0);
}

#[tokio::test]
async fn raw_log_failure_does_not_abort_cycle() {
    let h = harness(
        MockHistoryProvider::new(HistoryFetch::Insufficient),
        RecordingUploadSink::new(),
        InMemoryRawLogger::broken(),
    );

    assert!(h.cycle.run_at(now(), RawActivity::new(1, 0)).await.is_ok());
    assert_eq!(h.upload.uploads().len(), 1);
}

#[tokio::test]
async fn history_service_error_is_fatal_and_skips_upload() {
    let h = harness(
        MockHistoryProvider::failing(500),
        RecordingUploadSink::new(),
        InMemoryRawLogger::new(),
    );

    let err = h.cycle.run_at(now(), RawActivity::new(1, 0)).await.unwrap_err();

    assert!(format!("{:#}", err).contains("500"));
    assert!(h.upload.uploads().is_empty());
    // raw values are recorded before the forecasting path
    assert_eq!(h.raw_log.entries().len(), 1);
}

#[tokio::test]
async fn upload_rejection_is_fatal() {
    let h = harness(
        MockHistoryProvider::new(HistoryFetch::Insufficient),
        RecordingUploadSink::rejecting(503),
        InMemoryRawLogger::new(),
    );

    let err = h.cycle.run_at(now(), RawActivity::new(1, 0)).await.unwrap_err();
    assert!(format!("{:#}", err).contains("503"));
}
