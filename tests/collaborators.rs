//! HTTP adapter tests against a local mock server

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fx_hedge::eodhd::{ClientConfig, EodhdClient};
use fx_hedge::notify::{NotificationSink, TelegramConfig, TelegramNotifier};
use fx_hedge::{FailureKind, HedgeError, MalformedInput, PriceHistoryProvider};

fn eodhd_client(server: &MockServer, key: Option<&str>) -> EodhdClient {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_max_retries(3)
        .with_backoff(Duration::from_millis(1));
    EodhdClient::with_config(key.map(str::to_string), config).unwrap()
}

fn eod_rows() -> serde_json::Value {
    json!([
        {"date": "2024-03-13", "open": 1.0925, "high": 1.0960, "low": 1.0915,
         "close": 1.0946, "adjusted_close": 1.0946, "volume": 0},
        {"date": "2024-03-14", "open": 1.0946, "high": 1.0950, "low": 1.0880,
         "close": 1.0885, "adjusted_close": 1.0885, "volume": 0},
        {"date": "2024-03-15", "open": 1.0885, "high": 1.0905, "low": 1.0870,
         "close": 1.0890, "adjusted_close": 1.0889, "volume": 0}
    ])
}

// =============================================================================
// EODHD
// =============================================================================

#[tokio::test]
async fn test_eodhd_parses_adjusted_close() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eod/EURUSD.FOREX"))
        .and(query_param("api_token", "demo-key"))
        .and(query_param("fmt", "json"))
        .and(query_param("order", "a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(eod_rows()))
        .expect(1)
        .mount(&server)
        .await;

    let client = eodhd_client(&server, Some("demo-key"));
    let bars = client.fetch("EURUSD.FOREX", 30).await.unwrap();

    assert_eq!(bars.len(), 3);
    assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
    assert_eq!(bars[2].close, 1.0889);
}

#[tokio::test]
async fn test_eodhd_sorts_rows() {
    let server = MockServer::start().await;
    let rows = json!([
        {"date": "2024-03-15", "close": 1.0890},
        {"date": "2024-03-13", "close": 1.0946}
    ]);
    Mock::given(method("GET"))
        .and(path("/eod/EURUSD.FOREX"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(&server)
        .await;

    let bars = eodhd_client(&server, Some("k"))
        .fetch_history("EURUSD.FOREX", 30)
        .await
        .unwrap();
    assert!(bars[0].date < bars[1].date);
    assert_eq!(bars[0].close, 1.0946);
}

#[tokio::test]
async fn test_eodhd_null_price_is_malformed() {
    let server = MockServer::start().await;
    let rows = json!([
        {"date": "2024-03-13", "close": 1.0946, "adjusted_close": 1.0946},
        {"date": "2024-03-14", "close": null, "adjusted_close": null}
    ]);
    Mock::given(method("GET"))
        .and(path("/eod/EURUSD.FOREX"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(&server)
        .await;

    let err = eodhd_client(&server, Some("k"))
        .fetch_history("EURUSD.FOREX", 30)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        HedgeError::MalformedInput(MalformedInput::MissingField {
            row: 1,
            field: "adjusted_close"
        })
    );
}

#[tokio::test]
async fn test_eodhd_row_without_date_is_malformed() {
    let server = MockServer::start().await;
    let rows = json!([
        {"date": "2024-03-13", "close": 1.0946, "adjusted_close": 1.0946},
        {"close": 1.0885, "adjusted_close": 1.0885}
    ]);
    Mock::given(method("GET"))
        .and(path("/eod/EURUSD.FOREX"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .expect(1)
        .mount(&server)
        .await;

    let err = eodhd_client(&server, Some("k"))
        .fetch_history("EURUSD.FOREX", 30)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        HedgeError::MalformedInput(MalformedInput::MissingField {
            row: 1,
            field: "date"
        })
    );
    assert_eq!(err.category(), FailureKind::ComputationError);
}

#[tokio::test]
async fn test_eodhd_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eod/EURUSD.FOREX"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthenticated"))
        .expect(1)
        .mount(&server)
        .await;

    let err = eodhd_client(&server, Some("bad-key"))
        .fetch_history("EURUSD.FOREX", 30)
        .await
        .unwrap_err();
    match err {
        HedgeError::DataUnavailable(msg) => {
            assert!(msg.contains("401"));
            assert!(!msg.contains("bad-key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_eodhd_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eod/EURUSD.FOREX"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/eod/EURUSD.FOREX"))
        .respond_with(ResponseTemplate::new(200).set_body_json(eod_rows()))
        .expect(1)
        .mount(&server)
        .await;

    let bars = eodhd_client(&server, Some("k"))
        .fetch_history("EURUSD.FOREX", 30)
        .await
        .unwrap();
    assert_eq!(bars.len(), 3);
}

#[tokio::test]
async fn test_eodhd_gives_up_after_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eod/EURUSD.FOREX"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;

    let err = eodhd_client(&server, Some("k"))
        .fetch_history("EURUSD.FOREX", 30)
        .await
        .unwrap_err();
    assert!(matches!(err, HedgeError::DataUnavailable(_)));
}

#[tokio::test]
async fn test_eodhd_missing_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(eod_rows()))
        .expect(0)
        .mount(&server)
        .await;

    let err = eodhd_client(&server, None)
        .fetch_history("EURUSD.FOREX", 30)
        .await
        .unwrap_err();
    assert!(matches!(err, HedgeError::DataUnavailable(_)));
}

// =============================================================================
// Telegram
// =============================================================================

fn telegram(server: &MockServer) -> TelegramNotifier {
    let config = TelegramConfig::new(Some("123:abc".to_string()), Some("42".to_string()))
        .with_base_url(server.uri());
    TelegramNotifier::new(config).unwrap()
}

#[tokio::test]
async fn test_telegram_sends_markdown_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_json(json!({
            "chat_id": "42",
            "text": "*SIGNAL: OPEN HEDGE*",
            "parse_mode": "Markdown"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = telegram(&server);
    assert!(notifier.is_configured());
    assert!(notifier.send("*SIGNAL: OPEN HEDGE*").await);
}

#[tokio::test]
async fn test_telegram_rejection_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"ok": false, "description": "can't parse entities"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert!(!telegram(&server).send("*unbalanced").await);
}
