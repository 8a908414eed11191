use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tokenseer::client::{NewWatchlistItem, SignalQuery};
use tokenseer::config::Config;
use tokenseer::evaluator::{calculate_risk_score, RiskAnalyzer};
use tokenseer::{IntelClient, RiskLevel, SignalSeverity, SignalType, TokenSeerError};

const TOKEN: &str = "So11111111111111111111111111111111111111112";

/// Serves a single canned HTTP response and hands back the raw request.
async fn serve_once(status: &str, body: &str, delay: Option<Duration>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

fn client_for(base_url: String) -> IntelClient {
    let config = Config {
        api_key: Some("test-key".to_string()),
        base_url,
        timeout_ms: 2_000,
        ..Default::default()
    };
    IntelClient::new(&config).unwrap()
}

const SIGNALS_BODY: &str = r#"{
    "success": true,
    "timestamp": 1700000000000,
    "data": [
        { "id": "1", "type": "contract_risk", "severity": "high",
          "title": "Upgradeable contract", "summary": "Owner can change logic", "timestamp": 1700000000000 },
        { "id": "2", "type": "social_sentiment", "severity": "low",
          "title": "Sentiment dip", "summary": "Mentions trending negative", "timestamp": 1700000001000 }
    ]
}"#;

#[tokio::test]
async fn test_token_signals_request_and_scoring() {
    let (base_url, server) = serve_once("200 OK", SIGNALS_BODY, None).await;
    let client = client_for(base_url);

    let query = SignalQuery {
        types: vec![SignalType::ContractRisk, SignalType::SocialSentiment],
        min_severity: Some(SignalSeverity::Low),
        limit: Some(50),
        ..Default::default()
    };
    let signals = client.get_token_signals(TOKEN, &query).await.unwrap();

    assert_eq!(signals.len(), 2);
    assert_eq!(calculate_risk_score(&signals), 44);

    let request = server.await.unwrap();
    let request_line = request.lines().next().unwrap();
    assert!(request_line.starts_with(&format!("GET /v1/tokens/{}/signals?", TOKEN)));
    assert!(request_line.contains("types=contract_risk%2Csocial_sentiment"));
    assert!(request_line.contains("minSeverity=low"));
    assert!(request_line.contains("limit=50"));

    let lower = request.to_lowercase();
    assert!(lower.contains("authorization: bearer test-key"));
    assert!(lower.contains("accept: application/json"));
}

#[tokio::test]
async fn test_error_envelope_on_not_found() {
    let body = r#"{"success": false, "error": "token not found", "timestamp": 1}"#;
    let (base_url, _server) = serve_once("404 Not Found", body, None).await;
    let client = client_for(base_url);

    match client.get_market_data(TOKEN).await {
        Err(TokenSeerError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "token not found");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_server_error() {
    let (base_url, _server) = serve_once("500 Internal Server Error", "upstream exploded", None).await;
    let client = client_for(base_url);

    let err = client.get_contract_analysis(TOKEN).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("Internal Server Error"));
}

#[tokio::test]
async fn test_unsuccessful_envelope_with_ok_status() {
    let body = r#"{"success": false, "error": "rate limited", "timestamp": 1}"#;
    let (base_url, _server) = serve_once("200 OK", body, None).await;
    let client = client_for(base_url);

    let err = client.get_holder_analysis(TOKEN, Some(5)).await.unwrap_err();
    assert!(matches!(err, TokenSeerError::Api { status: 200, ref message } if message == "rate limited"));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let (base_url, _server) = serve_once("200 OK", r#"{"success": true, "data": {"bogus": 1}}"#, None).await;
    let client = client_for(base_url);

    let err = client.get_token_analysis(TOKEN).await.unwrap_err();
    assert!(matches!(err, TokenSeerError::Decode(_)));
}

#[tokio::test]
async fn test_timeout() {
    let (base_url, _server) = serve_once("200 OK", SIGNALS_BODY, Some(Duration::from_millis(1_000))).await;
    let config = Config {
        base_url,
        timeout_ms: 100,
        ..Default::default()
    };
    let client = IntelClient::new(&config).unwrap();

    let err = client.get_signal_feed(&SignalQuery::default()).await.unwrap_err();
    assert!(matches!(err, TokenSeerError::Timeout(100)), "got {:?}", err);
}

#[tokio::test]
async fn test_add_to_watchlist_posts_json() {
    let body = r#"{
        "success": true,
        "timestamp": 1,
        "data": { "id": "w-1", "address": "So11111111111111111111111111111111111111112",
                  "note": "launch watch", "alertSeverity": "high", "addedAt": 1700000000000 }
    }"#;
    let (base_url, server) = serve_once("201 Created", body, None).await;
    let client = client_for(base_url);

    let item = client
        .add_to_watchlist(&NewWatchlistItem {
            address: TOKEN.to_string(),
            note: Some("launch watch".to_string()),
            alert_severity: Some(SignalSeverity::High),
        })
        .await
        .unwrap();
    assert_eq!(item.id, "w-1");
    assert_eq!(item.alert_severity, Some(SignalSeverity::High));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/watchlist "));
    let json_start = request.find("\r\n\r\n").unwrap() + 4;
    let sent: serde_json::Value = serde_json::from_str(&request[json_start..]).unwrap();
    assert_eq!(
        sent,
        serde_json::json!({ "address": TOKEN, "note": "launch watch", "alertSeverity": "high" })
    );
}

#[tokio::test]
async fn test_delete_with_empty_body() {
    let (base_url, server) = serve_once("204 No Content", "", None).await;
    let client = client_for(base_url);

    client.delete_webhook("hook-7").await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("DELETE /v1/webhooks/hook-7 "));
}

#[tokio::test]
async fn test_risk_analyzer_over_http() {
    let (base_url, _server) = serve_once("200 OK", SIGNALS_BODY, None).await;
    let analyzer = RiskAnalyzer::new(client_for(base_url), RiskLevel::Medium);

    let assessment = analyzer.assess(TOKEN).await.unwrap();
    assert_eq!(assessment.score, 44);
    assert_eq!(assessment.level, RiskLevel::Medium);
    assert!(analyzer.is_within_tolerance(&assessment));
}

#[tokio::test]
async fn test_update_watchlist_item_patches() {
    let body = r#"{
        "success": true,
        "timestamp": 1,
        "data": { "id": "w-1", "address": "So11111111111111111111111111111111111111112",
                  "note": "raised alert", "addedAt": 1700000000000 }
    }"#;
    let (base_url, server) = serve_once("200 OK", body, None).await;
    let client = client_for(base_url);

    let update = tokenseer::client::WatchlistUpdate {
        note: Some("raised alert".to_string()),
        alert_severity: None,
    };
    let item = client.update_watchlist_item("w-1", &update).await.unwrap();
    assert_eq!(item.note.as_deref(), Some("raised alert"));

    let request = server.await.unwrap();
    assert!(request.starts_with("PATCH /v1/watchlist/w-1 "));
    assert!(request.ends_with(r#"{"note":"raised alert"}"#));
}

#[tokio::test]
async fn test_token_analysis_success() {
    let body = r#"{
        "success": true,
        "timestamp": 1700000000000,
        "data": {
            "token": { "address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL" },
            "signals": [
                { "id": "hp", "type": "honeypot", "severity": "info",
                  "title": "Sell path blocked", "summary": "Simulated sell reverted", "timestamp": 1700000000000 }
            ],
            "riskScore": 90,
            "riskLevel": "critical"
        }
    }"#;
    let (base_url, server) = serve_once("200 OK", body, None).await;
    let client = client_for(base_url);

    let analysis = client.get_token_analysis(TOKEN).await.unwrap();
    assert_eq!(analysis.token.symbol, "SOL");
    assert!(analysis.market.is_none());
    assert_eq!(analysis.risk_level, Some(RiskLevel::Critical));
    assert!(tokenseer::evaluator::is_high_risk(&analysis.signals));

    let request = server.await.unwrap();
    assert!(request.starts_with(&format!("GET /v1/tokens/{}/analysis ", TOKEN)));
}

#[tokio::test]
async fn test_signal_feed_success() {
    let (base_url, server) = serve_once("200 OK", SIGNALS_BODY, None).await;
    let client = client_for(base_url);

    let query = SignalQuery {
        min_severity: Some(SignalSeverity::High),
        since: Some(1_700_000_000_000),
        ..Default::default()
    };
    let signals = client.get_signal_feed(&query).await.unwrap();
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[0].signal_type, SignalType::ContractRisk);

    let request = server.await.unwrap();
    let request_line = request.lines().next().unwrap();
    assert!(request_line.starts_with("GET /v1/signals?"));
    assert!(request_line.contains("minSeverity=high"));
    assert!(request_line.contains("since=1700000000000"));
}

#[tokio::test]
async fn test_list_watchlist() {
    let body = r#"{
        "success": true,
        "timestamp": 1,
        "data": [
            { "id": "w-1", "address": "So11111111111111111111111111111111111111112", "symbol": "SOL", "addedAt": 1700000000000 },
            { "id": "w-2", "address": "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", "alertSeverity": "critical", "addedAt": 1700000100000 }
        ]
    }"#;
    let (base_url, server) = serve_once("200 OK", body, None).await;
    let client = client_for(base_url);

    let items = client.list_watchlist().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].symbol.as_deref(), Some("SOL"));
    assert_eq!(items[1].alert_severity, Some(SignalSeverity::Critical));
    assert!(items[1].note.is_none());

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /v1/watchlist "));
}

#[tokio::test]
async fn test_list_webhooks() {
    let body = r#"{
        "success": true,
        "timestamp": 1,
        "data": [
            { "id": "hook-1", "url": "https://example.com/a", "events": ["honeypot"], "createdAt": 1700000000000 },
            { "id": "hook-2", "url": "https://example.com/b", "active": false, "createdAt": 1700000000000 }
        ]
    }"#;
    let (base_url, server) = serve_once("200 OK", body, None).await;
    let client = client_for(base_url);

    let hooks = client.list_webhooks().await.unwrap();
    assert_eq!(hooks.len(), 2);
    assert_eq!(hooks[0].events, vec![SignalType::Honeypot]);
    assert!(hooks[0].active);
    assert!(hooks[1].events.is_empty());
    assert!(!hooks[1].active);

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /v1/webhooks "));
}

#[tokio::test]
async fn test_subscribe_webhook_posts_json() {
    let body = r#"{
        "success": true,
        "timestamp": 1,
        "data": { "id": "hook-9", "url": "https://example.com/hook", "events": ["rugpull_risk"],
                  "minSeverity": "high", "createdAt": 1700000000000 }
    }"#;
    let (base_url, server) = serve_once("201 Created", body, None).await;
    let client = client_for(base_url);

    let hook = client
        .subscribe_webhook(&tokenseer::client::NewWebhook {
            url: "https://example.com/hook".to_string(),
            events: vec![SignalType::RugpullRisk],
            min_severity: Some(SignalSeverity::High),
        })
        .await
        .unwrap();
    assert_eq!(hook.id, "hook-9");
    assert_eq!(hook.min_severity, Some(SignalSeverity::High));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/webhooks "));
    let json_start = request.find("\r\n\r\n").unwrap() + 4;
    let sent: serde_json::Value = serde_json::from_str(&request[json_start..]).unwrap();
    assert_eq!(
        sent,
        serde_json::json!({
            "url": "https://example.com/hook",
            "events": ["rugpull_risk"],
            "minSeverity": "high"
        })
    );
}

#[tokio::test]
async fn test_delete_rejected_in_envelope() {
    let body = r#"{"success": false, "error": "watchlist entry not found", "timestamp": 1}"#;
    let (base_url, server) = serve_once("200 OK", body, None).await;
    let client = client_for(base_url);

    let err = client.remove_from_watchlist("w-404").await.unwrap_err();
    assert!(matches!(err, TokenSeerError::Api { status: 200, ref message } if message == "watchlist entry not found"));

    let request = server.await.unwrap();
    assert!(request.starts_with("DELETE /v1/watchlist/w-404 "));
}

#[tokio::test]
async fn test_dot_segment_id_never_sent() {
    let client = client_for("http://127.0.0.1:9".to_string());

    let err = client.remove_from_watchlist("..").await.unwrap_err();
    assert!(matches!(err, TokenSeerError::Validation(_)));

    let err = client.get_market_data("abc\\..\\..\\watchlist").await.unwrap_err();
    assert!(matches!(err, TokenSeerError::Validation(_)));
}
