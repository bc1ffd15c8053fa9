//! Bot API client against a local stand-in server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use feed_relay::config::TelegramConfig;
use feed_relay::telegram::{LinkPreview, Messenger, SendOptions, TelegramClient};
use feed_relay::RelayError;

type Calls = Arc<Mutex<Vec<(String, String, Value)>>>;

async fn bot_api(
    State(calls): State<Calls>,
    Path((bot, method)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    calls
        .lock()
        .unwrap()
        .push((bot.clone(), method.clone(), body.clone()));

    match method.as_str() {
        "sendMessage" => Json(json!({"ok": true, "result": {"message_id": 7, "date": 0}}))
            .into_response(),
        "unpinChatMessage" if body["message_id"] == json!(404) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: message to unpin not found"
            })),
        )
            .into_response(),
        _ => Json(json!({"ok": true, "result": true})).into_response(),
    }
}

async fn start_bot_api() -> (SocketAddr, Calls) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route("/:bot/:method", post(bot_api))
        .with_state(calls.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, calls)
}

fn client(addr: SocketAddr) -> TelegramClient {
    TelegramClient::new(&TelegramConfig {
        bot_token: "123:abc".to_string(),
        channel: -1001234,
        api_base: format!("http://{}", addr),
    })
    .unwrap()
}

#[tokio::test]
async fn test_send_message() {
    let (addr, calls) = start_bot_api().await;
    let client = client(addr);

    let options = SendOptions::html().with_link_preview(LinkPreview::Disabled);
    let sent = client.send_message("<b>Deno 2</b>", &options).await.unwrap();
    assert_eq!(sent.message_id, 7);

    let calls = calls.lock().unwrap();
    let (bot, method, body) = &calls[0];
    assert_eq!(bot, "bot123:abc");
    assert_eq!(method, "sendMessage");
    assert_eq!(
        body,
        &json!({
            "chat_id": -1001234,
            "text": "<b>Deno 2</b>",
            "parse_mode": "HTML",
            "link_preview_options": {"is_disabled": true}
        })
    );
}

#[tokio::test]
async fn test_pin_and_unpin() {
    let (addr, calls) = start_bot_api().await;
    let client = client(addr);

    client.unpin_message(41).await.unwrap();
    client.pin_message(42, true).await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].1, "unpinChatMessage");
    assert_eq!(calls[0].2, json!({"chat_id": -1001234, "message_id": 41}));
    assert_eq!(calls[1].1, "pinChatMessage");
    assert_eq!(
        calls[1].2,
        json!({"chat_id": -1001234, "message_id": 42, "disable_notification": true})
    );
}

#[tokio::test]
async fn test_api_error_maps_to_telegram_error() {
    let (addr, _calls) = start_bot_api().await;
    let client = client(addr);

    let err = client.unpin_message(404).await.unwrap_err();
    assert!(matches!(err, RelayError::Telegram(_)));
    assert!(err.to_string().contains("message to unpin not found"));
}

#[tokio::test]
async fn test_unreachable_api() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr)
        .send_message("x", &SendOptions::html())
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Telegram(_)));
}
