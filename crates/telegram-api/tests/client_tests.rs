//! Integration tests for the Bot API client against a local mock server.

use std::time::Duration;

use serde_json::json;
use telegram_api::{
    ApiConfig, ApiError, BotClient, EditMessageTextParams, EditResult, InlineKeyboardButton,
    InlineKeyboardMarkup, PollConfig, ReplyKeyboardMarkup, SendMessageParams, UpdatePoller,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123:test";

fn client_for(server: &MockServer) -> BotClient {
    let config = ApiConfig::new(TOKEN).with_base_url(server.uri());
    BotClient::new(config).unwrap()
}

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": result}))
}

#[test]
fn test_empty_token_rejected() {
    let result = BotClient::new(ApiConfig::new(""));
    assert!(matches!(result, Err(ApiError::Config(_))));
}

#[tokio::test]
async fn test_send_text_removes_keyboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_json(json!({
            "chat_id": 7,
            "text": "Echo: hi",
            "parse_mode": "HTML",
            "reply_markup": {"remove_keyboard": true}
        })))
        .respond_with(ok(json!({"message_id": 99, "chat": {"id": 7}, "text": "Echo: hi"})))
        .expect(1)
        .mount(&server)
        .await;

    let params = SendMessageParams::text(7, "Echo: hi").removing_keyboard();
    let message = client_for(&server).send_message(&params).await.unwrap();
    assert_eq!(message.message_id, Some(99));
}

#[tokio::test]
async fn test_send_message_with_reply_keyboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_json(json!({
            "chat_id": 7,
            "text": "Pick & Choose",
            "parse_mode": "HTML",
            "reply_markup": {
                "keyboard": [[{"text": "/help"}], [{"text": "/woot"}]],
                "one_time_keyboard": true
            }
        })))
        .respond_with(ok(json!({"message_id": 100, "chat": {"id": 7}})))
        .expect(1)
        .mount(&server)
        .await;

    let keyboard = ReplyKeyboardMarkup::from_labels([["/help"], ["/woot"]], true);
    let params = SendMessageParams::text(7, "Pick & Choose").with_markup(keyboard);
    client_for(&server).send_message(&params).await.unwrap();
}

#[tokio::test]
async fn test_edit_message_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/editMessageText", TOKEN)))
        .respond_with(ok(json!({"message_id": 42, "chat": {"id": 7}, "text": "this is 3"})))
        .expect(1)
        .mount(&server)
        .await;

    let params = EditMessageTextParams::new(7, 42, "this is 3");
    let result = client_for(&server).edit_message_text(&params).await.unwrap();
    assert!(matches!(result, EditResult::Message(m) if m.message_id == Some(42)));
}

#[tokio::test]
async fn test_edit_reply_markup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/editMessageReplyMarkup", TOKEN)))
        .and(body_json(json!({
            "chat_id": 7,
            "message_id": 42,
            "reply_markup": {"inline_keyboard": [[{"text": "2025", "callback_data": "year;2025"}]]}
        })))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let markup = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::new(
        "2025",
        "year;2025",
    )]]);
    let result = client_for(&server)
        .edit_message_reply_markup(7, 42, Some(markup))
        .await
        .unwrap();
    assert_eq!(result, EditResult::Done(true));
}

#[tokio::test]
async fn test_answer_callback_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/answerCallbackQuery", TOKEN)))
        .and(body_json(json!({"callback_query_id": "cb-9"})))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client_for(&server).answer_callback_query("cb-9").await.unwrap());
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let params = SendMessageParams::text(1, "x");
    let err = client_for(&server).send_message(&params).await.unwrap_err();
    match err {
        ApiError::Api { code, description } => {
            assert_eq!(code, 400);
            assert!(description.contains("chat not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getMe", TOKEN)))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_me().await.unwrap_err();
    assert!(matches!(err, ApiError::Api { code: 502, .. }));
}

#[tokio::test]
async fn test_poll_once_advances_offset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .and(body_json(json!({"offset": 1, "limit": 1})))
        .respond_with(ok(json!([{
            "update_id": 500,
            "message": {"message_id": 1, "chat": {"id": 7}, "text": "hi"}
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = PollConfig {
        offset_file: dir.path().join("offset.json"),
        interval: Duration::from_millis(1),
        limit: 1,
    };
    let poller = UpdatePoller::new(client_for(&server), config.clone());

    let updates = poller.poll_once().await.unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].update_id, 500);

    let stored: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&config.offset_file).unwrap()).unwrap();
    assert_eq!(stored["offset"], 501);
}
