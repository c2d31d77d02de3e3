use mockito::Matcher;
use perch::config::{NotificationChannelsBuilder, PerchConfigBuilder, TelegramConfigBuilder};
use perch::notify::{DemoRequest, NotifyError};
use secrecy::SecretString;

const TOKEN: &str = "42:integration";
const DEMO_CHAT: &str = "-1009876543210";

fn config(api_base: String) -> perch::config::PerchConfig {
    let telegram = TelegramConfigBuilder::default()
        .token(SecretString::new(TOKEN.to_string()))
        .api_base(api_base)
        .build()
        .unwrap();
    PerchConfigBuilder::default()
        .telegram(telegram)
        .channels(NotificationChannelsBuilder::default().demo_requests(DEMO_CHAT).build().unwrap())
        .build()
        .unwrap()
}

#[tokio::test]
async fn demo_request_is_posted_once_to_demo_chat() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", format!("/bot{}/sendMessage", TOKEN).as_str())
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("chat_id".into(), DEMO_CHAT.into()),
            Matcher::UrlEncoded("parse_mode".into(), "HTML".into()),
            Matcher::Regex("John\\+Doe".into()),
            Matcher::Regex("john%40example\\.com".into()),
            Matcher::Regex("%2B1234567890".into()),
            Matcher::Regex("United\\+States".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let dispatcher = config(server.url()).dispatcher().unwrap();
    let request = DemoRequest::new("John Doe", "john@example.com", "+1234567890", "United States");
    dispatcher.notify_new_demo_request(&request).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn send_message_uses_given_destination() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", format!("/bot{}/sendMessage", TOKEN).as_str())
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("chat_id".into(), "@release_notes".into()),
            Matcher::UrlEncoded("text".into(), "v1.2 shipped".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let dispatcher = config(server.url()).dispatcher().unwrap();
    dispatcher.send_message("v1.2 shipped", "@release_notes").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_are_returned_to_caller() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", format!("/bot{}/sendMessage", TOKEN).as_str())
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let dispatcher = config(server.url()).dispatcher().unwrap();
    let err = dispatcher.send_message("hi", "1").await.unwrap_err();
    match err {
        NotifyError::Status { status, description } => {
            assert_eq!(status, 502);
            assert_eq!(description, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
