//! End-to-end tests covering the full client → relay → provider
//! send/receive cycle over a real listener

mod test_utils;

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use charla::chat::{ChatController, RelayClient, SEND_FAILURE_TEXT, SendOutcome};
    use charla::core::db::async_db;
    use charla::session::{Role, SessionStore};

    use crate::test_utils::test_app;

    /// Serve the relay app on an ephemeral port and return its base
    /// URL.
    async fn spawn_relay(provider_hostname: &str) -> String {
        let app = test_app(provider_hostname);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn controller_with(dir: &TempDir, relay_url: &str) -> ChatController {
        let db = async_db(dir.path().to_str().unwrap()).await.unwrap();
        let store = SessionStore::open(db).await.unwrap();
        ChatController::new(store, RelayClient::new(relay_url))
    }

    #[tokio::test]
    async fn it_delivers_a_reply_into_the_originating_session() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices": [{"message": {"role": "assistant", "content": "hola, como estas"}}]}"#,
            )
            .create_async()
            .await;

        let relay_url = spawn_relay(&server.url()).await;

        let dir = TempDir::new().unwrap();
        let mut controller = controller_with(&dir, &relay_url).await;
        let id = controller.store_mut().create("Chat A").await.unwrap();

        let outcome = controller.send(&id, "hola").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Delivered(_)));

        let messages = controller.store().messages(&id).unwrap().to_vec();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hola");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "hola, como estas");

        // The durable log matches the in-memory sequence after a
        // reload, timestamps included
        let db = async_db(dir.path().to_str().unwrap()).await.unwrap();
        let reloaded = SessionStore::open(db).await.unwrap();
        assert_eq!(reloaded.messages(&id).unwrap(), messages.as_slice());
    }

    #[tokio::test]
    async fn it_records_a_fixed_failure_message_when_the_relay_is_down() {
        // Nothing listens on port 1
        let dir = TempDir::new().unwrap();
        let mut controller = controller_with(&dir, "http://127.0.0.1:1").await;
        let id = controller.store_mut().create("Chat A").await.unwrap();

        let outcome = controller.send(&id, "hola").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Failed(_)));

        let messages = controller.store().messages(&id).unwrap().to_vec();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hola");
        assert_eq!(messages[1].content, SEND_FAILURE_TEXT);

        let db = async_db(dir.path().to_str().unwrap()).await.unwrap();
        let reloaded = SessionStore::open(db).await.unwrap();
        assert_eq!(reloaded.messages(&id).unwrap(), messages.as_slice());
    }

    #[tokio::test]
    async fn it_records_a_fixed_failure_message_when_the_provider_is_down() {
        // The relay is up but its provider is unreachable, so it
        // answers 500 and the client records the same failure text
        let relay_url = spawn_relay("http://127.0.0.1:1").await;

        let dir = TempDir::new().unwrap();
        let mut controller = controller_with(&dir, &relay_url).await;
        let id = controller.store_mut().create("Chat A").await.unwrap();

        let outcome = controller.send(&id, "hola").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Failed(_)));
        let messages = controller.store().messages(&id).unwrap();
        assert_eq!(messages[1].content, SEND_FAILURE_TEXT);
    }
}
