use std::time::Duration;

use siplink::{Client, ClientConfig, Server, ServerConfig};

#[tokio::test]
async fn minimal_server_and_client_from_the_facade_crate() {
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        let server = Server::new(ServerConfig::new().with_local_addr("127.0.0.1", 0).with_domain("127.0.0.1"));
        server.start().await.unwrap();
        let addr = server.local_addr().await.unwrap();

        let client = Client::new(
            ClientConfig::new()
                .with_server("127.0.0.1", addr.port())
                .with_credentials("alice", "secret")
                .with_domain("127.0.0.1")
                .with_local_addr("127.0.0.1", 0),
        );
        client.start().await.unwrap();
        client.register(3600).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(server.registrar().is_registered("alice"));

        client.stop().await;
        server.stop().await;
    })
    .await;

    assert!(result.is_ok(), "test timed out");
}
