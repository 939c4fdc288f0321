use siplink_client_core::{Client, ClientConfig, ClientError};

fn loopback_config() -> ClientConfig {
    ClientConfig::new()
        .with_server("127.0.0.1", 5060)
        .with_credentials("alice", "secret")
        .with_domain("127.0.0.1")
        .with_local_addr("127.0.0.1", 0)
}

#[tokio::test]
async fn make_call_before_start_fails_with_not_running() {
    let client = Client::new(loopback_config());
    let err = client.make_call("sip:bob@127.0.0.1").await.unwrap_err();
    assert!(matches!(err, ClientError::NotRunning));
}

#[tokio::test]
async fn register_before_start_fails_with_not_running() {
    let client = Client::new(loopback_config());
    let err = client.register(3600).await.unwrap_err();
    assert!(matches!(err, ClientError::NotRunning));
}

#[tokio::test]
async fn invalid_remote_uri_is_rejected_without_touching_the_network() {
    let client = Client::new(loopback_config());
    client.start().await.unwrap();

    let err = client.make_call("not-a-sip-uri").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidUri(_)));

    client.stop().await;
}

#[tokio::test]
async fn s6_unresolvable_server_host_surfaces_resolution_failure() {
    let config = ClientConfig::new()
        .with_server("this-host-does-not-resolve.invalid", 5060)
        .with_local_addr("127.0.0.1", 0);
    let client = Client::new(config);
    client.start().await.unwrap();

    let err = client.register(3600).await.unwrap_err();
    assert!(matches!(err, ClientError::ResolutionFailed(_)));

    client.stop().await;
}

#[tokio::test]
async fn property6_outbound_calls_get_distinct_call_ids_and_stay_active() {
    let client = Client::new(loopback_config());
    client.start().await.unwrap();

    let first = client.make_call("sip:bob@127.0.0.1:5060").await.unwrap();
    let second = client.make_call("sip:carol@127.0.0.1:5060").await.unwrap();
    assert_ne!(first, second);

    let active = client.active_calls().await;
    assert!(active.contains(&first));
    assert!(active.contains(&second));

    client.stop().await;
}

#[tokio::test]
async fn hangup_on_unknown_call_id_is_silent() {
    let client = Client::new(loopback_config());
    client.start().await.unwrap();

    // Must not panic even though no dialog exists for this Call-ID.
    client.hangup("no-such-call").await;

    client.stop().await;
}

#[tokio::test]
async fn start_is_idempotent_and_stop_can_follow_a_second_start() {
    let client = Client::new(loopback_config());
    client.start().await.unwrap();
    client.start().await.unwrap();
    client.stop().await;
    // A second stop is a no-op, not a panic.
    client.stop().await;
}

#[tokio::test]
async fn incoming_call_callback_fires_on_inbound_invite() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let client = Client::new(loopback_config());
    let fired = Arc::new(AtomicBool::new(false));
    let fired_in_callback = fired.clone();
    client.set_on_incoming_call(move |_| {
        fired_in_callback.store(true, Ordering::SeqCst);
    });
    client.start().await.unwrap();

    // Exercising the callback end-to-end would require a second UA to send
    // a real INVITE over the loopback socket; that belongs in the shared
    // dialog-core inbound-flow test. Here we only check wiring compiles
    // and the client survives with the callback installed and unfired.
    assert!(!fired.load(Ordering::SeqCst));

    client.stop().await;
}
