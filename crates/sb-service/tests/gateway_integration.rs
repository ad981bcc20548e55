//! Gateway integration tests
//!
//! Tests the gateway server and a front end talking JSON lines to it.

mod common;

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use sb_core::gateway::{GatewayRequest, GatewayResponse, OperatorEvent, Reply};
use sb_core::{CommandResult, OperatorId};
use sb_service::{render, Dispatcher, GatewayServer};

use common::{button, command, text, Bridge, MockConnector, OPERATOR};

/// Base port for test servers - each test gets a unique offset
static PORT_COUNTER: AtomicU16 = AtomicU16::new(0);

fn get_test_port() -> u16 {
    let offset = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
    39400 + offset
}

/// Gateway test client wrapper
struct TestClient {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: BufWriter<tokio::net::tcp::OwnedWriteHalf>,
}

impl TestClient {
    async fn connect(address: &str) -> Self {
        // Retry connection a few times in case server isn't ready
        let mut last_err = None;
        for _ in 0..10 {
            match TcpStream::connect(address).await {
                Ok(stream) => {
                    let (reader, writer) = stream.into_split();
                    return Self {
                        reader: BufReader::new(reader),
                        writer: BufWriter::new(writer),
                    };
                }
                Err(e) => {
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
        panic!("Failed to connect to gateway at {}: {:?}", address, last_err);
    }

    async fn send_line(&mut self, line: &str) -> GatewayResponse {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .expect("Failed to write request");
        self.writer.flush().await.expect("Failed to flush");

        let mut response_line = String::new();
        self.reader
            .read_line(&mut response_line)
            .await
            .expect("Failed to read response");

        if response_line.is_empty() {
            panic!("Server sent empty response (connection closed?)");
        }

        serde_json::from_str(&response_line).expect("Failed to parse response")
    }

    async fn send_request(&mut self, request: GatewayRequest) -> GatewayResponse {
        let request_json = serde_json::to_string(&request).expect("Failed to serialize request");
        self.send_line(&request_json).await
    }

    async fn send_event(&mut self, operator: &str, event: OperatorEvent) -> GatewayResponse {
        self.send_request(GatewayRequest::Event {
            operator: OperatorId::new(operator),
            event,
        })
        .await
    }
}

fn replies(response: GatewayResponse) -> Vec<Reply> {
    match response {
        GatewayResponse::Replies { replies } => replies,
        other => panic!("Expected replies, got {:?}", other),
    }
}

struct TestGateway {
    address: String,
    bridge: Arc<Bridge>,
    dispatcher: Arc<Dispatcher<MockConnector>>,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

async fn start_gateway() -> TestGateway {
    let address = format!("127.0.0.1:{}", get_test_port());
    let (dispatcher, bridge) = common::dispatcher();
    let shutdown = CancellationToken::new();

    let server = GatewayServer::new(address.clone(), Arc::clone(&dispatcher))
        .with_shutdown_token(shutdown.clone());
    let handle = tokio::spawn(async move { server.run().await });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestGateway {
        address,
        bridge,
        dispatcher,
        shutdown,
        handle,
    }
}

#[tokio::test]
async fn test_gateway_ping_pong() {
    let gateway = start_gateway().await;
    let mut client = TestClient::connect(&gateway.address).await;

    let response = client.send_request(GatewayRequest::Ping).await;
    assert!(matches!(response, GatewayResponse::Pong));

    gateway.handle.abort();
}

#[tokio::test]
async fn test_gateway_full_conversation() {
    let gateway = start_gateway().await;
    let mut client = TestClient::connect(&gateway.address).await;

    let start = replies(client.send_event(OPERATOR, OperatorEvent::Start).await);
    assert_eq!(start[0].text(), render::GREETING);
    assert!(!start[1].buttons().is_empty());

    for (option, value) in [
        ("hostname", "10.0.0.5"),
        ("port", "22"),
        ("username", "ops"),
        ("password", "x"),
    ] {
        client
            .send_event(OPERATOR, button(&format!("{}_option", option)))
            .await;
        client.send_event(OPERATOR, text(value)).await;
    }

    let connected = replies(client.send_event(OPERATOR, button("connect")).await);
    assert_eq!(
        connected,
        vec![
            Reply::Edit {
                text: render::CONNECTING.to_string()
            },
            Reply::Message {
                text: render::COMMAND_MODE_HELP.to_string(),
                buttons: vec![]
            },
        ]
    );

    gateway
        .bridge
        .script(CommandResult::Output("ops".to_string()));
    let whoami = replies(client.send_event(OPERATOR, command("whoami")).await);
    assert_eq!(whoami[0].text(), "ops");
    assert_eq!(gateway.bridge.open(), 1);

    gateway.handle.abort();
}

#[tokio::test]
async fn test_gateway_ignores_unknown_operator() {
    let gateway = start_gateway().await;
    let mut client = TestClient::connect(&gateway.address).await;

    let response = client.send_event("999", OperatorEvent::Start).await;
    assert!(matches!(response, GatewayResponse::Ignored));
    assert!(gateway.dispatcher.sessions().is_empty());

    gateway.handle.abort();
}

#[tokio::test]
async fn test_gateway_invalid_request() {
    let gateway = start_gateway().await;
    let mut client = TestClient::connect(&gateway.address).await;

    let response = client.send_line("{\"type\":\"teleport\"}").await;
    match response {
        GatewayResponse::Error { message } => assert!(message.starts_with("Invalid request")),
        other => panic!("Expected error, got {:?}", other),
    }

    // The connection stays usable
    let response = client.send_request(GatewayRequest::Ping).await;
    assert!(matches!(response, GatewayResponse::Pong));

    gateway.handle.abort();
}

#[tokio::test]
async fn test_gateway_survives_panicking_event() {
    let gateway = start_gateway().await;
    let mut client = TestClient::connect(&gateway.address).await;

    client.send_event(OPERATOR, OperatorEvent::Start).await;
    for (option, value) in [
        ("hostname", "10.0.0.5"),
        ("port", "22"),
        ("username", "ops"),
        ("password", "x"),
    ] {
        client
            .send_event(OPERATOR, button(&format!("{}_option", option)))
            .await;
        client.send_event(OPERATOR, text(value)).await;
    }
    client.send_event(OPERATOR, button("connect")).await;

    *gateway.bridge.panic_on.lock().unwrap() = Some("uptime".to_string());
    let response = client.send_event(OPERATOR, command("uptime")).await;
    assert!(matches!(response, GatewayResponse::Error { .. }));

    // The same operator keeps going with the session intact
    let whoami = replies(client.send_event(OPERATOR, command("whoami")).await);
    assert_eq!(whoami[0].text(), "ran: whoami");

    // Other front ends are unaffected
    let mut other = TestClient::connect(&gateway.address).await;
    let response = other.send_request(GatewayRequest::Ping).await;
    assert!(matches!(response, GatewayResponse::Pong));

    gateway.handle.abort();
}

#[tokio::test]
async fn test_gateway_serves_clients_concurrently() {
    let gateway = start_gateway().await;
    let mut first = TestClient::connect(&gateway.address).await;
    let mut second = TestClient::connect(&gateway.address).await;

    first.send_event(OPERATOR, OperatorEvent::Start).await;
    second.send_event("200", OperatorEvent::Start).await;

    assert_eq!(gateway.dispatcher.sessions().len(), 2);

    gateway.handle.abort();
}

#[tokio::test]
async fn test_gateway_shutdown_request() {
    let gateway = start_gateway().await;
    let mut client = TestClient::connect(&gateway.address).await;

    let response = client.send_request(GatewayRequest::Shutdown).await;
    assert!(matches!(response, GatewayResponse::Ok));
    assert!(gateway.shutdown.is_cancelled());

    let result = timeout(Duration::from_secs(2), gateway.handle)
        .await
        .expect("server should stop after shutdown")
        .expect("server task should not panic");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_gateway_drops_events_after_shutdown() {
    let gateway = start_gateway().await;
    let mut client = TestClient::connect(&gateway.address).await;

    let response = client.send_request(GatewayRequest::Ping).await;
    assert!(matches!(response, GatewayResponse::Pong));

    gateway.shutdown.cancel();

    let request = GatewayRequest::Event {
        operator: OperatorId::new(OPERATOR),
        event: OperatorEvent::Start,
    };
    let line = format!("{}\n", serde_json::to_string(&request).unwrap());
    // The server may already have closed its end
    let _ = client.writer.write_all(line.as_bytes()).await;
    let _ = client.writer.flush().await;

    let mut response_line = String::new();
    let read = timeout(
        Duration::from_secs(2),
        client.reader.read_line(&mut response_line),
    )
    .await
    .expect("connection should close after shutdown");
    assert!(matches!(read, Ok(0) | Err(_)), "got a response: {:?}", response_line);
    assert!(gateway.dispatcher.sessions().is_empty());
    assert_eq!(gateway.bridge.connects(), 0);

    gateway.handle.abort();
}
