//! End-to-end tests over real WebSocket connections.
//!
//! Each test binds an ephemeral port, runs the accept loop in the background
//! and drives it with tokio-tungstenite clients.

use futures::{SinkExt, StreamExt};
use relay_server::{create_server_with_config, PlayerId, RelayServer, ServerConfig, ServerMessage};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

async fn start_server(max_connections: usize) -> (Arc<RelayServer>, SocketAddr) {
    let config = ServerConfig {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        max_connections,
        outbound_queue_capacity: 64,
    };
    let server = Arc::new(create_server_with_config(config));
    let listener = server.bind().expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();

    let running = server.clone();
    tokio::spawn(async move { running.serve(listener).await });
    (server, addr)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/"))
        .await
        .expect("websocket handshake");
    client
}

async fn recv(client: &mut Client) -> ServerMessage {
    loop {
        let frame = timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a message")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("server sent valid JSON");
        }
    }
}

async fn recv_init(client: &mut Client) -> PlayerId {
    match recv(client).await {
        ServerMessage::Init { id } => id,
        other => panic!("expected init, got {other:?}"),
    }
}

async fn send(client: &mut Client, text: &str) {
    client.send(Message::text(text.to_string())).await.expect("send");
}

async fn http_get(addr: SocketAddr, path: &str) -> String {
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    http_request_in_parts(addr, &[&request]).await
}

/// Writes `parts` as separate TCP writes with a pause in between, then reads
/// the whole response.
async fn http_request_in_parts(addr: SocketAddr, parts: &[&str]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        stream.write_all(part.as_bytes()).await.unwrap();
        stream.flush().await.unwrap();
    }

    let mut response = String::new();
    timeout(RECV_TIMEOUT, stream.read_to_string(&mut response))
        .await
        .expect("health response timed out")
        .unwrap();
    response
}

#[tokio::test(flavor = "multi_thread")]
async fn test_join_move_chat_leave_scenario() {
    let (_server, addr) = start_server(100).await;

    // open A
    let mut a = connect(addr).await;
    let a_id = recv_init(&mut a).await;

    // open B: init, then the seed join for A; A hears about B
    let mut b = connect(addr).await;
    let b_id = recv_init(&mut b).await;
    assert_eq!(
        recv(&mut b).await,
        ServerMessage::PlayerJoin { id: a_id, x: 0.0, y: 0.0, z: 0.0 }
    );
    assert_eq!(
        recv(&mut a).await,
        ServerMessage::PlayerJoin { id: b_id, x: 0.0, y: 0.0, z: 0.0 }
    );
    assert_ne!(a_id, b_id);

    // A moves: only B is told
    send(&mut a, r#"{"type":"move","x":1,"y":2,"z":3}"#).await;
    assert_eq!(
        recv(&mut b).await,
        ServerMessage::PlayerMove { id: a_id, x: 1.0, y: 2.0, z: 3.0 }
    );

    // B chats: both receive it. A's next message being the chat shows the
    // move was never echoed back to A.
    send(&mut b, r#"{"type":"chat","message":"hi"}"#).await;
    for client in [&mut a, &mut b] {
        match recv(client).await {
            ServerMessage::Chat { id, message, timestamp } => {
                assert_eq!(id, b_id);
                assert_eq!(message, "hi");
                assert_eq!(timestamp.len(), 8);
                assert_eq!(timestamp.matches(':').count(), 2);
            }
            other => panic!("expected chat, got {other:?}"),
        }
    }

    // close A: B sees the leave
    a.close(None).await.unwrap();
    assert_eq!(recv(&mut b).await, ServerMessage::PlayerLeave { id: a_id });
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_messages_are_ignored() {
    let (_server, addr) = start_server(100).await;

    let mut a = connect(addr).await;
    recv_init(&mut a).await;
    let mut b = connect(addr).await;
    let b_id = recv_init(&mut b).await;
    recv(&mut b).await; // seed join for A
    recv(&mut a).await; // announcement of B

    send(&mut b, "definitely not json").await;
    send(&mut b, r#"{"type":"fly","speed":9000}"#).await;
    send(&mut b, r#"{"type":"move","x":1}"#).await;
    send(&mut b, r#"{"type":"chat","message":"after garbage"}"#).await;

    // The connection survives and the only thing A receives is the chat.
    match recv(&mut a).await {
        ServerMessage::Chat { id, message, .. } => {
            assert_eq!(id, b_id);
            assert_eq!(message, "after garbage");
        }
        other => panic!("expected chat, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_reports_player_count() {
    let (server, addr) = start_server(100).await;

    let response = http_get(addr, "/health").await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.ends_with(r#"{"status":"ok","players":0}"#), "{response}");

    let mut a = connect(addr).await;
    recv_init(&mut a).await;
    let mut b = connect(addr).await;
    recv_init(&mut b).await;
    assert_eq!(server.player_count().await, 2);

    let response = http_get(addr, "/health").await;
    assert!(response.ends_with(r#"{"status":"ok","players":2}"#), "{response}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_request_split_across_writes() {
    let (_server, addr) = start_server(100).await;

    let response = http_request_in_parts(
        addr,
        &["GET /hea", "lth HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"],
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response:?}");
    assert!(response.to_ascii_lowercase().contains("content-type: application/json"), "{response}");
    assert!(response.ends_with(r#"{"status":"ok","players":0}"#), "{response}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_frames_with_utf8_are_relayed() {
    let (_server, addr) = start_server(100).await;

    let mut a = connect(addr).await;
    let a_id = recv_init(&mut a).await;
    let mut b = connect(addr).await;
    recv_init(&mut b).await;
    recv(&mut b).await; // seed join for A
    recv(&mut a).await; // announcement of B

    a.send(Message::binary(vec![0xff, 0xfe, 0x00])).await.unwrap();
    a.send(Message::binary(br#"{"type":"move","x":4,"y":5,"z":6}"#.to_vec()))
        .await
        .unwrap();

    assert_eq!(
        recv(&mut b).await,
        ServerMessage::PlayerMove { id: a_id, x: 4.0, y: 5.0, z: 6.0 }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connections_beyond_capacity_are_rejected() {
    let (_server, addr) = start_server(1).await;

    let mut a = connect(addr).await;
    recv_init(&mut a).await;

    let rejected = connect_async(format!("ws://{addr}/")).await;
    match rejected {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 503);
        }
        Err(other) => panic!("expected HTTP rejection, got {other:?}"),
        Ok(_) => panic!("connection beyond capacity was accepted"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shutdown_closes_clients() {
    let (server, addr) = start_server(100).await;

    let mut a = connect(addr).await;
    recv_init(&mut a).await;

    server.shutdown().await.unwrap();

    let ended = timeout(RECV_TIMEOUT, async {
        loop {
            match a.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "client was not closed on shutdown");
}
