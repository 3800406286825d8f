//! Relay Socket Tests
//!
//! End-to-end tests against a live listener using a WebSocket client.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest,
        http::{header::COOKIE, HeaderValue, StatusCode},
        Error as WsError, Message,
    },
    MaybeTlsStream, WebSocketStream,
};

use crate::common::{spawn_app, wait_for_clients, SESSION_COOKIE};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr) -> Socket {
    let mut request = format!("ws://{}/room", addr).into_client_request().unwrap();
    request
        .headers_mut()
        .insert(COOKIE, HeaderValue::from_static(SESSION_COOKIE));

    let (socket, _response) = tokio_test::assert_ok!(connect_async(request).await);
    socket
}

/// Next text payload, skipping control frames
async fn next_text(socket: &mut Socket) -> String {
    loop {
        let message = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("timed out waiting for a message")
            .expect("socket closed")
            .expect("socket error");
        match message {
            Message::Text(_) | Message::Binary(_) => return message.to_text().unwrap().to_string(),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn test_message_is_relayed_to_every_client() {
    let server = spawn_app().await;
    let mut alice = connect(server.addr).await;
    let mut bob = connect(server.addr).await;
    wait_for_clients(&server.hub, 2).await;

    alice.send(Message::text("hello")).await.unwrap();

    assert_eq!(next_text(&mut bob).await, "hello");
    // The sender is a member too
    assert_eq!(next_text(&mut alice).await, "hello");
}

#[tokio::test]
async fn test_messages_from_one_sender_arrive_in_order() {
    let server = spawn_app().await;
    let mut alice = connect(server.addr).await;
    let mut bob = connect(server.addr).await;
    wait_for_clients(&server.hub, 2).await;

    for i in 0..10 {
        alice.send(Message::text(format!("m{}", i))).await.unwrap();
    }

    for i in 0..10 {
        assert_eq!(next_text(&mut bob).await, format!("m{}", i));
    }
}

#[tokio::test]
async fn test_closed_client_leaves_hub() {
    let server = spawn_app().await;
    let mut alice = connect(server.addr).await;
    let mut bob = connect(server.addr).await;
    wait_for_clients(&server.hub, 2).await;

    bob.close(None).await.unwrap();
    wait_for_clients(&server.hub, 1).await;

    alice.send(Message::text("still here")).await.unwrap();
    assert_eq!(next_text(&mut alice).await, "still here");
}

#[tokio::test]
async fn test_dropped_connection_leaves_hub() {
    let server = spawn_app().await;
    let alice = connect(server.addr).await;
    wait_for_clients(&server.hub, 1).await;

    drop(alice);

    wait_for_clients(&server.hub, 0).await;
}

#[tokio::test]
async fn test_upgrade_without_session_is_redirected() {
    let server = spawn_app().await;
    let request = format!("ws://{}/room", server.addr)
        .into_client_request()
        .unwrap();

    let result = connect_async(request).await;

    match result {
        Err(WsError::Http(response)) => {
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("upgrade without a session should be refused"),
    }
    assert_eq!(server.hub.active_clients(), 0);
}
