// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests over a real TCP listener and WebSocket clients.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use chatrelay::config::RelayConfig;
use chatrelay::state::RelayState;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const TIMEOUT: Duration = Duration::from_secs(5);

fn test_config(history_capacity: usize) -> RelayConfig {
    RelayConfig {
        host: "127.0.0.1".into(),
        port: 0,
        public_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
        history_capacity,
        log_format: "text".into(),
        log_level: "info".into(),
    }
}

async fn start(history_capacity: usize) -> anyhow::Result<(SocketAddr, Arc<RelayState>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state =
        Arc::new(RelayState::new(test_config(history_capacity), CancellationToken::new()));
    tokio::spawn(chatrelay::serve(listener, Arc::clone(&state)));
    Ok((addr, state))
}

async fn connect(addr: SocketAddr) -> anyhow::Result<Client> {
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await?;
    Ok(ws)
}

/// Block until the relay has registered exactly `n` clients.
async fn wait_for_clients(state: &RelayState, n: usize) -> anyhow::Result<()> {
    tokio::time::timeout(TIMEOUT, async {
        while state.relay.client_count() != n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    Ok(())
}

async fn send_text(ws: &mut Client, text: &str) -> anyhow::Result<()> {
    ws.send(Message::Text(text.into())).await?;
    Ok(())
}

/// Next text frame as raw string.
async fn recv_text(ws: &mut Client) -> anyhow::Result<String> {
    loop {
        let msg = tokio::time::timeout(TIMEOUT, ws.next())
            .await?
            .ok_or_else(|| anyhow::anyhow!("stream closed"))??;
        if let Message::Text(text) = msg {
            return Ok(text.as_str().to_owned());
        }
    }
}

/// Assert nothing arrives within a short window.
async fn assert_silent(ws: &mut Client) {
    let got = tokio::time::timeout(Duration::from_millis(150), ws.next()).await;
    assert!(got.is_err(), "expected no frame, got {got:?}");
}

#[tokio::test]
async fn scenario_broadcast_and_replay() -> anyhow::Result<()> {
    let (addr, state) = start(50).await?;
    let mut a = connect(addr).await?;
    let mut b = connect(addr).await?;
    wait_for_clients(&state, 2).await?;

    send_text(&mut a, r#"{"text":"hi"}"#).await?;
    let h0 = recv_text(&mut a).await?;
    assert_eq!(recv_text(&mut b).await?, h0);
    let parsed: Value = serde_json::from_str(&h0)?;
    assert_eq!(parsed["text"], "hi");
    assert!(parsed["time"].as_str().is_some_and(|t| !t.is_empty()));

    let mut c = connect(addr).await?;
    assert_eq!(recv_text(&mut c).await?, h0);
    wait_for_clients(&state, 3).await?;

    send_text(&mut b, r#"{"text":"yo"}"#).await?;
    let h1 = recv_text(&mut a).await?;
    assert_eq!(recv_text(&mut b).await?, h1);
    assert_eq!(recv_text(&mut c).await?, h1);
    assert_eq!(state.relay.history_len(), 2);
    Ok(())
}

#[tokio::test]
async fn malformed_frame_is_dropped_and_connection_survives() -> anyhow::Result<()> {
    let (addr, state) = start(50).await?;
    let mut a = connect(addr).await?;
    let mut b = connect(addr).await?;
    wait_for_clients(&state, 2).await?;

    send_text(&mut a, "this is not json").await?;
    assert_silent(&mut b).await;
    assert_eq!(state.relay.history_len(), 0);

    // Same connection is still usable.
    send_text(&mut a, r#"{"text":"after"}"#).await?;
    let frame: Value = serde_json::from_str(&recv_text(&mut b).await?)?;
    assert_eq!(frame["text"], "after");
    assert_eq!(state.relay.client_count(), 2);
    Ok(())
}

#[tokio::test]
async fn binary_frames_relay_only_when_utf8() -> anyhow::Result<()> {
    let (addr, state) = start(50).await?;
    let mut a = connect(addr).await?;
    let mut b = connect(addr).await?;
    wait_for_clients(&state, 2).await?;

    a.send(Message::Binary(vec![0xff, 0xfe].into())).await?;
    assert_silent(&mut b).await;
    assert_eq!(state.relay.history_len(), 0);

    a.send(Message::Binary(br#"{"b":1}"#.to_vec().into())).await?;
    let frame: Value = serde_json::from_str(&recv_text(&mut b).await?)?;
    assert_eq!(frame["b"], 1);
    assert!(frame["time"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(state.relay.history_len(), 1);
    assert_eq!(state.relay.client_count(), 2);
    Ok(())
}

#[tokio::test]
async fn closed_client_is_deregistered() -> anyhow::Result<()> {
    let (addr, state) = start(50).await?;
    let mut a = connect(addr).await?;
    let mut b = connect(addr).await?;
    let mut c = connect(addr).await?;
    wait_for_clients(&state, 3).await?;

    b.close(None).await?;
    wait_for_clients(&state, 2).await?;

    send_text(&mut a, r#"{"text":"two left"}"#).await?;
    let frame = recv_text(&mut a).await?;
    assert_eq!(recv_text(&mut c).await?, frame);
    Ok(())
}

#[tokio::test]
async fn late_joiner_gets_bounded_history() -> anyhow::Result<()> {
    let (addr, state) = start(3).await?;
    let mut a = connect(addr).await?;
    wait_for_clients(&state, 1).await?;

    for n in 0..5 {
        send_text(&mut a, &format!(r#"{{"n":{n}}}"#)).await?;
        recv_text(&mut a).await?;
    }

    let mut late = connect(addr).await?;
    let mut ns = Vec::new();
    for _ in 0..3 {
        let frame: Value = serde_json::from_str(&recv_text(&mut late).await?)?;
        ns.push(frame["n"].as_i64().unwrap_or(-1));
    }
    assert_eq!(ns, vec![2, 3, 4]);
    assert_silent(&mut late).await;
    Ok(())
}

#[tokio::test]
async fn shutdown_closes_clients() -> anyhow::Result<()> {
    let (addr, state) = start(50).await?;
    let mut a = connect(addr).await?;
    wait_for_clients(&state, 1).await?;

    state.shutdown.cancel();
    wait_for_clients(&state, 0).await?;

    let next = tokio::time::timeout(TIMEOUT, a.next()).await?;
    assert!(matches!(next, None | Some(Ok(Message::Close(_))) | Some(Err(_))));
    Ok(())
}
