//! Integration tests for the display client runner

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use queue_display::api::http::create_router;
use queue_display::api::websocket::AppState;
use queue_display::client::{ClientEvent, DisplayClient};
use queue_display::config::ClientConfig;
use queue_display::{DisplayItem, Polyclinic, QueueStore, Topic};

const WAIT: Duration = Duration::from_secs(3);

#[derive(Debug)]
enum Seen {
    Connecting,
    Snapshot(Vec<DisplayItem>),
    Called(u32),
}

async fn start_server() -> (SocketAddr, Arc<AppState>) {
    let store = Arc::new(
        QueueStore::with_polyclinics(vec![Polyclinic::new(1, "P001", "General")]).unwrap(),
    );
    let state = Arc::new(AppState::new(store, 32));
    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn spawn_client(base_url: String) -> (mpsc::UnboundedReceiver<Seen>, tokio::task::JoinHandle<()>) {
    let config = ClientConfig::new(&base_url, Topic::Display, Duration::from_millis(50)).unwrap();
    let client = DisplayClient::new(config).unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        client
            .run(move |event| {
                let seen = match event {
                    ClientEvent::Connecting => Seen::Connecting,
                    ClientEvent::Snapshot(items) => Seen::Snapshot(items.to_vec()),
                    ClientEvent::Called(called) => Seen::Called(called.number),
                };
                let _ = tx.send(seen);
            })
            .await;
    });
    (rx, handle)
}

async fn next_seen(rx: &mut mpsc::UnboundedReceiver<Seen>) -> Seen {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for client event")
        .expect("client stopped")
}

async fn wait_for_members(state: &AppState, count: usize) {
    let connections = state.broadcaster.connections().clone();
    tokio::time::timeout(WAIT, async {
        while connections.member_count(Topic::Display) != count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("client never joined");
}

#[tokio::test]
async fn test_client_fetches_joins_and_refreshes() {
    let (addr, state) = start_server().await;
    let (mut rx, handle) = spawn_client(format!("http://{}", addr));

    assert!(matches!(next_seen(&mut rx).await, Seen::Connecting));
    let Seen::Snapshot(initial) = next_seen(&mut rx).await else {
        panic!("expected initial snapshot");
    };
    assert_eq!(initial[0].waiting_count, 0);

    wait_for_members(&state, 1).await;
    let ticket = state.service.take_ticket(1).unwrap();

    let Seen::Snapshot(after_take) = next_seen(&mut rx).await else {
        panic!("expected refreshed snapshot");
    };
    assert_eq!(after_take[0].waiting_count, 1);

    state.service.call_ticket(ticket.id).unwrap();
    let Seen::Snapshot(after_call) = next_seen(&mut rx).await else {
        panic!("expected snapshot after call");
    };
    assert_eq!(after_call[0].current_number, 1);
    assert!(matches!(next_seen(&mut rx).await, Seen::Called(1)));

    handle.abort();
}

#[tokio::test]
async fn test_client_keeps_retrying_without_server() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (mut rx, handle) = spawn_client(format!("http://{}", addr));

    assert!(matches!(next_seen(&mut rx).await, Seen::Connecting));
    assert!(matches!(next_seen(&mut rx).await, Seen::Connecting));

    handle.abort();
}
