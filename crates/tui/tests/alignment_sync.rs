use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use api_types::formatting::Alignment;
use axum::{Json, Router, extract::Path, extract::State, http::StatusCode, routing::put};
use engine::{Column, TableLayout};
use serde_json::{Value, json};
use tbcparcer_tui::{client::Client, local_state::FileStorage, sync::RemoteAlignmentSink};

type Calls = Arc<Mutex<Vec<(String, Value)>>>;

async fn reject_alignment(
    State(calls): State<Calls>,
    Path(column): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    calls.lock().unwrap().push((column, body));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Internal Server Error"})),
    )
}

async fn spawn_failing_backend() -> (Client, Calls) {
    let calls = Calls::default();
    let router = Router::new()
        .route("/api/formatting/columns/{column}", put(reject_alignment))
        .with_state(calls.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (Client::new(&format!("http://{addr}")).unwrap(), calls)
}

async fn wait_for_call(calls: &Calls) {
    for _ in 0..100 {
        if !calls.lock().unwrap().is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("alignment update never reached the backend");
}

#[tokio::test]
async fn rejected_sync_keeps_local_alignment() {
    let (client, calls) = spawn_failing_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let storage = FileStorage::open(&path).unwrap();

    let mut layout = TableLayout::load(&storage, Some("777"))
        .with_sink(RemoteAlignmentSink::new(client, 777));
    layout.set_column_alignment(Column::Amount, Some(Alignment::Right));
    wait_for_call(&calls).await;
    // Let the spawned request observe the 500 before checking state.
    tokio::time::sleep(Duration::from_millis(50)).await;

    {
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Column::Amount.key());
        assert_eq!(calls[0].1["telegram_id"], 777);
        assert_eq!(calls[0].1["alignment"], "right");
    }
    assert_eq!(layout.alignment(Column::Amount), Alignment::Right);
    drop(layout);

    let reopened = FileStorage::open(&path).unwrap();
    let layout = TableLayout::load(&reopened, Some("777"));
    assert_eq!(layout.alignment(Column::Amount), Alignment::Right);
}

#[tokio::test]
async fn unreachable_backend_keeps_local_alignment() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = Client::new(&format!("http://{addr}")).unwrap();
    let storage = FileStorage::open(tempfile::tempdir().unwrap().path().join("state.json")).unwrap();

    let mut layout = TableLayout::load(&storage, None)
        .with_sink(RemoteAlignmentSink::new(client, 777));
    layout.set_column_alignment(Column::Currency, Some(Alignment::Center));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(layout.alignment(Column::Currency), Alignment::Center);
}
