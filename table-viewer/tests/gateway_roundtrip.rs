//! Drives the viewer against a real gateway on an ephemeral port

use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use table_viewer::{
    FormKind, GatewayConfig, GatewayLayer, HttpGateway, Modal, MutationKind, Phase,
    SortDirection, SortState, ViewerConfig, ViewerController, ViewerError,
};

async fn serve() -> String {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            age INTEGER
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    for (name, email, age) in [
        ("Bob", "bob@example.com", Some(41)),
        ("alice", "alice@example.com", Some(29)),
        ("Carol", "carol@example.com", None),
    ] {
        sqlx::query("INSERT INTO contacts (name, email, age) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(age)
            .execute(&pool)
            .await
            .unwrap();
    }

    let app = GatewayLayer::sqlite("/api", pool).into_router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api", address)
}

async fn viewer() -> ViewerController<HttpGateway> {
    let base_url = serve().await;
    let gateway = HttpGateway::new(&GatewayConfig::new(base_url)).unwrap();
    let mut viewer = ViewerController::new(
        gateway,
        ViewerConfig {
            page_size: 2,
            ..ViewerConfig::default()
        },
    );

    viewer.start().await.unwrap();
    viewer.select_database(Some("main".into())).await.unwrap();
    viewer.select_table(Some("contacts".into())).await.unwrap();
    viewer
}

fn column(viewer: &ViewerController<HttpGateway>, name: &str) -> Vec<Value> {
    viewer
        .ordered_rows()
        .iter()
        .map(|row| row[name].clone())
        .collect()
}

#[tokio::test]
async fn test_browse_table() {
    let mut viewer = viewer().await;

    assert!(viewer.connectivity().is_none());
    assert!(viewer.store().databases().contains(&"main".to_string()));
    assert_eq!(viewer.store().tables(), ["contacts"]);
    assert_eq!(viewer.store().columns(), ["id", "name", "email", "age"]);
    assert_eq!(viewer.store().primary_key(), "id");

    viewer.set_sort(SortState::new("age", SortDirection::Asc));
    assert_eq!(column(&viewer, "age"), vec![json!(29), json!(41), Value::Null]);

    viewer.toggle_sort("name");
    assert_eq!(
        column(&viewer, "name"),
        vec![json!("alice"), json!("Bob"), json!("Carol")]
    );

    let first = viewer.visible_page();
    assert_eq!(first.page_count, 2);
    assert_eq!(first.rows.len(), 2);
    viewer.set_page(2);
    assert_eq!(viewer.visible_page().rows.len(), 1);

    viewer.set_search("EXAMPLE.COM");
    assert_eq!(viewer.page(), 1);
    assert_eq!(viewer.visible_page().matching, 3);

    viewer.set_search("nobody");
    assert_eq!(viewer.empty_message(), Some("No rows match the search"));
}

#[tokio::test]
async fn test_crud_cycle() {
    let mut viewer = viewer().await;

    // duplicate email is refused by the database
    viewer.open_add();
    let draft = viewer.pending_mut().unwrap();
    draft.set("name", json!("Bobby"));
    draft.set("email", json!("bob@example.com"));
    let error = viewer.submit_add().await.unwrap_err();
    match &error {
        ViewerError::Mutation { operation, reason } => {
            assert_eq!(*operation, MutationKind::Add);
            assert!(reason.contains("UNIQUE constraint failed"), "{}", reason);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(viewer.modal().kind(), Some(FormKind::Add));
    assert_eq!(viewer.store().rows().len(), 3);

    viewer
        .pending_mut()
        .unwrap()
        .set("email", json!("bobby@example.com"));
    viewer.submit_add().await.unwrap();
    assert_eq!(viewer.modal(), &Modal::Closed);
    assert_eq!(viewer.notice(), Some("Record added"));
    assert_eq!(viewer.store().rows().len(), 4);

    let carol = viewer
        .store()
        .rows()
        .iter()
        .find(|row| row["name"] == json!("Carol"))
        .cloned()
        .unwrap();
    viewer.open_edit(&carol);
    viewer.pending_mut().unwrap().set("age", json!(35));
    viewer.submit_update().await.unwrap();
    assert!(viewer
        .store()
        .rows()
        .iter()
        .any(|row| row["name"] == json!("Carol") && row["age"] == json!(35)));

    let declined = viewer.delete(&carol, &|_: &str| false).await.unwrap();
    assert!(!declined);
    assert_eq!(viewer.store().rows().len(), 4);

    let deleted = viewer.delete(&carol, &|_: &str| true).await.unwrap();
    assert!(deleted);
    assert_eq!(viewer.store().rows().len(), 3);
    assert_eq!(viewer.phase(), &Phase::Idle);
}

#[tokio::test]
async fn test_unreachable_gateway() {
    // nothing listens on port 9 of localhost
    let gateway = HttpGateway::new(&GatewayConfig::new("http://127.0.0.1:9/api")).unwrap();
    let mut viewer = ViewerController::new(gateway, ViewerConfig::default());

    let error = viewer.start().await.unwrap_err();

    assert!(matches!(viewer.connectivity(), Some(ViewerError::Connectivity(_))));
    assert!(matches!(error, ViewerError::Fetch { .. }));
    assert!(viewer.store().databases().is_empty());
}
