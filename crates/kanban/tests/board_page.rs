mod common;

use common::{get, post_form, send_json, spawn_app};

#[tokio::test]
async fn board_page_lists_columns_and_cards() {
    let dir = tempfile::tempdir().expect("tempdir");
    let addr = spawn_app(dir.path()).await;
    send_json(addr, "POST", "/api/card", r#"{"title": "Write <docs>"}"#).await;

    let resp = get(addr, "/").await;
    assert_eq!(resp.status, 200);
    assert!(resp
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("text/html")));
    for title in ["To Do", "In Progress", "Blocked", "Done"] {
        assert!(resp.body.contains(title), "missing column {title}");
    }
    assert!(resp.body.contains("Write &lt;docs&gt;"));
    assert!(!resp.body.contains("Write <docs>"));
}

#[tokio::test]
async fn form_create_redirects_to_board() {
    let dir = tempfile::tempdir().expect("tempdir");
    let addr = spawn_app(dir.path()).await;

    let resp = post_form(addr, "/cards", "title=Fix+bug&description=&column=inprogress").await;
    assert_eq!(resp.status, 303);
    assert_eq!(resp.header("location").as_deref(), Some("/"));

    let board = get(addr, "/api/board").await.json();
    assert_eq!(board["columns"][1]["cards"][0]["title"], "Fix bug");
}

#[tokio::test]
async fn form_create_without_title_renders_error_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    let addr = spawn_app(dir.path()).await;

    let resp = post_form(addr, "/cards", "title=++&column=todo").await;
    assert_eq!(resp.status, 400);
    assert!(resp.body.contains("title required"));
}

#[tokio::test]
async fn form_move_edit_and_delete() {
    let dir = tempfile::tempdir().expect("tempdir");
    let addr = spawn_app(dir.path()).await;
    let card = send_json(addr, "POST", "/api/card", r#"{"title": "Fix bug"}"#)
        .await
        .json();
    let id = card["id"].as_str().expect("id");

    let resp = post_form(addr, &format!("/cards/{id}/move"), "column=done").await;
    assert_eq!(resp.status, 303);
    let board = get(addr, "/api/board").await.json();
    assert_eq!(board["columns"][3]["cards"][0]["id"], id);

    let resp = post_form(
        addr,
        &format!("/cards/{id}/edit"),
        "title=Fixed+bug&description=patched",
    )
    .await;
    assert_eq!(resp.status, 303);
    let board = get(addr, "/api/board").await.json();
    assert_eq!(board["columns"][3]["cards"][0]["title"], "Fixed bug");
    assert_eq!(board["columns"][3]["cards"][0]["description"], "patched");

    let resp = post_form(addr, &format!("/cards/{id}/delete"), "").await;
    assert_eq!(resp.status, 303);
    let board = get(addr, "/api/board").await.json();
    assert_eq!(board["columns"][3]["cards"], serde_json::json!([]));
}

#[tokio::test]
async fn form_move_of_missing_card_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let addr = spawn_app(dir.path()).await;

    let resp = post_form(addr, "/cards/nope/move", "column=done").await;
    assert_eq!(resp.status, 404);
    assert!(resp.body.contains("card not found"));
}
