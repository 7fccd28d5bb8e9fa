mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn about_pages_render() {
    let app = TestApp::new().await;

    let author = app.get("/about/author/", None).await;
    assert_eq!(author.status, StatusCode::OK);
    assert!(author.body.contains("<h1>About the author</h1>"));

    let tech = app.get("/about/tech/", None).await;
    assert_eq!(tech.status, StatusCode::OK);
    assert!(tech.body.contains("<h1>Technologies</h1>"));
}

#[tokio::test]
async fn unknown_page_is_a_custom_404() {
    let app = TestApp::new().await;

    let response = app.get("/unexisting_page/", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Page not found"));
}

#[tokio::test]
async fn stylesheet_is_served() {
    let app = TestApp::new().await;

    let response = app.get("/static/style.css", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body.is_empty());
}

#[tokio::test]
async fn signup_login_and_logout() {
    let app = TestApp::new().await;
    let cookie = app.signup("newbie").await;

    let home = app.get("/", Some(&cookie)).await.body;
    assert!(home.contains("@newbie"));

    let response = app.get("/auth/logout/", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(app.get("/create/", Some(&cookie)).await.status, StatusCode::SEE_OTHER);

    let wrong = app
        .post_form("/auth/login/", None, "username=newbie&password=wrong-password&next=/create/")
        .await;
    assert_eq!(wrong.status, StatusCode::OK);
    assert!(wrong.body.contains("errorlist"));

    let right = app
        .post_form("/auth/login/", None, "username=newbie&password=secret-pass-1&next=%2Fcreate%2F")
        .await;
    assert_eq!(right.status, StatusCode::SEE_OTHER);
    assert_eq!(right.location.as_deref(), Some("/create/"));
    let cookie = right.cookie.unwrap();
    assert_eq!(app.get("/create/", Some(&cookie)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn signup_rejects_bad_input() {
    let app = TestApp::new().await;
    app.signup("taken").await;

    let duplicate = app
        .post_form("/auth/signup/", None, "username=taken&password=secret-pass-1&password_confirm=secret-pass-1")
        .await;
    assert_eq!(duplicate.status, StatusCode::OK);
    assert!(duplicate.body.contains("already exists"));

    let mismatch = app
        .post_form("/auth/signup/", None, "username=fresh&password=secret-pass-1&password_confirm=other-pass-2")
        .await;
    assert_eq!(mismatch.status, StatusCode::OK);
    assert!(mismatch.body.contains("didn&#x27;t match"));

    let short = app
        .post_form("/auth/signup/", None, "username=fresh&password=short&password_confirm=short")
        .await;
    assert!(short.body.contains("at least 8 characters"));
}
