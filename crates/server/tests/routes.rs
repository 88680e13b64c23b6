use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, FixedClock};
use server::{
    ServerState, router,
    types::{
        balance::BalanceSheet,
        expense::{ExpenseListResponse, ExpenseView, SplitMethod},
        user::{UserListResponse, UserView},
    },
};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let now = Utc.with_ymd_and_hms(2024, 10, 20, 18, 30, 0).unwrap();
    let engine = Engine::builder()
        .database(db)
        .clock(Arc::new(FixedClock(now)))
        .build()
        .await
        .unwrap();
    router(ServerState {
        engine: Arc::new(engine),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_user(app: &Router, name: &str) -> UserView {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        Some(json!({"name": name, "email": format!("{name}@example.com"), "mobile": null})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_value(body).unwrap()
}

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

#[tokio::test]
async fn users_can_be_created_and_fetched() {
    let app = app().await;
    let ann = create_user(&app, "ann").await;
    assert_eq!(ann.email, "ann@example.com");

    let (status, body) = send(&app, "GET", &format!("/users/{}", ann.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_value::<UserView>(body).unwrap(), ann);

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({"name": "Ann again", "email": "ANN@example.com", "mobile": null})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("ann@example.com"));

    let bob = create_user(&app, "bob").await;
    let (status, body) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let list: UserListResponse = serde_json::from_value(body).unwrap();
    assert_eq!(list.users, vec![ann.clone(), bob]);

    let (status, _) = send(
        &app,
        "GET",
        "/users/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn equal_expense_is_created_and_listed() {
    let app = app().await;
    let ann = create_user(&app, "ann").await;
    let bob = create_user(&app, "bob").await;
    let cid = create_user(&app, "cid").await;

    let (status, body) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({
            "description": "Dinner",
            "total_amount": "100",
            "split_method": "equal",
            "participants": [
                {"user": "ann@example.com"},
                {"user": "bob@example.com"},
                {"user": "cid@example.com"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: ExpenseView = serde_json::from_value(body).unwrap();
    assert_eq!(created.split_method, SplitMethod::Equal);
    assert_eq!(created.total_amount, cents(100_00));
    let shares: Vec<_> = created
        .participants
        .iter()
        .map(|p| (p.user_id, p.share))
        .collect();
    assert_eq!(
        shares,
        vec![
            (ann.id, cents(33_34)),
            (bob.id, cents(33_33)),
            (cid.id, cents(33_33)),
        ]
    );

    let (status, body) = send(&app, "GET", &format!("/expenses/{}", created.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_value::<ExpenseView>(body).unwrap(), created);

    let (status, body) = send(&app, "GET", "/expenses", None).await;
    assert_eq!(status, StatusCode::OK);
    let list: ExpenseListResponse = serde_json::from_value(body).unwrap();
    assert_eq!(list.expenses, vec![created.clone()]);

    let (status, body) = send(&app, "GET", &format!("/expenses/user/{}", bob.id), None).await;
    assert_eq!(status, StatusCode::OK);
    let list: ExpenseListResponse = serde_json::from_value(body).unwrap();
    assert_eq!(list.expenses.len(), 1);
}

#[tokio::test]
async fn invalid_expenses_are_unprocessable() {
    let app = app().await;
    create_user(&app, "ann").await;
    create_user(&app, "bob").await;

    let cases = [
        (
            json!({
                "description": "Gym",
                "total_amount": 20,
                "split_method": "weekly",
                "participants": [{"user": "ann@example.com"}]
            }),
            "weekly",
        ),
        (
            json!({
                "description": "Cinema",
                "total_amount": 20,
                "split_method": "equal",
                "participants": [{"user": "ann@example.com"}, {"user": "ghost@example.com"}]
            }),
            "ghost@example.com",
        ),
        (
            json!({
                "description": "Hotel",
                "total_amount": 100,
                "split_method": "exact",
                "participants": [
                    {"user": "ann@example.com", "share": 40},
                    {"user": "bob@example.com", "share": 40}
                ]
            }),
            "100.00",
        ),
        (
            json!({
                "description": "Snacks",
                "total_amount": 100,
                "split_method": "percentage",
                "participants": [
                    {"user": "ann@example.com", "share": 50},
                    {"user": "bob@example.com", "share": 45}
                ]
            }),
            "95",
        ),
    ];

    for (payload, fragment) in cases {
        let (status, body) = send(&app, "POST", "/expenses", Some(payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains(fragment), "{message} lacks {fragment}");
    }

    let (_, body) = send(&app, "GET", "/expenses", None).await;
    let list: ExpenseListResponse = serde_json::from_value(body).unwrap();
    assert!(list.expenses.is_empty());
}

#[tokio::test]
async fn balances_sum_every_share() {
    let app = app().await;
    create_user(&app, "ann").await;
    create_user(&app, "bob").await;

    let (status, _) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({
            "description": "Taxi",
            "total_amount": "30.00",
            "split_method": "exact",
            "participants": [
                {"user": "ann@example.com", "share": "10.00"},
                {"user": "bob@example.com", "share": "20.00"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({
            "description": "Groceries",
            "total_amount": 100,
            "split_method": "percentage",
            "participants": [
                {"user": "ann@example.com", "share": 50},
                {"user": "bob@example.com", "share": 51}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/balances", None).await;
    assert_eq!(status, StatusCode::OK);
    let sheet: BalanceSheet = serde_json::from_value(body).unwrap();
    let owed: Vec<_> = sheet
        .balances
        .iter()
        .map(|b| (b.name.as_str(), b.owed, b.expenses))
        .collect();
    assert_eq!(
        owed,
        vec![("ann", cents(60_00), 2), ("bob", cents(71_00), 2)]
    );
}
