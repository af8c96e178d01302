mod common;

use common::{TestApp, dec};
use http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn test_create_customer_opens_first_card() {
    let app = TestApp::new().await;

    let (status, created) = app
        .send(
            "POST",
            "/api/customers",
            Some(&app.clerk),
            Some(json!({ "name": "  Tata Mbuyi ", "customer_number": "C-42" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "Tata Mbuyi");
    assert_eq!(created["extension_id"].as_i64(), Some(app.extension.id));

    let customer_id = created["id"].as_i64().unwrap();
    let card = app.open_card(customer_id).await;
    assert_eq!(card.card_number, 1);

    let (status, list) = app.send("GET", "/api/customers", Some(&app.clerk), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["current_card_id"].as_i64(), Some(card.id));
}

#[tokio::test]
async fn test_create_customer_validation() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            "POST",
            "/api/customers",
            Some(&app.clerk),
            Some(json!({ "name": " ", "customer_number": "C-42" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn test_customer_page_lists_card_chain() {
    let app = TestApp::new().await;
    let customer = app.customer("Mama Nzola", "C-1").await;
    let first = app.open_card(customer.id).await;

    let (status, _) = app
        .send(
            "POST",
            "/api/order",
            Some(&app.clerk),
            Some(json!({ "type": "ORDER", "customerid": customer.id, "amount": 200, "amountpaid": 200 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            "PATCH",
            &format!("/api/card/{}", first.id),
            Some(&app.clerk),
            Some(json!({ "updateType": "Status", "cardnumber": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            "POST",
            "/api/order",
            Some(&app.clerk),
            Some(json!({ "type": "ORDER", "customerid": customer.id, "amount": 30 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, page) = app
        .send("GET", &format!("/api/customers/{}", customer.id), Some(&app.clerk), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["customer_number"], "C-1");

    let cards = page["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["card_number"], 2);
    assert_eq!(cards[0]["card_status"], "OPEN");
    assert_eq!(dec(&cards[0]["summary"]["balance_due"]), Decimal::from(30));
    assert_eq!(cards[1]["card_status"], "CLOSED");
    assert_eq!(cards[1]["summary"]["standing"], "SETTLED");

    assert_eq!(dec(&page["totals"]["amount"]), Decimal::from(230));
    assert_eq!(dec(&page["commission"]), Decimal::new(621, 1));
}

#[tokio::test]
async fn test_customer_of_other_extension_is_hidden() {
    let app = TestApp::new().await;
    let customer = app.customer("Mama Nzola", "C-1").await;
    let outsider = app.other_extension_user().await;

    let (status, _) = app
        .send("GET", &format!("/api/customers/{}", customer.id), Some(&outsider), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.send("GET", "/api/customers", Some(&outsider), None).await;
    assert_eq!(list, json!([]));
}
