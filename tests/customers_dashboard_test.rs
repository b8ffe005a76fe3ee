mod common;

use axum::http::StatusCode;
use common::{Account, TestApp};
use serde_json::json;

async fn associate_company(app: &TestApp, ops: &Account, name: &str) -> String {
    let reply = app
        .post(
            "/api/v1/associate-company",
            json!({
                "user_id": ops.user_id.to_string(),
                "responsible_person_name": "Rae Lin",
                "associate_company_name": name,
                "associate_company_email": "ops@bayline.example",
                "email": "rae@bayline.example",
                "phone": "+1 555 0142",
                "address": "12 Dock Rd",
                "country": "US",
                "state": "CA",
                "zip_code": "90802",
            }),
            &ops.token,
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.data()["id"].as_str().expect("id").to_string()
}

#[tokio::test]
async fn dashboard_counts_the_callers_work() {
    let app = TestApp::new().await;
    let ops = app
        .onboarded_backoffice("ops@tidewater.example", "dispatch@tidewater.example")
        .await;
    app.signup("dana@haul.example", "driver").await;
    app.add_containers(&ops, &["MSCU0000001", "MSCU0000002"]).await;
    associate_company(&app, &ops, "Bayline Imports").await;

    let other = app
        .onboarded_backoffice("desk@other.example", "dispatch@other.example")
        .await;
    app.add_containers(&other, &["CMAU0000003"]).await;

    let stats = app.get("/api/v1/dashboard-stats", &ops.token).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(
        stats.data(),
        &json!({
            "today_shipment": 2,
            "total_shipment": 2,
            "total_driver": 1,
            "associate_company": 1,
            "shipment_history": 0,
        })
    );
}

#[tokio::test]
async fn customers_list_warehouses_and_associate_companies() {
    let app = TestApp::new().await;
    let ops = app
        .onboarded_backoffice("ops@tidewater.example", "dispatch@tidewater.example")
        .await;
    let dana = app.signup("dana@haul.example", "driver").await;
    let wendy = app.signup("wendy@depot.example", "warehouse").await;
    let customer = associate_company(&app, &ops, "Bayline Imports").await;
    let id = app.add_containers(&ops, &["MSCU7654321"]).await[0];

    let assigned = app
        .put(
            &format!("/api/v1/shipments/{}", id),
            json!({
                "driver": dana.profile_id.to_string(),
                "warehouse": wendy.profile_id.to_string(),
                "customer": customer,
                "assigned_date": "2026/10/18",
            }),
            &ops.token,
            false,
        )
        .await;
    assert_eq!(assigned.status, StatusCode::ACCEPTED, "{}", assigned.body);

    let list = app.get("/api/v1/shipments/customers", &ops.token).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.data()["total"], 2);
    let items = list.data()["items"].as_array().expect("items");
    let warehouse = items
        .iter()
        .find(|e| e["type"] == "warehouse")
        .expect("warehouse entry");
    assert_eq!(warehouse["id"], wendy.profile_id.to_string());
    assert_eq!(warehouse["latest_shipment"]["id"], id.to_string());
    let company = items
        .iter()
        .find(|e| e["type"] == "company")
        .expect("company entry");
    assert_eq!(company["company_name"], "Bayline Imports");
    assert_eq!(company["latest_shipment"]["status"], "Assigned");

    let searched = app
        .get("/api/v1/shipments/customers?search=bayline", &ops.token)
        .await;
    assert_eq!(searched.data()["total"], 1);

    let history = app
        .get(
            &format!("/api/v1/shipments/customers/{}?type=warehouse", wendy.profile_id),
            &ops.token,
        )
        .await;
    assert_eq!(history.status, StatusCode::OK);
    assert_eq!(history.data()["total"], 1);

    let closed = app
        .get(
            &format!("/api/v1/shipments/customers/{}?type=company&status=closed", customer),
            &ops.token,
        )
        .await;
    assert_eq!(closed.data()["total"], 0);

    let invalid = app
        .get(
            &format!("/api/v1/shipments/customers/{}?type=driver", wendy.profile_id),
            &ops.token,
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        invalid.body["message"],
        "Invalid type parameter. Must be \"warehouse\" or \"company\"."
    );
}

#[tokio::test]
async fn associate_company_update_and_delete() {
    let app = TestApp::new().await;
    let ops = app
        .onboarded_backoffice("ops@tidewater.example", "dispatch@tidewater.example")
        .await;
    let id = associate_company(&app, &ops, "Bayline Imports").await;
    let uri = format!("/api/v1/associate-company/{}", id);

    let listed = app.get("/api/v1/associate-company", &ops.token).await;
    assert_eq!(listed.data()[0]["associate_company_name"], "Bayline Imports");

    let incomplete = app
        .put(&uri, json!({ "city": "Carson" }), &ops.token, false)
        .await;
    assert_eq!(incomplete.status, StatusCode::BAD_REQUEST);

    let patched = app
        .call(
            axum::http::Method::PATCH,
            &uri,
            Some(json!({ "city": "Carson" })),
            Some(&ops.token),
            false,
        )
        .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.data()["city"], "Carson");
    assert_eq!(patched.data()["zip_code"], "90802");

    let deleted = app
        .call(axum::http::Method::DELETE, &uri, None, Some(&ops.token), false)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, &ops.token).await.status, StatusCode::NOT_FOUND);
}
