mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn container_moves_from_port_to_warehouse_and_back() {
    let app = TestApp::new().await;
    let ops = app
        .onboarded_backoffice("ops@tidewater.example", "dispatch@tidewater.example")
        .await;
    let dana = app.signup("dana@haul.example", "driver").await;
    let wendy = app.signup("wendy@depot.example", "warehouse").await;

    let registered = app
        .post("/api/v1/devices", json!({ "registration_id": "fcm-dana-1" }), &dana.token)
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);

    let ids = app.add_containers(&ops, &["MSCU7654321"]).await;
    let id = ids[0];
    let uri = format!("/api/v1/shipments/{}", id);

    let reply = app
        .put(&uri, json!({ "driver": dana.profile_id.to_string() }), &ops.token, false)
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Assign Date Required");

    let reply = app
        .put(
            &uri,
            json!({ "driver": dana.profile_id.to_string(), "assigned_date": "2026/10/18" }),
            &ops.token,
            false,
        )
        .await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);
    assert_eq!(reply.message(), "Shipment Updated");
    assert!(reply.data().is_null());

    let reply = app
        .put(&uri, json!({ "status": "Picked Up" }), &dana.token, true)
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Warehouse is not assigned to this shipment");

    let reply = app
        .put(&uri, json!({ "warehouse": wendy.profile_id.to_string() }), &ops.token, false)
        .await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);

    let reply = app
        .put(&uri, json!({ "status": "Picked Up" }), &dana.token, true)
        .await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);
    assert_eq!(reply.data()["status"], "Picked Up");
    assert!(reply.data()["pickedup_date"].is_string());

    let reply = app
        .put(&uri, json!({ "status": "Returned Empty" }), &dana.token, true)
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Shipment is not accepted");

    let reply = app
        .put(&uri, json!({ "status": "Delivered" }), &dana.token, true)
        .await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);

    let reply = app
        .put(&uri, json!({ "status": "Accepted" }), &wendy.token, true)
        .await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);
    assert!(reply.data()["proof_of_delivery_file"].is_string());
    let pdf_key = format!("proof_of_delivery/shipment_details_{}.pdf", id);
    assert!(app.storage.keys().iter().any(|k| k.ends_with(&pdf_key)));

    let reply = app
        .put(&uri, json!({ "status": "Returned Empty" }), &ops.token, false)
        .await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);

    let web = app.get(&uri, &ops.token).await;
    assert_eq!(web.status, StatusCode::OK);
    assert_eq!(web.data()["status"], "Returned Empty");
    assert_eq!(web.data()["container"]["container_number"], "MSCU7654321");
    assert_eq!(web.data()["driver"]["id"], dana.profile_id.to_string());

    // Every successful update notifies the other parties, field-only edits included
    for (account, expected) in [(&ops, 3), (&dana, 4), (&wendy, 4)] {
        let inbox = app.get("/api/v1/notifications", &account.token).await;
        assert_eq!(inbox.status, StatusCode::OK);
        assert_eq!(
            inbox.data()["notifications"].as_array().map(Vec::len),
            Some(expected),
            "inbox: {}",
            inbox.body
        );
    }

    let pushed_to_dana: Vec<_> = app
        .push
        .sent()
        .into_iter()
        .filter(|m| m.registration_ids == vec!["fcm-dana-1".to_string()])
        .collect();
    assert_eq!(pushed_to_dana.len(), 4);
    assert_eq!(pushed_to_dana[0].body, "Container MSCU7654321 has been Assigned.");
    assert_eq!(pushed_to_dana[1].body, "Container MSCU7654321 has been Assigned.");
    assert_eq!(pushed_to_dana[3].body, "Container MSCU7654321 has been Returned Empty.");
}

#[tokio::test]
async fn add_containers_accepts_one_or_two() {
    let app = TestApp::new().await;
    let ops = app
        .onboarded_backoffice("ops@tidewater.example", "dispatch@tidewater.example")
        .await;

    let reply = app
        .post(
            "/api/v1/container/add",
            json!({ "containers": [
                { "container_number": "AAAU0000001" },
                { "container_number": "AAAU0000002" },
                { "container_number": "AAAU0000003" },
            ] }),
            &ops.token,
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.body["message"],
        "Invalid data. Provide a list of up to 2 containers."
    );

    let reply = app
        .post("/api/v1/container/add", json!({ "containers": [] }), &ops.token)
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let ids = app.add_containers(&ops, &["AAAU0000001", "AAAU0000002"]).await;
    assert_eq!(ids.len(), 2);

    let list = app.get("/api/v1/shipments", &ops.token).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.data()["total"], 2);
    assert_eq!(list.data()["items"][0]["status"], "Queued");
}

#[tokio::test]
async fn invalid_field_leaves_shipment_untouched() {
    let app = TestApp::new().await;
    let ops = app
        .onboarded_backoffice("ops@tidewater.example", "dispatch@tidewater.example")
        .await;
    let id = app.add_containers(&ops, &["TGHU1111111"]).await[0];
    let uri = format!("/api/v1/shipments/{}", id);

    let reply = app
        .put(
            &uri,
            json!({
                "assigned_date": "2026/10/18",
                "pickup_location": "Pier 400",
                "piece_count": "a dozen",
            }),
            &ops.token,
            false,
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Shipment not Updated");

    let view = app.get(&uri, &ops.token).await;
    assert!(view.data()["pickup_location"].is_null());
    assert!(view.data()["assigned_date"].is_null());
}

#[tokio::test]
async fn list_filters_by_status_and_search() {
    let app = TestApp::new().await;
    let ops = app
        .onboarded_backoffice("ops@tidewater.example", "dispatch@tidewater.example")
        .await;
    let dana = app.signup("dana@haul.example", "driver").await;
    let ids = app.add_containers(&ops, &["MSCU0000001", "CMAU0000002"]).await;

    let reply = app
        .put(
            &format!("/api/v1/shipments/{}", ids[1]),
            json!({ "driver": dana.profile_id.to_string(), "assigned_date": "2026/10/18" }),
            &ops.token,
            false,
        )
        .await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);

    let assigned = app
        .get("/api/v1/shipments?status=CONTAINER_ASSIGNED", &ops.token)
        .await;
    assert_eq!(assigned.data()["total"], 1);
    assert_eq!(assigned.data()["items"][0]["id"], ids[1].to_string());

    let both = app
        .get(
            "/api/v1/shipments?status=CONTAINER_QUEUED,%20CONTAINER_ASSIGNED",
            &ops.token,
        )
        .await;
    assert_eq!(both.data()["items"][0]["status"], "Queued");
    assert_eq!(both.data()["items"][1]["status"], "Assigned");

    let invalid = app.get("/api/v1/shipments?status=LOST", &ops.token).await;
    assert_eq!(invalid.status, StatusCode::NOT_FOUND);
    assert_eq!(invalid.body["message"], "Invalid status value.");

    let search = app.get("/api/v1/shipments?search=cmau", &ops.token).await;
    assert_eq!(search.data()["total"], 1);

    let driver_view = app
        .call(Method::GET, "/api/v1/shipments", None, Some(&dana.token), true)
        .await;
    assert_eq!(driver_view.data()["total"], 1);
    assert_eq!(driver_view.data()["items"][0]["assigned_date"], "2026/10/18");
}

#[tokio::test]
async fn deleted_shipment_is_gone() {
    let app = TestApp::new().await;
    let ops = app
        .onboarded_backoffice("ops@tidewater.example", "dispatch@tidewater.example")
        .await;
    let id = app.add_containers(&ops, &["OOLU2222222"]).await[0];
    let uri = format!("/api/v1/shipments/{}", id);

    let deleted = app.call(Method::DELETE, &uri, None, Some(&ops.token), false).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let missing = app.get(&uri, &ops.token).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], "Shipment Does not exist");

    let list = app.get("/api/v1/shipments", &ops.token).await;
    assert_eq!(list.data()["total"], 0);
}

#[tokio::test]
async fn driver_field_edit_notifies_the_creator() {
    let app = TestApp::new().await;
    let ops = app
        .onboarded_backoffice("ops@tidewater.example", "dispatch@tidewater.example")
        .await;
    let dana = app.signup("dana@haul.example", "driver").await;
    let wendy = app.signup("wendy@depot.example", "warehouse").await;
    let id = app.add_containers(&ops, &["TCLU5555555"]).await[0];
    let uri = format!("/api/v1/shipments/{}", id);

    app.put(
        &uri,
        json!({ "driver": dana.profile_id.to_string(), "assigned_date": "2026/10/18" }),
        &ops.token,
        false,
    )
    .await;
    let before = app.get("/api/v1/notifications", &ops.token).await;
    assert_eq!(before.data()["notifications"].as_array().map(Vec::len), Some(0));

    let pickup = app
        .put(
            &uri,
            json!({ "status": "Picked Up", "warehouse": wendy.profile_id.to_string() }),
            &dana.token,
            true,
        )
        .await;
    assert_eq!(pickup.status, StatusCode::BAD_REQUEST);
    assert_eq!(pickup.body["message"], "Warehouse is not assigned to this shipment");

    let edit = app
        .put(&uri, json!({ "pickup_location": "Pier 9" }), &dana.token, true)
        .await;
    assert_eq!(edit.status, StatusCode::ACCEPTED);
    assert_eq!(edit.data()["pickup_location"], "Pier 9");

    let after = app.get("/api/v1/notifications", &ops.token).await;
    let inbox = after.data()["notifications"].as_array().expect("notifications");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["message"], "Container TCLU5555555 has been Assigned.");
}
