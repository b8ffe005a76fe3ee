mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, PASSWORD};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn signup_shapes_follow_the_platform() {
    let app = TestApp::new().await;

    let web = app
        .call(
            Method::POST,
            "/api/v1/signup",
            Some(json!({
                "first_name": "Olive",
                "last_name": "Mensah",
                "email": "Olive@Tidewater.example",
                "password": PASSWORD,
                "user_type": "backoffice",
            })),
            None,
            false,
        )
        .await;
    assert_eq!(web.status, StatusCode::CREATED);
    assert!(web.data()["token"].is_string());
    assert_eq!(web.data()["user"]["email"], "olive@tidewater.example");
    assert!(web.data().get("user_data").is_none());

    let duplicate = app
        .call(
            Method::POST,
            "/api/v1/signup",
            Some(json!({
                "first_name": "Olive",
                "last_name": "Mensah",
                "email": "olive@tidewater.example",
                "password": PASSWORD,
                "user_type": "backoffice",
            })),
            None,
            false,
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        duplicate.body["message"],
        "A user is already registered with this e-mail address."
    );

    let mobile = app
        .call(
            Method::POST,
            "/api/v1/signup",
            Some(json!({
                "first_name": "Dana",
                "last_name": "Reyes",
                "email": "dana@haul.example",
                "password": PASSWORD,
                "user_type": "driver",
            })),
            None,
            true,
        )
        .await;
    assert_eq!(mobile.status, StatusCode::CREATED);
    assert!(mobile.data()["token"].is_string());
    assert_eq!(mobile.data()["user_data"]["user"]["user_type"], "driver");
    assert!(mobile.data().get("user").is_none());
}

#[tokio::test]
async fn login_enforces_platform_and_rotates_mobile_tokens() {
    let app = TestApp::new().await;
    let dana = app.signup("dana@haul.example", "driver").await;
    app.signup("ops@tidewater.example", "backoffice").await;

    let missing = app
        .call(Method::POST, "/api/v1/login", Some(json!({ "email": "dana@haul.example" })), None, true)
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["message"], "Must include \"email\" and \"password\".");

    let wrong = app
        .call(
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "dana@haul.example", "password": "not-it-at-all" })),
            None,
            true,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.body["message"], "Unable to log in with provided credentials.");

    let on_web = app
        .call(
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "dana@haul.example", "password": PASSWORD })),
            None,
            false,
        )
        .await;
    assert_eq!(on_web.status, StatusCode::BAD_REQUEST);
    assert_eq!(on_web.body["message"], "driver is not allowed to login on web");

    let backoffice_on_mobile = app
        .call(
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "ops@tidewater.example", "password": PASSWORD })),
            None,
            true,
        )
        .await;
    assert_eq!(backoffice_on_mobile.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        backoffice_on_mobile.body["message"],
        "backoffice is not allowed to login on Mobile"
    );

    let login = app
        .call(
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "DANA@haul.example", "password": PASSWORD })),
            None,
            true,
        )
        .await;
    assert_eq!(login.status, StatusCode::CREATED);
    let fresh = login.data()["token"].as_str().unwrap().to_string();
    assert_eq!(login.data()["user_data"]["id"], dana.profile_id.to_string());

    let stale = app.get("/api/v1/user-profile", &dana.token).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
    let current = app.get("/api/v1/user-profile", &fresh).await;
    assert_eq!(current.status, StatusCode::OK);

    let web_login = app
        .call(
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "ops@tidewater.example", "password": PASSWORD })),
            None,
            false,
        )
        .await;
    assert_eq!(web_login.status, StatusCode::CREATED);
    assert!(web_login.data()["user"].is_object());
    assert!(web_login.data()["user_data"].is_object());
}

#[tokio::test]
async fn password_change_and_reset() {
    let app = TestApp::new().await;
    let ops = app.signup("ops@tidewater.example", "backoffice").await;

    let mismatch = app
        .post(
            "/api/v1/change-password",
            json!({
                "old_password": PASSWORD,
                "new_password": "Brine-Gantry-5580",
                "confirm_new_password": "Brine-Gantry-5581",
            }),
            &ops.token,
        )
        .await;
    assert_eq!(mismatch.status, StatusCode::BAD_REQUEST);
    assert_eq!(mismatch.body["message"], "Password Didn't match.");

    let wrong_old = app
        .post(
            "/api/v1/change-password",
            json!({
                "old_password": "guess-again-123",
                "new_password": "Brine-Gantry-5580",
                "confirm_new_password": "Brine-Gantry-5580",
            }),
            &ops.token,
        )
        .await;
    assert_eq!(wrong_old.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        wrong_old.body["message"],
        "Incorrect password!. Old password did not match"
    );

    let changed = app
        .post(
            "/api/v1/change-password",
            json!({
                "old_password": PASSWORD,
                "new_password": "Brine-Gantry-5580",
                "confirm_new_password": "Brine-Gantry-5580",
            }),
            &ops.token,
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);
    assert_eq!(changed.message(), "Password Changes Successfully");

    let unknown = app
        .call(
            Method::POST,
            "/api/v1/forgot-password",
            Some(json!({ "email": "nobody@tidewater.example" })),
            None,
            false,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let forgot = app
        .call(
            Method::POST,
            "/api/v1/forgot-password",
            Some(json!({ "email": "ops@tidewater.example" })),
            None,
            false,
        )
        .await;
    assert_eq!(forgot.status, StatusCode::ACCEPTED);
    assert_eq!(forgot.message(), "Password Recovery email sent");

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    let link = sent[0]
        .body
        .lines()
        .find(|line| line.contains("token="))
        .expect("reset link");
    let query = link.split_once('?').map(|(_, q)| q).expect("query");
    let param = |name: &str| {
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{}=", name)))
            .map(str::to_string)
            .expect("param")
    };
    let (token, uid) = (param("token"), param("uid"));

    let bad_token = app
        .call(
            Method::POST,
            "/api/v1/reset-password",
            Some(json!({
                "new_password1": "Ballast-Mooring-9042",
                "new_password2": "Ballast-Mooring-9042",
                "uid": uid,
                "token": "1a2b3c-deadbeef",
            })),
            None,
            false,
        )
        .await;
    assert_eq!(bad_token.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_token.body["message"], "Invalid token or token has expired");

    let same = app
        .call(
            Method::POST,
            "/api/v1/reset-password",
            Some(json!({
                "new_password1": "Brine-Gantry-5580",
                "new_password2": "Brine-Gantry-5580",
                "uid": uid,
                "token": token,
            })),
            None,
            false,
        )
        .await;
    assert_eq!(same.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        same.body["message"],
        "New password cannot be the same as the old password."
    );

    let reset = app
        .call(
            Method::POST,
            "/api/v1/reset-password",
            Some(json!({
                "new_password1": "Ballast-Mooring-9042",
                "new_password2": "Ballast-Mooring-9042",
                "uid": uid,
                "token": token,
            })),
            None,
            false,
        )
        .await;
    assert_eq!(reset.status, StatusCode::ACCEPTED);
    assert_eq!(reset.message(), "Password has been reset with the new password.");

    let reused = app
        .call(
            Method::POST,
            "/api/v1/reset-password",
            Some(json!({
                "new_password1": "Keel-Hawser-3318",
                "new_password2": "Keel-Hawser-3318",
                "uid": uid,
                "token": token,
            })),
            None,
            false,
        )
        .await;
    assert_eq!(reused.status, StatusCode::BAD_REQUEST);

    let login = app
        .call(
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "ops@tidewater.example", "password": "Ballast-Mooring-9042" })),
            None,
            false,
        )
        .await;
    assert_eq!(login.status, StatusCode::CREATED);
}

#[tokio::test]
async fn mail_failures_surface_as_server_errors() {
    let app = TestApp::with_failing_mailer().await;
    app.signup("ops@tidewater.example", "backoffice").await;

    let forgot = app
        .call(
            Method::POST,
            "/api/v1/forgot-password",
            Some(json!({ "email": "ops@tidewater.example" })),
            None,
            false,
        )
        .await;
    assert_eq!(forgot.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(forgot.body["message"], "Unable to send email - please try again");

    let contact = app
        .call(
            Method::POST,
            "/api/v1/contact-us",
            Some(json!({ "full_name": "Rae", "email": "rae@shipper.example", "message": "Rates?" })),
            None,
            false,
        )
        .await;
    assert_eq!(contact.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        contact.body["message"],
        "Failed to submit form. Please try again later."
    );
}

#[tokio::test]
async fn contact_form_is_mailed_to_the_platform() {
    let app = TestApp::new().await;

    let reply = app
        .call(
            Method::POST,
            "/api/v1/contact-us",
            Some(json!({ "full_name": "Rae Lin", "email": "rae@shipper.example", "message": "Rates to Reno?" })),
            None,
            false,
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.message(), "Form submitted successfully");

    let sent = app.mailer.sent();
    assert_eq!(sent[0].to, "noreply@harbor.example");
    assert_eq!(sent[0].subject, "Contact Us Form Submission");
    assert_eq!(
        sent[0].body,
        "Full Name: Rae Lin\nEmail: rae@shipper.example\nMessage: Rates to Reno?"
    );
}

#[tokio::test]
async fn logout_revokes_the_token_and_delete_removes_the_account() {
    let app = TestApp::new().await;
    let dana = app.signup("dana@haul.example", "driver").await;
    app.post("/api/v1/devices", json!({ "registration_id": "fcm-1" }), &dana.token)
        .await;

    let logout = app.get("/api/v1/user/logout", &dana.token).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.message(), "User Logout successfully");
    assert_eq!(
        app.get("/api/v1/devices", &dana.token).await.status,
        StatusCode::UNAUTHORIZED
    );

    let login = app
        .call(
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "dana@haul.example", "password": PASSWORD })),
            None,
            true,
        )
        .await;
    let token = login.data()["token"].as_str().unwrap().to_string();
    let devices = app.get("/api/v1/devices", &token).await;
    assert_eq!(devices.data().as_array().map(Vec::len), Some(0));

    let deleted = app
        .call(Method::DELETE, "/api/v1/delete-user", None, Some(&token), false)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app
        .call(
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "dana@haul.example", "password": PASSWORD })),
            None,
            true,
        )
        .await;
    assert_eq!(gone.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn google_mobile_login_signs_up_then_logs_in() {
    let google = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", "Bearer ya29.mobile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "1187",
            "email": "wendy@depot.example",
            "given_name": "Wendy",
            "family_name": "Achebe",
        })))
        .mount(&google)
        .await;

    let app = TestApp::with_google_userinfo(&format!("{}/userinfo", google.uri())).await;
    let body = json!({ "access_token": "ya29.mobile", "user_type": "warehouse" });

    let first = app
        .call(Method::POST, "/api/v1/auth/google/login", Some(body.clone()), None, true)
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.data()["success"], "User signed up and logged in successfully");
    assert_eq!(first.data()["user_data"]["user"]["first_name"], "Wendy");

    let second = app
        .call(Method::POST, "/api/v1/auth/google/login", Some(body), None, true)
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.data()["success"], "User logged in successfully");

    let web = app
        .call(
            Method::POST,
            "/api/v1/auth/google/login",
            Some(json!({ "code": "4/0Ad-web" })),
            None,
            false,
        )
        .await;
    assert_eq!(web.status, StatusCode::BAD_REQUEST);
    assert_eq!(web.body["message"], "Failed to exchange code for tokens");
}

#[tokio::test]
async fn profile_picture_upload_is_served_as_a_signed_url() {
    let app = TestApp::new().await;
    let wendy = app.signup("wendy@depot.example", "warehouse").await;

    let before = app.get("/api/v1/upload-profile-picture", &wendy.token).await;
    assert_eq!(before.status, StatusCode::OK);
    assert!(before.data()["profile_picture"].is_null());

    let missing = app
        .call_multipart(Method::POST, "/api/v1/upload-profile-picture", &[], &[], &wendy.token, true)
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["message"], "Unable to upload Profile Picture");

    let uploaded = app
        .call_multipart(
            Method::POST,
            "/api/v1/upload-profile-picture",
            &[],
            &[("profile_picture", "avatar.png", &b"\x89PNG\r\n"[..])],
            &wendy.token,
            true,
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::OK);
    assert_eq!(uploaded.message(), "Profile Picture Uploaded");
    let url = uploaded.data()["profile_picture"].as_str().expect("signed url");
    assert!(url.contains("profile_pictures/"));
    assert!(app
        .storage
        .keys()
        .iter()
        .any(|k| k.contains("profile_pictures/") && k.ends_with("avatar.png")));

    let after = app.get("/api/v1/upload-profile-picture", &wendy.token).await;
    assert!(after.data()["profile_picture"].is_string());
}
