use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use sf_domain::config::AppConfig;
use sf_domain::features::{EnvironmentSet, FeatureDefinition};
use sf_flags::{FeatureRegistry, FlagStore};
use sf_kernel::server::AppState;
use sf_kernel::server::router::api_router;
use tower::ServiceExt;

fn app() -> (Router, FlagStore) {
    let registry = FeatureRegistry::builder()
        .feature(
            FeatureDefinition::new("newSearchExperience", "New Search").enabled(true).rollout(50),
        )
        .feature(
            FeatureDefinition::new("schoolSubscriptions", "Subscriptions")
                .enabled(true)
                .rollout(100),
        )
        .feature(
            FeatureDefinition::new("teacherProfiles", "Teacher Profiles")
                .enabled(true)
                .rollout(100)
                .roles(["admin"]),
        )
        .build()
        .expect("valid registry");
    let flags = FlagStore::new(registry, EnvironmentSet::DEVELOPMENT);

    let state = AppState::builder()
        .config(AppConfig::default())
        .flags(flags.clone())
        .build()
        .expect("state");
    let (router, _openapi) = api_router().split_for_parts();
    (router.with_state(state), flags)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body =
        if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).expect("json") };
    (status, body)
}

fn get(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::get(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).expect("request")
}

fn post(body: &Value, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder =
        Request::post("/api/feature-flags").header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

#[tokio::test]
async fn health_reports_up() {
    let (router, _) = app();
    let (status, body) = send(router, get("/health", &[])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
}

#[tokio::test]
async fn enabled_features_requires_user() {
    let (router, _) = app();
    let (status, body) = send(router, get("/api/feature-flags", &[])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn enabled_features_applies_bucketing_and_roles() {
    let (router, _) = app();

    // user-7 is in bucket 20, inside the 50% rollout; role defaults to "user".
    let request = get("/api/feature-flags", &[("x-user-id", "user-7")]);
    let (status, body) = send(router.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabledFeatures"], json!(["newSearchExperience", "schoolSubscriptions"]));
    assert_eq!(body["userRole"], "user");
    assert_eq!(body["userId"], "user-7");

    // user-42 is in bucket 57, outside it; admins also get teacherProfiles.
    let (_, body) = send(
        router,
        get("/api/feature-flags", &[("x-user-id", "user-42"), ("x-user-role", "admin")]),
    )
    .await;
    assert_eq!(body["enabledFeatures"], json!(["schoolSubscriptions", "teacherProfiles"]));
}

#[tokio::test]
async fn get_feature_returns_definition_or_404() {
    let (router, _) = app();

    let (status, body) = send(router.clone(), get("/api/feature-flags/teacherProfiles", &[])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["displayName"], "Teacher Profiles");
    assert_eq!(body["allowedRoles"], json!(["admin"]));

    let (status, body) = send(router, get("/api/feature-flags/does-not-exist", &[])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Feature flag 'does-not-exist' not found");
}

#[tokio::test]
async fn registry_listing_is_admin_only() {
    let (router, _) = app();

    let request = get("/api/admin/feature-flags", &[("x-user-role", "user")]);
    let (status, _) = send(router.clone(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = get("/api/admin/feature-flags", &[("x-user-role", "admin")]);
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["features"][0]["key"], "newSearchExperience");
}

const ADMIN: [(&str, &str); 2] = [("x-user-id", "admin-1"), ("x-user-role", "admin")];

#[tokio::test]
async fn update_requires_admin() {
    let (router, flags) = app();
    let body = json!({ "featureName": "newSearchExperience", "updates": { "enabled": false } });

    let user = [("x-user-id", "u"), ("x-user-role", "user")];
    let (status, _) = send(router.clone(), post(&body, &user)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // An admin role without an authenticated user id is not enough.
    let (status, response) = send(router, post(&body, &[("x-user-role", "admin")])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["error"], "Unauthorized");

    assert!(flags.snapshot().get("newSearchExperience").is_some_and(|f| f.enabled));
}

#[tokio::test]
async fn update_publishes_new_definition() {
    let (router, flags) = app();
    let body =
        json!({ "featureName": "newSearchExperience", "updates": { "rollout_percentage": 100 } });

    let (status, response) = send(router, post(&body, &ADMIN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], true);
    assert_eq!(response["message"], "Feature 'newSearchExperience' updated successfully");

    assert!(flags.snapshot().is_enabled("newSearchExperience", Some("user-42")));
}

#[tokio::test]
async fn update_validation_errors() {
    let (router, flags) = app();

    let (status, body) = send(router.clone(), post(&json!({ "featureName": "x" }), &ADMIN)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Feature name and updates are required");

    let unknown = json!({ "featureName": "missing", "updates": { "enabled": true } });
    let (status, _) = send(router.clone(), post(&unknown, &ADMIN)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let empty = json!({ "featureName": "newSearchExperience", "updates": {} });
    let (status, body) = send(router.clone(), post(&empty, &ADMIN)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No updates provided");

    let rejected = [
        json!({ "featureName": "newSearchExperience", "updates": { "rollout_percentage": 150 } }),
        json!({ "featureName": "newSearchExperience", "updates": { "rollout_percentage": 300 } }),
        json!({ "featureName": "newSearchExperience", "updates": { "rollout_percentage": -5 } }),
        json!({ "featureName": "newSearchExperience", "updates": { "bogus": true } }),
    ];
    for body in &rejected {
        let (status, response) = send(router.clone(), post(body, &ADMIN)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response["error"].is_string(), "{body}: {response}");
    }

    assert_eq!(
        flags.snapshot().get("newSearchExperience").map(|f| f.rollout_percentage),
        Some(50)
    );
}

#[tokio::test]
async fn update_rejects_malformed_json() {
    let (router, _) = app();
    let mut builder =
        Request::post("/api/feature-flags").header("content-type", "application/json");
    for (name, value) in ADMIN {
        builder = builder.header(name, value);
    }
    let request = builder.body(Body::from("{not json")).expect("request");

    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
