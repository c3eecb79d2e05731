//! HTTP API integration tests.
//!
//! Drives the full router (auth middleware, error mapping, CORS, request
//! ids) against the in-memory store and the mock payment provider.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use campaign_credits::adapters::auth::MockSessionValidator;
use campaign_credits::adapters::http::{app_router, AppPorts, AppSettings, AppState};
use campaign_credits::adapters::memory::InMemoryStore;
use campaign_credits::adapters::stripe::MockPaymentProvider;
use campaign_credits::config::{CreditsConfig, FeatureFlags, ServerConfig};
use campaign_credits::domain::billing::{signature_header, PlanPrices};
use campaign_credits::domain::foundation::ProfileId;
use campaign_credits::ports::ProfileRepository;

// =============================================================================
// Test Infrastructure
// =============================================================================

const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";
const WEBHOOK_SECRET: &str = "whsec_test";

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
    provider: Arc<MockPaymentProvider>,
    validator: Arc<MockSessionValidator>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_features(FeatureFlags::default())
    }

    fn with_features(features: FeatureFlags) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(MockPaymentProvider::new());
        let validator = Arc::new(
            MockSessionValidator::new()
                .with_test_user(ALICE)
                .with_test_user(BOB),
        );

        let ports = AppPorts {
            profiles: store.clone(),
            campaigns: store.clone(),
            ledger: store.clone(),
            visits: store.clone(),
            subscriptions: store.clone(),
            webhook_events: store.clone(),
            payment_provider: provider.clone(),
            session_validator: validator.clone(),
        };
        let prices = PlanPrices::new(HashMap::from([
            ("starter".to_string(), "price_starter".to_string()),
            ("growth".to_string(), "price_growth".to_string()),
        ]));
        let settings = AppSettings {
            webhook_secret: SecretString::new(WEBHOOK_SECRET.to_string()),
            require_livemode: false,
            prices,
            credits: CreditsConfig {
                signup_credits: 100,
                allow_self_promotion: false,
                ..CreditsConfig::default()
            },
            features,
        };

        let router = app_router(AppState::new(ports, settings), &ServerConfig::default());
        Self {
            router,
            store,
            provider,
            validator,
        }
    }

    fn profile_id(&self, token: &str) -> ProfileId {
        self.validator
            .user(token)
            .map(|user| user.id)
            .expect("token is registered")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn send_json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn promote_alice(&self) {
        // An existing admin promotes Alice; self promotion is off here.
        app_profile(self, ALICE).await;
        let mut admin = campaign_credits::domain::profile::Profile::new(
            self.profile_id(BOB),
            "bob@test.example.com",
            None,
            0,
        );
        admin.role = campaign_credits::domain::profile::Role::Admin;
        self.store.put_profile(admin).await;

        let alice = self.profile_id(ALICE).to_string();
        let (status, _) = self
            .send_json("POST", "/api/admin/promote", Some(BOB), json!({ "profile_id": alice }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn deliver_webhook(&self, event: Value) -> (StatusCode, Value) {
        let payload = event.to_string();
        let signature = signature_header(
            WEBHOOK_SECRET,
            chrono::Utc::now().timestamp(),
            payload.as_bytes(),
        )
        .unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/webhooks/stripe")
            .header(header::CONTENT_TYPE, "application/json")
            .header("Stripe-Signature", signature)
            .body(Body::from(payload))
            .unwrap();
        self.send(request).await
    }

    async fn create_campaign(&self, token: &str, allocated: i64) -> (StatusCode, Value) {
        self.send_json(
            "POST",
            "/api/campaigns",
            Some(token),
            json!({
                "name": "Spring launch",
                "target_url": "https://example.com/spring",
                "allocated_credits": allocated,
            }),
        )
        .await
    }
}

async fn app_profile(app: &TestApp, token: &str) -> Value {
    let (status, profile) = app.get("/api/profile", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    profile
}

// =============================================================================
// Health and Authentication
// =============================================================================

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/profile", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/profile", Some("forged-token")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn catalog_is_public_and_lists_only_priced_plans() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/plans", None).await;

    assert_eq!(status, StatusCode::OK);
    let plan_ids: Vec<&str> = body["plans"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|plan| plan["id"].as_str())
        .collect();
    assert_eq!(plan_ids, vec!["starter", "growth"]);
    assert_eq!(body["packages"].as_array().unwrap().len(), 3);
}

// =============================================================================
// Profiles
// =============================================================================

#[tokio::test]
async fn first_access_creates_profile_with_signup_credits() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/profile", Some(ALICE)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], app.profile_id(ALICE).to_string());
    assert_eq!(body["role"], "user");
    assert_eq!(body["credits"], 100);

    // A second access returns the same row without another grant.
    let (_, again) = app.get("/api/profile", Some(ALICE)).await;
    assert_eq!(again["credits"], 100);
}

#[tokio::test]
async fn self_promotion_is_forbidden_when_disabled() {
    let app = TestApp::new();
    let alice = app.profile_id(ALICE).to_string();

    let (status, body) = app
        .send_json("POST", "/api/admin/promote", Some(ALICE), json!({ "profile_id": alice }))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "FORBIDDEN");
}

#[tokio::test]
async fn admin_promotion_grants_role_and_testing_credits() {
    let app = TestApp::new();

    app.promote_alice().await;

    let (_, body) = app.get("/api/profile", Some(ALICE)).await;
    assert_eq!(body["role"], "admin");
    assert_eq!(body["credits"], 10_000);
}

// =============================================================================
// Campaigns
// =============================================================================

#[tokio::test]
async fn creating_campaign_debits_allocation() {
    let app = TestApp::new();

    let (status, campaign) = app.create_campaign(ALICE, 40).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(campaign["allocated_credits"], 40);
    assert_eq!(campaign["spent_credits"], 0);
    assert_eq!(campaign["status"], "active");

    let (_, profile) = app.get("/api/profile", Some(ALICE)).await;
    assert_eq!(profile["credits"], 60);

    let (_, campaigns) = app.get("/api/campaigns", Some(ALICE)).await;
    assert_eq!(campaigns.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn over_allocation_is_payment_required() {
    let app = TestApp::new();

    let (status, body) = app.create_campaign(ALICE, 500).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error_code"], "INSUFFICIENT_CREDITS");

    let (_, profile) = app.get("/api/profile", Some(ALICE)).await;
    assert_eq!(profile["credits"], 100);
}

#[tokio::test]
async fn zero_allocation_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app.create_campaign(ALICE, 0).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_updates_spend_within_allocation() {
    let app = TestApp::new();
    let (_, campaign) = app.create_campaign(ALICE, 40).await;
    let uri = format!("/api/campaigns/{}", campaign["id"].as_str().unwrap());

    let (status, updated) = app
        .send_json("PATCH", &uri, Some(ALICE), json!({ "spent_credits": 25, "status": "paused" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["spent_credits"], 25);
    assert_eq!(updated["status"], "paused");

    let (status, body) = app
        .send_json("PATCH", &uri, Some(ALICE), json!({ "spent_credits": 41 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "SPEND_EXCEEDS_ALLOCATION");
}

#[tokio::test]
async fn other_users_cannot_see_or_update_a_campaign() {
    let app = TestApp::new();
    let (_, campaign) = app.create_campaign(ALICE, 40).await;
    let uri = format!("/api/campaigns/{}", campaign["id"].as_str().unwrap());

    let (status, _) = app
        .send_json("PATCH", &uri, Some(BOB), json!({ "name": "Hijacked" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, campaigns) = app.get("/api/campaigns", Some(BOB)).await;
    assert!(campaigns.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_campaign_id_is_a_validation_error() {
    let app = TestApp::new();

    let (status, body) = app
        .send_json("PATCH", "/api/campaigns/not-a-uuid", Some(ALICE), json!({ "name": "x" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn admin_campaign_listing_requires_admin() {
    let app = TestApp::new();
    app.create_campaign(ALICE, 40).await;

    let (status, _) = app.get("/api/admin/campaigns", Some(ALICE)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.promote_alice().await;
    let (status, campaigns) = app
        .get("/api/admin/campaigns?status=active", Some(ALICE))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(campaigns.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn debug_routes_are_absent_unless_enabled() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/debug/campaigns", Some(ALICE)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let app = TestApp::with_features(FeatureFlags {
        debug_routes: true,
        ..FeatureFlags::default()
    });
    app.promote_alice().await;
    let (status, _) = app.get("/api/debug/campaigns", Some(ALICE)).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Visits and Analytics
// =============================================================================

#[tokio::test]
async fn visits_are_public_and_feed_analytics() {
    let app = TestApp::new();
    let (_, campaign) = app.create_campaign(ALICE, 40).await;
    let campaign_id = campaign["id"].as_str().unwrap().to_string();

    for visitor in ["v1", "v2", "v1"] {
        let (status, _) = app
            .send_json(
                "POST",
                "/api/visits",
                None,
                json!({ "campaign_id": campaign_id, "visitor_id": visitor }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, visits) = app
        .get(&format!("/api/visits?campaign_id={}", campaign_id), Some(ALICE))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(visits.as_array().unwrap().len(), 3);

    let (_, summary) = app.get("/api/analytics", Some(ALICE)).await;
    assert_eq!(summary["total_visits"], 3);
    assert_eq!(summary["unique_visitors"], 2);
    assert_eq!(summary["allocated_credits"], 40);
}

#[tokio::test]
async fn visit_for_unknown_campaign_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app
        .send_json(
            "POST",
            "/api/visits",
            None,
            json!({ "campaign_id": ProfileId::new().to_string(), "visitor_id": "v1" }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "CAMPAIGN_NOT_FOUND");
}

#[tokio::test]
async fn visits_of_another_owners_campaign_are_hidden() {
    let app = TestApp::new();
    let (_, campaign) = app.create_campaign(ALICE, 40).await;

    let (status, _) = app
        .get(
            &format!("/api/visits?campaign_id={}", campaign["id"].as_str().unwrap()),
            Some(BOB),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Credits
// =============================================================================

#[tokio::test]
async fn purchase_grants_package_credits_once_per_key() {
    let app = TestApp::new();
    let body = json!({
        "package_id": "small",
        "payment_method_id": "pm_card_visa",
        "idempotency_key": "purchase-1",
    });

    let (status, first) = app
        .send_json("POST", "/api/credits/purchase", Some(ALICE), body.clone())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["granted"], true);
    assert_eq!(first["balance"], 600);

    let (_, transactions) = app.get("/api/credits/transactions", Some(ALICE)).await;
    let transactions = transactions.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["amount"], 500);
    assert_eq!(app.provider.call_count("create_payment_intent"), 1);
}

#[tokio::test]
async fn unknown_package_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app
        .send_json(
            "POST",
            "/api/credits/purchase",
            Some(ALICE),
            json!({ "package_id": "huge", "payment_method_id": "pm_card_visa" }),
        )
        .await;

    assert!(status.is_client_error());
    assert!(!app.provider.was_called("create_payment_intent"));
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test]
async fn subscribe_then_upgrade_then_cancel() {
    let app = TestApp::new();

    let (status, created) = app
        .send_json(
            "POST",
            "/api/subscriptions",
            Some(ALICE),
            json!({ "plan_id": "starter", "payment_method_id": "pm_card_visa" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["subscription"]["plan_id"], "starter");
    assert_eq!(created["subscription"]["status"], "active");
    assert_eq!(created["credits_granted"], 1_000);

    let (status, _) = app
        .send_json(
            "POST",
            "/api/subscriptions",
            Some(ALICE),
            json!({ "plan_id": "growth", "payment_method_id": "pm_card_visa" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, upgraded) = app
        .send_json("POST", "/api/subscriptions/upgrade", Some(ALICE), json!({ "plan_id": "growth" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upgraded["subscription"]["plan_id"], "growth");
    assert_eq!(upgraded["credits_granted"], 4_000);

    let (status, canceled) = app
        .send_json("POST", "/api/subscriptions/cancel", Some(ALICE), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(canceled["cancel_at_period_end"], true);

    let (_, current) = app.get("/api/subscriptions", Some(ALICE)).await;
    assert_eq!(current["plan_id"], "growth");

    let (_, profile) = app.get("/api/profile", Some(ALICE)).await;
    assert_eq!(profile["credits"], 100 + 1_000 + 4_000);
}

#[tokio::test]
async fn unpriced_plan_cannot_be_subscribed() {
    let app = TestApp::new();

    let (status, _) = app
        .send_json(
            "POST",
            "/api/subscriptions",
            Some(ALICE),
            json!({ "plan_id": "scale", "payment_method_id": "pm_card_visa" }),
        )
        .await;

    assert!(status.is_client_error());
    assert!(!app.provider.was_called("create_subscription"));
}

#[tokio::test]
async fn unpaid_first_invoice_grants_nothing() {
    let app = TestApp::new();
    app.provider.set_invoice_paid(false);

    let (status, created) = app
        .send_json(
            "POST",
            "/api/subscriptions",
            Some(ALICE),
            json!({ "plan_id": "starter", "payment_method_id": "pm_card_visa" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["subscription"]["status"], "incomplete");
    assert_eq!(created["credits_granted"], 0);
}

#[tokio::test]
async fn upgrade_paid_after_the_request_is_credited_by_webhook() {
    let app = TestApp::new();
    let (status, _) = app
        .send_json(
            "POST",
            "/api/subscriptions",
            Some(ALICE),
            json!({ "plan_id": "starter", "payment_method_id": "pm_card_visa" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    app.provider.set_invoice_paid(false);
    let (status, upgraded) = app
        .send_json("POST", "/api/subscriptions/upgrade", Some(ALICE), json!({ "plan_id": "growth" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upgraded["credits_granted"], 0);

    let stripe_id = upgraded["subscription"]["stripe_subscription_id"]
        .as_str()
        .unwrap()
        .to_string();
    let remote = app.provider.subscription(&stripe_id).unwrap();
    let invoice = json!({
        "id": "evt_upgrade_paid",
        "type": "invoice.paid",
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": { "object": {
            "id": remote.latest_invoice.unwrap().id,
            "subscription": stripe_id,
            "billing_reason": "subscription_update",
            "subscription_details": { "metadata": remote.metadata },
        }},
    });

    let (status, body) = app.deliver_webhook(invoice.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processed");
    let (_, body) = app.deliver_webhook(invoice).await;
    assert_eq!(body["status"], "already_processed");

    let (_, profile) = app.get("/api/profile", Some(ALICE)).await;
    assert_eq!(profile["credits"], 100 + 1_000 + 4_000);
}

// =============================================================================
// Request Validation
// =============================================================================

fn assert_validation_error(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_FAILED");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn missing_body_fields_are_validation_errors() {
    let app = TestApp::new();
    let (_, campaign) = app.create_campaign(ALICE, 40).await;
    let campaign_id = campaign["id"].as_str().unwrap().to_string();

    let cases = [
        ("POST", "/api/campaigns".to_string(), Some(ALICE), json!({ "name": "No budget" })),
        ("POST", "/api/visits".to_string(), None, json!({ "campaign_id": campaign_id })),
        (
            "POST",
            "/api/credits/purchase".to_string(),
            Some(ALICE),
            json!({ "package_id": "small" }),
        ),
        ("POST", "/api/subscriptions".to_string(), Some(ALICE), json!({ "plan_id": "starter" })),
        ("POST", "/api/subscriptions/upgrade".to_string(), Some(ALICE), json!({})),
        (
            "PATCH",
            format!("/api/campaigns/{}", campaign_id),
            Some(ALICE),
            json!({ "spent_credits": "ten" }),
        ),
    ];
    for (method, uri, token, body) in cases {
        let (status, response) = app.send_json(method, &uri, token, body).await;
        assert_validation_error(status, &response);
    }

    let (_, campaigns) = app.get("/api/campaigns", Some(ALICE)).await;
    assert_eq!(campaigns.as_array().unwrap().len(), 1);
    assert_eq!(campaigns[0]["spent_credits"], 0);
    assert_eq!(app.store.visit_count().await, 0);
    assert!(!app.provider.was_called("create_payment_intent"));
    assert!(!app.provider.was_called("create_subscription"));
    assert_eq!(app_profile(&app, ALICE).await["credits"], 60);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/visits")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"campaign_id\":"))
        .unwrap();

    let (status, body) = app.send(request).await;

    assert_validation_error(status, &body);
}

#[tokio::test]
async fn missing_query_parameter_is_a_validation_error() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/visits?limit=5", Some(ALICE)).await;

    assert_validation_error(status, &body);
    let stored = ProfileRepository::find(app.store.as_ref(), &app.profile_id(ALICE))
        .await
        .unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn authentication_is_checked_before_the_body() {
    let app = TestApp::new();

    let (status, body) = app
        .send_json("POST", "/api/campaigns", None, json!({ "name": "No budget" }))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn rejected_body_does_not_create_the_callers_profile() {
    let app = TestApp::new();

    let (status, body) = app
        .send_json("POST", "/api/campaigns", Some(ALICE), json!({ "name": "No budget" }))
        .await;
    assert_validation_error(status, &body);

    let stored = ProfileRepository::find(app.store.as_ref(), &app.profile_id(ALICE))
        .await
        .unwrap();
    assert!(stored.is_none());
}
