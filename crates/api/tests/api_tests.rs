//! Integration tests for the optimizer API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use optimizer_api::{create_router, AppState};
use optimizer_lib::{
    observability::{OptimizerMetrics, StructuredLogger},
    scoring::UnderutilizationThresholds,
};
use std::sync::Arc;
use tower::ServiceExt;

fn setup_test_app() -> Router {
    let state = Arc::new(AppState::new(
        OptimizerMetrics::new(),
        StructuredLogger::new("optimizer-api-test"),
        UnderutilizationThresholds::default(),
    ));
    create_router(state)
}

async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn idle_vm_snapshot() -> serde_json::Value {
    serde_json::json!({
        "resources": [
            {"id": "vm1", "name": "vm-idle", "resource_type": "Microsoft.Compute/virtualMachines", "sku": "Standard_D2s_v3"},
            {"id": "vm2", "name": "vm-busy", "resource_type": "Microsoft.Compute/virtualMachines"}
        ],
        "metrics": [
            {"resource_id": "vm1", "metric_name": "Percentage CPU", "average": 3.0, "maximum": 15.0, "timestamp": "2026-10-15T00:00:00Z"},
            {"resource_id": "vm2", "metric_name": "Percentage CPU", "average": 70.0, "maximum": 95.0, "timestamp": "2026-10-15T00:00:00Z"}
        ],
        "costs": [
            {"resource_id": "vm1", "cost_amount": 200.0, "usage_date": "2026-10-02"},
            {"resource_id": "vm2", "cost_amount": 400.0, "usage_date": "2026-10-02"}
        ],
        "now": "2026-10-16T00:00:00Z"
    })
}

#[tokio::test]
async fn test_healthz_returns_ok() {
    let (status, body) = get(setup_test_app(), "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["version"].is_string());
}

#[tokio::test]
async fn test_thresholds_returns_defaults() {
    let (status, body) = get(setup_test_app(), "/api/v1/thresholds").await;

    assert_eq!(status, StatusCode::OK);
    let thresholds: UnderutilizationThresholds = serde_json::from_slice(&body).unwrap();
    assert_eq!(thresholds, UnderutilizationThresholds::default());
}

#[tokio::test]
async fn test_underutilized_reports_idle_vm_only() {
    let (status, body) = post_json(setup_test_app(), "/api/v1/underutilized", idle_vm_snapshot()).await;

    assert_eq!(status, StatusCode::OK);
    let reports = body["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["name"], "vm-idle");
    assert_eq!(reports[0]["potential_savings"], 140.0);
    assert_eq!(reports[0]["recommendations"][0]["type"], "deallocate");
    assert_eq!(body["summary"]["resource_count"], 1);
}

#[tokio::test]
async fn test_underutilized_rejects_invalid_thresholds() {
    let mut snapshot = idle_vm_snapshot();
    snapshot["thresholds"] = serde_json::json!({"cpu": -1.0});

    let (status, body) = post_json(setup_test_app(), "/api/v1/underutilized", snapshot).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_THRESHOLDS");
}

#[tokio::test]
async fn test_recommendations_for_single_resource() {
    let snapshot = serde_json::json!({
        "resource": {"id": "db1", "name": "sqldb-orders", "resource_type": "Microsoft.Sql/servers/databases"},
        "usage": {"dtu": {"category": "dtu", "avg_value": 10.0, "max_value": 30.0}},
        "monthly_cost": 300.0
    });

    let (status, body) = post_json(setup_test_app(), "/api/v1/recommendations", snapshot).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["underutilization_score"], 50);
    assert_eq!(body["recommendations"][0]["type"], "downsize");
}

#[tokio::test]
async fn test_recommendations_rejects_mislabelled_usage() {
    let snapshot = serde_json::json!({
        "resource": {"id": "db1", "name": "sqldb-orders", "resource_type": "Microsoft.Sql/servers/databases"},
        "usage": {"cpu": {"category": "memory", "avg_value": 10.0, "max_value": 30.0}},
        "monthly_cost": 300.0
    });

    let (status, body) = post_json(setup_test_app(), "/api/v1/recommendations", snapshot).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_sql_health_scores_database() {
    let snapshot = serde_json::json!({
        "performance": [
            {"resource_id": "db1", "dtu_percent": 20.0, "deadlock_count": 0, "blocked_count": 0, "timestamp": "2026-10-15T00:00:00Z"}
        ],
        "wait_stats": [],
        "replication_links": []
    });

    let (status, body) = post_json(setup_test_app(), "/api/v1/sql-health", snapshot).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_score"], 100);
    assert_eq!(body["database_count"], 1);
    assert_eq!(body["healthy_count"], 1);
}

#[tokio::test]
async fn test_cost_trend_returns_series() {
    let snapshot = serde_json::json!({
        "costs": [
            {"resource_id": "a", "cost_amount": 10.0, "usage_date": "2026-10-01"},
            {"resource_id": "b", "cost_amount": 5.0, "usage_date": "2026-10-01"},
            {"resource_id": "a", "cost_amount": 12.0, "usage_date": "2026-10-02"}
        ]
    });

    let (status, body) = post_json(setup_test_app(), "/api/v1/cost-trend", snapshot).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["series"].as_array().unwrap().len(), 2);
    assert_eq!(body["series"][0]["amount"], 15.0);
    assert_eq!(body["trend"]["month_to_date"], 27.0);
}

#[tokio::test]
async fn test_storage_projection_needs_two_samples() {
    let snapshot = serde_json::json!({
        "samples": [{"timestamp": "2026-10-15T00:00:00Z", "used": 40.0}],
        "capacity": 100.0
    });

    let (status, body) = post_json(setup_test_app(), "/api/v1/storage-projection", snapshot).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_DATA");
}

#[tokio::test]
async fn test_storage_projection_with_nearly_flat_growth() {
    let snapshot = serde_json::json!({
        "samples": [
            {"timestamp": "2026-09-15T00:00:00Z", "used": 100.0},
            {"timestamp": "2026-10-15T00:00:00Z", "used": 100.000001}
        ],
        "capacity": 1e12
    });

    let (status, body) = post_json(setup_test_app(), "/api/v1/storage-projection", snapshot).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["days_until_full"].as_f64().unwrap() > 0.0);
    assert!(body["projected_full_at"].is_null());
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let _ = post_json(setup_test_app(), "/api/v1/underutilized", idle_vm_snapshot()).await;

    let (status, body) = get(setup_test_app(), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("optimizer_underutilized_reports_total"));
}
