//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Layer stack (outermost → innermost): CORS → access log → handler.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    // NOTE: .with_state() turns Router<ApiContext> into Router<()> so the
    // from_fn layers (state = ()) stack on top of it.
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/predict-asthma", post(endpoints::predict::predict_asthma))
        .route("/symptoms", post(endpoints::symptoms::record))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::access::log_access));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::api::types::testing::seeded_context;
    use crate::prediction::{MockPredictor, RecordingMailer};

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn test_app(output: &str, mailer: Arc<RecordingMailer>, caretakers: &[&str]) -> (Router, Arc<MockPredictor>) {
        let predictor = Arc::new(MockPredictor::new(output));
        let ctx = seeded_context(predictor.clone(), mailer, caretakers);
        (api_router(ctx), predictor)
    }

    #[tokio::test]
    async fn health_response_shape() {
        let (app, _) = test_app("No Asthma,0.1", Arc::new(RecordingMailer::new()), &[]);
        let req = Request::get("/api/health").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn predict_positive_notifies_doctor() {
        let mailer = Arc::new(RecordingMailer::new());
        let (app, predictor) = test_app("Asthma,0.91", mailer.clone(), &[]);

        let response = app
            .oneshot(json_request("/api/predict-asthma", serde_json::json!({"patientId": "P1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["prediction"], "Asthma");
        assert_eq!(json["probability"], 0.91);
        assert_eq!(predictor.calls(), 1);

        let attempts = mailer.attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].recipient, "d1@clinic.test");
    }

    #[tokio::test]
    async fn predict_negative_sends_nothing() {
        let mailer = Arc::new(RecordingMailer::new());
        let (app, _) = test_app("No Asthma,0.12", mailer.clone(), &["care@home.test"]);

        let response = app
            .oneshot(json_request("/api/predict-asthma", serde_json::json!({"patientId": "P1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["prediction"], "No Asthma");
        assert!(mailer.attempts().is_empty());
    }

    #[tokio::test]
    async fn predict_succeeds_despite_notification_failure() {
        let mailer = Arc::new(RecordingMailer::new().failing_for("c1@home.test"));
        let (app, _) = test_app("Asthma,0.8", mailer.clone(), &["c1@home.test", "c2@home.test"]);

        let response = app
            .oneshot(json_request("/api/predict-asthma", serde_json::json!({"patientId": "P1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await["prediction"], "Asthma");
        assert_eq!(mailer.attempts().len(), 3);
    }

    #[tokio::test]
    async fn predict_unknown_patient_returns_404() {
        let (app, predictor) = test_app("Asthma,0.9", Arc::new(RecordingMailer::new()), &[]);

        let response = app
            .oneshot(json_request("/api/predict-asthma", serde_json::json!({"patientId": "NOPE"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response_json(response).await["error"], "Patient not found");
        assert_eq!(predictor.calls(), 0);
    }

    #[tokio::test]
    async fn predict_without_symptoms_returns_404() {
        let (app, predictor) = test_app("Asthma,0.9", Arc::new(RecordingMailer::new()), &[]);

        let response = app
            .oneshot(json_request("/api/predict-asthma", serde_json::json!({"patientId": "P2"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response_json(response).await["error"],
            "No symptom data found for patient"
        );
        assert_eq!(predictor.calls(), 0);
    }

    #[tokio::test]
    async fn predict_malformed_output_returns_500() {
        let mailer = Arc::new(RecordingMailer::new());
        let (app, _) = test_app("Asthma,1.5", mailer.clone(), &[]);

        let response = app
            .oneshot(json_request("/api/predict-asthma", serde_json::json!({"patientId": "P1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response_json(response).await["error"], "Invalid prediction output");
        assert!(mailer.attempts().is_empty());
    }

    #[tokio::test]
    async fn predict_process_failure_returns_500() {
        let predictor = Arc::new(MockPredictor::failing("Traceback: model.pkl missing"));
        let ctx = seeded_context(predictor, Arc::new(RecordingMailer::new()), &[]);

        let response = api_router(ctx)
            .oneshot(json_request("/api/predict-asthma", serde_json::json!({"patientId": "P1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"], "Prediction process failed");
        assert!(json["details"].as_str().unwrap().contains("model.pkl"));
    }

    #[tokio::test]
    async fn predict_empty_patient_id_returns_400() {
        let (app, predictor) = test_app("Asthma,0.9", Arc::new(RecordingMailer::new()), &[]);

        let response = app
            .oneshot(json_request("/api/predict-asthma", serde_json::json!({"patientId": "  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(predictor.calls(), 0);
    }

    #[tokio::test]
    async fn predict_missing_body_field_returns_400_json() {
        let (app, _) = test_app("Asthma,0.9", Arc::new(RecordingMailer::new()), &[]);

        let response = app
            .oneshot(json_request("/api/predict-asthma", serde_json::json!({"id": "P1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_json(response).await["error"], "Invalid request");
    }

    #[tokio::test]
    async fn symptoms_record_derives_severity() {
        let (app, _) = test_app("Asthma,0.9", Arc::new(RecordingMailer::new()), &[]);

        let response = app
            .oneshot(json_request(
                "/api/symptoms",
                serde_json::json!({
                    "patientId": "P2",
                    "wheezing": 1,
                    "shortnessOfBreath": 1,
                    "chestTightness": 1,
                    "coughing": 0,
                    "nighttimeSymptoms": 0,
                    "exercise": 0,
                    "notes": "after the run"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["severity"], "Moderate");
        assert!(json["id"].is_string());
        assert!(json["recordedAt"].is_string());
    }

    #[tokio::test]
    async fn symptoms_then_predict_uses_new_record() {
        let predictor = Arc::new(MockPredictor::new("No Asthma,0.2"));
        let ctx = seeded_context(predictor.clone(), Arc::new(RecordingMailer::new()), &[]);

        let response = api_router(ctx.clone())
            .oneshot(json_request(
                "/api/symptoms",
                serde_json::json!({"patientId": "P2", "coughing": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await["severity"], "Mild");

        let response = api_router(ctx)
            .oneshot(json_request("/api/predict-asthma", serde_json::json!({"patientId": "P2"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(predictor.calls(), 1);
    }

    #[tokio::test]
    async fn symptoms_unknown_patient_returns_404() {
        let (app, _) = test_app("Asthma,0.9", Arc::new(RecordingMailer::new()), &[]);

        let response = app
            .oneshot(json_request(
                "/api/symptoms",
                serde_json::json!({"patientId": "NOPE", "wheezing": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn symptoms_rejects_oversized_notes() {
        let (app, _) = test_app("Asthma,0.9", Arc::new(RecordingMailer::new()), &[]);

        let response = app
            .oneshot(json_request(
                "/api/symptoms",
                serde_json::json!({"patientId": "P1", "notes": "x".repeat(2001)}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let (app, _) = test_app("Asthma,0.9", Arc::new(RecordingMailer::new()), &[]);
        let req = Request::get("/api/nonexistent").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_preflight_allowed() {
        let (app, _) = test_app("Asthma,0.9", Arc::new(RecordingMailer::new()), &[]);
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/predict-asthma")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert!(response.status().is_success());
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
