pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Interactive form
        .route("/", get(handlers::handle_form))
        .route("/screen", post(handlers::handle_screen_form))
        // Screening API
        .route(
            "/api/v1/screenings",
            post(handlers::handle_create_screening),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::screening::test_support::{RecordingMailer, ScriptedModel};

    const BOUNDARY: &str = "screener-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a str),
    }

    fn multipart_body(parts: &[Part<'_>]) -> String {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match part {
                Part::Text(name, value) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    ));
                }
                Part::File(name, filename, content) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n{content}\r\n"
                    ));
                }
            }
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn screening_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn full_form<'a>(api_key: &'a str) -> Vec<Part<'a>> {
        vec![
            Part::Text("api_key", api_key),
            Part::File(
                "job_description",
                "jd.txt",
                "Looking for a Python backend engineer with 3+ years experience",
            ),
            Part::File("resumes", "alice.txt", "5 years Python, Django, REST APIs"),
            Part::File("resumes", "zoe.txt", "Barista"),
            Part::File(
                "spreadsheet",
                "emails.csv",
                "filename,email\nalice.txt,alice@example.com\n",
            ),
            Part::Text("sender_email", "hr@example.com"),
            Part::Text("sender_password", "app-pass"),
        ]
    }

    fn app(model: ScriptedModel, mailer: Arc<RecordingMailer>) -> Router {
        build_router(AppState {
            config: Config::default(),
            llm: Arc::new(model),
            mailer,
        })
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let router = app(ScriptedModel::new(vec![]), Arc::new(RecordingMailer::default()));
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload["status"], "ok");
    }

    #[tokio::test]
    async fn test_form_is_served() {
        let router = app(ScriptedModel::new(vec![]), Arc::new(RecordingMailer::default()));
        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Run Screening"));
    }

    #[tokio::test]
    async fn test_api_returns_json_report() {
        let mailer = Arc::new(RecordingMailer::default());
        let model = ScriptedModel::new(vec![
            Ok("Match Percentage: 92%\nExplanation: Strong backend fit."),
            Ok("Match Percentage: 12%\nExplanation: No backend experience."),
        ]);
        let response = app(model, mailer.clone())
            .oneshot(screening_request("/api/v1/screenings", &full_form("sk-test")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: Value = serde_json::from_str(&body_text(response).await).unwrap();
        let results = payload["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["filename"], "alice.txt");
        assert_eq!(results[0]["score"], 92);
        assert_eq!(results[0]["status"], "Passed");
        assert_eq!(results[0]["notification"]["state"], "sent");
        assert_eq!(results[1]["email"], "Not found");
        assert_eq!(results[1]["status"], "Not Passed");
        assert_eq!(results[1]["notification"]["state"], "skipped");

        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_api_csv_export() {
        let model = ScriptedModel::new(vec![
            Ok("Match Percentage: 92%\nExplanation: Strong backend fit."),
            Ok("No verdict."),
        ]);
        let response = app(model, Arc::new(RecordingMailer::default()))
            .oneshot(screening_request(
                "/api/v1/screenings?format=csv",
                &full_form("sk-test"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("cv_screening_results.csv"));

        let csv = body_text(response).await;
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Filename,Email,Score,Status,Explanation");
        assert_eq!(
            lines[1],
            "alice.txt,alice@example.com,92,Passed,Strong backend fit."
        );
        assert_eq!(lines[2], "zoe.txt,Not found,,Not Passed,N/A");
    }

    #[tokio::test]
    async fn test_api_rejects_unknown_format_before_screening() {
        let mailer = Arc::new(RecordingMailer::default());
        let model = ScriptedModel::new(vec![Ok("Match Percentage: 92%")]);
        let response = app(model, mailer.clone())
            .oneshot(screening_request(
                "/api/v1/screenings?format=xml",
                &full_form("sk-test"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_api_missing_api_key_is_bad_request() {
        let mut parts = full_form("sk-test");
        parts.remove(0);
        let response = app(ScriptedModel::new(vec![]), Arc::new(RecordingMailer::default()))
            .oneshot(screening_request("/api/v1/screenings", &parts))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_form_fields_are_ignored() {
        let mut parts = vec![
            Part::Text("notes", "first batch of the week"),
            Part::File("cover_letter", "letter.txt", "Dear hiring manager"),
        ];
        parts.extend(full_form("sk-test"));
        let model = ScriptedModel::new(vec![
            Ok("Match Percentage: 92%\nExplanation: Strong backend fit."),
            Ok("Match Percentage: 12%\nExplanation: No backend experience."),
        ]);
        let response = app(model, Arc::new(RecordingMailer::default()))
            .oneshot(screening_request("/api/v1/screenings", &parts))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: Value = serde_json::from_str(&body_text(response).await).unwrap();
        let filenames: Vec<&str> = payload["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["filename"].as_str().unwrap())
            .collect();
        assert_eq!(filenames, vec!["alice.txt", "zoe.txt"]);
    }

    #[tokio::test]
    async fn test_form_submit_renders_results_page() {
        let model = ScriptedModel::new(vec![
            Ok("Match Percentage: 92%\nExplanation: Strong backend fit."),
            Ok("Match Percentage: 40%\nExplanation: Weak."),
        ]);
        let response = app(model, Arc::new(RecordingMailer::default()))
            .oneshot(screening_request("/screen", &full_form("sk-test")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Screening complete. 1 of 2 candidate(s) passed."));
        assert!(html.contains("Email sent to alice@example.com"));
        assert!(html.contains("Download Results"));
    }

    #[tokio::test]
    async fn test_form_submit_with_bad_spreadsheet_shows_inline_error() {
        let mut parts = full_form("sk-test");
        parts[4] = Part::File("spreadsheet", "emails.csv", "name,mail\nalice.txt,a@x.com\n");
        let response = app(ScriptedModel::new(vec![]), Arc::new(RecordingMailer::default()))
            .oneshot(screening_request("/screen", &parts))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains(r#"class="error""#));
        assert!(html.contains("filename"));
        assert!(html.contains("Run Screening"));
    }
}
