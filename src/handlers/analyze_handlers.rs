// linkhub-backend/src/analyze_handlers.rs
//
// Meeting-notes analyzer endpoint. Unlike the CRUD handlers this one
// answers with the form-state triple {message, result?, error?} the
// frontend feeds straight into toasts: validation problems come back as
// a field error, provider problems as one generic retry message.
use crate::error_handler::ServiceError;
use crate::inference::{AnalyzeError, MeetingNotesAnalysis, NotesAnalyzer};
use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct AnalyzeMeetingNotesPayload {
    pub meeting_notes: String,
}

#[derive(Serialize, Debug)]
pub struct AnalyzeFormState {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MeetingNotesAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// === POST /analyze/meeting-notes ===
#[post("/meeting-notes")]
pub async fn analyze_meeting_notes_handler(
    analyzer: web::Data<NotesAnalyzer>,
    payload: web::Json<AnalyzeMeetingNotesPayload>,
) -> Result<HttpResponse, ServiceError> {
    match analyzer.analyze_meeting_notes(&payload.meeting_notes).await {
        Ok(result) => Ok(HttpResponse::Ok().json(AnalyzeFormState {
            message: "Analysis successful.".to_string(),
            result: Some(result),
            error: None,
        })),
        Err(AnalyzeError::Validation(field_error)) => {
            Ok(HttpResponse::BadRequest().json(AnalyzeFormState {
                message: "Validation failed.".to_string(),
                result: None,
                error: Some(field_error),
            }))
        }
        Err(AnalyzeError::Provider(detail)) => {
            // One opaque message whatever went wrong on the provider side.
            log::error!("Meeting notes analysis failed: {}", detail);
            Ok(HttpResponse::Ok().json(AnalyzeFormState {
                message: "An unexpected error occurred.".to_string(),
                result: None,
                error: Some("Failed to analyze notes. Please try again later.".to_string()),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    macro_rules! spawn_app {
        ($analyzer:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($analyzer))
                    .service(web::scope("/analyze").service(analyze_meeting_notes_handler)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn short_notes_report_a_field_error_without_a_provider_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = spawn_app!(NotesAnalyzer::with_config(
            server.uri(),
            "test-model".to_string(),
            5,
        ));

        let req = test::TestRequest::post()
            .uri("/analyze/meeting-notes")
            .set_json(serde_json::json!({ "meeting_notes": "ab" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Validation failed.");
        assert_eq!(
            body["error"],
            "Meeting notes must be at least 10 characters."
        );
        assert!(body.get("result").is_none());
    }

    #[actix_web::test]
    async fn successful_analysis_passes_the_result_through() {
        let server = MockServer::start().await;
        let content = r#"{"suggested_dates":["May 15"],"suggested_invitees":["Alice","Bob","Carol"],"suggested_tasks":["follow up with Bob"]}"#;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": { "role": "assistant", "content": content }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = spawn_app!(NotesAnalyzer::with_config(
            server.uri(),
            "test-model".to_string(),
            5,
        ));

        let req = test::TestRequest::post()
            .uri("/analyze/meeting-notes")
            .set_json(serde_json::json!({
                "meeting_notes": "Team sync on May 15. Alice to follow up with Bob. Invite Carol."
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Analysis successful.");
        assert_eq!(body["result"]["suggested_dates"][0], "May 15");
        assert_eq!(body["result"]["suggested_invitees"][2], "Carol");
        assert_eq!(body["result"]["suggested_tasks"][0], "follow up with Bob");
    }

    #[actix_web::test]
    async fn provider_failure_is_masked_as_a_generic_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = spawn_app!(NotesAnalyzer::with_config(
            server.uri(),
            "test-model".to_string(),
            5,
        ));

        let req = test::TestRequest::post()
            .uri("/analyze/meeting-notes")
            .set_json(serde_json::json!({
                "meeting_notes": "A perfectly reasonable set of meeting notes."
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "An unexpected error occurred.");
        assert_eq!(
            body["error"],
            "Failed to analyze notes. Please try again later."
        );
        assert!(body.get("result").is_none());
    }
}
