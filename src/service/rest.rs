use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::EditorialConfig;
use crate::error::{ApiError, EditorialError, ErrorBody, WorkflowError};
use crate::workflow::{
    AbstractTransition, Actor, ConferenceAbstract, Editor, EditorId, EntityKind, Manuscript,
    ManuscriptTransition, TransitionGuard,
};

use super::{TransitionRequest, WorkflowService};

/// Client for the back-office REST API.
///
/// Transitions are checked locally with the [`TransitionGuard`] before the
/// mutation is sent, so an obviously illegal request never reaches the
/// server. The server stays authoritative: its answer is what we return.
pub struct RestWorkflowService {
    client: Client,
    base_url: String,
    token: String,
}

impl RestWorkflowService {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, EditorialError> {
        Self::with_timeout(base_url, token, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EditorialError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(ApiError::from)?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn from_config(config: &EditorialConfig) -> Result<Self, EditorialError> {
        Self::with_timeout(
            config.api_base_url.clone(),
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.token)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        entity: Option<(EntityKind, u64)>,
    ) -> Result<T, EditorialError> {
        debug!(path, "GET");
        let response = self
            .authorized(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(ApiError::from)?;
        decode(response, entity).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        entity: (EntityKind, u64),
    ) -> Result<T, EditorialError> {
        debug!(path, "POST");
        let response = self
            .authorized(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?;
        decode(response, Some(entity)).await
    }
}

async fn decode<T: DeserializeOwned>(
    response: Response,
    entity: Option<(EntityKind, u64)>,
) -> Result<T, EditorialError> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        if let Some((kind, id)) = entity {
            return Err(WorkflowError::EntityNotFound { kind, id }.into());
        }
    }

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.message,
            Err(_) if text.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
            Err(_) => text,
        };
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        }
        .into());
    }

    Ok(response.json::<T>().await.map_err(ApiError::from)?)
}

impl WorkflowService for RestWorkflowService {
    async fn editors(&self) -> Result<Vec<Editor>, EditorialError> {
        self.get_json("/editors", None).await
    }

    async fn fetch_manuscript(&self, id: u64) -> Result<Manuscript, EditorialError> {
        self.get_json(
            &format!("/manuscripts/{id}"),
            Some((EntityKind::Manuscript, id)),
        )
        .await
    }

    async fn apply_manuscript_transition(
        &self,
        id: u64,
        transition: &ManuscriptTransition,
        actor: &Actor,
    ) -> Result<Manuscript, EditorialError> {
        let current = self.fetch_manuscript(id).await?;
        let editors = match transition {
            ManuscriptTransition::AssignEditor { .. } => self.editors().await?,
            _ => Vec::new(),
        };
        let action = transition.action().name();
        if let Err(e) =
            TransitionGuard::apply_manuscript(&current, transition, actor, &editors, Utc::now())
        {
            warn!(manuscript_id = id, action, role = %actor.role, error = %e, "transition rejected locally");
            return Err(e.into());
        }

        let updated: Manuscript = self
            .post_json(
                &format!("/manuscripts/{id}/transitions"),
                &TransitionRequest { actor, transition },
                (EntityKind::Manuscript, id),
            )
            .await?;
        info!(manuscript_id = id, action, role = %actor.role, status = %updated.status, "transition applied");
        Ok(updated)
    }

    async fn manuscripts_assigned_to(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<Manuscript>, EditorialError> {
        self.get_json(&format!("/editors/{editor_id}/manuscripts"), None)
            .await
    }

    async fn fetch_abstract(&self, id: u64) -> Result<ConferenceAbstract, EditorialError> {
        self.get_json(&format!("/abstracts/{id}"), Some((EntityKind::Abstract, id)))
            .await
    }

    async fn apply_abstract_transition(
        &self,
        id: u64,
        transition: &AbstractTransition,
        actor: &Actor,
    ) -> Result<ConferenceAbstract, EditorialError> {
        let current = self.fetch_abstract(id).await?;
        let editors = match transition {
            AbstractTransition::AssignEditor { .. }
            | AbstractTransition::AssignConferenceEditor { .. } => self.editors().await?,
            _ => Vec::new(),
        };
        let action = transition.action().name();
        if let Err(e) =
            TransitionGuard::apply_abstract(&current, transition, actor, &editors, Utc::now())
        {
            warn!(abstract_id = id, action, role = %actor.role, error = %e, "transition rejected locally");
            return Err(e.into());
        }

        let updated: ConferenceAbstract = self
            .post_json(
                &format!("/abstracts/{id}/transitions"),
                &TransitionRequest { actor, transition },
                (EntityKind::Abstract, id),
            )
            .await?;
        info!(abstract_id = id, action, role = %actor.role, status = %updated.status, "transition applied");
        Ok(updated)
    }

    async fn abstracts_assigned_to(
        &self,
        editor_id: EditorId,
    ) -> Result<Vec<ConferenceAbstract>, EditorialError> {
        self.get_json(&format!("/editors/{editor_id}/abstracts"), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequiredField;
    use crate::workflow::{AbstractStatus, Decision, ManuscriptStatus};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pending_json() -> serde_json::Value {
        json!({
            "id": 1,
            "manuscript_id": "MS-2024-001",
            "title": "Soil carbon",
            "status": "Pending",
            "editor_status": null,
            "createdAt": "2024-03-01T09:00:00Z",
            "updatedAt": "2024-03-01T09:00:00Z"
        })
    }

    fn assigned_json() -> serde_json::Value {
        let mut value = pending_json();
        value["status"] = json!("Assigned to Editor");
        value["editor_status"] = json!("Pending Review");
        value["assigned_editor_id"] = json!(7);
        value["updatedAt"] = json!("2024-03-02T09:00:00Z");
        value
    }

    fn client(server: &MockServer) -> RestWorkflowService {
        RestWorkflowService::new(server.uri(), "secret").unwrap()
    }

    #[tokio::test]
    async fn fetch_manuscript_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manuscripts/1"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pending_json()))
            .expect(1)
            .mount(&server)
            .await;

        let m = client(&server).fetch_manuscript(1).await.unwrap();
        assert_eq!(m.manuscript_id, "MS-2024-001");
        assert_eq!(m.status, ManuscriptStatus::Pending);
    }

    #[tokio::test]
    async fn not_found_maps_to_entity_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/abstracts/5"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server).fetch_abstract(5).await.unwrap_err();
        assert_eq!(
            err.as_workflow(),
            Some(&WorkflowError::EntityNotFound {
                kind: EntityKind::Abstract,
                id: 5
            })
        );
    }

    #[tokio::test]
    async fn assign_editor_checks_locally_then_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manuscripts/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pending_json()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/editors"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 7, "name": "Prof. J. Mensah"}])),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/manuscripts/1/transitions"))
            .and(body_partial_json(json!({
                "actor": {"id": 1, "role": "admin"},
                "transition": {"name": "assign_editor", "editor_id": 7}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(assigned_json()))
            .expect(1)
            .mount(&server)
            .await;

        let m = client(&server)
            .apply_manuscript_transition(
                1,
                &ManuscriptTransition::AssignEditor { editor_id: 7 },
                &Actor::admin(1),
            )
            .await
            .unwrap();
        assert_eq!(m.status, ManuscriptStatus::AssignedToEditor);
        assert_eq!(m.assigned_editor_id, Some(7));
    }

    #[tokio::test]
    async fn guard_failure_never_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manuscripts/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(assigned_json()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(assigned_json()))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server)
            .apply_manuscript_transition(
                1,
                &ManuscriptTransition::EditorReview {
                    decision: Decision::Accept,
                    comment: String::new(),
                },
                &Actor::editor(7),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.as_workflow(),
            Some(&WorkflowError::MissingRequiredField(RequiredField::Comment))
        );
    }

    #[tokio::test]
    async fn unknown_editor_is_caught_before_posting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manuscripts/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pending_json()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/editors"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server)
            .apply_manuscript_transition(
                1,
                &ManuscriptTransition::AssignEditor { editor_id: 7 },
                &Actor::admin(1),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.as_workflow(),
            Some(&WorkflowError::UnknownReference { editor_id: 7 })
        );
    }

    #[tokio::test]
    async fn server_rejection_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manuscripts/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(assigned_json()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/manuscripts/1/transitions"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"message": "Manuscript was updated by someone else"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .apply_manuscript_transition(
                1,
                &ManuscriptTransition::EditorReview {
                    decision: Decision::Accept,
                    comment: "Fine".into(),
                },
                &Actor::editor(7),
            )
            .await
            .unwrap_err();
        match err {
            EditorialError::Api(ApiError::Status { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "Manuscript was updated by someone else");
            }
            other => panic!("expected API status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn plain_text_error_body_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/editors"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client(&server).editors().await.unwrap_err();
        assert_eq!(err.to_string(), "API error: status 502: bad gateway");
    }

    #[tokio::test]
    async fn lists_abstracts_for_editor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/editors/9/abstracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 21,
                "status": "Assigned to Conference Editor",
                "assigned_editor": 3,
                "assigned_conference_editor": 9,
                "createdAt": "2024-05-10T12:00:00Z",
                "updatedAt": "2024-05-13T12:00:00Z"
            }])))
            .mount(&server)
            .await;

        let list = client(&server).abstracts_assigned_to(9).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, AbstractStatus::AssignedToConferenceEditor);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let svc = RestWorkflowService::new("http://localhost:8080/api/", "").unwrap();
        assert_eq!(svc.url("/editors"), "http://localhost:8080/api/editors");
    }
}
