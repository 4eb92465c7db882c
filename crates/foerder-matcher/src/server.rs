/// MCP server exposing programme matching to the intake chat.
///
/// Exposes four tools:
/// - `match_programmes`: Filter and rank funding programmes for an answer set
/// - `answer_status`: Which question to ask next
/// - `merge_answers`: Fold newly extracted values into the answer set
/// - `refresh_corpus`: Re-read the programme corpus file
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::{error, info};

use crate::api::{
    AnswerStatusParams, AnswerStatusResponse, MatchProgrammesParams, MatchProgrammesResponse,
    MergeAnswersParams, RefreshCorpusResponse,
};
use crate::service::MatchService;
use foerder_core::answers::{is_complete, merge_answers, next_missing, status_lines};
use foerder_core::model::AnswerSet;

const MAX_TOP_K: u32 = 20;

pub const NO_MATCHES_MESSAGE: &str = "Kein Treffer nach den Filtern. Ändere eine Angabe oder \
                                      beschreibe dein Projekt ausführlicher.";

#[derive(Clone)]
pub struct FoerderMatcherServer {
    service: Arc<MatchService>,
    tool_router: ToolRouter<FoerderMatcherServer>,
}

impl FoerderMatcherServer {
    pub fn new(service: Arc<MatchService>) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl FoerderMatcherServer {
    #[tool(description = "Find funding programmes for an applicant. Applies hard eligibility rules (category, federal state, own contribution) and ranks the rest by relevance to the project description.")]
    async fn match_programmes(
        &self,
        Parameters(params): Parameters<MatchProgrammesParams>,
    ) -> Result<Json<MatchProgrammesResponse>, String> {
        let top_k = params.top_k.map(|k| k.clamp(1, MAX_TOP_K) as usize);

        // Failures are logged for the operator; the applicant just sees no matches.
        let matches = match self
            .service
            .search(params.answers, params.project_text, top_k)
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                error!(error = %e, "programme matching failed");
                Vec::new()
            }
        };

        let message = matches.is_empty().then(|| NO_MATCHES_MESSAGE.to_string());
        Ok(Json(MatchProgrammesResponse { matches, message }))
    }

    #[tool(description = "Report which of the six intake questions are answered and which question to ask next.")]
    async fn answer_status(
        &self,
        Parameters(params): Parameters<AnswerStatusParams>,
    ) -> Result<Json<AnswerStatusResponse>, String> {
        let answers = params.answers;
        let next = next_missing(&answers);
        Ok(Json(AnswerStatusResponse {
            complete: is_complete(&answers),
            next_field: next.map(|f| f.key().to_string()),
            next_question: next.map(|f| f.label().to_string()),
            status: status_lines(&answers),
        }))
    }

    #[tool(description = "Merge newly extracted answer values into the current answer set. Values of \"not found\" never overwrite known answers.")]
    async fn merge_answers(
        &self,
        Parameters(params): Parameters<MergeAnswersParams>,
    ) -> Result<Json<AnswerSet>, String> {
        Ok(Json(merge_answers(&params.current, &params.updates)))
    }

    #[tool(description = "Re-read the funding programme corpus from disk. Reports whether its content changed.")]
    async fn refresh_corpus(&self) -> Result<Json<RefreshCorpusResponse>, String> {
        info!("refresh_corpus tool invoked");

        let result = self
            .service
            .refresh()
            .await
            .map_err(|e| format!("refresh failed: {e}"))?;

        info!(
            changed = result.changed,
            programmes = result.programme_count,
            "corpus refresh finished"
        );
        Ok(Json(RefreshCorpusResponse {
            changed: result.changed,
            programme_count: result.programme_count,
            fingerprint: result.fingerprint,
        }))
    }
}

#[tool_handler]
impl ServerHandler for FoerderMatcherServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "foerder-matcher".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Funding programme matcher for a German funding intake chat. Use \
                 merge_answers and answer_status while collecting the six answers, \
                 match_programmes to rank eligible programmes for the project \
                 description, and refresh_corpus after the programme data was rebuilt."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foerder_core::config::MatchConfig;

    #[test]
    fn tools_publish_output_schemas() {
        let tools = FoerderMatcherServer::tool_router().list_all();
        for name in [
            "match_programmes",
            "answer_status",
            "merge_answers",
            "refresh_corpus",
        ] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }

    fn server(corpus_path: std::path::PathBuf) -> FoerderMatcherServer {
        FoerderMatcherServer::new(Arc::new(MatchService::new(MatchConfig::new(corpus_path))))
    }

    #[tokio::test]
    async fn unreadable_corpus_yields_no_matches_message() {
        let dir = tempfile::TempDir::new().unwrap();
        let server = server(dir.path().join("missing.json"));
        let Json(response) = server
            .match_programmes(Parameters(MatchProgrammesParams {
                answers: AnswerSet::default(),
                project_text: "Neue Heizung".to_string(),
                top_k: None,
            }))
            .await
            .unwrap();
        assert!(response.matches.is_empty());
        assert_eq!(response.message.as_deref(), Some(NO_MATCHES_MESSAGE));
    }

    #[tokio::test]
    async fn answer_status_points_to_next_question() {
        let dir = tempfile::TempDir::new().unwrap();
        let server = server(dir.path().join("unused.json"));
        let answers = AnswerSet {
            kategorie: "Innovation".to_string(),
            ..AnswerSet::default()
        };
        let Json(status) = server
            .answer_status(Parameters(AnswerStatusParams { answers }))
            .await
            .unwrap();
        assert!(!status.complete);
        assert_eq!(status.next_field.as_deref(), Some("branche"));
        assert_eq!(status.status.len(), 6);
    }
}
