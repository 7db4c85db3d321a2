use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::RankedResult;
use crate::services::recommendations::{self, Diagnostics, Recommendation};
use crate::services::Deadline;

use super::AppState;

// Request/Response types

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub mode: Option<String>,
    pub title: Option<String>,
    pub debug: Option<String>,
}

impl RecommendationQuery {
    pub fn debug_enabled(&self) -> bool {
        matches!(
            self.debug.as_deref().map(str::trim),
            Some("1") | Some("true")
        )
    }
}

/// What a `/recommendations` request asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationMode {
    Diagnostic,
    SingleSeed { title: String },
    AggregatedSeed,
    InvalidMode(String),
}

impl RecommendationMode {
    /// Parses the mode once; `similar` without a title is rejected here
    pub fn from_query(query: &RecommendationQuery) -> AppResult<Self> {
        let mode = query
            .mode
            .as_deref()
            .map(|m| m.trim().to_lowercase())
            .unwrap_or_else(|| "similar".to_string());

        match mode.as_str() {
            "diag" => Ok(Self::Diagnostic),
            "user" => Ok(Self::AggregatedSeed),
            "similar" => {
                let title = query
                    .title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        AppError::InvalidInput("Missing 'title' query parameter".to_string())
                    })?;
                Ok(Self::SingleSeed {
                    title: title.to_string(),
                })
            }
            _ => Ok(Self::InvalidMode(mode)),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Diagnostic => "diag",
            Self::SingleSeed { .. } => "similar",
            Self::AggregatedSeed => "user",
            Self::InvalidMode(mode) => mode,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecommendationResponse {
    #[serde(rename_all = "camelCase")]
    Diagnostic {
        tmdb_key_present: bool,
        user_table_set: bool,
    },
    Recommendations {
        mode: String,
        seed: String,
        recommendations: Vec<RankedResult>,
        #[serde(skip_serializing_if = "Option::is_none")]
        debug: Option<Diagnostics>,
    },
}

impl RecommendationResponse {
    fn from_recommendation(mode: &str, recommendation: Recommendation, debug: bool) -> Self {
        Self::Recommendations {
            mode: mode.to_string(),
            seed: recommendation.seed,
            recommendations: recommendation.ranking.results,
            debug: debug.then_some(recommendation.diagnostics),
        }
    }
}

// Health check

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

// Recommendations

/// CORS preflight
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let mode = RecommendationMode::from_query(&query)?;
    let debug_enabled = query.debug_enabled();

    tracing::info!(
        request_id = %request_id,
        mode = %mode.label(),
        debug = debug_enabled,
        "Recommendation request"
    );

    let response = match mode {
        RecommendationMode::Diagnostic => diagnostic(&state),
        RecommendationMode::SingleSeed { title } => similar(&state, &title, debug_enabled).await?,
        RecommendationMode::AggregatedSeed => user(&state, debug_enabled).await?,
        RecommendationMode::InvalidMode(mode) => {
            return Err(AppError::InvalidInput(format!("Unknown mode: {}", mode)));
        }
    };

    Ok(Json(response))
}

fn diagnostic(state: &AppState) -> RecommendationResponse {
    RecommendationResponse::Diagnostic {
        tmdb_key_present: state.config.tmdb_key().is_some(),
        user_table_set: state.config.redis_url.is_some(),
    }
}

async fn similar(state: &AppState, title: &str, debug: bool) -> AppResult<RecommendationResponse> {
    let metadata = state.metadata()?;
    let deadline = Deadline::start(state.config.time_budget());

    let recommendation = recommendations::recommend_similar(&metadata, title, &deadline).await?;

    Ok(RecommendationResponse::from_recommendation(
        "similar",
        recommendation,
        debug,
    ))
}

async fn user(state: &AppState, debug: bool) -> AppResult<RecommendationResponse> {
    let metadata = state.metadata()?;
    let history = state.watch_history()?;
    let deadline = Deadline::start(state.config.time_budget());

    let recommendation =
        recommendations::recommend_for_history(&metadata, history.as_ref(), &deadline).await?;

    Ok(RecommendationResponse::from_recommendation(
        "user",
        recommendation,
        debug,
    ))
}
