//! HTTP routes over the reference-consistency manager.

use crate::{ApiError, AppState};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use scp_core::{NewScp, NewTale, Page, ReconcileReport, Scp, ScpPatch, ScpTale, TalePatch};
use scp_error::{ScpArchiveError, ServerError, ServerErrorKind};
use scp_interface::DocumentStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::warn;

type ApiResult<T> = Result<T, ApiError>;

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Documents per page
    pub limit: Option<u64>,
}

/// Build the API router.
///
/// | Method | Path | |
/// |---|---|---|
/// | GET | `/health` | store reachability |
/// | GET, POST | `/scps` | list, create |
/// | GET, PATCH, DELETE | `/scps/:scp_id` | read, merge-update, delete |
/// | GET, POST | `/tales` | list, create |
/// | GET, PATCH, DELETE | `/tales/:id` | read, merge-update, delete |
/// | GET | `/admin/audit` | report reference inconsistencies |
/// | POST | `/admin/reconcile` | rebuild back-references |
pub fn router<S>(state: AppState<S>) -> Router
where
    S: DocumentStore + 'static,
    S::TaleId: FromStr + Serialize,
{
    Router::new()
        .route("/health", get(health::<S>))
        .route("/scps", get(list_scps::<S>).post(create_scp::<S>))
        .route(
            "/scps/:scp_id",
            get(get_scp::<S>)
                .patch(update_scp::<S>)
                .delete(delete_scp::<S>),
        )
        .route("/tales", get(list_tales::<S>).post(create_tale::<S>))
        .route(
            "/tales/:id",
            get(get_tale::<S>)
                .patch(update_tale::<S>)
                .delete(delete_tale::<S>),
        )
        .route("/admin/audit", get(audit::<S>))
        .route("/admin/reconcile", post(reconcile::<S>))
        .with_state(state)
}

fn bad_parameter(message: impl Into<String>) -> ApiError {
    ApiError::from(ScpArchiveError::from(ServerError::new(
        ServerErrorKind::InvalidParameter(message.into()),
    )))
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::from(ScpArchiveError::from(ServerError::new(
        ServerErrorKind::InvalidBody(rejection.body_text()),
    )))
}

fn params(query: Result<Query<ListParams>, QueryRejection>) -> ApiResult<ListParams> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| bad_parameter(rejection.body_text()))
}

fn tale_id<S>(raw: &str) -> ApiResult<S::TaleId>
where
    S: DocumentStore,
    S::TaleId: FromStr,
{
    raw.parse()
        .map_err(|_| bad_parameter(format!("'{}' is not a valid tale id", raw)))
}

async fn health<S: DocumentStore>(State(state): State<AppState<S>>) -> Response {
    match state.manager().store().count_scps().await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

async fn list_scps<S>(
    State(state): State<AppState<S>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Page<Scp<S::TaleId>>>>
where
    S: DocumentStore,
    S::TaleId: Serialize,
{
    let params = params(query)?;
    let request = state.limits().request(params.page, params.limit);
    Ok(Json(state.manager().list_scps(request).await?))
}

async fn create_scp<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewScp>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Scp<S::TaleId>>)>
where
    S: DocumentStore,
    S::TaleId: Serialize,
{
    let Json(scp) = payload.map_err(bad_body)?;
    let created = state.manager().create_scp(scp).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_scp<S>(
    State(state): State<AppState<S>>,
    Path(scp_id): Path<String>,
) -> ApiResult<Json<Scp<S::TaleId>>>
where
    S: DocumentStore,
    S::TaleId: Serialize,
{
    Ok(Json(state.manager().get_scp(&scp_id).await?))
}

async fn update_scp<S>(
    State(state): State<AppState<S>>,
    Path(scp_id): Path<String>,
    payload: Result<Json<ScpPatch>, JsonRejection>,
) -> ApiResult<Json<Scp<S::TaleId>>>
where
    S: DocumentStore,
    S::TaleId: Serialize,
{
    let Json(patch) = payload.map_err(bad_body)?;
    Ok(Json(state.manager().update_scp(&scp_id, patch).await?))
}

async fn delete_scp<S>(
    State(state): State<AppState<S>>,
    Path(scp_id): Path<String>,
) -> ApiResult<Json<Scp<S::TaleId>>>
where
    S: DocumentStore,
    S::TaleId: Serialize,
{
    Ok(Json(state.manager().delete_scp(&scp_id).await?))
}

async fn list_tales<S>(
    State(state): State<AppState<S>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Page<ScpTale<S::TaleId>>>>
where
    S: DocumentStore,
    S::TaleId: Serialize,
{
    let params = params(query)?;
    let request = state.limits().request(params.page, params.limit);
    Ok(Json(state.manager().list_tales(request).await?))
}

async fn create_tale<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewTale>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ScpTale<S::TaleId>>)>
where
    S: DocumentStore,
    S::TaleId: Serialize,
{
    let Json(tale) = payload.map_err(bad_body)?;
    let created = state.manager().create_tale(tale).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_tale<S>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<ScpTale<S::TaleId>>>
where
    S: DocumentStore,
    S::TaleId: FromStr + Serialize,
{
    let id = tale_id::<S>(&raw_id)?;
    Ok(Json(state.manager().get_tale(&id).await?))
}

async fn update_tale<S>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<TalePatch>, JsonRejection>,
) -> ApiResult<Json<ScpTale<S::TaleId>>>
where
    S: DocumentStore,
    S::TaleId: FromStr + Serialize,
{
    let id = tale_id::<S>(&raw_id)?;
    let Json(patch) = payload.map_err(bad_body)?;
    Ok(Json(state.manager().update_tale(&id, patch).await?))
}

async fn delete_tale<S>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<ScpTale<S::TaleId>>>
where
    S: DocumentStore,
    S::TaleId: FromStr + Serialize,
{
    let id = tale_id::<S>(&raw_id)?;
    Ok(Json(state.manager().delete_tale(&id).await?))
}

async fn audit<S>(State(state): State<AppState<S>>) -> ApiResult<Json<ReconcileReport<S::TaleId>>>
where
    S: DocumentStore,
    S::TaleId: Serialize,
{
    Ok(Json(state.manager().audit().await?))
}

async fn reconcile<S>(
    State(state): State<AppState<S>>,
) -> ApiResult<Json<ReconcileReport<S::TaleId>>>
where
    S: DocumentStore,
    S::TaleId: Serialize,
{
    Ok(Json(state.manager().reconcile().await?))
}
