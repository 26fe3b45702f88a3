use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use catalog::{
    models::{ContactSubmission, Insight, Pillar, ServiceDetail, SystemStatus},
    slug::slug,
};
use resolver::{Content, ContentKind, cache::Resolved, contact::ContactOutcome};
use serde::Serialize;
use tracing::info;

use crate::{error::AppError, state::AppState};

#[derive(Serialize, Debug)]
pub struct ContactResponse {
    pub delivered: bool,
    pub outcome: ContactOutcome,
}

pub async fn list_handler<T>(State(state): State<Arc<AppState>>) -> Json<Resolved<T>>
where
    T: Content + Serialize,
{
    Json(state.resolver.resolve::<T>().await)
}

pub async fn pillar_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Pillar>, AppError> {
    let pillars = state.resolver.pillars().await;

    find_pillar(&pillars, &key).cloned().map(Json)
}

pub async fn service_handler(
    State(state): State<Arc<AppState>>,
    Path((pillar_key, service_key)): Path<(String, String)>,
) -> Result<Json<ServiceDetail>, AppError> {
    let pillars = state.resolver.pillars().await;
    let pillar = find_pillar(&pillars, &pillar_key)?;
    let key = slug(&service_key);

    pillar
        .service_details
        .iter()
        .find(|detail| slug(&detail.name) == key)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Service {service_key}")))
}

pub async fn insight_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Insight>, AppError> {
    let insights = state.resolver.insights().await;
    let wanted = slug(&key);

    insights
        .iter()
        .find(|insight| slug(&insight.title) == wanted)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Insight {key}")))
}

pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    Json(state.resolver.status().await)
}

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<Json<ContactResponse>, AppError> {
    let Json(form) = payload.map_err(|_| AppError::MalformedPayload)?;
    let outcome = state.resolver.submit_contact(&form).await?;

    Ok(Json(ContactResponse {
        delivered: outcome.delivered(),
        outcome,
    }))
}

pub async fn invalidate_all_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    authorize(&state, &headers)?;
    state.resolver.invalidate_all();

    Ok(StatusCode::NO_CONTENT)
}

pub async fn invalidate_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    authorize(&state, &headers)?;
    let kind: ContentKind = kind.parse()?;
    state.resolver.invalidate(kind);

    Ok(StatusCode::NO_CONTENT)
}

fn find_pillar<'a>(pillars: &'a [Pillar], key: &str) -> Result<&'a Pillar, AppError> {
    let wanted = slug(key);

    pillars
        .iter()
        .find(|pillar| slug(&pillar.title) == wanted)
        .ok_or_else(|| AppError::NotFound(format!("Pillar {key}")))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        return Err(AppError::Forbidden);
    };

    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    if presented == Some(expected) {
        Ok(())
    } else {
        info!("Rejected cache invalidation with bad token");
        Err(AppError::Unauthorized)
    }
}
