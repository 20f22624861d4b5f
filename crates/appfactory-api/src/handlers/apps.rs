//! App creation, listing and cleanup handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use tracing::info;

use appfactory_core::{CleanupSummary, CreatedApp};
use appfactory_models::{escape_html, AppRecord};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{AppListResponse, AppSummary, CleanupRequest, CreateAppRequest};

/// Caller id used when a request does not carry one.
const ANONYMOUS_CALLER: &str = "web";

/// POST /api/create-app - Run the full pipeline for one app.
pub async fn create_app(
    State(state): State<AppState>,
    Json(req): Json<CreateAppRequest>,
) -> Result<(StatusCode, Json<CreatedApp>)> {
    if req.app_name.trim().is_empty() {
        return Err(ApiError::BadRequest("appName is required".to_string()));
    }

    let caller = req.user_id.as_deref().unwrap_or(ANONYMOUS_CALLER);
    let created = state.factory.create_app(&req.app_name, caller).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /apps - All created apps, newest first.
pub async fn list_apps(State(state): State<AppState>) -> Json<AppListResponse> {
    let apps: Vec<AppSummary> = state
        .factory
        .registry()
        .list()
        .await
        .into_iter()
        .map(|record| AppSummary {
            link: state.factory.app_link(&record.slug),
            record,
        })
        .collect();
    let total = apps.len();

    Json(AppListResponse { apps, total })
}

/// GET /app/:slug - HTML page for one app.
pub async fn app_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let record = state
        .factory
        .registry()
        .get(&slug)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("app not found: {}", slug)))?;

    Ok(Html(render_app_page(&record)))
}

/// POST /api/cleanup - Delete repositories.
pub async fn cleanup(
    State(state): State<AppState>,
    body: Option<Json<CleanupRequest>>,
) -> Result<Json<CleanupSummary>> {
    let repos = body.and_then(|Json(req)| req.repos);
    info!(explicit = repos.is_some(), "Cleanup requested over HTTP");
    let summary = state.factory.cleanup(repos).await?;
    Ok(Json(summary))
}

fn render_app_page(record: &AppRecord) -> String {
    let name = escape_html(&record.name);
    let deployed = escape_html(&record.deployed_url);
    let repo = escape_html(&record.repo_url);
    let mock_note = if record.deploy_mock {
        "<p class=\"note\">Placeholder deployment URL: hosting is not configured.</p>"
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{name}</title>
  <style>
    body {{ font-family: system-ui, sans-serif; max-width: 40rem; margin: 3rem auto; padding: 0 1rem; }}
    .note {{ color: #92400e; }}
    dt {{ font-weight: 600; margin-top: 1rem; }}
  </style>
</head>
<body>
  <h1>{name}</h1>
  <dl>
    <dt>Live URL</dt><dd><a href="{deployed}">{deployed}</a></dd>
    <dt>Source</dt><dd><a href="{repo}">{repo}</a></dd>
    <dt>Created</dt><dd>{created}</dd>
  </dl>
  {mock_note}
</body>
</html>
"#,
        created = record.created_at.to_rfc3339(),
    )
}
