use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::ingest::models::{
    ImportRequest, LimitQuery, MapRequest, MapResponse, PostHistoryResponse, PreviewResponse,
};
use crate::ingest::orchestrator::ImportOutcome;
use crate::ingest::parser::parse_csv;
use crate::mapping::{map_row, suggest_mapping, validate};
use crate::models::{ImportRow, RecomputeRunRow};
use crate::state::AppState;

const CSV_CONTENT_TYPES: &[&str] = &[
    "text/csv",
    "text/plain",
    "application/csv",
    "application/vnd.ms-excel",
];

/// POST /api/v1/imports/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PreviewResponse>, AppError> {
    let mut upload: Option<(Option<String>, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        if !is_csv_upload(field.content_type(), file_name.as_deref()) {
            return Err(AppError::UnsupportedMediaType(format!(
                "Expected a CSV file, got {}",
                field.content_type().unwrap_or("unknown content type")
            )));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    let parsed = parse_csv(&bytes)?;

    let suggested_mapping = suggest_mapping(&state.settings.synonyms, &parsed.headers);
    let validation = validate(&suggested_mapping);
    let preview = parsed
        .rows
        .iter()
        .take(state.config.preview_rows)
        .map(|raw| map_row(raw, &suggested_mapping))
        .collect();

    info!(
        file = file_name.as_deref().unwrap_or("<unnamed>"),
        headers = parsed.headers.len(),
        rows = parsed.rows.len(),
        "Parsed CSV upload"
    );

    Ok(Json(PreviewResponse {
        file_name,
        headers: parsed.headers,
        rows: parsed.rows,
        suggested_mapping,
        validation,
        preview,
    }))
}

/// POST /api/v1/imports/map
pub async fn handle_map(Json(req): Json<MapRequest>) -> Json<MapResponse> {
    let validation = validate(&req.mapping);
    let rows = req.rows.iter().map(|raw| map_row(raw, &req.mapping)).collect();
    Json(MapResponse { validation, rows })
}

/// POST /api/v1/imports
pub async fn handle_import(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Json<ImportOutcome> {
    let rows = req.rows.len();
    let outcome = state
        .importer
        .import(req.file_name, &req.mapping, req.rows)
        .await;
    info!(rows, success = outcome.is_success(), "Handled import submission");
    Json(outcome)
}

/// GET /api/v1/imports
pub async fn handle_list_imports(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<ImportRow>>, AppError> {
    let Some(owner) = state
        .store
        .find_user(&state.config.default_username)
        .await
        .map_err(AppError::Internal)?
    else {
        return Ok(Json(Vec::new()));
    };
    let imports = state
        .store
        .list_imports(owner.id, params.clamped())
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(imports))
}

/// GET /api/v1/posts/:x_post_id/snapshots
pub async fn handle_post_snapshots(
    State(state): State<AppState>,
    Path(x_post_id): Path<String>,
) -> Result<Json<PostHistoryResponse>, AppError> {
    let (post, snapshots) = state
        .store
        .list_post_snapshots(&x_post_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("Post {x_post_id} not found")))?;
    Ok(Json(PostHistoryResponse { post, snapshots }))
}

/// GET /api/v1/recompute/runs
pub async fn handle_recompute_runs(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<RecomputeRunRow>>, AppError> {
    let runs = state
        .store
        .list_recompute_runs(params.clamped())
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(runs))
}

fn is_csv_upload(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    let by_type = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .is_some_and(|ct| CSV_CONTENT_TYPES.contains(&ct.as_str()));
    let by_name = file_name.is_some_and(|name| name.to_ascii_lowercase().ends_with(".csv"));
    by_type || by_name
}
