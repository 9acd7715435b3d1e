//! HTTP routes for the prediction page, the report page and the JSON API.

use std::sync::Arc;

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use gizi_core::report::{build_report, ReportOptions};
use gizi_core::{predictor, AppContext, DataReport, GiziError, Prediction, VERSION};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::form::{FormError, PredictForm, PredictRequest};
use crate::render::{self, Banner};

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
    pub options: ReportOptions,
}

impl AppState {
    pub fn new(ctx: AppContext, options: ReportOptions) -> Self {
        Self {
            ctx: Arc::new(ctx),
            options,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/predict", post(handle_predict_form))
        .route("/report", get(handle_report))
        .route("/report/predict", post(handle_report_predict))
        .route("/api/health", get(handle_health))
        .route("/api/predict", post(handle_api_predict))
        .route("/api/report", get(handle_api_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<GiziError> for ApiError {
    fn from(err: GiziError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

fn status_for(err: &GiziError) -> StatusCode {
    match err {
        GiziError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        GiziError::UnknownCategory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_fingerprint: Option<String>,
    feature_names: Vec<String>,
    classes: Vec<String>,
}

async fn handle_index() -> Html<String> {
    Html(render::prediction_page(None))
}

async fn handle_predict_form(
    State(state): State<AppState>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> (StatusCode, Html<String>) {
    match predict_from_form(&state.ctx, form) {
        Ok(prediction) => (
            StatusCode::OK,
            Html(render::prediction_page(Some(Banner::Prediction(&prediction)))),
        ),
        Err(err) => (
            err.status,
            Html(render::prediction_page(Some(Banner::Error(&err.message)))),
        ),
    }
}

async fn handle_report(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    match build_report(&state.ctx, state.options) {
        Ok(report) => (StatusCode::OK, Html(render::report_page(&report, None))),
        Err(err) => report_failure(err),
    }
}

async fn handle_report_predict(
    State(state): State<AppState>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let report = match build_report(&state.ctx, state.options) {
        Ok(report) => report,
        Err(err) => return report_failure(err),
    };
    match predict_from_form(&state.ctx, form) {
        Ok(prediction) => (
            StatusCode::OK,
            Html(render::report_page(
                &report,
                Some(Banner::Prediction(&prediction)),
            )),
        ),
        Err(err) => (
            err.status,
            Html(render::report_page(&report, Some(Banner::Error(&err.message)))),
        ),
    }
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: VERSION,
        model_fingerprint: state.ctx.model_fingerprint().map(str::to_string),
        feature_names: state.ctx.classifier().feature_names().to_vec(),
        classes: state.ctx.labels().status.classes().to_vec(),
    })
}

async fn handle_api_predict(
    State(state): State<AppState>,
    request: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let Json(request) = request?;
    let record = request.to_record()?;
    let prediction = predictor::run(&state.ctx, &record)?;
    Ok(Json(prediction))
}

async fn handle_api_report(State(state): State<AppState>) -> Result<Json<DataReport>, ApiError> {
    let report = build_report(&state.ctx, state.options)?;
    Ok(Json(report))
}

fn predict_from_form(
    ctx: &AppContext,
    form: Result<Form<PredictForm>, FormRejection>,
) -> Result<Prediction, ApiError> {
    let Form(form) = form.map_err(|rejection| {
        warn!("Rejected form body: {}", rejection);
        ApiError::from(rejection)
    })?;
    let record = form.to_record()?;
    predictor::run(ctx, &record).map_err(|err| {
        warn!("Prediction failed: {}", err);
        ApiError::from(err)
    })
}

fn report_failure(err: GiziError) -> (StatusCode, Html<String>) {
    warn!("Report failed: {}", err);
    (
        status_for(&err),
        Html(render::error_page("Gagal memuat data", &err.to_string())),
    )
}
