// src/routes/appointment_routes.rs

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    error::ApiError,
    models::{
        AppState, Appointment, AppointmentDetail, AppointmentFilters, AppointmentPatch,
        CreatedResponse, NewAppointment, PatientAppointments, UpdatedResponse,
    },
    validator::parse_id,
};

// Extractors are taken as `Result` so malformed input is rendered by `ApiError`
// instead of axum's plain-text rejection.

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(search_appointments).post(create_appointment))
        .route(
            "/appointments/{appointment_id}",
            get(get_appointment).patch(patch_appointment),
        )
        .route("/patients/{patient_id}/appointments", get(get_patient_appointments))
}

/* ============================================================
   POST /appointments
   ============================================================ */

pub async fn create_appointment(
    State(state): State<AppState>,
    body: Result<Json<NewAppointment>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(req) = body?;
    let created = state.appointments.create(&req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/* ============================================================
   PATCH /appointments/{id}
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct PatchAppointmentRequest {
    pub reason: Option<String>,
    pub status: Option<String>,
}

pub async fn patch_appointment(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<PatchAppointmentRequest>, JsonRejection>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let Path(appointment_id) = path?;
    let Json(req) = body?;
    let patch = AppointmentPatch {
        appointment_id: Some(appointment_id),
        reason: req.reason,
        status: req.status,
    };
    Ok(Json(state.appointments.update(&patch).await?))
}

/* ============================================================
   GET /appointments/{id}
   ============================================================ */

pub async fn get_appointment(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<AppointmentDetail>, ApiError> {
    let Path(raw) = path?;
    let appointment_id = parse_id(&raw, "appointment_id")?;
    Ok(Json(state.appointments.get(appointment_id).await?))
}

/* ============================================================
   GET /patients/{id}/appointments
   ============================================================ */

pub async fn get_patient_appointments(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<PatientAppointments>, ApiError> {
    let Path(raw) = path?;
    let patient_id = parse_id(&raw, "patient_id")?;
    Ok(Json(state.appointments.get_my_appointments(patient_id).await?))
}

/* ============================================================
   GET /appointments?status=&id_number=&limit=&offset=
   ============================================================ */

pub async fn search_appointments(
    State(state): State<AppState>,
    query: Result<Query<AppointmentFilters>, QueryRejection>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let Query(filters) = query?;
    Ok(Json(state.appointments.get_appointments(&filters).await?))
}
