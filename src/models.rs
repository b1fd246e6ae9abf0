use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::service::AppointmentService;

#[derive(Clone)]
pub struct AppState {
    pub appointments: Arc<AppointmentService>,
}

/* -------------------------
   Status values
--------------------------*/

/// Status assigned by storage when an appointment is created.
pub const STATUS_REQUESTED: &str = "Solicitada";
pub const STATUS_SCHEDULED: &str = "Programada";
pub const STATUS_CANCELLED: &str = "Cancelada";

/* -------------------------
   Request DTOs
--------------------------*/

/// Booking request as received from a caller. Fields stay raw strings so
/// the validator can tell "absent" from "blank" from "malformed".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAppointment {
    pub patient_id: Option<String>,
    pub reason: Option<String>,
}

/// Single-field amendment of an existing appointment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentPatch {
    pub appointment_id: Option<String>,
    pub reason: Option<String>,
    pub status: Option<String>,
}

/// Search options for `get_appointments`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilters {
    pub status: Option<String>,
    /// External identity number of the patient, not the internal `patient_id`.
    pub id_number: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/* -------------------------
   Validated intents
--------------------------*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCreate {
    pub patient_id: Uuid,
    pub reason: String,
}

/// The one field an update call is allowed to change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentMutation {
    ChangeReason(String),
    ChangeStatus(String),
}

impl AppointmentMutation {
    pub fn field(&self) -> AppointmentField {
        match self {
            AppointmentMutation::ChangeReason(_) => AppointmentField::Reason,
            AppointmentMutation::ChangeStatus(_) => AppointmentField::Status,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            AppointmentMutation::ChangeReason(v) | AppointmentMutation::ChangeStatus(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentField {
    Reason,
    Status,
}

impl AppointmentField {
    pub fn column(self) -> &'static str {
        match self {
            AppointmentField::Reason => "reason",
            AppointmentField::Status => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpdate {
    pub appointment_id: Uuid,
    pub mutation: AppointmentMutation,
}

/// Normalized search: blank text filters are already dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentQuery {
    pub status: Option<String>,
    pub id_number: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/* -------------------------
   Response DTOs
--------------------------*/

pub const MESSAGE_CREATED: &str = "Created";
pub const MESSAGE_UPDATED: &str = "Updated!";
pub const MESSAGE_FOUND: &str = "Found";

#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub appointment_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdatedResponse {
    pub message: String,
    pub appointment_id: Uuid,
    pub field: AppointmentField,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetail {
    pub message: String,
    #[serde(flatten)]
    pub appointment: Appointment,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientAppointments {
    pub message: String,
    pub appointments: Vec<Appointment>,
}
