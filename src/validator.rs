// src/validator.rs

//! Admission rules for appointment requests. Nothing here touches storage:
//! a request that fails these checks never reaches the store.

use uuid::Uuid;

use crate::{
    error::ValidationError,
    models::{
        AppointmentFilters, AppointmentMutation, AppointmentPatch, AppointmentQuery,
        NewAppointment, ValidatedCreate, ValidatedUpdate,
    },
};

/// The caller's value as given, or `None` when absent or only whitespace.
fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Parses an identifier taken from a request body or URL segment.
pub fn parse_id(raw: &str, field: &'static str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ValidationError::MalformedIdentifier(field))
}

/// Checks a booking request is complete. Patient existence is left to storage.
pub fn validate_create(req: &NewAppointment) -> Result<ValidatedCreate, ValidationError> {
    let patient_id = non_blank(req.patient_id.as_ref()).ok_or(ValidationError::MissingPatientId)?;
    let reason = non_blank(req.reason.as_ref()).ok_or(ValidationError::MissingReason)?;

    Ok(ValidatedCreate {
        patient_id: parse_id(patient_id, "patient_id")?,
        reason: reason.to_string(),
    })
}

/// Resolves an update request into exactly one mutation.
///
/// Both `reason` and `status` set is rejected rather than applied in sequence:
/// each call amends a single concern.
pub fn validate_update(req: &AppointmentPatch) -> Result<ValidatedUpdate, ValidationError> {
    let appointment_id =
        non_blank(req.appointment_id.as_ref()).ok_or(ValidationError::MissingAppointmentId)?;
    let appointment_id = parse_id(appointment_id, "appointment_id")?;

    let mutation = match (non_blank(req.reason.as_ref()), non_blank(req.status.as_ref())) {
        (Some(reason), None) => AppointmentMutation::ChangeReason(reason.to_string()),
        (None, Some(status)) => AppointmentMutation::ChangeStatus(status.to_string()),
        (None, None) => return Err(ValidationError::MissingMutation),
        (Some(_), Some(_)) => return Err(ValidationError::ConflictingMutation),
    };

    Ok(ValidatedUpdate {
        appointment_id,
        mutation,
    })
}

pub fn validate_filters(filters: &AppointmentFilters) -> Result<AppointmentQuery, ValidationError> {
    if filters.limit.is_some_and(|l| l < 1) {
        return Err(ValidationError::InvalidLimit);
    }
    if filters.offset.is_some_and(|o| o < 0) {
        return Err(ValidationError::InvalidOffset);
    }

    Ok(AppointmentQuery {
        status: non_blank(filters.status.as_ref()).map(str::to_string),
        id_number: non_blank(filters.id_number.as_ref()).map(str::to_string),
        limit: filters.limit,
        offset: filters.offset,
    })
}
