// src/service.rs

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{AppointmentError, StoreError},
    models::{
        Appointment, AppointmentDetail, AppointmentFilters, AppointmentPatch, CreatedResponse,
        NewAppointment, PatientAppointments, UpdatedResponse, MESSAGE_CREATED, MESSAGE_FOUND,
        MESSAGE_UPDATED,
    },
    store::AppointmentStore,
    validator::{validate_create, validate_filters, validate_update},
};

/// Validates appointment requests and runs them against the injected store.
pub struct AppointmentService {
    store: Arc<dyn AppointmentStore>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, req: &NewAppointment) -> Result<CreatedResponse, AppointmentError> {
        let valid = validate_create(req).inspect_err(|e| debug!("create rejected: {e}"))?;

        let appointment_id = self
            .store
            .insert_appointment(valid.patient_id, &valid.reason)
            .await
            .map_err(|e| match e {
                StoreError::ForeignKeyViolation => {
                    warn!("create for unknown patient {}", valid.patient_id);
                    AppointmentError::ReferentialIntegrity(valid.patient_id)
                }
                other => storage_failure("insert", other),
            })?;

        info!("appointment {appointment_id} created for patient {}", valid.patient_id);
        Ok(CreatedResponse {
            message: MESSAGE_CREATED.to_string(),
            appointment_id,
        })
    }

    /// The patch is only borrowed: the caller's value already holds the new
    /// field and the row is not read back.
    pub async fn update(&self, patch: &AppointmentPatch) -> Result<UpdatedResponse, AppointmentError> {
        let valid = validate_update(patch).inspect_err(|e| debug!("update rejected: {e}"))?;
        let field = valid.mutation.field();

        let rows = self
            .store
            .update_appointment_field(valid.appointment_id, &valid.mutation)
            .await
            .map_err(|e| storage_failure("update", e))?;

        if rows == 0 {
            return Err(AppointmentError::NotFound(valid.appointment_id));
        }

        info!("appointment {} {} updated", valid.appointment_id, field.column());
        Ok(UpdatedResponse {
            message: MESSAGE_UPDATED.to_string(),
            appointment_id: valid.appointment_id,
            field,
        })
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<AppointmentDetail, AppointmentError> {
        let appointment = self
            .store
            .get_appointment_by_id(appointment_id)
            .await
            .map_err(|e| storage_failure("get", e))?
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        Ok(AppointmentDetail {
            message: MESSAGE_FOUND.to_string(),
            appointment,
        })
    }

    pub async fn get_my_appointments(&self, patient_id: Uuid) -> Result<PatientAppointments, AppointmentError> {
        let appointments = self
            .store
            .list_appointments_by_patient(patient_id)
            .await
            .map_err(|e| storage_failure("list by patient", e))?;

        Ok(PatientAppointments {
            message: MESSAGE_FOUND.to_string(),
            appointments,
        })
    }

    pub async fn get_appointments(&self, filters: &AppointmentFilters) -> Result<Vec<Appointment>, AppointmentError> {
        let query = validate_filters(filters)?;
        debug!(?query, "searching appointments");

        self.store
            .list_appointments(&query)
            .await
            .map_err(|e| storage_failure("search", e))
    }
}

fn storage_failure(op: &str, e: StoreError) -> AppointmentError {
    warn!("appointment {op} failed: {e}");
    e.into()
}
