use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{Appointment, AppointmentMutation, AppointmentQuery},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAppointmentStore;
pub use postgres::PgAppointmentStore;

/// Persistence behind the appointment service.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Inserts with the storage default status and returns the new id.
    /// Fails with `ForeignKeyViolation` when the patient does not exist.
    async fn insert_appointment(&self, patient_id: Uuid, reason: &str) -> Result<Uuid, StoreError>;

    /// Applies one mutation and returns the number of rows affected.
    async fn update_appointment_field(
        &self,
        appointment_id: Uuid,
        mutation: &AppointmentMutation,
    ) -> Result<u64, StoreError>;

    async fn get_appointment_by_id(&self, appointment_id: Uuid) -> Result<Option<Appointment>, StoreError>;

    async fn list_appointments_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError>;

    async fn list_appointments(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>, StoreError>;
}
