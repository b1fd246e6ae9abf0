// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{Appointment, AppointmentMutation, AppointmentQuery, STATUS_REQUESTED},
    store::AppointmentStore,
};

#[derive(Default)]
struct Tables {
    /// patient_id -> id_number
    patients: HashMap<Uuid, String>,
    appointments: HashMap<Uuid, Appointment>,
}

/// Process-local store with the same foreign-key and ordering behaviour as
/// the Postgres schema. Used as the collaborator in tests.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    tables: RwLock<Tables>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_patient(&self, patient_id: Uuid, id_number: &str) {
        self.tables
            .write()
            .await
            .patients
            .insert(patient_id, id_number.to_string());
    }

    pub async fn appointment_count(&self) -> usize {
        self.tables.read().await.appointments.len()
    }
}

fn sorted(mut rows: Vec<Appointment>) -> Vec<Appointment> {
    rows.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then(a.appointment_id.cmp(&b.appointment_id))
    });
    rows
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert_appointment(&self, patient_id: Uuid, reason: &str) -> Result<Uuid, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.patients.contains_key(&patient_id) {
            return Err(StoreError::ForeignKeyViolation);
        }

        let now = Utc::now();
        let appointment_id = Uuid::new_v4();
        tables.appointments.insert(
            appointment_id,
            Appointment {
                appointment_id,
                patient_id,
                reason: reason.to_string(),
                status: STATUS_REQUESTED.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(appointment_id)
    }

    async fn update_appointment_field(
        &self,
        appointment_id: Uuid,
        mutation: &AppointmentMutation,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.appointments.get_mut(&appointment_id) else {
            return Ok(0);
        };

        match mutation {
            AppointmentMutation::ChangeReason(reason) => row.reason = reason.clone(),
            AppointmentMutation::ChangeStatus(status) => row.status = status.clone(),
        }
        row.updated_at = Utc::now();
        Ok(1)
    }

    async fn get_appointment_by_id(&self, appointment_id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(self.tables.read().await.appointments.get(&appointment_id).cloned())
    }

    async fn list_appointments_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        Ok(sorted(rows))
    }

    async fn list_appointments(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables
            .appointments
            .values()
            .filter(|a| query.status.as_ref().is_none_or(|s| &a.status == s))
            .filter(|a| {
                query.id_number.as_ref().is_none_or(|n| {
                    tables.patients.get(&a.patient_id).is_some_and(|id_number| id_number == n)
                })
            })
            .cloned()
            .collect();

        let offset = query.offset.unwrap_or(0).max(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(sorted(rows).into_iter().skip(offset).take(limit).collect())
    }
}
