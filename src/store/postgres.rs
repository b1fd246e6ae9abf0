// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{Appointment, AppointmentMutation, AppointmentQuery},
    store::AppointmentStore,
};

#[derive(Clone)]
pub struct PgAppointmentStore {
    db: PgPool,
}

impl PgAppointmentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return StoreError::ForeignKeyViolation;
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn insert_appointment(&self, patient_id: Uuid, reason: &str) -> Result<Uuid, StoreError> {
        // status is left to the column default
        let appointment_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO appointment (patient_id, reason)
            VALUES ($1, $2)
            RETURNING appointment_id
            "#,
        )
        .bind(patient_id)
        .bind(reason)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)?;

        Ok(appointment_id)
    }

    async fn update_appointment_field(
        &self,
        appointment_id: Uuid,
        mutation: &AppointmentMutation,
    ) -> Result<u64, StoreError> {
        let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("UPDATE appointment SET ");
        // column name comes from a closed enum, never from input
        qb.push(mutation.field().column());
        qb.push(" = ");
        qb.push_bind(mutation.value().to_string());
        qb.push(", updated_at = now() WHERE appointment_id = ");
        qb.push_bind(appointment_id);

        let res = qb.build().execute(&self.db).await?;
        Ok(res.rows_affected())
    }

    async fn get_appointment_by_id(&self, appointment_id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT appointment_id, patient_id, reason, status, created_at, updated_at
            FROM appointment
            WHERE appointment_id = $1
            "#,
        )
        .bind(appointment_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn list_appointments_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT appointment_id, patient_id, reason, status, created_at, updated_at
            FROM appointment
            WHERE patient_id = $1
            ORDER BY created_at ASC, appointment_id ASC
            "#,
        )
        .bind(patient_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn list_appointments(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>, StoreError> {
        let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
            SELECT
              a.appointment_id,
              a.patient_id,
              a.reason,
              a.status,
              a.created_at,
              a.updated_at
            FROM appointment a
            "#,
        );

        // join only if id_number filtering is used
        if query.id_number.is_some() {
            qb.push(" JOIN patient p ON p.patient_id = a.patient_id ");
        }

        qb.push(" WHERE 1=1 ");

        if let Some(status) = &query.status {
            qb.push(" AND a.status = ");
            qb.push_bind(status.clone());
        }
        if let Some(id_number) = &query.id_number {
            qb.push(" AND p.id_number = ");
            qb.push_bind(id_number.clone());
        }

        qb.push(" ORDER BY a.created_at ASC, a.appointment_id ASC ");
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }
        if let Some(offset) = query.offset {
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }

        let rows = qb.build_query_as::<Appointment>().fetch_all(&self.db).await?;
        Ok(rows)
    }
}
