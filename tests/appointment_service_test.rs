use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use uuid::Uuid;

use appointments_server::{
    error::{AppointmentError, StoreError, ValidationError},
    models::{
        Appointment, AppointmentField, AppointmentFilters, AppointmentMutation, AppointmentPatch,
        AppointmentQuery, NewAppointment, STATUS_CANCELLED, STATUS_REQUESTED, STATUS_SCHEDULED,
    },
    service::AppointmentService,
    store::{AppointmentStore, InMemoryAppointmentStore},
};

const ID_NUMBER: &str = "1005928740";

struct Fixture {
    store: Arc<InMemoryAppointmentStore>,
    service: AppointmentService,
    patient_id: Uuid,
}

async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let patient_id = Uuid::new_v4();
    store.add_patient(patient_id, ID_NUMBER).await;
    let service = AppointmentService::new(store.clone());
    Fixture {
        store,
        service,
        patient_id,
    }
}

fn new_appointment(patient_id: &str, reason: &str) -> NewAppointment {
    NewAppointment {
        patient_id: Some(patient_id.to_string()),
        reason: Some(reason.to_string()),
    }
}

fn patch(appointment_id: Uuid, reason: Option<&str>, status: Option<&str>) -> AppointmentPatch {
    AppointmentPatch {
        appointment_id: Some(appointment_id.to_string()),
        reason: reason.map(Into::into),
        status: status.map(Into::into),
    }
}

impl Fixture {
    async fn booked(&self, reason: &str) -> Uuid {
        self.service
            .create(&new_appointment(&self.patient_id.to_string(), reason))
            .await
            .unwrap()
            .appointment_id
    }
}

/// Store whose every call fails as a timed-out pool would.
struct UnreachableStore;

#[async_trait]
impl AppointmentStore for UnreachableStore {
    async fn insert_appointment(&self, _: Uuid, _: &str) -> Result<Uuid, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn update_appointment_field(&self, _: Uuid, _: &AppointmentMutation) -> Result<u64, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn get_appointment_by_id(&self, _: Uuid) -> Result<Option<Appointment>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn list_appointments_by_patient(&self, _: Uuid) -> Result<Vec<Appointment>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn list_appointments(&self, _: &AppointmentQuery) -> Result<Vec<Appointment>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}

/* ---------------- create ---------------- */

#[tokio::test]
async fn create_for_existing_patient_is_created() {
    let f = fixture().await;
    let resp = f
        .service
        .create(&new_appointment(&f.patient_id.to_string(), "Dolor de Cabeza"))
        .await
        .unwrap();
    assert_eq!(resp.message, "Created");

    let stored = f.service.get(resp.appointment_id).await.unwrap();
    assert_eq!(stored.appointment.reason, "Dolor de Cabeza");
    assert_eq!(stored.appointment.status, STATUS_REQUESTED);
}

#[tokio::test]
async fn create_stores_the_reason_as_sent() {
    let f = fixture().await;
    let resp = f
        .service
        .create(&new_appointment(&f.patient_id.to_string(), "  Dolor de Cabeza "))
        .await
        .unwrap();

    let stored = f.service.get(resp.appointment_id).await.unwrap();
    assert_eq!(stored.appointment.reason, "  Dolor de Cabeza ");
}

#[tokio::test]
async fn create_for_unknown_patient_is_error_and_persists_nothing() {
    let f = fixture().await;
    let unknown = Uuid::new_v4();
    let err = f
        .service
        .create(&new_appointment(&unknown.to_string(), "Dolor de Cabeza"))
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Error");
    assert_matches!(err, AppointmentError::ReferentialIntegrity(id) if id == unknown);
    assert_eq!(f.store.appointment_count().await, 0);
}

#[tokio::test]
async fn create_with_placeholder_patient_id_is_error() {
    let f = fixture().await;
    let err = f
        .service
        .create(&new_appointment("unknown", "Headache"))
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Error");
    assert_eq!(f.store.appointment_count().await, 0);
}

#[tokio::test]
async fn create_without_reason_never_reaches_storage() {
    let f = fixture().await;
    let err = f
        .service
        .create(&NewAppointment {
            patient_id: Some(f.patient_id.to_string()),
            reason: Some(String::new()),
        })
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::Validation(ValidationError::MissingReason));
    assert_eq!(f.store.appointment_count().await, 0);
}

/* ---------------- update ---------------- */

#[tokio::test]
async fn schedule_then_cancel() {
    let f = fixture().await;
    let id = f.booked("Dolor de Cabeza").await;

    let req = patch(id, None, Some(STATUS_SCHEDULED));
    let resp = f.service.update(&req).await.unwrap();
    assert_eq!(resp.message, "Updated!");
    assert_eq!(resp.field, AppointmentField::Status);
    assert_eq!(req.status.as_deref(), Some("Programada"));
    assert_eq!(f.service.get(id).await.unwrap().appointment.status, "Programada");

    let req = patch(id, None, Some(STATUS_CANCELLED));
    assert_eq!(f.service.update(&req).await.unwrap().message, "Updated!");
    assert_eq!(f.service.get(id).await.unwrap().appointment.status, "Cancelada");
}

#[tokio::test]
async fn cancelled_can_move_back_to_scheduled() {
    let f = fixture().await;
    let id = f.booked("Control").await;

    f.service.update(&patch(id, None, Some(STATUS_CANCELLED))).await.unwrap();
    f.service.update(&patch(id, None, Some(STATUS_SCHEDULED))).await.unwrap();
    assert_eq!(f.service.get(id).await.unwrap().appointment.status, STATUS_SCHEDULED);
}

#[tokio::test]
async fn reason_update_changes_only_reason() {
    let f = fixture().await;
    let id = f.booked("Dolor de Cabeza").await;
    let before = f.service.get(id).await.unwrap().appointment;

    let resp = f.service.update(&patch(id, Some("Dolor"), None)).await.unwrap();
    assert_eq!(resp.message, "Updated!");
    assert_eq!(resp.field, AppointmentField::Reason);

    let after = f.service.get(id).await.unwrap().appointment;
    assert_eq!(after.reason, "Dolor");
    assert_eq!(after.status, before.status);
    assert_eq!(after.patient_id, before.patient_id);
}

#[tokio::test]
async fn updated_field_matches_the_callers_value() {
    let f = fixture().await;
    let id = f.booked("Dolor").await;

    let req = patch(id, Some(" Dolor leve "), None);
    f.service.update(&req).await.unwrap();
    assert_eq!(
        Some(f.service.get(id).await.unwrap().appointment.reason),
        req.reason
    );
}

#[tokio::test]
async fn update_of_unknown_appointment_is_not_found() {
    let f = fixture().await;
    let missing = Uuid::new_v4();
    let err = f
        .service
        .update(&patch(missing, Some("Dolor de Cabeza"), None))
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Error");
    assert_matches!(err, AppointmentError::NotFound(id) if id == missing);
}

#[tokio::test]
async fn update_with_reason_and_status_changes_nothing() {
    let f = fixture().await;
    let id = f.booked("Dolor de Cabeza").await;
    let before = f.service.get(id).await.unwrap().appointment;

    let err = f
        .service
        .update(&patch(id, Some("X"), Some("Y")))
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Error");
    assert_matches!(err, AppointmentError::Validation(ValidationError::ConflictingMutation));
    assert_eq!(f.service.get(id).await.unwrap().appointment, before);
}

#[tokio::test]
async fn update_without_any_field_is_error() {
    let f = fixture().await;
    let id = f.booked("Dolor").await;
    let err = f.service.update(&patch(id, None, None)).await.unwrap_err();
    assert_matches!(err, AppointmentError::Validation(ValidationError::MissingMutation));
}

#[tokio::test]
async fn repeating_the_same_update_is_idempotent() {
    let f = fixture().await;
    let id = f.booked("Dolor").await;
    let req = patch(id, None, Some(STATUS_SCHEDULED));

    for _ in 0..2 {
        assert_eq!(f.service.update(&req).await.unwrap().message, "Updated!");
        assert_eq!(f.service.get(id).await.unwrap().appointment.status, STATUS_SCHEDULED);
    }
}

/* ---------------- get ---------------- */

#[tokio::test]
async fn get_returns_the_record_with_a_message() {
    let f = fixture().await;
    let id = f.booked("Dolor de pecho").await;

    let resp = f.service.get(id).await.unwrap();
    assert!(!resp.message.is_empty());
    assert_eq!(resp.appointment.reason, "Dolor de pecho");
}

#[tokio::test]
async fn get_of_unknown_id_is_not_found() {
    let f = fixture().await;
    let err = f.service.get(Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, AppointmentError::NotFound(_));
}

#[tokio::test]
async fn my_appointments_lists_only_that_patient() {
    let f = fixture().await;
    f.booked("a").await;
    f.booked("b").await;

    let other = Uuid::new_v4();
    f.store.add_patient(other, "42").await;
    f.service
        .create(&new_appointment(&other.to_string(), "c"))
        .await
        .unwrap();

    let resp = f.service.get_my_appointments(f.patient_id).await.unwrap();
    assert!(!resp.message.is_empty());
    assert_eq!(resp.appointments.len(), 2);
    assert!(resp.appointments.iter().all(|a| a.patient_id == f.patient_id));

    let none = f.service.get_my_appointments(Uuid::new_v4()).await.unwrap();
    assert!(none.appointments.is_empty());
}

/* ---------------- search ---------------- */

#[tokio::test]
async fn filtered_search_respects_every_filter() {
    let f = fixture().await;
    let mut scheduled = Vec::new();
    for i in 0..16 {
        let id = f.booked(&format!("visit {i}")).await;
        if i % 4 != 0 {
            f.service.update(&patch(id, None, Some(STATUS_SCHEDULED))).await.unwrap();
            scheduled.push(id);
        }
    }

    let filters = AppointmentFilters {
        status: Some(STATUS_SCHEDULED.into()),
        id_number: Some(ID_NUMBER.into()),
        limit: Some(9),
        offset: Some(0),
    };
    let page = f.service.get_appointments(&filters).await.unwrap();
    assert_eq!(page.len(), 9);
    assert!(page.iter().all(|a| a.status == STATUS_SCHEDULED));

    let rest = f
        .service
        .get_appointments(&AppointmentFilters {
            offset: Some(9),
            ..filters.clone()
        })
        .await
        .unwrap();
    assert_eq!(rest.len(), scheduled.len() - 9);
    assert!(rest.iter().all(|a| !page.contains(a)));
}

#[tokio::test]
async fn search_without_matches_is_an_empty_list() {
    let f = fixture().await;
    f.booked("Dolor").await;

    let rows = f
        .service
        .get_appointments(&AppointmentFilters {
            id_number: Some("does-not-exist".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(rows.is_empty());

    let all = f.service.get_appointments(&AppointmentFilters::default()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn malformed_pagination_is_a_validation_error() {
    let f = fixture().await;
    let err = f
        .service
        .get_appointments(&AppointmentFilters {
            limit: Some(-3),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, AppointmentError::Validation(ValidationError::InvalidLimit));
}

/* ---------------- storage failures ---------------- */

#[tokio::test]
async fn storage_failures_surface_as_storage_errors() {
    let service = AppointmentService::new(Arc::new(UnreachableStore));
    let id = Uuid::new_v4();

    let errors = vec![
        service
            .create(&new_appointment(&id.to_string(), "Dolor"))
            .await
            .unwrap_err(),
        service
            .update(&patch(id, None, Some(STATUS_SCHEDULED)))
            .await
            .unwrap_err(),
        service.get(id).await.unwrap_err(),
        service.get_my_appointments(id).await.unwrap_err(),
        service
            .get_appointments(&AppointmentFilters::default())
            .await
            .unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err.message(), "Error");
        assert_matches!(err, AppointmentError::Storage(_));
    }
}
