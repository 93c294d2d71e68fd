//! Appointment booking. The one piece of coordination the calendar does:
//! a therapist cannot be double-booked. Everything else is last-write-wins.

use db::{
    DBService,
    models::{
        appointment::{Appointment, CreateAppointment, UpdateAppointment},
        child::Child,
        therapist::Therapist,
    },
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("appointment not found")]
    NotFound,
    #[error("child does not belong to this center")]
    ChildNotInCenter,
    #[error("therapist does not belong to this center")]
    TherapistNotInCenter,
    #[error("end time must be after start time")]
    InvalidTimeRange,
    #[error("therapist already has {0} overlapping appointment(s)")]
    Conflict(usize),
}

#[derive(Clone)]
pub struct SchedulingService {
    db: DBService,
}

impl SchedulingService {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    pub async fn book(
        &self,
        center_id: Uuid,
        data: &CreateAppointment,
    ) -> Result<Appointment, SchedulingError> {
        if data.end_at <= data.start_at {
            return Err(SchedulingError::InvalidTimeRange);
        }

        let child = Child::find_by_id(&self.db.pool, data.child_id).await?;
        if !child.is_some_and(|c| c.center_id == center_id) {
            return Err(SchedulingError::ChildNotInCenter);
        }
        let therapist = Therapist::find_by_id(&self.db.pool, data.therapist_id).await?;
        if !therapist.is_some_and(|t| t.center_id == center_id) {
            return Err(SchedulingError::TherapistNotInCenter);
        }

        let conflicts = Appointment::find_overlapping(
            &self.db.pool,
            data.therapist_id,
            data.start_at,
            data.end_at,
            None,
        )
        .await?;
        if !conflicts.is_empty() {
            return Err(SchedulingError::Conflict(conflicts.len()));
        }

        let appointment = Appointment::create(&self.db.pool, center_id, data).await?;
        tracing::info!(
            appointment_id = %appointment.id,
            center_id = %center_id,
            therapist_id = %appointment.therapist_id,
            start_at = %appointment.start_at,
            "appointment booked"
        );
        Ok(appointment)
    }

    /// Update an appointment. Re-checks the therapist's calendar whenever the
    /// time window or the therapist changes.
    pub async fn update(
        &self,
        id: Uuid,
        center_id: Uuid,
        data: &UpdateAppointment,
    ) -> Result<Appointment, SchedulingError> {
        let existing = Appointment::find_by_id(&self.db.pool, id)
            .await?
            .filter(|a| a.center_id == center_id)
            .ok_or(SchedulingError::NotFound)?;

        let therapist_id = data.therapist_id.unwrap_or(existing.therapist_id);
        let start_at = data.start_at.unwrap_or(existing.start_at);
        let end_at = data.end_at.unwrap_or(existing.end_at);
        if end_at <= start_at {
            return Err(SchedulingError::InvalidTimeRange);
        }

        let window_changed = therapist_id != existing.therapist_id
            || start_at != existing.start_at
            || end_at != existing.end_at;
        if window_changed {
            if let Some(new_therapist) = data.therapist_id {
                let therapist = Therapist::find_by_id(&self.db.pool, new_therapist).await?;
                if !therapist.is_some_and(|t| t.center_id == center_id) {
                    return Err(SchedulingError::TherapistNotInCenter);
                }
            }
            let conflicts = Appointment::find_overlapping(
                &self.db.pool,
                therapist_id,
                start_at,
                end_at,
                Some(id),
            )
            .await?;
            if !conflicts.is_empty() {
                return Err(SchedulingError::Conflict(conflicts.len()));
            }
        }

        Appointment::update(&self.db.pool, id, center_id, data)
            .await?
            .ok_or(SchedulingError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use db::models::{
        center::{Center, CreateCenter},
        child::CreateChild,
        therapist::CreateTherapist,
    };

    use super::*;

    struct Fixture {
        svc: SchedulingService,
        center: Center,
        child: Child,
        therapist: Therapist,
    }

    async fn fixture() -> Fixture {
        let db = DBService::new_in_memory().await.unwrap();
        let center = Center::create(
            &db.pool,
            &CreateCenter {
                name: "Acme".to_string(),
                slug: None,
                custom_domain: None,
                description: None,
                phone: None,
                email: None,
                address: None,
                city: None,
            },
            "acme",
        )
        .await
        .unwrap();
        let child = Child::create(
            &db.pool,
            center.id,
            &CreateChild {
                parent_profile_id: None,
                first_name: "Mia".to_string(),
                last_name: "Onat".to_string(),
                birth_date: chrono::NaiveDate::from_ymd_opt(2019, 4, 2).unwrap(),
                diagnosis: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        let therapist = Therapist::create(
            &db.pool,
            center.id,
            &CreateTherapist {
                profile_id: None,
                full_name: "Dr. Kaya".to_string(),
                specialty: "speech".to_string(),
                title: None,
                bio: None,
            },
        )
        .await
        .unwrap();
        Fixture {
            svc: SchedulingService::new(db),
            center,
            child,
            therapist,
        }
    }

    fn slot(offset_hours: i64, len_minutes: i64) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
        let start = Utc::now() + Duration::hours(offset_hours);
        (start, start + Duration::minutes(len_minutes))
    }

    #[tokio::test]
    async fn booking_a_free_slot_succeeds() {
        let f = fixture().await;
        let (start_at, end_at) = slot(24, 45);
        let appt = f
            .svc
            .book(
                f.center.id,
                &CreateAppointment {
                    child_id: f.child.id,
                    therapist_id: f.therapist.id,
                    start_at,
                    end_at,
                    note: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(appt.center_id, f.center.id);
    }

    #[tokio::test]
    async fn overlapping_booking_is_rejected() {
        let f = fixture().await;
        let (start_at, end_at) = slot(24, 60);
        f.svc
            .book(
                f.center.id,
                &CreateAppointment {
                    child_id: f.child.id,
                    therapist_id: f.therapist.id,
                    start_at,
                    end_at,
                    note: None,
                },
            )
            .await
            .unwrap();

        // Second session starting halfway through the first.
        let err = f
            .svc
            .book(
                f.center.id,
                &CreateAppointment {
                    child_id: f.child.id,
                    therapist_id: f.therapist.id,
                    start_at: start_at + Duration::minutes(30),
                    end_at: end_at + Duration::minutes(30),
                    note: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Conflict(1)));
    }

    #[tokio::test]
    async fn back_to_back_slots_do_not_conflict() {
        let f = fixture().await;
        let (start_at, end_at) = slot(24, 60);
        f.svc
            .book(
                f.center.id,
                &CreateAppointment {
                    child_id: f.child.id,
                    therapist_id: f.therapist.id,
                    start_at,
                    end_at,
                    note: None,
                },
            )
            .await
            .unwrap();
        f.svc
            .book(
                f.center.id,
                &CreateAppointment {
                    child_id: f.child.id,
                    therapist_id: f.therapist.id,
                    start_at: end_at,
                    end_at: end_at + Duration::hours(1),
                    note: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn moving_an_appointment_checks_the_new_window() {
        let f = fixture().await;
        let (start_a, end_a) = slot(24, 60);
        let first = f
            .svc
            .book(
                f.center.id,
                &CreateAppointment {
                    child_id: f.child.id,
                    therapist_id: f.therapist.id,
                    start_at: start_a,
                    end_at: end_a,
                    note: None,
                },
            )
            .await
            .unwrap();
        let second = f
            .svc
            .book(
                f.center.id,
                &CreateAppointment {
                    child_id: f.child.id,
                    therapist_id: f.therapist.id,
                    start_at: end_a,
                    end_at: end_a + Duration::hours(1),
                    note: None,
                },
            )
            .await
            .unwrap();

        // Moving the second on top of the first conflicts.
        let err = f
            .svc
            .update(
                second.id,
                f.center.id,
                &UpdateAppointment {
                    therapist_id: None,
                    start_at: Some(start_a),
                    end_at: Some(end_a),
                    status: None,
                    note: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Conflict(_)));

        // Moving it into free space works, and excluding itself means the
        // unchanged window is never its own conflict.
        f.svc
            .update(
                first.id,
                f.center.id,
                &UpdateAppointment {
                    therapist_id: None,
                    start_at: None,
                    end_at: None,
                    status: None,
                    note: Some("room 2".to_string()),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn invalid_time_range_is_rejected() {
        let f = fixture().await;
        let (start_at, end_at) = slot(24, 45);
        let err = f
            .svc
            .book(
                f.center.id,
                &CreateAppointment {
                    child_id: f.child.id,
                    therapist_id: f.therapist.id,
                    start_at: end_at,
                    end_at: start_at,
                    note: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidTimeRange));
    }
}
