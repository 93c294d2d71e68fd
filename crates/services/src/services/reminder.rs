//! Background service reminding parents of upcoming appointments.

use std::time::Duration;

use chrono::Utc;
use db::{
    DBService,
    models::{appointment::Appointment, child::Child},
};
use thiserror::Error;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use super::notification::NotificationService;

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("notification error: {0}")]
    Notification(#[from] super::notification::NotificationError),
}

/// Periodically scans for scheduled appointments starting within the horizon
/// and notifies the child's parent once per appointment.
pub struct AppointmentReminderService {
    db: DBService,
    notification_service: NotificationService,
    poll_interval: Duration,
    horizon: chrono::Duration,
}

impl AppointmentReminderService {
    pub async fn spawn(
        db: DBService,
        notification_service: NotificationService,
        poll_interval: Duration,
        horizon_hours: i64,
    ) -> tokio::task::JoinHandle<()> {
        let service = Self {
            db,
            notification_service,
            poll_interval,
            horizon: chrono::Duration::hours(horizon_hours),
        };
        tokio::spawn(async move {
            service.start().await;
        })
    }

    async fn start(&self) {
        info!(
            "Starting appointment reminder service with interval {:?}, horizon {} h",
            self.poll_interval,
            self.horizon.num_hours()
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;
            if let Err(e) = self.sweep().await {
                error!("Error checking for upcoming appointments: {}", e);
            }
        }
    }

    /// One pass: remind every due appointment, isolating per-item failures.
    pub async fn sweep(&self) -> Result<usize, ReminderError> {
        let now = Utc::now();
        let due = Appointment::list_needing_reminder(&self.db.pool, now, now + self.horizon)
            .await?;

        if due.is_empty() {
            debug!("Reminder sweep: nothing due");
            return Ok(0);
        }

        let mut sent = 0;
        for appointment in due {
            match self.remind(&appointment).await {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        appointment_id = %appointment.id,
                        error = %e,
                        "Reminder sweep: failed to notify"
                    );
                }
            }
        }
        Ok(sent)
    }

    /// Returns true when a parent was notified. Appointments without a linked
    /// parent are marked reminded so they are not rescanned every pass.
    async fn remind(&self, appointment: &Appointment) -> Result<bool, ReminderError> {
        let child = Child::find_by_id(&self.db.pool, appointment.child_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let notified = if let Some(parent_id) = child.parent_profile_id {
            self.notification_service
                .notify(
                    Some(appointment.center_id),
                    parent_id,
                    "Upcoming appointment",
                    &format!(
                        "{} {} has a session on {}",
                        child.first_name,
                        child.last_name,
                        appointment.start_at.format("%Y-%m-%d %H:%M UTC")
                    ),
                )
                .await?;
            true
        } else {
            false
        };

        Appointment::mark_reminded(&self.db.pool, appointment.id, Utc::now()).await?;
        Ok(notified)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use db::models::{
        appointment::CreateAppointment,
        center::{Center, CreateCenter},
        child::CreateChild,
        notification::Notification,
        profile::{CreateProfile, Profile, ProfileRole},
        therapist::{CreateTherapist, Therapist},
    };

    use super::*;

    async fn service(db: &DBService) -> AppointmentReminderService {
        AppointmentReminderService {
            db: db.clone(),
            notification_service: NotificationService::new(db.clone()),
            poll_interval: Duration::from_secs(300),
            horizon: ChronoDuration::hours(24),
        }
    }

    #[tokio::test]
    async fn sweep_notifies_parent_once() {
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
        let parent = Profile::create(
            &db.pool,
            &CreateProfile {
                center_id: Some(center.id),
                email: "parent@acme.test".to_string(),
                full_name: "Parent".to_string(),
                phone: None,
                role: ProfileRole::Parent,
            },
            None,
        )
        .await
        .unwrap();
        let child = Child::create(
            &db.pool,
            center.id,
            &CreateChild {
                parent_profile_id: Some(parent.id),
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

        // One appointment inside the horizon, one far outside it.
        let soon = Utc::now() + ChronoDuration::hours(2);
        Appointment::create(
            &db.pool,
            center.id,
            &CreateAppointment {
                child_id: child.id,
                therapist_id: therapist.id,
                start_at: soon,
                end_at: soon + ChronoDuration::minutes(45),
                note: None,
            },
        )
        .await
        .unwrap();
        let far = Utc::now() + ChronoDuration::days(10);
        Appointment::create(
            &db.pool,
            center.id,
            &CreateAppointment {
                child_id: child.id,
                therapist_id: therapist.id,
                start_at: far,
                end_at: far + ChronoDuration::minutes(45),
                note: None,
            },
        )
        .await
        .unwrap();

        let svc = service(&db).await;
        assert_eq!(svc.sweep().await.unwrap(), 1);

        let feed = Notification::list_by_profile(&db.pool, parent.id, true, 10)
            .await
            .unwrap();
        assert_eq!(feed.len(), 1);
        assert!(feed[0].body.contains("Mia"));

        // Second sweep finds nothing: the reminder was recorded.
        assert_eq!(svc.sweep().await.unwrap(), 0);
    }
}
