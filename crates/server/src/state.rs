use std::sync::Arc;

use db::DBService;
use services::services::{
    analytics::AnalyticsService, auth::AuthService, config::Config,
    invitation::InvitationService, notification::NotificationService,
    reports::ReportExportService, scheduling::SchedulingService, seo::SeoService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub invitations: InvitationService,
    pub scheduling: SchedulingService,
    pub reports: ReportExportService,
    pub seo: SeoService,
    pub notifications: NotificationService,
    pub analytics: AnalyticsService,
}

impl AppState {
    pub fn new(db: DBService, config: Config) -> Self {
        let auth = AuthService::new(db.clone(), config.jwt_secret.clone(), config.jwt_ttl_hours);
        let seo = SeoService::new(db.clone(), config.public_base_url.clone());
        Self {
            auth,
            invitations: InvitationService::new(db.clone()),
            scheduling: SchedulingService::new(db.clone()),
            reports: ReportExportService::new(db.clone()),
            seo,
            notifications: NotificationService::new(db.clone()),
            analytics: AnalyticsService::new(config.analytics_enabled),
            config: Arc::new(config),
            db,
        }
    }
}
