use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    auth::AuthError, invitation::InvitationError, notification::NotificationError,
    reports::ReportExportError, scheduling::SchedulingError, seo::SeoError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Invitation(#[from] InvitationError),
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
    #[error(transparent)]
    ReportExport(#[from] ReportExportError),
    #[error(transparent)]
    Seo(#[from] SeoError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::Inactive => StatusCode::FORBIDDEN,
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::WeakPassword => StatusCode::BAD_REQUEST,
                AuthError::Jwt(_) => StatusCode::UNAUTHORIZED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Invitation(e) => match e {
                InvitationError::Forbidden => StatusCode::FORBIDDEN,
                InvitationError::NotFound => StatusCode::NOT_FOUND,
                InvitationError::Expired
                | InvitationError::AlreadyAccepted
                | InvitationError::RoleNotInvitable => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Scheduling(e) => match e {
                SchedulingError::Conflict(_) => StatusCode::CONFLICT,
                SchedulingError::NotFound => StatusCode::NOT_FOUND,
                SchedulingError::InvalidTimeRange
                | SchedulingError::ChildNotInCenter
                | SchedulingError::TherapistNotInCenter => StatusCode::BAD_REQUEST,
                SchedulingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::ReportExport(_) | Self::Seo(_) | Self::Notification(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
