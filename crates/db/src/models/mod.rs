pub mod appointment;
pub mod blog_post;
pub mod center;
pub mod child;
pub mod consultation;
pub mod invitation;
pub mod lead;
pub mod notification;
pub mod payment;
pub mod profile;
pub mod progress_report;
pub mod push_subscription;
pub mod review;
pub mod therapist;
