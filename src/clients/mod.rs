pub mod fcm;
pub mod mailer;
pub mod profile;
pub mod rbmq;
