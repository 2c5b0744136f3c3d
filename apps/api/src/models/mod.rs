pub mod application;
pub mod job;
pub mod onboarding;
pub mod user;
