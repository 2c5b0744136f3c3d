// Employee onboarding: task checklist, training modules, document slots and
// the progress summary shown on the employee dashboard.

pub mod handlers;
pub mod progress;
pub mod rules;
