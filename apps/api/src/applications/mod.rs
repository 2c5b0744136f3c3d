// Candidate applications: submission, HR review, status transitions,
// bulk actions and the candidate-to-employee conversion.
// Workflows run against `store::HrStore` so they can be exercised without Postgres.

pub mod bulk;
pub mod filters;
pub mod handlers;
pub mod hire;
pub mod status;
pub mod store;
pub mod submit;
pub mod update;
