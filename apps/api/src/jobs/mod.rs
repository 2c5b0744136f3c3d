// Job positions: listing for candidates, creation and closing for HR.
// Positions are never deleted; closing stops new applications.

pub mod handlers;
