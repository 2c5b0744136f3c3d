// Resume-to-job matching. The score is computed once at submission and
// persisted on the application for ranking.

pub mod match_score;
