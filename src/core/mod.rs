mod engine;
mod insights;
mod types;

pub use engine::{monthly_rate, months_to_reach_goal, project_over_horizon, seek_goal};
pub use insights::{
    Analysis, Composition, GoalStatus, TimeToGoal, analysis, composition, goal_status,
};
pub use types::{
    GoalOutcome, GoalSeekResult, MAX_MONTHS, MONTHS_PER_YEAR, MonthlyDataPoint, ProjectionInput,
    ProjectionResult, YearlyRollup,
};
