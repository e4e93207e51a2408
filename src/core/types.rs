use serde::Serialize;

/// Hard cap on any goal-seeking simulation (50 years).
pub const MAX_MONTHS: u32 = 600;

pub const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInput {
    pub initial_investment: f64,
    pub monthly_contribution: f64,
    /// Nominal annual rate in percent, so 10.0 means 10%.
    pub annual_rate: f64,
    pub horizon_months: Option<u32>,
    pub target_goal: Option<f64>,
}

impl ProjectionInput {
    pub fn new(initial_investment: f64, monthly_contribution: f64, annual_rate: f64) -> Self {
        Self {
            initial_investment,
            monthly_contribution,
            annual_rate,
            horizon_months: None,
            target_goal: None,
        }
    }

    pub fn with_horizon_months(mut self, months: u32) -> Self {
        self.horizon_months = Some(months);
        self
    }

    pub fn with_horizon_years(self, years: u32) -> Self {
        self.with_horizon_months(years.saturating_mul(MONTHS_PER_YEAR))
    }

    pub fn with_target_goal(mut self, target_goal: f64) -> Self {
        self.target_goal = Some(target_goal);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDataPoint {
    pub month: u32,
    pub balance: f64,
    pub cumulative_contributions: f64,
    pub cumulative_returns: f64,
}

impl MonthlyDataPoint {
    pub(crate) fn new(month: u32, balance: f64, cumulative_contributions: f64) -> Self {
        Self {
            month,
            balance,
            cumulative_contributions,
            cumulative_returns: balance - cumulative_contributions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRollup {
    pub year: u32,
    pub months: u32,
    pub start_balance: f64,
    pub end_balance: f64,
    pub contributions_this_year: f64,
    pub returns_this_year: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum GoalOutcome {
    Reached { months: u32 },
    NotReached,
}

impl GoalOutcome {
    pub fn months(self) -> Option<u32> {
        match self {
            GoalOutcome::Reached { months } => Some(months),
            GoalOutcome::NotReached => None,
        }
    }

    pub fn is_reached(self) -> bool {
        matches!(self, GoalOutcome::Reached { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub monthly_data: Vec<MonthlyDataPoint>,
    pub yearly_data: Vec<YearlyRollup>,
    pub months_to_goal: Option<GoalOutcome>,
    pub final_value: f64,
    pub total_contributions: f64,
    pub total_returns: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSeekResult {
    pub outcome: GoalOutcome,
    pub trajectory: Vec<MonthlyDataPoint>,
}
