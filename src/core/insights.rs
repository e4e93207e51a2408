use serde::Serialize;

use super::engine::monthly_rate;
use super::types::{GoalOutcome, MONTHS_PER_YEAR, ProjectionInput, ProjectionResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub initial: f64,
    pub contributions: f64,
    pub returns: f64,
    pub initial_share: f64,
    pub contributions_share: f64,
    pub returns_share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub annual_rate_percent: f64,
    pub monthly_rate_percent: f64,
    pub roi_percent: Option<f64>,
    pub capital_multiplier: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalStatus {
    Reached,
    Reachable,
    Distant,
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeToGoal {
    pub years: u32,
    pub months: u32,
}

impl TimeToGoal {
    pub fn from_months(total_months: u32) -> Self {
        Self {
            years: total_months / MONTHS_PER_YEAR,
            months: total_months % MONTHS_PER_YEAR,
        }
    }
}

pub fn composition(input: &ProjectionInput, result: &ProjectionResult) -> Composition {
    let initial = input.initial_investment;
    let contributions = result.total_contributions - initial;
    let returns = result.total_returns.max(0.0);
    let total = initial + contributions + returns;

    let share = |part: f64| {
        if total > 0.0 {
            part / total * 100.0
        } else {
            0.0
        }
    };

    Composition {
        initial,
        contributions,
        returns,
        initial_share: share(initial),
        contributions_share: share(contributions),
        returns_share: share(returns),
    }
}

pub fn analysis(input: &ProjectionInput, result: &ProjectionResult) -> Analysis {
    let invested = result.total_contributions;
    let (roi_percent, capital_multiplier) = if invested > 0.0 {
        (
            Some(result.total_returns / invested * 100.0),
            Some(result.final_value / invested),
        )
    } else {
        (None, None)
    };

    Analysis {
        annual_rate_percent: input.annual_rate,
        monthly_rate_percent: monthly_rate(input.annual_rate) * 100.0,
        roi_percent,
        capital_multiplier,
    }
}

pub fn goal_status(
    result: &ProjectionResult,
    target_goal: Option<f64>,
    goal_outcome: GoalOutcome,
    horizon_years: f64,
) -> Option<GoalStatus> {
    let target = target_goal?;
    if result.final_value >= target {
        return Some(GoalStatus::Reached);
    }

    let status = match goal_outcome {
        GoalOutcome::NotReached => GoalStatus::Unreachable,
        GoalOutcome::Reached { months } => {
            let years_needed = months as f64 / MONTHS_PER_YEAR as f64;
            if years_needed <= horizon_years * 1.5 {
                GoalStatus::Reachable
            } else {
                GoalStatus::Distant
            }
        }
    };
    Some(status)
}
