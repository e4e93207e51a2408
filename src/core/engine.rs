use super::types::{
    GoalOutcome, GoalSeekResult, MAX_MONTHS, MONTHS_PER_YEAR, MonthlyDataPoint, ProjectionInput,
    ProjectionResult, YearlyRollup,
};

#[derive(Debug, Clone, Copy)]
struct Account {
    balance: f64,
    contributions: f64,
}

impl Account {
    fn open(initial_investment: f64) -> Self {
        Self {
            balance: initial_investment,
            contributions: initial_investment,
        }
    }

    fn snapshot(self, month: u32) -> MonthlyDataPoint {
        MonthlyDataPoint::new(month, self.balance, self.contributions)
    }
}

/// Converts a nominal annual rate in percent to the equivalent effective
/// monthly rate. A zero rate maps to exactly zero.
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    if annual_rate_percent == 0.0 {
        return 0.0;
    }
    (1.0 + annual_rate_percent / 100.0).powf(1.0 / MONTHS_PER_YEAR as f64) - 1.0
}

/// Simulates `horizon_months` periods (zero when the input has no horizon).
///
/// Every month grows last month's ending balance first and only then adds the
/// contribution, so a contribution earns nothing in the month it lands.
pub fn project_over_horizon(input: &ProjectionInput) -> ProjectionResult {
    let horizon = input.horizon_months.unwrap_or(0);
    let rate = monthly_rate(input.annual_rate);

    let mut account = Account::open(input.initial_investment);
    let mut monthly_data = Vec::with_capacity(horizon as usize + 1);
    monthly_data.push(account.snapshot(0));

    for month in 1..=horizon {
        advance_month(&mut account, rate, input.monthly_contribution);
        monthly_data.push(account.snapshot(month));
    }

    let yearly_data = rollup_years(&monthly_data);
    let months_to_goal = input
        .target_goal
        .map(|target| first_month_at_or_above(&monthly_data, target));

    let last = monthly_data[monthly_data.len() - 1];
    ProjectionResult {
        monthly_data,
        yearly_data,
        months_to_goal,
        final_value: last.balance,
        total_contributions: last.cumulative_contributions,
        total_returns: last.cumulative_returns,
    }
}

pub fn months_to_reach_goal(input: &ProjectionInput) -> GoalOutcome {
    seek_goal(input).outcome
}

pub fn seek_goal(input: &ProjectionInput) -> GoalSeekResult {
    let target = input.target_goal.unwrap_or(0.0);
    let mut account = Account::open(input.initial_investment);
    let mut trajectory = vec![account.snapshot(0)];

    if target <= input.initial_investment {
        return GoalSeekResult {
            outcome: GoalOutcome::Reached { months: 0 },
            trajectory,
        };
    }

    let rate = monthly_rate(input.annual_rate);
    if rate == 0.0 && input.monthly_contribution == 0.0 {
        return GoalSeekResult {
            outcome: GoalOutcome::NotReached,
            trajectory,
        };
    }

    let mut month = 0_u32;
    while account.balance < target && month < MAX_MONTHS {
        month += 1;
        advance_month(&mut account, rate, input.monthly_contribution);
        trajectory.push(account.snapshot(month));
    }

    let outcome = if account.balance >= target {
        GoalOutcome::Reached { months: month }
    } else {
        GoalOutcome::NotReached
    };
    GoalSeekResult {
        outcome,
        trajectory,
    }
}

fn advance_month(account: &mut Account, rate: f64, contribution: f64) {
    account.balance *= 1.0 + rate;
    account.balance += contribution;
    account.contributions += contribution;
}

fn first_month_at_or_above(points: &[MonthlyDataPoint], target: f64) -> GoalOutcome {
    points
        .iter()
        .find(|p| p.balance >= target)
        .map(|p| GoalOutcome::Reached { months: p.month })
        .unwrap_or(GoalOutcome::NotReached)
}

fn rollup_years(points: &[MonthlyDataPoint]) -> Vec<YearlyRollup> {
    let Some(last_month) = points.len().checked_sub(1) else {
        return Vec::new();
    };

    let per_year = MONTHS_PER_YEAR as usize;
    let mut rollups = Vec::with_capacity(last_month.div_ceil(per_year));
    let mut start_idx = 0;
    while start_idx < last_month {
        let end_idx = (start_idx + per_year).min(last_month);
        let start = points[start_idx];
        let end = points[end_idx];
        rollups.push(YearlyRollup {
            year: (rollups.len() + 1) as u32,
            months: (end_idx - start_idx) as u32,
            start_balance: start.balance,
            end_balance: end.balance,
            contributions_this_year: end.cumulative_contributions
                - start.cumulative_contributions,
            returns_this_year: end.cumulative_returns - start.cumulative_returns,
        });
        start_idx = end_idx;
    }
    rollups
}
