//! Materialization of recurring rules into dated expense instances.
//!
//! Everything here is pure: no I/O, and "now" is an argument. The caller
//! samples the clock once per unit of work so the deletion cutoff and the
//! generation cutoff can never disagree.

use chrono::{DateTime, Datelike, Days, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::{Expense, RecurringRule, ResultStore, StoreError};

/// Step between two occurrences of a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// The date one step after `date`.
    ///
    /// Monthly and yearly steps keep the day of month and let it overflow
    /// into the following month when the target month is shorter:
    /// Jan 31 steps to Mar 3 (Mar 2 in leap years), Feb 29 steps to Mar 1 of
    /// the next year. Returns `None` past the representable calendar range.
    pub fn step(self, date: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = match self {
            Self::Daily => return date.checked_add_days(Days::new(1)),
            Self::Weekly => return date.checked_add_days(Days::new(7)),
            Self::Monthly => 1,
            Self::Yearly => 12,
        };
        date.with_day(1)?
            .checked_add_months(Months::new(months))?
            .checked_add_days(Days::new(u64::from(date.day0())))
    }

    /// The first `count` dates of a series starting at `start`, each one step
    /// after the previous. An item is `None` once the series leaves the
    /// calendar range, and iteration stops right after it.
    pub fn series(
        self,
        start: DateTime<Utc>,
        count: u32,
    ) -> impl Iterator<Item = Option<DateTime<Utc>>> {
        std::iter::successors(Some(Some(start)), move |prev: &Option<DateTime<Utc>>| {
            prev.map(|date| self.step(date))
        })
        .take(count as usize)
    }

    /// Whether all `count` dates of a series starting at `start` exist.
    pub(crate) fn fits(self, start: DateTime<Utc>, count: u32) -> bool {
        self.series(start, count).all(|date| date.is_some())
    }
}

impl core::fmt::Display for Interval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Interval {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(StoreError::validation(format!(
                "invalid interval: '{other}'. Must be one of 'daily', 'weekly', 'monthly', or 'yearly'"
            ))),
        }
    }
}

impl core::str::FromStr for Interval {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::try_from(s)
    }
}

/// Which part of a series to materialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationMode {
    /// Every occurrence, from the start date.
    Full,
    /// Only the occurrences dated at or after "now". Occurrences before "now"
    /// still consume the budget, they are just not emitted.
    FutureOnly,
}

/// Expand `rule` into its ordered instances.
///
/// Each instance copies name, category, amount, currency and tags from the
/// rule, gets a fresh id and points back at the rule through `recurring_id`.
pub fn generate(
    rule: &RecurringRule,
    mode: GenerationMode,
    now: DateTime<Utc>,
) -> ResultStore<Vec<Expense>> {
    let out_of_range = || {
        StoreError::validation(format!(
            "recurring rule '{}' runs past the supported calendar range",
            rule.name
        ))
    };

    let dates = rule
        .interval
        .series(rule.start_date, rule.occurrences)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(out_of_range)?;

    // Past occurrences still count against the budget in FutureOnly mode.
    let instances: Vec<Expense> = dates
        .into_iter()
        .skip_while(|date| mode == GenerationMode::FutureOnly && *date < now)
        .map(|date| Expense::materialized(rule, date))
        .collect();
    Ok(instances)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;
    use crate::{Currency, MoneyCents};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn rule(start: DateTime<Utc>, interval: Interval, occurrences: u32) -> RecurringRule {
        RecurringRule {
            id: Uuid::new_v4(),
            tenant_id: "alice".to_string(),
            name: "Gym".to_string(),
            amount: MoneyCents::new(100),
            currency: Currency::Usd,
            category: "Healthcare".to_string(),
            tags: vec!["fitness".to_string()],
            start_date: start,
            interval,
            occurrences,
        }
    }

    fn dates(instances: &[Expense]) -> Vec<DateTime<Utc>> {
        instances.iter().map(|e| e.date).collect()
    }

    #[test]
    fn full_monthly_series_from_the_first() {
        let rule = rule(at(2026, 1, 1), Interval::Monthly, 3);
        let out = generate(&rule, GenerationMode::Full, at(2020, 1, 1)).unwrap();

        assert_eq!(
            dates(&out),
            vec![at(2026, 1, 1), at(2026, 2, 1), at(2026, 3, 1)]
        );
        for instance in &out {
            assert_eq!(instance.amount.cents(), 100);
            assert_eq!(instance.recurring_id, Some(rule.id));
            assert_eq!(instance.tenant_id, "alice");
            assert_eq!(instance.currency, Currency::Usd);
            assert_eq!(instance.tags, vec!["fitness"]);
        }
    }

    #[test]
    fn instances_get_distinct_ids() {
        let rule = rule(at(2026, 1, 1), Interval::Daily, 5);
        let out = generate(&rule, GenerationMode::Full, at(2026, 1, 1)).unwrap();
        let mut ids: Vec<_> = out.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn daily_weekly_yearly_steps() {
        let start = at(2024, 2, 28);
        let daily = generate(&rule(start, Interval::Daily, 3), GenerationMode::Full, start).unwrap();
        assert_eq!(
            dates(&daily),
            vec![at(2024, 2, 28), at(2024, 2, 29), at(2024, 3, 1)]
        );

        let weekly =
            generate(&rule(start, Interval::Weekly, 2), GenerationMode::Full, start).unwrap();
        assert_eq!(dates(&weekly), vec![at(2024, 2, 28), at(2024, 3, 6)]);

        let yearly =
            generate(&rule(start, Interval::Yearly, 2), GenerationMode::Full, start).unwrap();
        assert_eq!(dates(&yearly), vec![at(2024, 2, 28), at(2025, 2, 28)]);
    }

    #[test]
    fn month_end_overflows_into_next_month() {
        let rule = rule(at(2026, 1, 31), Interval::Monthly, 4);
        let out = generate(&rule, GenerationMode::Full, at(2026, 1, 1)).unwrap();
        assert_eq!(
            dates(&out),
            vec![
                at(2026, 1, 31),
                at(2026, 3, 3),
                at(2026, 4, 3),
                at(2026, 5, 3)
            ]
        );

        let leap = self::rule(at(2024, 1, 31), Interval::Monthly, 2);
        let out = generate(&leap, GenerationMode::Full, at(2024, 1, 1)).unwrap();
        assert_eq!(dates(&out), vec![at(2024, 1, 31), at(2024, 3, 2)]);
    }

    #[test]
    fn leap_day_yearly_series_moves_to_march() {
        let rule = rule(at(2024, 2, 29), Interval::Yearly, 3);
        let out = generate(&rule, GenerationMode::Full, at(2024, 1, 1)).unwrap();
        assert_eq!(
            dates(&out),
            vec![at(2024, 2, 29), at(2025, 3, 1), at(2026, 3, 1)]
        );
    }

    #[test]
    fn future_only_steps_like_full() {
        let rule = rule(at(2026, 1, 31), Interval::Monthly, 4);
        let out = generate(&rule, GenerationMode::FutureOnly, at(2026, 3, 10)).unwrap();
        assert_eq!(dates(&out), vec![at(2026, 4, 3), at(2026, 5, 3)]);
    }

    #[test]
    fn series_past_calendar_range_is_rejected() {
        let start = Utc.with_ymd_and_hms(262_000, 1, 1, 0, 0, 0).unwrap();
        let rule = rule(start, Interval::Yearly, 1_000);
        assert!(matches!(
            generate(&rule, GenerationMode::Full, start),
            Err(StoreError::Validation(_))
        ));
        assert!(!Interval::Yearly.fits(start, 1_000));
        assert!(Interval::Yearly.fits(start, 2));
    }

    #[test]
    fn future_only_consumes_past_budget() {
        let rule = rule(at(2026, 1, 1), Interval::Monthly, 6);
        let out = generate(&rule, GenerationMode::FutureOnly, at(2026, 3, 15)).unwrap();
        assert_eq!(
            dates(&out),
            vec![at(2026, 4, 1), at(2026, 5, 1), at(2026, 6, 1)]
        );
    }

    #[test]
    fn future_only_keeps_an_occurrence_exactly_at_now() {
        let rule = rule(at(2026, 1, 1), Interval::Monthly, 3);
        let out = generate(&rule, GenerationMode::FutureOnly, at(2026, 2, 1)).unwrap();
        assert_eq!(dates(&out), vec![at(2026, 2, 1), at(2026, 3, 1)]);
    }

    #[test]
    fn future_only_is_empty_once_budget_is_spent() {
        let rule = rule(at(2025, 1, 1), Interval::Weekly, 3);
        let out = generate(&rule, GenerationMode::FutureOnly, at(2026, 1, 1)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn future_only_before_start_matches_full() {
        let rule = rule(at(2026, 6, 1), Interval::Daily, 4);
        let now = at(2026, 1, 1);
        assert_eq!(
            dates(&generate(&rule, GenerationMode::FutureOnly, now).unwrap()),
            dates(&generate(&rule, GenerationMode::Full, now).unwrap())
        );
    }

    #[test]
    fn interval_parse_rejects_unknown() {
        assert_eq!(Interval::try_from("weekly").unwrap(), Interval::Weekly);
        assert!(matches!(
            Interval::try_from("hourly"),
            Err(StoreError::Validation(_))
        ));
    }
}
