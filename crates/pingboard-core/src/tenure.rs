use chrono::{Datelike, NaiveDate};
use std::fmt;

const MONTHS_IN_YEAR: i32 = 12;

/// Whole years and months elapsed between a start date and a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tenure {
    pub years: u32,
    pub months: u32,
}

impl Tenure {
    /// Calendar-aware difference. `None` when `start` is after `reference`.
    ///
    /// A month only counts once the reference day-of-month has reached the
    /// start day-of-month, so 10 July to 9 August is still zero months.
    pub fn between(start: NaiveDate, reference: NaiveDate) -> Option<Self> {
        if start > reference {
            return None;
        }

        let mut years = reference.year() - start.year();
        let mut months = reference.month() as i32 - start.month() as i32;
        if reference.day() < start.day() {
            months -= 1;
        }
        if months < 0 {
            years -= 1;
            months += MONTHS_IN_YEAR;
        }

        Some(Self {
            years: years as u32,
            months: months as u32,
        })
    }

    pub fn total_months(&self) -> u32 {
        self.years * MONTHS_IN_YEAR as u32 + self.months
    }

    pub fn is_new_starter(&self) -> bool {
        self.years == 0 && self.months == 0
    }
}

fn unit(count: u32, singular: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}s", count, singular)
    }
}

impl fmt::Display for Tenure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_new_starter() {
            return f.write_str("New starter");
        }

        let mut parts = Vec::with_capacity(2);
        if self.years > 0 {
            parts.push(unit(self.years, "year"));
        }
        if self.months > 0 {
            parts.push(unit(self.months, "month"));
        }
        f.write_str(&parts.join(", "))
    }
}

/// Human-readable tenure, e.g. `"1 year, 2 months"`.
///
/// Returns `""` when `start` lies after `reference` and `"New starter"` when
/// less than one whole month has elapsed.
pub fn describe_tenure(start: NaiveDate, reference: NaiveDate) -> String {
    Tenure::between(start, reference)
        .map(|t| t.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_describe_tenure_reference_table() {
        let start = date(2010, 7, 10);
        let cases = [
            (date(2010, 2, 28), ""),
            (date(2010, 7, 10), "New starter"),
            (date(2010, 7, 30), "New starter"),
            (date(2010, 8, 9), "New starter"),
            (date(2010, 8, 10), "1 month"),
            (date(2010, 8, 25), "1 month"),
            (date(2010, 9, 9), "1 month"),
            (date(2010, 9, 10), "2 months"),
            (date(2011, 2, 5), "6 months"),
            (date(2011, 2, 10), "7 months"),
            (date(2011, 7, 9), "11 months"),
            (date(2011, 7, 10), "1 year"),
            (date(2011, 9, 30), "1 year, 2 months"),
            (date(2011, 11, 5), "1 year, 3 months"),
            (date(2011, 11, 11), "1 year, 4 months"),
            (date(2013, 7, 10), "3 years"),
            (date(2099, 3, 15), "88 years, 8 months"),
        ];

        for (reference, expected) in cases {
            assert_eq!(
                describe_tenure(start, reference),
                expected,
                "tenure from {} to {}",
                start,
                reference
            );
        }
    }

    #[test]
    fn test_year_boundary_borrow() {
        // December to January crosses the year without completing a year.
        let t = Tenure::between(date(2019, 12, 15), date(2020, 1, 20)).unwrap();
        assert_eq!(t, Tenure { years: 0, months: 1 });

        let t = Tenure::between(date(2019, 12, 15), date(2020, 12, 14)).unwrap();
        assert_eq!(t, Tenure { years: 0, months: 11 });
    }

    #[test]
    fn test_pluralization_boundaries() {
        assert_eq!(Tenure { years: 1, months: 1 }.to_string(), "1 year, 1 month");
        assert_eq!(Tenure { years: 2, months: 2 }.to_string(), "2 years, 2 months");
        assert_eq!(Tenure { years: 2, months: 0 }.to_string(), "2 years");
        assert_eq!(Tenure { years: 0, months: 1 }.to_string(), "1 month");
    }

    #[test]
    fn test_end_of_month_start() {
        // Day 31 start: February never reaches day 31, so the month completes in March.
        let start = date(2021, 1, 31);
        assert_eq!(describe_tenure(start, date(2021, 2, 28)), "New starter");
        assert_eq!(describe_tenure(start, date(2021, 3, 31)), "2 months");
    }

    fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..60_000).prop_map(|offset| date(1900, 1, 1) + chrono::Duration::days(offset))
    }

    proptest! {
        #[test]
        fn prop_future_start_is_empty(start in arb_date(), back in 1i64..20_000) {
            let reference = start - chrono::Duration::days(back);
            prop_assert_eq!(describe_tenure(start, reference), "");
        }

        #[test]
        fn prop_same_day_is_new_starter(start in arb_date()) {
            prop_assert_eq!(describe_tenure(start, start), "New starter");
        }

        #[test]
        fn prop_monotonic_day_by_day(start in arb_date(), span in 0i64..800) {
            let mut previous = 0u32;
            for offset in 0..=span {
                let reference = start + chrono::Duration::days(offset);
                let total = Tenure::between(start, reference).unwrap().total_months();
                prop_assert!(total >= previous);
                previous = total;
            }
        }

        #[test]
        fn prop_singular_only_for_one(years in 0u32..120, months in 0u32..12) {
            let text = Tenure { years, months }.to_string();
            prop_assert_eq!(text.contains("1 year,") || text.ends_with("1 year"), years == 1);
            prop_assert_eq!(text.contains(" years"), years > 1);
            prop_assert_eq!(text.contains(" months"), months > 1);
            prop_assert_eq!(text.ends_with(" month"), months == 1);
        }
    }
}
