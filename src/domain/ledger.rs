//! Trade ledger: append-only record of `Buy`/`Sell` calls.

use crate::domain::error::SimtraderError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Marker used in narration lines and ledger reports.
    pub fn marker(self) -> &'static str {
        match self {
            Side::Buy => "買",
            Side::Sell => "売",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub date: NaiveDate,
    pub code: String,
    pub price: i64,
    pub quantity: i64,
    pub side: Side,
}

/// What `Ledger::add` does when a trade for the same instrument and date
/// is already recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    AlwaysAppend,
    RejectSameDay,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "append" => Ok(DuplicatePolicy::AlwaysAppend),
            "reject" => Ok(DuplicatePolicy::RejectSameDay),
            other => Err(format!("unknown duplicate policy '{other}' (expected append or reject)")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    system: Option<String>,
    policy: DuplicatePolicy,
    entries: Vec<LogEntry>,
    by_day: HashMap<(String, NaiveDate), Vec<usize>>,
}

impl Ledger {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn set_system(&mut self, system: impl Into<String>) {
        self.system = Some(system.into());
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn add(&mut self, entry: LogEntry) -> Result<(), SimtraderError> {
        let key = (entry.code.clone(), entry.date);
        if self.policy == DuplicatePolicy::RejectSameDay && self.by_day.contains_key(&key) {
            return Err(SimtraderError::DuplicateTrade {
                code: entry.code,
                date: entry.date,
            });
        }
        self.by_day.entry(key).or_default().push(self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn all(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn entries_on(&self, code: &str, date: NaiveDate) -> Vec<&LogEntry> {
        self.by_day
            .get(&(code.to_string(), date))
            .map(|positions| positions.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, day: u32, side: Side) -> LogEntry {
        LogEntry {
            date: NaiveDate::from_ymd_opt(2013, 7, day).unwrap(),
            code: code.to_string(),
            price: 1500,
            quantity: 100,
            side,
        }
    }

    #[test]
    fn default_policy_appends_duplicates() {
        let mut ledger = Ledger::default();
        assert_eq!(ledger.policy(), DuplicatePolicy::AlwaysAppend);
        ledger.add(entry("1321", 8, Side::Buy)).unwrap();
        ledger.add(entry("1321", 8, Side::Buy)).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.all()[0], ledger.all()[1]);
    }

    #[test]
    fn reject_policy_refuses_same_day_same_code() {
        let mut ledger = Ledger::new(DuplicatePolicy::RejectSameDay);
        ledger.add(entry("1321", 8, Side::Buy)).unwrap();
        let result = ledger.add(entry("1321", 8, Side::Sell));
        assert!(matches!(
            result,
            Err(SimtraderError::DuplicateTrade { code, .. }) if code == "1321"
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn reject_policy_allows_other_days_and_codes() {
        let mut ledger = Ledger::new(DuplicatePolicy::RejectSameDay);
        ledger.add(entry("1321", 8, Side::Buy)).unwrap();
        ledger.add(entry("1321", 9, Side::Sell)).unwrap();
        ledger.add(entry("7203", 8, Side::Buy)).unwrap();
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn entries_on_uses_day_index() {
        let mut ledger = Ledger::default();
        ledger.add(entry("1321", 8, Side::Buy)).unwrap();
        ledger.add(entry("7203", 8, Side::Buy)).unwrap();
        ledger.add(entry("1321", 8, Side::Sell)).unwrap();

        let date = NaiveDate::from_ymd_opt(2013, 7, 8).unwrap();
        let found = ledger.entries_on("1321", date);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].side, Side::Buy);
        assert_eq!(found[1].side, Side::Sell);
        assert!(ledger.entries_on("1001", date).is_empty());
    }

    #[test]
    fn system_name_is_optional() {
        let ledger = Ledger::default();
        assert!(ledger.system().is_none());
        let ledger = ledger.with_system("golden_cross.pt");
        assert_eq!(ledger.system(), Some("golden_cross.pt"));
    }

    #[test]
    fn side_markers() {
        assert_eq!(Side::Buy.marker(), "買");
        assert_eq!(Side::Sell.marker(), "売");
    }

    #[test]
    fn policy_from_str() {
        assert_eq!(
            "append".parse::<DuplicatePolicy>(),
            Ok(DuplicatePolicy::AlwaysAppend)
        );
        assert_eq!(
            " Reject ".parse::<DuplicatePolicy>(),
            Ok(DuplicatePolicy::RejectSameDay)
        );
        assert!("skip".parse::<DuplicatePolicy>().is_err());
    }
}
