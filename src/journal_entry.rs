use std::fmt;

use chrono::{DateTime, Local, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Motivated,
    Relaxed,
    Angry,
    Excited,
    Bored,
    Anxious,
    Confused,
    Grateful,
}

impl Mood {
    pub const ALL: [Mood; 10] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Motivated,
        Mood::Relaxed,
        Mood::Angry,
        Mood::Excited,
        Mood::Bored,
        Mood::Anxious,
        Mood::Confused,
        Mood::Grateful,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Motivated => "Motivated",
            Mood::Relaxed => "Relaxed",
            Mood::Angry => "Angry",
            Mood::Excited => "Excited",
            Mood::Bored => "Bored",
            Mood::Anxious => "Anxious",
            Mood::Confused => "Confused",
            Mood::Grateful => "Grateful",
        }
    }

    fn index(self) -> usize {
        Mood::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    /// Next mood in selector order, wrapping around. `None` starts at the first.
    pub fn cycle(current: Option<Mood>, forward: bool) -> Mood {
        let len = Mood::ALL.len();
        let next = match current {
            None if forward => 0,
            None => len - 1,
            Some(mood) if forward => (mood.index() + 1) % len,
            Some(mood) => (mood.index() + len - 1) % len,
        };
        Mood::ALL[next]
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub text: String,
    #[serde(serialize_with = "write_date")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
}

/// Dates are always written with three fractional digits and a `Z` suffix.
fn write_date<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl Entry {
    pub fn new(id: EntryId, date: DateTime<Utc>, text: String, mood: Option<Mood>) -> Self {
        Entry {
            id,
            text,
            date,
            mood,
        }
    }

    pub fn first_line(&self) -> &str {
        self.text.lines().next().unwrap_or("")
    }

    pub fn date_label(&self) -> String {
        self.date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Issues entry ids from wall-clock milliseconds.
///
/// Ids never repeat within a process: when the clock has not advanced past
/// the last issued id (same millisecond, or a clock step backwards) the
/// generator hands out `last + 1` instead. The floor saturates at
/// `i64::MAX`.
#[derive(Debug)]
pub struct IdGenerator<C = SystemClock> {
    clock: C,
    last: i64,
}

impl IdGenerator<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for IdGenerator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> IdGenerator<C> {
    pub fn with_clock(clock: C) -> Self {
        IdGenerator { clock, last: 0 }
    }

    /// Raise the floor so that ids already on disk are never reissued.
    pub fn observe(&mut self, entries: &[Entry]) {
        if let Some(max) = entries.iter().map(|e| e.id.0).max() {
            self.last = self.last.max(max);
        }
    }

    /// A fresh id together with the creation time it was derived from.
    pub fn stamp(&mut self) -> (EntryId, DateTime<Utc>) {
        let date = self.clock.now().trunc_subsecs(3);
        let millis = date.timestamp_millis();
        let id = if millis > self.last {
            millis
        } else {
            self.last.saturating_add(1)
        };
        self.last = id;
        (EntryId(id), date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FrozenClock(DateTime<Utc>);

    impl Clock for FrozenClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn serializes_like_the_stored_payload() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let entry = Entry::new(EntryId(1709281800000), date, "Walk".into(), Some(Mood::Relaxed));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1709281800000i64,
                "text": "Walk",
                "date": "2024-03-01T08:30:00.000Z",
                "mood": "Relaxed",
            })
        );
    }

    #[test]
    fn reads_payload_without_mood() {
        let entry: Entry = serde_json::from_str(
            r#"{"id": 1700000000000, "text": "plain", "date": "2023-11-14T22:13:20.000Z"}"#,
        )
        .unwrap();

        assert_eq!(entry.id, EntryId(1700000000000));
        assert_eq!(entry.mood, None);
        assert_eq!(entry.date.timestamp_millis(), 1700000000000);
    }

    #[test]
    fn omits_absent_mood_on_write() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let entry = Entry::new(EntryId(1), date, "x".into(), None);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("mood"));
    }

    #[test]
    fn frozen_clock_still_yields_distinct_ids() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut ids = IdGenerator::with_clock(FrozenClock(date));

        let (a, da) = ids.stamp();
        let (b, db) = ids.stamp();

        assert_eq!(a.0, date.timestamp_millis());
        assert_eq!(b.0, a.0 + 1);
        assert_eq!(da, db);
    }

    #[test]
    fn observe_skips_past_existing_ids() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let existing = Entry::new(
            EntryId(date.timestamp_millis() + 50),
            date,
            "later".into(),
            None,
        );
        let mut ids = IdGenerator::with_clock(FrozenClock(date));
        ids.observe(&[existing]);

        let (id, _) = ids.stamp();
        assert_eq!(id.0, date.timestamp_millis() + 51);
    }

    #[test]
    fn whole_second_dates_keep_millisecond_digits() {
        let date = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let entry = Entry::new(EntryId(1), date, "x".into(), None);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""date":"2023-11-14T22:13:20.000Z""#), "{json}");

        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date, date);
    }

    #[test]
    fn stamp_after_maximal_stored_id_does_not_overflow() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let existing = Entry::new(EntryId(i64::MAX), date, "far future".into(), None);
        let mut ids = IdGenerator::with_clock(FrozenClock(date));
        ids.observe(&[existing]);

        let (id, stamped) = ids.stamp();
        assert_eq!(id, EntryId(i64::MAX));
        assert_eq!(stamped, date);
    }

    #[test]
    fn stamp_truncates_to_milliseconds() {
        let date = Utc.timestamp_nanos(1_700_000_000_123_456_789);
        let mut ids = IdGenerator::with_clock(FrozenClock(date));
        let (_, stamped) = ids.stamp();
        assert_eq!(stamped.timestamp_subsec_nanos(), 123_000_000);
    }

    struct ScriptedClock {
        readings: Vec<i64>,
        next: std::cell::Cell<usize>,
    }

    impl Clock for ScriptedClock {
        fn now(&self) -> DateTime<Utc> {
            let i = self.next.get();
            self.next.set(i + 1);
            let millis = self.readings[i % self.readings.len()];
            Utc.timestamp_millis_opt(millis).unwrap()
        }
    }

    proptest::proptest! {
        #[test]
        fn ids_are_unique_and_increasing_for_any_clock(
            readings in proptest::collection::vec(1_600_000_000_000i64..1_600_000_000_050, 1..50),
            count in 1usize..200,
        ) {
            let mut ids = IdGenerator::with_clock(ScriptedClock {
                readings,
                next: std::cell::Cell::new(0),
            });
            let issued: Vec<i64> = (0..count).map(|_| ids.stamp().0 .0).collect();
            proptest::prop_assert!(issued.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(Mood::cycle(None, true), Mood::Happy);
        assert_eq!(Mood::cycle(None, false), Mood::Grateful);
        assert_eq!(Mood::cycle(Some(Mood::Grateful), true), Mood::Happy);
        assert_eq!(Mood::cycle(Some(Mood::Happy), false), Mood::Grateful);
        assert_eq!(Mood::cycle(Some(Mood::Sad), true), Mood::Motivated);
    }
}
