//! Entity extraction: dates, times, numbers, places and people.
//!
//! All patterns run over an ASCII-lowercased copy of the text so byte offsets
//! line up with the original; entity text is sliced from the original.

use std::ops::Range;
use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use colloquy_core::signal::{Entity, EntityKind};
use regex_lite::Regex;
use serde_json::{Number, Value};

static TIME_MERIDIEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").expect("time pattern")
});

static TIME_24H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("24h time pattern"));

static TIME_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(noon|midday|midnight)\b").expect("time word pattern"));

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date pattern"));

static DAY_AFTER_TOMORROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bday after tomorrow\b").expect("relative date pattern"));

static DATE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(next|this)\s+)?(today|tonight|tomorrow|yesterday|monday|tuesday|wednesday|thursday|friday|saturday|sunday|week)\b",
    )
    .expect("date word pattern")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("number pattern"));

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z'\-]*").expect("word pattern"));

const NUMBER_WORDS: &[(&str, i64)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
    ("hundred", 100),
];

const PLACE_CUES: &[&str] = &["in", "at", "near"];
const PERSON_CUES: &[&str] = &["call", "text", "email", "with", "ask", "tell", "message"];

/// Words that are capitalised at the start of a place or name but are not one.
const NOT_NAMES: &[&str] = &[
    "i", "the", "a", "an", "me", "my", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "sunday", "today", "tomorrow", "tonight", "yesterday",
];

/// Extract every entity from `raw`, in order of appearance.
pub fn extract(raw: &str, today: NaiveDate) -> Vec<Entity> {
    let lower = raw.to_ascii_lowercase();
    let mut found: Vec<(usize, Entity)> = Vec::new();
    let mut taken: Vec<Range<usize>> = Vec::new();

    times(raw, &lower, &mut found, &mut taken);
    dates(raw, &lower, today, &mut found, &mut taken);
    numbers(raw, &lower, &mut found, &taken);
    names(raw, PLACE_CUES, EntityKind::Place, &mut found);
    names(raw, PERSON_CUES, EntityKind::Person, &mut found);

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, e)| e).collect()
}

fn overlaps(taken: &[Range<usize>], span: &Range<usize>) -> bool {
    taken.iter().any(|t| t.start < span.end && span.start < t.end)
}

fn times(raw: &str, lower: &str, found: &mut Vec<(usize, Entity)>, taken: &mut Vec<Range<usize>>) {
    for caps in TIME_MERIDIEM.captures_iter(lower) {
        let Some(m) = caps.get(0) else { continue };
        let hour: u32 = caps.get(1).and_then(|h| h.as_str().parse().ok()).unwrap_or(0);
        let minute: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        if !(1..=12).contains(&hour) || minute > 59 {
            continue;
        }
        let pm = caps.get(3).is_some_and(|s| s.as_str() == "pm");
        let hour24 = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        push_time(raw, m.range(), hour24, minute, found, taken);
    }

    for caps in TIME_24H.captures_iter(lower) {
        let Some(m) = caps.get(0) else { continue };
        if overlaps(taken, &m.range()) {
            continue;
        }
        let hour: u32 = caps.get(1).and_then(|h| h.as_str().parse().ok()).unwrap_or(99);
        let minute: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(99);
        if hour > 23 || minute > 59 {
            continue;
        }
        push_time(raw, m.range(), hour, minute, found, taken);
    }

    for m in TIME_WORD.find_iter(lower) {
        let hour = if m.as_str() == "midnight" { 0 } else { 12 };
        push_time(raw, m.range(), hour, 0, found, taken);
    }
}

fn push_time(
    raw: &str,
    span: Range<usize>,
    hour: u32,
    minute: u32,
    found: &mut Vec<(usize, Entity)>,
    taken: &mut Vec<Range<usize>>,
) {
    let entity = Entity::new(EntityKind::Time, &raw[span.clone()])
        .with_value(format!("{hour:02}:{minute:02}"));
    found.push((span.start, entity));
    taken.push(span);
}

fn dates(
    raw: &str,
    lower: &str,
    today: NaiveDate,
    found: &mut Vec<(usize, Entity)>,
    taken: &mut Vec<Range<usize>>,
) {
    for caps in ISO_DATE.captures_iter(lower) {
        let Some(m) = caps.get(0) else { continue };
        let parsed = NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d");
        if let Ok(date) = parsed {
            push_date(raw, m.range(), date, found, taken);
        }
    }

    for m in DAY_AFTER_TOMORROW.find_iter(lower) {
        push_date(raw, m.range(), today + Duration::days(2), found, taken);
    }

    for caps in DATE_WORD.captures_iter(lower) {
        let Some(m) = caps.get(0) else { continue };
        if overlaps(taken, &m.range()) {
            continue;
        }
        let modifier = caps.get(1).map(|c| c.as_str());
        let word = caps.get(2).map_or("", |c| c.as_str());
        let offset = match word {
            "today" | "tonight" => 0,
            "tomorrow" => 1,
            "yesterday" => -1,
            "week" if modifier == Some("next") => 7,
            "week" => continue,
            weekday => {
                let Some(target) = weekday_index(weekday) else { continue };
                let current = i64::from(today.weekday().num_days_from_monday());
                let ahead = (target - current).rem_euclid(7);
                if modifier == Some("next") && ahead == 0 { 7 } else { ahead }
            }
        };
        push_date(raw, m.range(), today + Duration::days(offset), found, taken);
    }
}

fn push_date(
    raw: &str,
    span: Range<usize>,
    date: NaiveDate,
    found: &mut Vec<(usize, Entity)>,
    taken: &mut Vec<Range<usize>>,
) {
    let entity = Entity::new(EntityKind::Date, &raw[span.clone()])
        .with_value(date.format("%Y-%m-%d").to_string());
    found.push((span.start, entity));
    taken.push(span);
}

fn weekday_index(word: &str) -> Option<i64> {
    let index = match word {
        "monday" => 0,
        "tuesday" => 1,
        "wednesday" => 2,
        "thursday" => 3,
        "friday" => 4,
        "saturday" => 5,
        "sunday" => 6,
        _ => return None,
    };
    Some(index)
}

fn numbers(raw: &str, lower: &str, found: &mut Vec<(usize, Entity)>, taken: &[Range<usize>]) {
    for m in NUMBER.find_iter(lower) {
        if overlaps(taken, &m.range()) {
            continue;
        }
        let text = m.as_str();
        let value = if let Ok(n) = text.parse::<i64>() {
            Value::Number(n.into())
        } else if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            Value::Number(n)
        } else {
            continue;
        };
        found.push((m.start(), Entity::new(EntityKind::Number, &raw[m.range()]).with_value(value)));
    }

    for m in WORD.find_iter(lower) {
        if let Some((_, n)) = NUMBER_WORDS.iter().find(|(w, _)| *w == m.as_str()) {
            found.push((m.start(), Entity::new(EntityKind::Number, &raw[m.range()]).with_value(*n)));
        }
    }
}

/// Runs of capitalised words right after a cue word.
fn names(raw: &str, cues: &[&str], kind: EntityKind, found: &mut Vec<(usize, Entity)>) {
    let words: Vec<_> = WORD.find_iter(raw).collect();
    let mut i = 0;
    while i < words.len() {
        let cue = words[i].as_str().to_ascii_lowercase();
        if !cues.contains(&cue.as_str()) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < words.len() && is_name_word(words[j].as_str()) {
            // A run stops at a gap wider than one space.
            if j > i + 1 && words[j].start() - words[j - 1].end() > 1 {
                break;
            }
            j += 1;
        }
        if j > i + 1 {
            let span = words[i + 1].start()..words[j - 1].end();
            found.push((span.start, Entity::new(kind, &raw[span])));
        }
        i = j.max(i + 1);
    }
}

fn is_name_word(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
        && !NOT_NAMES.contains(&word.to_ascii_lowercase().as_str())
}
