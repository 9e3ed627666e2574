//! Regex entity extraction: dates, emails, phone numbers, amounts, addresses.
//!
//! One pattern per entity class, applied case-insensitively. All
//! non-overlapping matches are collected and de-duplicated; classes with no
//! match are left out of the bag.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Entity classes recognised by [`extract_entities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    Dates,
    Emails,
    PhoneNumbers,
    Amounts,
    Locations,
}

impl EntityClass {
    pub const ALL: [EntityClass; 5] = [
        Self::Dates,
        Self::Emails,
        Self::PhoneNumbers,
        Self::Amounts,
        Self::Locations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dates => "dates",
            Self::Emails => "emails",
            Self::PhoneNumbers => "phone_numbers",
            Self::Amounts => "amounts",
            Self::Locations => "locations",
        }
    }
}

/// Entity class → matched substrings.
///
/// Ordered maps and sets keep iteration and serialisation deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityBag(BTreeMap<EntityClass, BTreeSet<String>>);

impl EntityBag {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, class: EntityClass) -> Option<&BTreeSet<String>> {
        self.0.get(&class)
    }

    /// Matches for a class, empty when the class is absent.
    pub fn values(&self, class: EntityClass) -> impl Iterator<Item = &str> {
        self.0.get(&class).into_iter().flatten().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityClass, &BTreeSet<String>)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }
}

const MONTHS: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

fn pattern(src: &str) -> Regex {
    Regex::new(src).expect("Invalid entity regex")
}

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(&format!(
        r"(?i)\b(?:\d{{4}}-\d{{1,2}}-\d{{1,2}}|\d{{1,2}}[/-]\d{{1,2}}[/-]\d{{2,4}}|(?:{MONTHS})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?(?:,?\s+\d{{4}})?)\b"
    ))
});

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b"));

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?:\+?1[\s.-]?)?(?:\(\d{3}\)\s?|\b\d{3}[\s.-])\d{3}[\s.-]\d{4}\b")
});

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?i)\$\s?\d{1,3}(?:,\d{3})*(?:\.\d{2})?(?:\s?(?:k|million|billion)\b)?|\b\d{1,3}(?:,\d{3})*(?:\.\d{2})?\s?(?:dollars|usd)\b",
    )
});

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?i)\b\d{1,6}\s+(?:[a-z0-9.]+\s+){1,4}(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|court|ct|way|highway|hwy|parkway|pkwy|place|pl)\b\.?|\b[a-z][a-z .'-]*,\s*[a-z]{2}\s+\d{5}(?:-\d{4})?\b",
    )
});

fn regex_for(class: EntityClass) -> &'static Regex {
    match class {
        EntityClass::Dates => &DATE,
        EntityClass::Emails => &EMAIL,
        EntityClass::PhoneNumbers => &PHONE,
        EntityClass::Amounts => &AMOUNT,
        EntityClass::Locations => &LOCATION,
    }
}

/// Extract every entity class from `text`. Empty text gives an empty bag.
pub fn extract_entities(text: &str) -> EntityBag {
    let mut bag = BTreeMap::new();
    if text.trim().is_empty() {
        return EntityBag(bag);
    }
    for class in EntityClass::ALL {
        let found: BTreeSet<String> = regex_for(class)
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !found.is_empty() {
            bag.insert(class, found);
        }
    }
    EntityBag(bag)
}

/// [`extract_entities`] for optional input; `None` behaves like `""`.
pub fn extract_entities_opt(text: Option<&str>) -> EntityBag {
    extract_entities(text.unwrap_or_default())
}

/// Date matches in order of first appearance, without duplicates.
pub fn dates_in_order(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in DATE.find_iter(text) {
        let s = m.as_str().trim().to_string();
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}
