//! Weighted-keyword case-type classifier.
//!
//! Scores a description against a fixed table of practice areas. Each
//! keyword is a literal, lower-case substring; its weight is added once per
//! category when present. The highest total wins, ties go to the category
//! listed first, and confidence is `min(1, score / 10)`.

use lexintake_core::analysis::CATEGORY_OTHER;
use lexintake_core::config::{ClassifierConfig, DEFAULT_NO_MATCH_CONFIDENCE};
use serde::Serialize;

/// Score at which confidence saturates at 1.0.
pub const SCORE_DENOMINATOR: f32 = 10.0;

struct Category {
    name: &'static str,
    case_type_key: &'static str,
    keywords: &'static [(&'static str, u32)],
}

/// Category table in tie-break order.
const CATEGORIES: &[Category] = &[
    Category {
        name: "family",
        case_type_key: "family_law",
        keywords: &[
            ("divorce", 3),
            ("custody", 3),
            ("child support", 3),
            ("alimony", 3),
            ("adoption", 2),
            ("prenup", 2),
            ("visitation", 2),
            ("marriage", 1),
            ("spouse", 1),
        ],
    },
    Category {
        name: "criminal",
        case_type_key: "criminal_defense",
        keywords: &[
            ("arrest", 3),
            ("charged", 3),
            ("dui", 3),
            ("felony", 3),
            ("misdemeanor", 3),
            ("police", 1),
            ("theft", 2),
            ("assault", 2),
            ("probation", 2),
            ("bail", 2),
        ],
    },
    Category {
        name: "civil",
        case_type_key: "civil_litigation",
        keywords: &[
            ("lawsuit", 2),
            ("sue", 1),
            ("breach", 2),
            ("contract", 2),
            ("damages", 1),
            ("dispute", 1),
            ("small claims", 3),
            ("defamation", 3),
        ],
    },
    Category {
        name: "employment",
        case_type_key: "employment_law",
        keywords: &[
            ("fired", 3),
            ("wrongful termination", 4),
            ("discrimination", 3),
            ("harassment", 3),
            ("overtime", 2),
            ("wages", 2),
            ("employer", 1),
            ("boss", 1),
            ("hostile work", 3),
            ("retaliation", 2),
        ],
    },
    Category {
        name: "real_estate",
        case_type_key: "real_estate",
        keywords: &[
            ("landlord", 3),
            ("tenant", 3),
            ("eviction", 3),
            ("lease", 2),
            ("property", 1),
            ("mortgage", 2),
            ("foreclosure", 3),
            ("deed", 2),
            ("zoning", 2),
        ],
    },
    Category {
        name: "personal_injury",
        case_type_key: "personal_injury",
        keywords: &[
            ("injury", 3),
            ("injured", 3),
            ("accident", 2),
            ("slip", 2),
            ("fall", 1),
            ("hurt", 2),
            ("whiplash", 3),
            ("collision", 2),
            ("hospital", 1),
        ],
    },
    Category {
        name: "medical_malpractice",
        case_type_key: "medical_malpractice",
        keywords: &[
            ("malpractice", 4),
            ("misdiagnosis", 4),
            ("surgery", 2),
            ("surgeon", 2),
            ("doctor", 1),
            ("negligence", 2),
            ("wrong medication", 3),
            ("birth injury", 3),
        ],
    },
    Category {
        name: "business",
        case_type_key: "business_law",
        keywords: &[
            ("llc", 3),
            ("incorporate", 3),
            ("partnership", 2),
            ("shareholder", 3),
            ("business", 1),
            ("merger", 3),
            ("startup", 2),
        ],
    },
    Category {
        name: "immigration",
        case_type_key: "immigration",
        keywords: &[
            ("visa", 3),
            ("green card", 4),
            ("deportation", 4),
            ("asylum", 4),
            ("citizenship", 3),
            ("immigration", 3),
        ],
    },
    Category {
        name: "bankruptcy",
        case_type_key: "bankruptcy",
        keywords: &[
            ("bankruptcy", 4),
            ("chapter 7", 4),
            ("chapter 13", 4),
            ("debt", 2),
            ("creditor", 2),
            ("collections", 2),
        ],
    },
    Category {
        name: "intellectual_property",
        case_type_key: "intellectual_property",
        keywords: &[
            ("patent", 4),
            ("trademark", 4),
            ("copyright", 4),
            ("infringement", 3),
            ("trade secret", 3),
        ],
    },
    Category {
        name: "estate_planning",
        case_type_key: "estate_planning",
        keywords: &[
            ("will", 1),
            ("trust", 2),
            ("estate", 2),
            ("probate", 3),
            ("inheritance", 3),
            ("power of attorney", 3),
        ],
    },
];

/// Best category for one description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseClassification {
    pub category: String,
    /// In [0, 1].
    pub confidence: f32,
    /// Raw summed weight of the winning category; 0 when nothing matched.
    pub score: u32,
}

impl CaseClassification {
    pub fn is_other(&self) -> bool {
        self.category == CATEGORY_OTHER
    }

    /// Taxonomy key for the category, `None` for `other`.
    pub fn case_type_key(&self) -> Option<&'static str> {
        case_type_key_for(&self.category)
    }
}

/// Taxonomy key for a generic category name.
pub fn case_type_key_for(category: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|c| c.name == category)
        .map(|c| c.case_type_key)
}

/// Generic category names in table order.
pub fn category_names() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().map(|c| c.name)
}

/// Keyword classifier with a configurable no-match confidence.
#[derive(Debug, Clone, Copy)]
pub struct CaseTypeClassifier {
    no_match_confidence: f32,
}

impl Default for CaseTypeClassifier {
    fn default() -> Self {
        Self {
            no_match_confidence: DEFAULT_NO_MATCH_CONFIDENCE,
        }
    }
}

impl CaseTypeClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            no_match_confidence: config.no_match_confidence.clamp(0.0, 1.0),
        }
    }

    pub fn classify(&self, description: &str) -> CaseClassification {
        let text = description.to_lowercase();
        let mut best: Option<(&Category, u32)> = None;

        for category in CATEGORIES {
            let score: u32 = category
                .keywords
                .iter()
                .filter(|(kw, _)| text.contains(kw))
                .map(|(_, w)| w)
                .sum();
            // Strictly greater: earlier categories win ties.
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((category, score));
            }
        }

        match best {
            Some((category, score)) => CaseClassification {
                category: category.name.to_string(),
                confidence: (score as f32 / SCORE_DENOMINATOR).min(1.0),
                score,
            },
            None => CaseClassification {
                category: CATEGORY_OTHER.to_string(),
                confidence: self.no_match_confidence,
                score: 0,
            },
        }
    }

    /// Classify many descriptions; output order matches input order.
    pub fn classify_batch<S: AsRef<str>>(&self, descriptions: &[S]) -> Vec<CaseClassification> {
        descriptions
            .iter()
            .map(|d| self.classify(d.as_ref()))
            .collect()
    }
}

/// `(category, confidence)` with the default no-match confidence.
pub fn classify_case(description: &str) -> (String, f32) {
    let c = CaseTypeClassifier::default().classify(description);
    (c.category, c.confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_other_at_half() {
        assert_eq!(classify_case(""), ("other".to_string(), 0.5));
    }

    #[test]
    fn no_match_confidence_is_configurable() {
        let classifier = CaseTypeClassifier::new(&ClassifierConfig {
            no_match_confidence: 0.0,
        });
        let c = classifier.classify("the weather is nice");
        assert!(c.is_other());
        assert_eq!(c.confidence, 0.0);
        assert_eq!(c.case_type_key(), None);
    }

    #[test]
    fn picks_highest_score() {
        let c = CaseTypeClassifier::default().classify("My landlord started an eviction");
        assert_eq!(c.category, "real_estate");
        assert_eq!(c.score, 6);
        assert!((c.confidence - 0.6).abs() < f32::EPSILON);
        assert_eq!(c.case_type_key(), Some("real_estate"));
    }

    #[test]
    fn ties_go_to_table_order() {
        // "custody" (family, 3) and "arrest" (criminal, 3).
        let c = CaseTypeClassifier::default().classify("custody arrest");
        assert_eq!(c.category, "family");
    }

    #[test]
    fn literal_substrings_are_not_word_bounded() {
        // "sue" inside "issue".
        let c = CaseTypeClassifier::default().classify("a small issue");
        assert_eq!(c.category, "civil");
        assert_eq!(c.score, 1);
    }

    #[test]
    fn confidence_clamps_at_one() {
        let text = "divorce custody alimony child support ".repeat(500);
        let c = CaseTypeClassifier::default().classify(&text);
        assert_eq!(c.category, "family");
        assert_eq!(c.confidence, 1.0);

        let every_keyword: String = CATEGORIES
            .iter()
            .flat_map(|c| c.keywords.iter().map(|(k, _)| *k))
            .collect::<Vec<_>>()
            .join(" ")
            .repeat(200);
        let (_, confidence) = classify_case(&every_keyword);
        assert!((0.0..=1.0).contains(&confidence));
    }

    #[test]
    fn case_insensitive() {
        let (category, _) = classify_case("FILING FOR BANKRUPTCY");
        assert_eq!(category, "bankruptcy");
    }

    #[test]
    fn batch_preserves_order() {
        let out = CaseTypeClassifier::default().classify_batch(&[
            "patent dispute over my invention",
            "",
            "my visa expired",
        ]);
        let cats: Vec<_> = out.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(cats, ["intellectual_property", "other", "immigration"]);
    }

    #[test]
    fn every_category_has_a_taxonomy_key() {
        for name in category_names() {
            let key = case_type_key_for(name).unwrap();
            assert!(lexintake_core::taxonomy::lookup(key).is_some(), "{key}");
        }
    }
}
