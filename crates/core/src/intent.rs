use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::Intent;

/// Returned when no intent table matches at all.
pub const FALLBACK_CONFIDENCE: f32 = 0.5;
pub const MAX_CONFIDENCE: f32 = 0.9;
const CONFIDENCE_PER_MATCH: f32 = 0.2;

/// Tie-break order: on equal scores the intent listed first wins.
pub const DEFAULT_PRIORITY: [Intent; 5] = [
    Intent::Food,
    Intent::Traffic,
    Intent::Slang,
    Intent::Itinerary,
    Intent::Culture,
];

struct IntentPatterns {
    intent: Intent,
    vocabulary: Regex,
    phrases: Regex,
    entities: Regex,
}

impl IntentPatterns {
    fn new(intent: Intent, vocabulary: &str, phrases: &str, entities: &str) -> Self {
        Self {
            intent,
            vocabulary: compile(vocabulary),
            phrases: compile(phrases),
            entities: compile(entities),
        }
    }

    fn score(&self, lower: &str) -> u32 {
        [&self.vocabulary, &self.phrases, &self.entities]
            .iter()
            .map(|pattern| pattern.find_iter(lower).count() as u32)
            .sum()
    }
}

static INTENT_TABLES: Lazy<Vec<IntentPatterns>> = Lazy::new(|| {
    vec![
        IntentPatterns::new(
            Intent::Food,
            r"\b(food|eat|eating|breakfast|lunch|dinner|restaurants?|cafe|dosas?|idli|vada|biryani|meals?|hungry|taste|snacks?|coffee|chaat)\b",
            r"\b(where.*eat|what.*eat|food.*recommend|recommend.*food|restaurant.*suggest|best.*(restaurants?|food))\b",
            r"\b(malleshwaram|basavanagudi|vv puram|street food|food street|janatha hotel|darshini|mtr|ctr)\b",
        ),
        IntentPatterns::new(
            Intent::Traffic,
            r"\b(traffic|roads?|drive|driving|metro|transport|travel|commute|bus|auto|cab|jam|congestion|peak)\b",
            r"\b(how.*reach|traffic.*bad|bad.*traffic|metro.*better|avoid.*traffic|rush hour|peak hours?|get to)\b",
            r"\b(silk board|silkboard|electronic city|outer ring road|orr|whitefield|hebbal|bannerghatta|hosur road|kr puram|marathahalli)\b",
        ),
        IntentPatterns::new(
            Intent::Slang,
            r"\b(slang|mean|meaning|means|explain|translate|kannada)\b",
            r"\b(what.*mean|what is the meaning|how do locals say|local words?)\b",
            r"\b(guru|machcha|macha|maga|sakkath|scene illa|swalpa adjust maadi|bombat|oota aytha|banni)\b",
        ),
        IntentPatterns::new(
            Intent::Itinerary,
            r"\b(itinerary|plan|planning|days?|visit|places|tour|trip|schedule|sightseeing|weekend)\b",
            r"\b(one day|full day|places.*visit|what.*see|plan.*day|things to do|must see)\b",
            r"\b(lalbagh|lal bagh|cubbon park|bangalore palace|vidhana soudha|tipu sultan|nandi hills|ulsoor lake|iskcon)\b",
        ),
        IntentPatterns::new(
            Intent::Culture,
            r"\b(culture|cultural|customs?|traditions?|etiquette|behaviou?r|respect|temples?|festivals?)\b",
            r"\b(cultural.*norm|how.*behave|what.*expect|local.*custom|dress code|is it rude|should i tip|tipping)\b",
            r"\b(dasara|ugadi|karaga|kadalekai parishe|bull temple|kannada rajyotsava|sankranti)\b",
        ),
    ]
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid intent pattern")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntentScore {
    pub intent: Intent,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f32,
    /// Per-intent match counts, in the classifier's priority order.
    pub scores: Vec<IntentScore>,
}

impl Classification {
    pub fn winning_score(&self) -> u32 {
        self.scores
            .iter()
            .find(|entry| entry.intent == self.intent)
            .map(|entry| entry.score)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntentClassifier {
    priority: [Intent; 5],
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Builds a classifier with a different tie-break order.
    ///
    /// Returns `None` unless `priority` is a permutation of the five scored intents.
    pub fn with_priority(priority: [Intent; 5]) -> Option<Self> {
        let is_permutation = DEFAULT_PRIORITY
            .iter()
            .all(|intent| priority.iter().filter(|p| *p == intent).count() == 1);

        is_permutation.then_some(Self { priority })
    }

    pub fn priority(&self) -> &[Intent; 5] {
        &self.priority
    }

    pub fn classify(&self, text: &str) -> Classification {
        let lower = text.to_lowercase();

        let scores = self
            .priority
            .iter()
            .map(|intent| IntentScore {
                intent: *intent,
                score: score_intent(*intent, &lower),
            })
            .collect::<Vec<_>>();

        let mut best: Option<IntentScore> = None;
        for entry in scores.iter().filter(|entry| entry.score > 0) {
            match best {
                Some(current) if current.score >= entry.score => {}
                _ => best = Some(*entry),
            }
        }

        match best {
            Some(winner) => Classification {
                intent: winner.intent,
                confidence: confidence_for(winner.score),
                scores,
            },
            None => Classification {
                intent: Intent::General,
                confidence: FALLBACK_CONFIDENCE,
                scores,
            },
        }
    }
}

pub fn classify_intent(text: &str) -> Classification {
    IntentClassifier::new().classify(text)
}

/// Counts every match of the intent's three pattern groups. Expects lower-cased input.
pub fn score_intent(intent: Intent, lower: &str) -> u32 {
    INTENT_TABLES
        .iter()
        .find(|table| table.intent == intent)
        .map(|table| table.score(lower))
        .unwrap_or(0)
}

pub fn confidence_for(score: u32) -> f32 {
    if score == 0 {
        return FALLBACK_CONFIDENCE;
    }
    (FALLBACK_CONFIDENCE + CONFIDENCE_PER_MATCH * score as f32).min(MAX_CONFIDENCE)
}
