//! Verification challenges shown in the gate's auth phase

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which puzzle variant the auth panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthMode {
    /// Hexadecimal arithmetic ("QUANTUM HASH")
    #[default]
    MathChallenge,
    /// Identify the keyword of a verse ("VEDIC GATE")
    KnowledgeChallenge,
}

impl AuthMode {
    pub fn label(&self) -> &'static str {
        match self {
            AuthMode::MathChallenge => "QUANTUM HASH",
            AuthMode::KnowledgeChallenge => "VEDIC GATE",
        }
    }

    /// Input placeholder for this mode
    pub fn placeholder(&self) -> &'static str {
        match self {
            AuthMode::MathChallenge => "Calculate Result",
            AuthMode::KnowledgeChallenge => "e.g. DHARMA",
        }
    }
}

/// Operator used by a math challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathOp {
    Add,
    Sub,
}

impl MathOp {
    pub fn symbol(&self) -> char {
        match self {
            MathOp::Add => '+',
            MathOp::Sub => '-',
        }
    }

    pub fn apply(&self, a: i32, b: i32) -> i32 {
        match self {
            MathOp::Add => a + b,
            MathOp::Sub => a - b,
        }
    }
}

/// Operand ranges (inclusive)
pub const MATH_A_RANGE: (i32, i32) = (5, 19);
pub const MATH_B_RANGE: (i32, i32) = (2, 11);

/// One entry of the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verse {
    pub sanskrit: &'static str,
    pub english: &'static str,
    pub hint: &'static str,
    /// Expected answer, uppercase
    pub keyword: &'static str,
}

pub static VERSES: [Verse; 4] = [
    Verse {
        sanskrit: "कर्मण्येवाधिकारस्ते मा फलेषु कदाचन ।",
        english: "You have a right to perform your prescribed duty, but you are not entitled to the fruits of action.",
        hint: "Duty / Action",
        keyword: "KARMA",
    },
    Verse {
        sanskrit: "यदा यदा हि धर्मस्य ग्लानिर्भवति भारत ।",
        english: "Whenever there is a decline in righteousness, O Arjuna, at that time I manifest myself.",
        hint: "Righteousness",
        keyword: "DHARMA",
    },
    Verse {
        sanskrit: "अहम् ब्रह्मास्मि ।",
        english: "I am the Absolute Reality (The Universe is within me).",
        hint: "Ultimate Reality",
        keyword: "BRAHMAN",
    },
    Verse {
        sanskrit: "सत्यमेव जयते ।",
        english: "Truth alone triumphs, not falsehood.",
        hint: "Truth",
        keyword: "SATYA",
    },
];

/// A generated challenge and its single correct answer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Challenge {
    Math { a: i32, b: i32, op: MathOp },
    Knowledge { verse: &'static Verse },
}

impl Challenge {
    pub fn mode(&self) -> AuthMode {
        match self {
            Challenge::Math { .. } => AuthMode::MathChallenge,
            Challenge::Knowledge { .. } => AuthMode::KnowledgeChallenge,
        }
    }

    /// Text shown to the user, e.g. `0xD + 0x3`
    pub fn prompt(&self) -> String {
        match self {
            Challenge::Math { a, b, op } => format!("0x{:X} {} 0x{:X}", a, op.symbol(), b),
            Challenge::Knowledge { verse } => {
                format!("{}\n\"{}\"", verse.sanskrit, verse.english)
            }
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Challenge::Math { .. } => None,
            Challenge::Knowledge { verse } => Some(verse.hint),
        }
    }

    /// The expected answer in display form
    pub fn answer(&self) -> String {
        match self {
            Challenge::Math { a, b, op } => op.apply(*a, *b).to_string(),
            Challenge::Knowledge { verse } => verse.keyword.to_string(),
        }
    }

    /// Check an attempt. Empty or malformed input is simply rejected.
    pub fn verify(&self, attempt: &str) -> bool {
        let attempt = attempt.trim();
        match self {
            Challenge::Math { a, b, op } => attempt
                .parse::<i64>()
                .is_ok_and(|n| n == op.apply(*a, *b) as i64),
            Challenge::Knowledge { verse } => attempt.to_uppercase() == verse.keyword,
        }
    }
}

/// Produce a fresh challenge for `mode`
pub fn generate<R: Rng>(mode: AuthMode, rng: &mut R) -> Challenge {
    match mode {
        AuthMode::MathChallenge => {
            let a = rng.random_range(MATH_A_RANGE.0..=MATH_A_RANGE.1);
            let b = rng.random_range(MATH_B_RANGE.0..=MATH_B_RANGE.1);
            let op = if rng.random_bool(0.5) {
                MathOp::Add
            } else {
                MathOp::Sub
            };
            Challenge::Math { a, b, op }
        }
        AuthMode::KnowledgeChallenge => {
            let verse = &VERSES[rng.random_range(0..VERSES.len())];
            Challenge::Knowledge { verse }
        }
    }
}
