//! Question classification.
//!
//! Classification is a fixed, ordered rule table: each [`Rule`] pairs a
//! [`Signal`] with a case-insensitive pattern, and [`QuestionSignals`] records
//! which signals a question raises. The precedence between signals lives in
//! [`QuestionSignals::classify`] and is independent of how patterns match.
//!
//! The vocabulary is Portuguese, matching the questions the planner serves.

pub mod columns;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::plan::Intent;

/// A vocabulary category a question can mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Structure of the table: columns, fields, schema.
    Schema,
    /// "by", "for each", "grouped by".
    GroupBy,
    /// "which", "list", "values", "categories".
    Distinct,
    /// "how many", "count", "records".
    Count,
    /// "sum", "total".
    Sum,
    /// "show", "details", "all rows".
    Detail,
    /// Mentions area.
    AreaHint,
    /// Mentions perimeter.
    PerimeterHint,
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub signal: Signal,
    pub pattern: &'static str,
}

/// Every rule, evaluated top to bottom.
pub const RULES: &[Rule] = &[
    Rule {
        signal: Signal::Schema,
        pattern: r"colunas?|campos?|atributos?|esquema|schema|estrutura",
    },
    Rule {
        signal: Signal::GroupBy,
        pattern: r"de\s+cada|por\s+cada|por\b|agrupad[oa]\s+por|separad[oa]\s+por",
    },
    Rule {
        signal: Signal::Distinct,
        pattern: r"quais|quais\s+s[aã]o|listar|lista|existem|existentes|valores|op[cç][oõ]es|categorias|tipos|nomes|diferentes|distint[oa]s|distinct",
    },
    Rule {
        signal: Signal::Count,
        pattern: r"quantos|quantas|conta|contagem|n[uú]mero\s+de\s+registros|n[uú]mero\s+de\s+linhas|registros",
    },
    Rule {
        signal: Signal::Sum,
        pattern: r"soma|somat[oó]rio|somar|total",
    },
    Rule {
        signal: Signal::Detail,
        pattern: r"detalhe|detalhes|mostrar|exibir|trazer|todas?\s+as?\s+linhas|tudo",
    },
    Rule {
        signal: Signal::AreaHint,
        pattern: r"[aá]rea",
    },
    Rule {
        signal: Signal::PerimeterHint,
        pattern: r"per[ií]metro",
    },
];

static COMPILED_RULES: Lazy<Vec<(Signal, Regex)>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|rule| {
            let re = Regex::new(&format!(r"(?i)\b(?:{})\b", rule.pattern))
                .expect("rule patterns are valid regexes");
            (rule.signal, re)
        })
        .collect()
});

/// Signals raised by one question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionSignals {
    pub schema: bool,
    pub group_by: bool,
    pub distinct: bool,
    pub count: bool,
    pub sum: bool,
    pub detail: bool,
    pub area_hint: bool,
    pub perimeter_hint: bool,
}

impl QuestionSignals {
    /// Run the rule table over a question.
    pub fn detect(question: &str) -> Self {
        let mut signals = Self::default();
        for (signal, re) in COMPILED_RULES.iter() {
            if re.is_match(question) {
                signals.set(*signal);
            }
        }
        signals
    }

    fn set(&mut self, signal: Signal) {
        match signal {
            Signal::Schema => self.schema = true,
            Signal::GroupBy => self.group_by = true,
            Signal::Distinct => self.distinct = true,
            Signal::Count => self.count = true,
            Signal::Sum => self.sum = true,
            Signal::Detail => self.detail = true,
            Signal::AreaHint => self.area_hint = true,
            Signal::PerimeterHint => self.perimeter_hint = true,
        }
    }

    pub fn is_schema(&self) -> bool {
        self.schema
    }

    /// A listing question: distinct vocabulary, no count vocabulary, and
    /// neither detail nor schema vocabulary.
    pub fn is_distinct(&self) -> bool {
        !self.detail && !self.schema && self.distinct && !self.count
    }

    pub fn is_sum(&self) -> bool {
        self.sum
    }

    pub fn is_count(&self) -> bool {
        self.count
    }

    pub fn wants_group_by(&self) -> bool {
        self.group_by
    }

    /// The single intent with the highest precedence:
    /// schema, distinct, sum, count, then detail.
    pub fn classify(&self) -> Option<Intent> {
        if self.is_schema() {
            Some(Intent::Schema)
        } else if self.is_distinct() {
            Some(Intent::Distinct)
        } else if self.is_sum() {
            Some(if self.group_by {
                Intent::GroupedSum
            } else {
                Intent::Sum
            })
        } else if self.is_count() {
            Some(Intent::Count)
        } else if self.detail {
            Some(Intent::Detail)
        } else {
            None
        }
    }
}

/// Classify a question.
pub fn classify(question: &str) -> Option<Intent> {
    QuestionSignals::detect(question).classify()
}

/// Cache key form of a question: trimmed, lower-cased, single-spaced.
pub fn normalize_question(question: &str) -> String {
    question
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
