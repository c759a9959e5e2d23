//! Ticket text normalization — tokenizer, stop words ES + helpdesk, stemmer
//!
//! Full pipeline per ticket text:
//!   lowercase → NFD accent fold → non-word removal → whitespace split
//!   → length filter → stop-word filter → Snowball-ES stemming
//!
//! Both keyword rules and incoming text go through the same pipeline, so
//! matching stays consistent whatever the stemmer does to a given word.

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static NON_WORD: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"[^\p{L}\p{N}]+").expect("NON_WORD: invalid pattern")
});

/// Layer 1 — Standard Spanish stop words (accent-folded forms).
///
/// Interrogatives (como, cuando, donde, que tal), negations (no, nunca) and
/// scope quantifiers (todos, varios, solo, ninguno) are deliberately NOT in
/// this list: they carry type/urgency/impact signal for the classifiers.
const SPANISH_STOP_WORDS: &[&str] = &[
    // Articles
    "el", "la", "los", "las", "un", "una", "unos", "unas", "lo",
    // Prepositions
    "al", "de", "del", "en", "con", "por", "para", "sin", "sobre", "entre",
    "hacia", "hasta", "desde", "tras", "segun", "durante", "mediante", "ante",
    // Personal pronouns
    "yo", "tu", "usted", "ustedes", "nosotros", "vosotros", "ellos", "ellas",
    "me", "te", "se", "le", "les", "nos", "os",
    // Possessives and demonstratives
    "mi", "mis", "tus", "su", "sus", "nuestro", "nuestra", "nuestros",
    "nuestras", "este", "esta", "estos", "estas", "ese", "esa", "esos",
    "esas", "aquel", "aquella", "esto", "eso",
    // Conjunctions
    "y", "e", "o", "u", "ni", "que", "si", "pero", "aunque", "porque",
    "pues", "mientras", "sino",
    // Auxiliaries and very common verbs
    "es", "son", "esta", "estan", "estoy", "soy", "era", "fue", "fueron",
    "ha", "han", "he", "hay", "hubo", "sera", "seria", "estaba", "estaban",
    "ser", "estar", "hacer", "hace", "hacen", "tengo", "tiene", "tienen",
    "tenemos", "haber", "hecho",
    // Adverbs and fillers; temporal words like "antes" or "vez" stay out,
    // they appear in urgency and recurrence trigger phrases
    "ya", "muy", "mas", "menos", "tambien", "tampoco", "ahora", "luego",
    "aqui", "alli", "asi", "bien", "mal", "entonces",
    "algo", "alguien", "cual", "cuales", "quien", "quienes", "donde",
    "tal", "etc",
];

/// Layer 2 — Helpdesk stop words: greetings, courtesy, ticket fillers.
///
/// Unlike log-clustering filters, the classification triggers themselves
/// (incidente, urgente, problema, solicitud…) must never appear here.
const HELPDESK_STOP_WORDS: &[&str] = &[
    "hola", "buenos", "buenas", "dias", "tardes", "noches", "gracias",
    "saludos", "cordialmente", "atentamente", "estimado", "estimada",
    "favor", "agradezco", "agradeceria", "quedo", "atento", "atenta",
    "ticket", "folio", "numero", "referencia", "asunto",
];

/// Minimum token length kept, before and after stemming
const MIN_TOKEN_LEN: usize = 2;
/// Maximum token length kept (drops base64 blobs, ids, urls glued together)
const MAX_TOKEN_LEN: usize = 30;

/// Normalizes raw ticket text into a stemmed token sequence.
///
/// Construction is cheap; the engine builds one and shares it.
pub struct Normalizer {
    stop_words: HashSet<&'static str>,
    stemmer: Stemmer,
}

impl Normalizer {
    /// Create a normalizer with the built-in Spanish + helpdesk stop words
    pub fn new() -> Self {
        let stop_words = SPANISH_STOP_WORDS
            .iter()
            .chain(HELPDESK_STOP_WORDS.iter())
            .copied()
            .collect();
        Self {
            stop_words,
            stemmer: Stemmer::create(Algorithm::Spanish),
        }
    }

    /// Lowercased, accent-folded, punctuation-free, space-collapsed form.
    ///
    /// This is the representation edit-distance similarity works on; it keeps
    /// stop words and inflections. Empty input yields an empty string.
    pub fn clean(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let folded = fold_accents(&lowered);
        let spaced = NON_WORD.replace_all(&folded, " ");
        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Full pipeline: returns the ordered stemmed token sequence.
    ///
    /// Never panics; empty or whitespace-only input yields an empty vec.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        self.clean(text)
            .split_whitespace()
            .filter(|t| t.len() >= MIN_TOKEN_LEN && t.len() <= MAX_TOKEN_LEN)
            .filter(|t| !self.stop_words.contains(t))
            .map(|t| self.stemmer.stem(t).to_string())
            .filter(|t| t.len() >= MIN_TOKEN_LEN)
            .collect()
    }

}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip diacritics via NFD decomposition (caído → caido, ñ → n)
fn fold_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}
