//! Text normalization, sentence splitting and term extraction

use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Upper bound on normalization passes; real text settles in two or three
const MAX_NORMALIZE_PASSES: usize = 16;

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
    whitespace_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");

        Self {
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
            whitespace_regex,
        }
    }

    /// Decode HTML entities, fold typography, NFC-normalize and collapse whitespace.
    ///
    /// The pipeline repeats until its output stops changing, so `&amp;amp;` ends up
    /// as `&` and entity syntax produced by composition is decoded too. Normalizing
    /// an already normalized string returns it unchanged.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.normalize_pass(text);
        for _ in 1..MAX_NORMALIZE_PASSES {
            let next = self.normalize_pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn normalize_pass(&self, text: &str) -> String {
        let decoded = html_escape::decode_html_entities(text);
        let folded = Self::fold_typography(&decoded);
        let composed: String = folded.nfc().collect();

        self.whitespace_regex
            .replace_all(&composed, " ")
            .trim()
            .to_string()
    }

    fn fold_typography(text: &str) -> String {
        text.chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                '\u{2013}' | '\u{2014}' => '-',
                '\u{2026}' => '.',
                _ => c,
            })
            .collect()
    }

    /// Split on `.`, `!` or `?` followed by whitespace; punctuation stays with its sentence
    pub fn split_sentences(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if matches!(c, '.' | '!' | '?') {
                if let Some(&(next_idx, next)) = chars.peek() {
                    if next.is_whitespace() {
                        pieces.push(&text[start..next_idx]);
                        start = next_idx;
                    }
                }
            }
        }
        pieces.push(&text[start..]);

        pieces
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Lowercased word tokens of two or more characters, stop words removed
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(|w| w.to_lowercase())
            .filter(|w| w.chars().count() >= 2 && !self.is_stop_word(w))
            .collect()
    }

    /// Terms for vectorization: tokens, plus adjacent-token bigrams when requested
    pub fn terms(&self, text: &str, include_bigrams: bool) -> Vec<String> {
        let tokens = self.tokenize(text);
        if !include_bigrams {
            return tokens;
        }

        let bigrams: Vec<String> = tokens
            .windows(2)
            .map(|pair| format!("{} {}", pair[0], pair[1]))
            .collect();

        tokens.into_iter().chain(bigrams).collect()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }
}

/// English stop words as used by scikit-learn's `TfidfVectorizer(stop_words="english")`
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
    "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
    "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
    "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
    "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
    "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
    "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
    "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
    "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
    "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
    "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
    "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
    "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
    "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
    "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its",
    "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many",
    "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most",
    "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor",
    "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only",
    "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
    "over", "own", "part", "per", "perhaps", "please", "put", "rather", "re", "same",
    "see", "seem", "seemed", "seeming", "seems", "serious", "several", "she", "should",
    "show", "side", "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone",
    "something", "sometime", "sometimes", "somewhere", "still", "such", "system", "take",
    "ten", "than", "that", "the", "their", "them", "themselves", "then", "thence", "there",
    "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they", "thick",
    "thin", "third", "this", "those", "though", "three", "through", "throughout", "thru",
    "thus", "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two",
    "un", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
    "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
    "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
    "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
    "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_decodes_entities() {
        let processor = TextProcessor::new();

        assert_eq!(processor.normalize("M&amp;A due diligence"), "M&A due diligence");
        assert_eq!(processor.normalize("R&amp;amp;D"), "R&D");
        assert_eq!(processor.normalize("&#65;&#x42; &lt;tag&gt;"), "AB <tag>");
        // Unknown entities are left alone
        assert_eq!(processor.normalize("&bogus; text"), "&bogus; text");
    }

    #[test]
    fn test_normalize_decodes_named_entities() {
        let processor = TextProcessor::new();

        assert_eq!(
            processor.normalize("caf&eacute; &mdash; O&rsquo;Brien &euro;5"),
            "caf\u{e9} - O'Brien \u{20ac}5"
        );
        assert_eq!(processor.normalize("&ldquo;lead&rdquo; &hellip;"), "\"lead\" .");
    }

    #[test]
    fn test_normalize_decodes_entities_formed_by_composition() {
        let processor = TextProcessor::new();

        // U+037E composes to ';', which can complete an entity after the decode step
        let once = processor.normalize("R&amp\u{037E}D");
        assert!(!once.contains("amp"), "entity left behind in {:?}", once);
        assert_eq!(processor.normalize(&once), once);
    }

    #[test]
    fn test_normalize_composes_and_collapses() {
        let processor = TextProcessor::new();

        assert_eq!(processor.normalize("  cafe\u{301}\n\n\tteam  "), "caf\u{e9} team");
        assert_eq!(processor.normalize("a&nbsp;&nbsp;b"), "a b");
        assert_eq!(processor.normalize("\u{201C}lead\u{201D} \u{2013} owner"), "\"lead\" - owner");
        assert_eq!(processor.normalize(""), "");
        assert_eq!(processor.normalize(" \n\t "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let processor = TextProcessor::new();
        let samples = [
            "",
            "plain text",
            "&amp;amp;lt; nested &#38;amp; entities",
            "e\u{301}\u{327} combining marks",
            "  \u{301} leading combining mark ",
            "tabs\tand\r\nnewlines\u{2003}em space",
            "smart \u{2018}quotes\u{2019} and\u{2026}",
            "&#0; &#xD800; invalid numeric",
            "R&amp\u{037E}D",
            "caf&eacute; &amp;mdash; &amp;rsquo;",
        ];

        for sample in samples {
            let once = processor.normalize(sample);
            let twice = processor.normalize(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_split_sentences() {
        let processor = TextProcessor::new();
        let text = "Led audits. Built tools!  Trained staff? v1.2 shipped";

        let sentences = processor.split_sentences(text);

        assert_eq!(
            sentences,
            vec!["Led audits.", "Built tools!", "Trained staff?", "v1.2 shipped"]
        );
        assert!(processor.split_sentences("   ").is_empty());
    }

    #[test]
    fn test_tokenize_removes_stop_words() {
        let processor = TextProcessor::new();

        let tokens = processor.tokenize("The Compliance training was delivered for 20 staff");

        assert_eq!(tokens, vec!["compliance", "training", "delivered", "20", "staff"]);
        assert!(processor.tokenize("it is the a").is_empty());
    }

    #[test]
    fn test_terms_with_bigrams() {
        let processor = TextProcessor::new();

        let terms = processor.terms("risk governance framework", true);

        assert!(terms.contains(&"risk governance".to_string()));
        assert!(terms.contains(&"governance framework".to_string()));
        assert_eq!(terms.len(), 5);
        assert_eq!(processor.terms("risk governance framework", false).len(), 3);
    }
}
