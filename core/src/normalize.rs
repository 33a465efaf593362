use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref STRIP: Regex = Regex::new(r"[^a-z0-9\s-]").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","arent","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cant","cannot","could","couldnt",
            "did","didnt","do","does","doesnt","doing","dont","down","during",
            "each","few","for","from","further",
            "had","hadnt","has","hasnt","have","havent","having","he","hed","hell","hes","her","here","heres","hers","herself","him","himself","his","how","hows",
            "i","id","ill","im","ive","if","in","into","is","isnt","it","its","itself",
            "lets","me","more","most","mustnt","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","shed","shell","shes","should","shouldnt","so","some","such",
            "than","that","thats","the","their","theirs","them","themselves","then","there","theres","these","they","theyd","theyll","theyre","theyve","this","those","through","to","too",
            "under","until","up","very",
            "was","wasnt","we","wed","well","were","werent","weve","what","whats","when","whens","where","wheres","which","while","who","whos","whom","why","whys","with","wont","would","wouldnt",
            "you","youd","youll","youre","youve","your","yours","yourself","yourselves",
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Singular/plural companion of a word: strip a trailing `s`, or append one.
fn companion(word: &str) -> String {
    match word.strip_suffix('s') {
        Some(singular) => singular.to_string(),
        None => format!("{word}s"),
    }
}

/// Normalize raw text into an ordered pre-dedup sequence of (term, position).
///
/// Pipeline: NFKD decomposition, lowercase, strip everything outside
/// `[a-z0-9 \s-]`, hyphens become spaces, whitespace split, stopword
/// removal, Porter stemming. Words longer than 3 characters also emit a
/// singular/plural companion and its stem, which widens recall on catalog
/// vocabulary ("platformers" matches "platformer").
///
/// Positions are running indices over the emitted sequence and feed
/// term-frequency tracking in the index builder; dedup happens there, not
/// here. Empty input yields an empty sequence.
pub fn normalize(text: &str) -> Vec<(String, u32)> {
    let lowered = text.nfkd().collect::<String>().to_lowercase();
    let stripped = STRIP.replace_all(&lowered, "").replace('-', " ");

    let mut tokens: Vec<(String, u32)> = Vec::new();
    let mut pos: u32 = 0;
    let mut emit = |term: String, pos: &mut u32| {
        if term.is_empty() {
            return;
        }
        tokens.push((term, *pos));
        *pos += 1;
    };

    for word in stripped.split_whitespace() {
        if is_stopword(word) {
            continue;
        }
        emit(STEMMER.stem(word).to_string(), &mut pos);
        if word.len() > 3 {
            let variant = companion(word);
            emit(variant.clone(), &mut pos);
            emit(STEMMER.stem(&variant).to_string(), &mut pos);
        }
    }
    tokens
}

/// Distinct terms of `normalize(text)` in first-emission order. This is the
/// query-side entry point.
pub fn distinct_terms(text: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut terms = Vec::new();
    for (term, _pos) in normalize(text) {
        if seen.insert(term.clone()) {
            terms.push(term);
        }
    }
    terms
}
