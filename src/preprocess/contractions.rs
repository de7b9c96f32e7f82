// Contraction expansion — "don't" becomes "do not" before tokenization.
//
// A fixed lexicon covers the irregular forms; generic suffix rules catch the
// rest ("'re", "'ve", "n't", ...). Expansions contain no apostrophes, so
// applying the expansion twice is a no-op.

use std::collections::HashMap;
use std::sync::LazyLock;

static LEXICON: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ain't", "am not"),
        ("aren't", "are not"),
        ("can't", "cannot"),
        ("can't've", "cannot have"),
        ("could've", "could have"),
        ("couldn't", "could not"),
        ("didn't", "did not"),
        ("doesn't", "does not"),
        ("don't", "do not"),
        ("hadn't", "had not"),
        ("hasn't", "has not"),
        ("haven't", "have not"),
        ("he'd", "he would"),
        ("he'll", "he will"),
        ("he's", "he is"),
        ("here's", "here is"),
        ("how'd", "how did"),
        ("how'll", "how will"),
        ("how's", "how is"),
        ("i'd", "i would"),
        ("i'll", "i will"),
        ("i'm", "i am"),
        ("i've", "i have"),
        ("isn't", "is not"),
        ("it'd", "it would"),
        ("it'll", "it will"),
        ("it's", "it is"),
        ("let's", "let us"),
        ("ma'am", "madam"),
        ("mightn't", "might not"),
        ("might've", "might have"),
        ("mustn't", "must not"),
        ("must've", "must have"),
        ("needn't", "need not"),
        ("o'clock", "of the clock"),
        ("oughtn't", "ought not"),
        ("shan't", "shall not"),
        ("she'd", "she would"),
        ("she'll", "she will"),
        ("she's", "she is"),
        ("should've", "should have"),
        ("shouldn't", "should not"),
        ("that'd", "that would"),
        ("that's", "that is"),
        ("there'd", "there would"),
        ("there's", "there is"),
        ("they'd", "they would"),
        ("they'll", "they will"),
        ("they're", "they are"),
        ("they've", "they have"),
        ("wasn't", "was not"),
        ("we'd", "we would"),
        ("we'll", "we will"),
        ("we're", "we are"),
        ("we've", "we have"),
        ("weren't", "were not"),
        ("what'll", "what will"),
        ("what're", "what are"),
        ("what's", "what is"),
        ("what've", "what have"),
        ("when's", "when is"),
        ("where'd", "where did"),
        ("where's", "where is"),
        ("who'll", "who will"),
        ("who's", "who is"),
        ("who've", "who have"),
        ("why's", "why is"),
        ("won't", "will not"),
        ("would've", "would have"),
        ("wouldn't", "would not"),
        ("y'all", "you all"),
        ("you'd", "you would"),
        ("you'll", "you will"),
        ("you're", "you are"),
        ("you've", "you have"),
    ])
});

/// Generic suffix fallbacks, applied when the whole word is not in the lexicon.
/// "'s" is deliberately absent — it is ambiguous with the possessive.
const SUFFIX_RULES: [(&str, &str); 6] = [
    ("n't", " not"),
    ("'re", " are"),
    ("'ve", " have"),
    ("'ll", " will"),
    ("'d", " would"),
    ("'m", " am"),
];

/// Expand every contracted form in `text`. Idempotent: expanded output
/// contains no apostrophized contractions, so a second pass changes nothing.
pub fn expand(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            if !word.is_empty() {
                out.push_str(&expand_chunk(&word));
                word.clear();
            }
            out.push(c);
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        out.push_str(&expand_chunk(&word));
    }
    out
}

/// Expand a single whitespace-delimited chunk, preserving any surrounding
/// punctuation and a leading capital letter.
fn expand_chunk(chunk: &str) -> String {
    // Normalize the curly apostrophe so lexicon lookup works on pasted text.
    let normalized = chunk.replace('\u{2019}', "'");
    if !normalized.contains('\'') {
        return chunk.to_string();
    }

    let is_core = |c: char| c.is_alphanumeric() || c == '\'';
    let start = match normalized.find(is_core) {
        Some(i) => i,
        None => return chunk.to_string(),
    };
    let end = normalized.rfind(is_core).map(|i| i + 1).unwrap_or(start);
    let (prefix, rest) = normalized.split_at(start);
    let (core, suffix) = rest.split_at(end - start);

    let expanded = match expand_core(core) {
        Some(e) => e,
        None => return chunk.to_string(),
    };

    format!("{prefix}{expanded}{suffix}")
}

fn expand_core(core: &str) -> Option<String> {
    let lower = core.to_lowercase();

    let expansion = if let Some(&e) = LEXICON.get(lower.as_str()) {
        e.to_string()
    } else {
        // Suffix rules only apply cleanly to ASCII cores.
        if !core.is_ascii() {
            return None;
        }
        let (suffix, replacement) = SUFFIX_RULES
            .iter()
            .find(|(s, _)| lower.ends_with(s) && lower.len() > s.len())?;
        let base = &core[..core.len() - suffix.len()];
        format!("{base}{replacement}")
    };

    // Restore a leading capital ("Don't" -> "Do not").
    if core.chars().next().is_some_and(|c| c.is_uppercase()) {
        let mut chars = expansion.chars();
        let head = chars.next()?;
        Some(head.to_uppercase().collect::<String>() + chars.as_str())
    } else {
        Some(expansion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicon_forms() {
        assert_eq!(expand("don't stop"), "do not stop");
        assert_eq!(expand("it's fine"), "it is fine");
        assert_eq!(expand("won't work"), "will not work");
        assert_eq!(expand("y'all know"), "you all know");
    }

    #[test]
    fn test_suffix_fallback() {
        assert_eq!(expand("cats're everywhere"), "cats are everywhere");
        assert_eq!(expand("somebody'd said"), "somebody would said");
    }

    #[test]
    fn test_capitalization_preserved() {
        assert_eq!(expand("Don't panic"), "Do not panic");
        assert_eq!(expand("They're here"), "They are here");
    }

    #[test]
    fn test_punctuation_preserved() {
        assert_eq!(expand("(can't)"), "(cannot)");
        assert_eq!(expand("don't!"), "do not!");
    }

    #[test]
    fn test_possessive_untouched() {
        assert_eq!(expand("the cat's toy"), "the cat's toy");
    }

    #[test]
    fn test_idempotent() {
        let once = expand("I don't think they're right, but it's fine");
        let twice = expand(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_curly_apostrophe() {
        assert_eq!(expand("don\u{2019}t"), "do not");
    }
}
