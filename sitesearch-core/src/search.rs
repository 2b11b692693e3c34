use unicode_normalization::UnicodeNormalization;

/// Split a raw query into tokens. Whitespace separates tokens, double quotes
/// group a phrase, and a backslash escapes the next character.
pub fn query_tokens(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in input.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            if !in_quotes && !current.is_empty() {
                tokens.push(current.clone());
                current.clear();
            }
            continue;
        }
        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(current.clone());
                current.clear();
            }
            continue;
        }
        current.push(ch);
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Unicode-aware normalization for search: lowercases, NFD-decomposes, and
/// strips combining marks (accents). This lets "cafe" match "café".
pub fn normalize_for_search(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

/// `text` folded with [`normalize_for_search`], keeping for every folded
/// char the index of the original char it came from.
struct FoldedText {
    folded: String,
    /// Byte offset in `folded` of each folded char.
    starts: Vec<usize>,
    /// Original char index of each folded char.
    origin: Vec<usize>,
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut starts = Vec::new();
        let mut origin = Vec::new();
        let mut buf = [0u8; 4];
        for (idx, ch) in text.chars().enumerate() {
            for folded_ch in normalize_for_search(ch.encode_utf8(&mut buf)).chars() {
                starts.push(folded.len());
                origin.push(idx);
                folded.push(folded_ch);
            }
        }
        Self {
            folded,
            starts,
            origin,
        }
    }
}

/// Non-overlapping occurrences of the query tokens in `text`, compared the
/// same way the executor compares (case- and accent-insensitive). Ranges are
/// `[start, end)` in original char indices, left to right; at one position the
/// longest token wins.
pub fn find_token_matches(text: &str, tokens: &[String]) -> Vec<(usize, usize)> {
    let mut needles: Vec<String> = tokens
        .iter()
        .map(|t| normalize_for_search(t))
        .filter(|t| !t.is_empty())
        .collect();
    if needles.is_empty() {
        return Vec::new();
    }
    needles.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

    let folded = FoldedText::new(text);
    let mut matches = Vec::new();
    let mut i = 0;
    while i < folded.starts.len() {
        let rest = &folded.folded[folded.starts[i]..];
        match needles.iter().find(|needle| rest.starts_with(needle.as_str())) {
            Some(needle) => {
                let len = needle.chars().count();
                let start = folded.origin[i];
                let end = folded.origin[i + len - 1] + 1;
                matches.push((start, end));
                // skip folded chars still belonging to the last matched original char
                i += len;
                while i < folded.origin.len() && folded.origin[i] < end {
                    i += 1;
                }
            }
            None => i += 1,
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_tokens_quotes() {
        let tokens = query_tokens("ruby \"home page\"  docs");
        assert_eq!(tokens, vec!["ruby", "home page", "docs"]);
    }

    #[test]
    fn test_query_tokens_escape_and_blank() {
        assert_eq!(query_tokens(r#"say \"hi\""#), vec!["say", "\"hi\""]);
        assert!(query_tokens("   ").is_empty());
        assert_eq!(query_tokens("."), vec!["."]);
    }

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(normalize_for_search("Résumé CAFÉ"), "resume cafe");
    }

    #[test]
    fn test_find_token_matches_folds_accents() {
        let text = "Visit our café, CAFE or Café";
        let matches = find_token_matches(text, &["cafe".to_string()]);
        assert_eq!(matches, vec![(10, 14), (16, 20), (24, 28)]);

        let matches = find_token_matches("plain cafe", &["Café".to_string()]);
        assert_eq!(matches, vec![(6, 10)]);
    }

    #[test]
    fn test_find_token_matches_prefers_longest() {
        let tokens = vec!["a.b".to_string(), "a.b.c".to_string()];
        assert_eq!(find_token_matches("xx A.B.C", &tokens), vec![(3, 8)]);
        assert!(find_token_matches("axb", &tokens).is_empty());
        assert!(find_token_matches("anything", &[]).is_empty());
        assert!(find_token_matches("anything", &[String::new()]).is_empty());
    }
}
