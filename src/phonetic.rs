// NATO phonetic alphabet lookup

const ALPHABET: [&str; 26] = [
    "Alfa", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India",
    "Juliett", "Kilo", "Lima", "Mike", "November", "Oscar", "Papa", "Quebec", "Romeo",
    "Sierra", "Tango", "Uniform", "Victor", "Whiskey", "X-ray", "Yankee", "Zulu",
];

/// Code word for a letter, case-insensitive
pub fn code_word(c: char) -> Option<&'static str> {
    let upper = c.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some(ALPHABET[(upper as u8 - b'A') as usize])
    } else {
        None
    }
}

/// Spell `word` one character at a time
///
/// Surrounding whitespace is trimmed; characters without a code word are kept as-is.
pub fn transliterate(word: &str) -> Vec<String> {
    word.trim()
        .chars()
        .map(|c| match code_word(c) {
            Some(code) => code.to_string(),
            None => c.to_uppercase().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_word() {
        assert_eq!(code_word('a'), Some("Alfa"));
        assert_eq!(code_word('Z'), Some("Zulu"));
        assert_eq!(code_word('7'), None);
        assert_eq!(code_word('é'), None);
    }

    #[test]
    fn test_transliterate_word() {
        assert_eq!(transliterate("  Sam "), vec!["Sierra", "Alfa", "Mike"]);
    }

    #[test]
    fn test_unknown_characters_pass_through() {
        assert_eq!(transliterate("a-1 b"), vec!["Alfa", "-", "1", " ", "Bravo"]);
    }

    #[test]
    fn test_empty_word() {
        assert!(transliterate("   ").is_empty());
    }
}
