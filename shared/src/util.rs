/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a short photo id: the first segment (8 hex chars) of a UUIDv4.
///
/// Matches the filename convention `{seq}-{id}-clean.{ext}`. Uniqueness is
/// enforced at the repository layer; the sequence number in filenames is
/// cosmetic only.
pub fn short_id() -> String {
    let uuid = uuid::Uuid::new_v4().to_string();
    uuid.split('-').next().unwrap_or("00000000").to_string()
}

/// Transliterate Greek characters to Latin and sanitize the rest for use in
/// filenames. Unknown characters outside `[A-Za-z0-9._-]` become `_`.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if let Some(latin) = greek_to_latin(ch) {
            out.push_str(latin);
        } else if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    out
}

fn greek_to_latin(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'α' | 'ά' => "a",
        'β' => "v",
        'γ' => "g",
        'δ' => "d",
        'ε' | 'έ' => "e",
        'ζ' => "z",
        'η' | 'ή' => "i",
        'θ' => "th",
        'ι' | 'ί' | 'ϊ' | 'ΐ' => "i",
        'κ' => "k",
        'λ' => "l",
        'μ' => "m",
        'ν' => "n",
        'ξ' => "x",
        'ο' | 'ό' => "o",
        'π' => "p",
        'ρ' => "r",
        'σ' | 'ς' => "s",
        'τ' => "t",
        'υ' | 'ύ' | 'ϋ' | 'ΰ' => "y",
        'φ' => "f",
        'χ' => "ch",
        'ψ' => "ps",
        'ω' | 'ώ' => "o",
        'Α' | 'Ά' => "A",
        'Β' => "V",
        'Γ' => "G",
        'Δ' => "D",
        'Ε' | 'Έ' => "E",
        'Ζ' => "Z",
        'Η' | 'Ή' => "I",
        'Θ' => "Th",
        'Ι' | 'Ί' | 'Ϊ' => "I",
        'Κ' => "K",
        'Λ' => "L",
        'Μ' => "M",
        'Ν' => "N",
        'Ξ' => "X",
        'Ο' | 'Ό' => "O",
        'Π' => "P",
        'Ρ' => "R",
        'Σ' => "S",
        'Τ' => "T",
        'Υ' | 'Ύ' | 'Ϋ' => "Y",
        'Φ' => "F",
        'Χ' => "Ch",
        'Ψ' => "Ps",
        'Ω' | 'Ώ' => "O",
        _ => return None,
    };
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_format() {
        let id = short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sanitize_greek_filename() {
        assert_eq!(sanitize_filename("γάμος.jpg"), "gamos.jpg");
        assert_eq!(sanitize_filename("Φωτογραφία 12.png"), "Fotografia_12.png");
    }

    #[test]
    fn test_sanitize_keeps_ascii() {
        assert_eq!(sanitize_filename("wedding-2024_01.jpeg"), "wedding-2024_01.jpeg");
    }

    #[test]
    fn test_sanitize_replaces_specials() {
        assert_eq!(sanitize_filename("a b/c:d.jpg"), "a_b_c_d.jpg");
    }
}
