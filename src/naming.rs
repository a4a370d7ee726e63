//! Identifier sanitizing and per-compile name allocation.
use std::collections::HashSet;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static INVALID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^\s*[^a-zA-Z_$])|([^a-zA-Z_$\d])").unwrap());
static LEADING_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^_[a-z]").unwrap());
static SNAKE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"_[a-z]").unwrap());
static AFTER_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d$]+[a-zA-Z]").unwrap());
static AFTER_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([a-zA-Z])").unwrap());
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").unwrap());

/// Latin letters that do not decompose into base + combining mark.
fn fold_letter(c: char) -> Option<&'static str> {
    Some(match c {
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "Ae",
        'œ' => "oe",
        'Œ' => "Oe",
        'ø' => "o",
        'Ø' => "O",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'ł' => "l",
        'Ł' => "L",
        'þ' => "th",
        'Þ' => "Th",
        'ı' => "i",
        _ => return None,
    })
}

/// Strip accents and fold ligatures to basic latin letters.
pub fn deburr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfd().filter(|c| !is_combining_mark(*c)) {
        match fold_letter(c) {
            Some(folded) => out.push_str(folded),
            None => out.push(c),
        }
    }
    out
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn arbitrary text into an identifier usable as a type name:
/// `"pet owner"` → `PetOwner`, `"pet_owner"` → `PetOwner`, `"Café"` → `Cafe`.
pub fn to_safe_string(s: &str) -> String {
    let s = deburr(s);
    let s = INVALID_CHARS.replace_all(&s, " ");
    let s = LEADING_UNDERSCORE.replace_all(&s, |c: &Captures| c[0].to_uppercase());
    let s = SNAKE_BOUNDARY.replace_all(&s, |c: &Captures| c[0][1..].to_uppercase());
    let s = AFTER_DIGITS.replace_all(&s, |c: &Captures| c[0].to_uppercase());
    let s = AFTER_SPACE.replace_all(&s, |c: &Captures| c[1].to_uppercase());
    let s = SPACES.replace_all(&s, "");
    upper_first(&s)
}

/// Standalone names handed out during one compile call.
#[derive(Debug, Default)]
pub struct NameRegistry {
    used: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self { Self::default() }

    /// Sanitize `hint` and suffix it with the first free counter if taken.
    pub fn allocate(&mut self, hint: &str) -> String {
        let mut base = to_safe_string(hint);
        if base.is_empty() {
            base = "NoName".to_string();
        }
        let mut name = base.clone();
        let mut counter = 1usize;
        while self.used.contains(&name) {
            name = format!("{base}{counter}");
            counter += 1;
        }
        trace!(hint, %name, "allocated standalone name");
        self.used.insert(name.clone());
        name
    }

    pub fn contains(&self, name: &str) -> bool { self.used.contains(name) }

    pub fn len(&self) -> usize { self.used.len() }

    pub fn is_empty(&self) -> bool { self.used.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_separators_and_case() {
        assert_eq!(to_safe_string("pet"), "Pet");
        assert_eq!(to_safe_string("pet owner"), "PetOwner");
        assert_eq!(to_safe_string("pet_owner"), "PetOwner");
        assert_eq!(to_safe_string("pet-owner"), "PetOwner");
        assert_eq!(to_safe_string("_private"), "_Private");
        assert_eq!(to_safe_string("v2beta"), "V2Beta");
        assert_eq!(to_safe_string("$ref"), "$Ref");
        assert_eq!(to_safe_string("https://example.com/pet.json"), "HttpsExampleComPetJson");
    }

    #[test]
    fn strips_diacritics() {
        assert_eq!(to_safe_string("Café crème"), "CafeCreme");
        assert_eq!(to_safe_string("straße"), "Strasse");
        assert_eq!(deburr("Ærøskøbing"), "Aeroskobing");
    }

    #[test]
    fn registry_suffixes_collisions_in_order() {
        let mut names = NameRegistry::new();
        assert_eq!(names.allocate("Pet"), "Pet");
        assert_eq!(names.allocate("pet"), "Pet1");
        assert_eq!(names.allocate("PET"), "PET");
        assert_eq!(names.allocate("Pet"), "Pet2");
        assert_eq!(names.allocate("!!!"), "NoName");
        assert_eq!(names.len(), 5);
        assert!(names.contains("Pet1"));
    }
}
