//! Municipality name cleaning and the canonical grouping key
//!
//! Validation and deduplication must agree on what counts as "the same
//! municipality", so both go through [`MunicipalityKey::from_name`], which is
//! built on top of [`clean_municipality_name`].

use std::fmt;

/// Trailing words dropped from a municipality name
const NAME_SUFFIXES: [&str; 3] = ["kommun", "stad", "municipality"];

/// Clean a municipality name for display
///
/// Collapses whitespace, drops trailing `kommun` / `stad` / `municipality`
/// words and title-cases the rest. A suffix is only dropped when it is a
/// separate word and at least one other word remains, so "Karlstad" stays
/// "Karlstad" and the result is stable under a second clean.
///
/// # Examples
///
/// ```
/// use taxa_domain::clean_municipality_name;
///
/// assert_eq!(clean_municipality_name("  stockholm   kommun "), "Stockholm");
/// assert_eq!(clean_municipality_name("upplands väsby"), "Upplands Väsby");
/// assert_eq!(clean_municipality_name("Karlstad"), "Karlstad");
/// ```
pub fn clean_municipality_name(raw: &str) -> String {
    let mut words: Vec<&str> = raw.split_whitespace().collect();

    while words.len() > 1 {
        match words.last() {
            Some(last) if NAME_SUFFIXES.iter().any(|s| last.eq_ignore_ascii_case(s)) => {
                words.pop();
            }
            _ => break,
        }
    }

    title_case(&words.join(" "))
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// Canonical municipality key used to group duplicate records
///
/// Built from the cleaned name, lower-cased, so "Stockholm kommun" and
/// "STOCKHOLM  stad" share one key. Diacritics are significant: Håbo and
/// Habo are different municipalities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MunicipalityKey(String);

impl MunicipalityKey {
    /// Derive the key from any spelling of a municipality name
    ///
    /// # Examples
    ///
    /// ```
    /// use taxa_domain::MunicipalityKey;
    ///
    /// let a = MunicipalityKey::from_name("Stockholm kommun");
    /// let b = MunicipalityKey::from_name("stockholm");
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str(), "stockholm");
    /// ```
    pub fn from_name(raw: &str) -> Self {
        Self(clean_municipality_name(raw).to_lowercase())
    }

    /// Get the key as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key is empty (no usable name)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MunicipalityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_stripping() {
        assert_eq!(clean_municipality_name("Stockholm kommun"), "Stockholm");
        assert_eq!(clean_municipality_name("Stockholms stad"), "Stockholms");
        assert_eq!(clean_municipality_name("Ale Municipality"), "Ale");
        assert_eq!(clean_municipality_name("ALE KOMMUN"), "Ale");
    }

    #[test]
    fn test_suffix_must_be_separate_word() {
        assert_eq!(clean_municipality_name("Karlstad"), "Karlstad");
        assert_eq!(clean_municipality_name("Halmstad kommun"), "Halmstad");
    }

    #[test]
    fn test_repeated_suffixes_are_all_dropped() {
        assert_eq!(clean_municipality_name("Ale kommun kommun"), "Ale");
        assert_eq!(clean_municipality_name("Ale stad kommun"), "Ale");
        assert_eq!(clean_municipality_name("kommun kommun"), "Kommun");
        assert_eq!(
            clean_municipality_name(&clean_municipality_name("Ale kommun kommun")),
            "Ale"
        );
    }

    #[test]
    fn test_lone_suffix_word_is_kept() {
        assert_eq!(clean_municipality_name("kommun"), "Kommun");
    }

    #[test]
    fn test_title_case_swedish_letters() {
        assert_eq!(clean_municipality_name("örebro"), "Örebro");
        assert_eq!(clean_municipality_name("ÄLVSBYN"), "Älvsbyn");
        assert_eq!(clean_municipality_name("upplands-bro"), "Upplands-Bro");
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(clean_municipality_name("   "), "");
        assert!(MunicipalityKey::from_name("").is_empty());
    }

    #[test]
    fn test_key_folds_case_and_suffix() {
        let keys = [
            MunicipalityKey::from_name("Malmö stad"),
            MunicipalityKey::from_name("malmö"),
            MunicipalityKey::from_name("  MALMÖ  "),
        ];
        assert!(keys.iter().all(|k| k == &keys[0]));
        assert_eq!(keys[0].as_str(), "malmö");
    }

    #[test]
    fn test_key_keeps_diacritics() {
        assert_ne!(
            MunicipalityKey::from_name("Håbo kommun"),
            MunicipalityKey::from_name("Habo kommun")
        );
        assert_ne!(
            MunicipalityKey::from_name("Malmö"),
            MunicipalityKey::from_name("Malmo")
        );
    }

    #[test]
    fn test_key_distinguishes_different_municipalities() {
        assert_ne!(
            MunicipalityKey::from_name("Ale"),
            MunicipalityKey::from_name("Alingsås")
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: cleaning is idempotent
        #[test]
        fn test_clean_is_idempotent(name in "[a-zA-ZåäöÅÄÖ ]{0,30}[xqz]( kommun| stad){0,3}") {
            let once = clean_municipality_name(&name);
            let twice = clean_municipality_name(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: the key ignores case and suffix variants
        #[test]
        fn test_key_ignores_case_and_suffix(name in "[a-zåäö]{2,12}") {
            let base = MunicipalityKey::from_name(&name);
            prop_assert_eq!(&base, &MunicipalityKey::from_name(&name.to_uppercase()));
            prop_assert_eq!(&base, &MunicipalityKey::from_name(&format!("{} kommun", name)));
            prop_assert_eq!(&base, &MunicipalityKey::from_name(&format!("  {}  stad ", name)));
        }
    }
}
