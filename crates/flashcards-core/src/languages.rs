//! Language-key handling: mapping deck keys to speech tags and ordering the
//! selector options.

/// Preferred ordering and defaults for the language selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePreferences {
    pub order: Vec<String>,
    pub study: String,
    pub translation: Vec<String>,
}

const CANONICAL_TAGS: [&str; 3] = ["en-GB", "es-ES", "fr-FR"];

/// Map a deck key to the tag handed to the speech engine.
pub fn resolve_speech_lang(key: &str) -> String {
    let key = key.trim();
    if key.is_empty() {
        return "en-US".to_string();
    }
    if let Some(tag) = CANONICAL_TAGS
        .iter()
        .find(|tag| tag.eq_ignore_ascii_case(key))
    {
        return (*tag).to_string();
    }
    if key.contains(['-', '_']) {
        return key.to_string();
    }
    match key.to_ascii_lowercase().as_str() {
        "en" => "en-US".to_string(),
        "fr" => "fr-FR".to_string(),
        "es" => "es-ES".to_string(),
        _ => key.to_string(),
    }
}

/// Primary subtag of a language tag, lowercased: `en-GB` and `en_us` give `en`.
pub fn primary_subtag(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn same_primary_language(a: &str, b: &str) -> bool {
    let a = primary_subtag(a);
    !a.is_empty() && a == primary_subtag(b)
}

/// Exact tag comparison, tolerant of case and `_` separators.
pub fn same_tag(a: &str, b: &str) -> bool {
    a.replace('_', "-").eq_ignore_ascii_case(&b.replace('_', "-"))
}

/// Preferred languages first (in preference order), then remaining keys in
/// deck order.
pub fn ordered_options(keys: &[String], prefs: &LanguagePreferences) -> Vec<String> {
    let mut ordered: Vec<String> = prefs
        .order
        .iter()
        .filter(|lang| keys.contains(*lang))
        .cloned()
        .collect();
    for key in keys {
        if !ordered.contains(key) {
            ordered.push(key.clone());
        }
    }
    ordered
}

pub fn default_study_language(options: &[String], prefs: &LanguagePreferences) -> Option<String> {
    if options.contains(&prefs.study) {
        Some(prefs.study.clone())
    } else {
        options.first().cloned()
    }
}

pub fn translation_options(options: &[String], study: Option<&str>) -> Vec<String> {
    options
        .iter()
        .filter(|key| Some(key.as_str()) != study)
        .cloned()
        .collect()
}

pub fn default_translation_language(
    options: &[String],
    prefs: &LanguagePreferences,
) -> Option<String> {
    prefs
        .translation
        .iter()
        .find(|lang| options.contains(*lang))
        .or_else(|| options.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> LanguagePreferences {
        LanguagePreferences {
            order: vec!["en-GB".into(), "fr-FR".into(), "es-ES".into()],
            study: "en-GB".into(),
            translation: vec!["es-ES".into(), "fr-FR".into()],
        }
    }

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn resolves_known_and_bare_keys() {
        assert_eq!(resolve_speech_lang(""), "en-US");
        assert_eq!(resolve_speech_lang("en-gb"), "en-GB");
        assert_eq!(resolve_speech_lang("EN"), "en-US");
        assert_eq!(resolve_speech_lang("es"), "es-ES");
        assert_eq!(resolve_speech_lang("de-DE"), "de-DE");
        assert_eq!(resolve_speech_lang("ja"), "ja");
    }

    #[test]
    fn primary_subtag_matching_ignores_region_and_case() {
        assert!(same_primary_language("en-GB", "en_US"));
        assert!(same_primary_language("EN", "en-AU"));
        assert!(!same_primary_language("en-GB", "es-ES"));
        assert!(!same_primary_language("", ""));
    }

    #[test]
    fn preferred_languages_lead_the_options() {
        let options = ordered_options(&keys(&["de-DE", "es-ES", "en-GB"]), &prefs());
        assert_eq!(options, keys(&["en-GB", "es-ES", "de-DE"]));
    }

    #[test]
    fn study_defaults_to_preference_then_first() {
        assert_eq!(
            default_study_language(&keys(&["en-GB", "es-ES"]), &prefs()).as_deref(),
            Some("en-GB")
        );
        assert_eq!(
            default_study_language(&keys(&["de-DE", "it-IT"]), &prefs()).as_deref(),
            Some("de-DE")
        );
    }

    #[test]
    fn translation_options_exclude_study_and_prefer_spanish() {
        let options = keys(&["en-GB", "fr-FR", "es-ES"]);
        let translations = translation_options(&options, Some("en-GB"));
        assert_eq!(translations, keys(&["fr-FR", "es-ES"]));
        assert_eq!(
            default_translation_language(&translations, &prefs()).as_deref(),
            Some("es-ES")
        );
        let without_preferred = keys(&["it-IT", "pt-PT"]);
        assert_eq!(
            default_translation_language(&without_preferred, &prefs()).as_deref(),
            Some("it-IT")
        );
    }
}
