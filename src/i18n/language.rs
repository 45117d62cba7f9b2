//! Human-readable language names for locale codes.
//!
//! The translation prompt names languages in English ("Russian", not "ru"),
//! which gives the model less room to guess.

/// Metadata for a known language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// ISO 639-1 code (e.g., "en", "ru")
    pub code: &'static str,

    /// English name (e.g., "Russian")
    pub name: &'static str,

    /// Native name (e.g., "Русский")
    pub native_name: &'static str,
}

const LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo { code: "ar", name: "Arabic", native_name: "العربية" },
    LanguageInfo { code: "de", name: "German", native_name: "Deutsch" },
    LanguageInfo { code: "en", name: "English", native_name: "English" },
    LanguageInfo { code: "es", name: "Spanish", native_name: "Español" },
    LanguageInfo { code: "fr", name: "French", native_name: "Français" },
    LanguageInfo { code: "he", name: "Hebrew", native_name: "עברית" },
    LanguageInfo { code: "hy", name: "Armenian", native_name: "Հայերեն" },
    LanguageInfo { code: "it", name: "Italian", native_name: "Italiano" },
    LanguageInfo { code: "ja", name: "Japanese", native_name: "日本語" },
    LanguageInfo { code: "ka", name: "Georgian", native_name: "ქართული" },
    LanguageInfo { code: "kk", name: "Kazakh", native_name: "Қазақ тілі" },
    LanguageInfo { code: "ko", name: "Korean", native_name: "한국어" },
    LanguageInfo { code: "pl", name: "Polish", native_name: "Polski" },
    LanguageInfo { code: "pt", name: "Portuguese", native_name: "Português" },
    LanguageInfo { code: "ru", name: "Russian", native_name: "Русский" },
    LanguageInfo { code: "tr", name: "Turkish", native_name: "Türkçe" },
    LanguageInfo { code: "uk", name: "Ukrainian", native_name: "Українська" },
    LanguageInfo { code: "uz", name: "Uzbek", native_name: "Oʻzbekcha" },
    LanguageInfo { code: "zh", name: "Chinese", native_name: "中文" },
];

/// Look up a language by locale code.
///
/// Region subtags are ignored, so "pt-BR" and "pt_BR" resolve to Portuguese.
pub fn lookup(code: &str) -> Option<&'static LanguageInfo> {
    let primary = code
        .split(['-', '_'])
        .next()
        .unwrap_or(code)
        .to_ascii_lowercase();
    LANGUAGES.iter().find(|lang| lang.code == primary)
}

/// English name for a locale code, or the code itself when unknown.
pub fn language_name(code: &str) -> &str {
    lookup(code).map(|lang| lang.name).unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(language_name("en"), "English");
        assert_eq!(language_name("ru"), "Russian");
        assert_eq!(lookup("ru").unwrap().native_name, "Русский");
    }

    #[test]
    fn test_region_subtags_are_ignored() {
        assert_eq!(language_name("pt-BR"), "Portuguese");
        assert_eq!(language_name("zh_Hant"), "Chinese");
        assert_eq!(language_name("EN-us"), "English");
    }

    #[test]
    fn test_unknown_code_falls_back_to_code() {
        assert_eq!(language_name("xx"), "xx");
        assert_eq!(language_name(""), "");
        assert!(lookup("tlh").is_none());
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in LANGUAGES.iter().enumerate() {
            for b in &LANGUAGES[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}
