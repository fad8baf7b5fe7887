//! Localised block labels inserted after translated sections and image
//! descriptions.
//!
//! The table is keyed by lowercase English language name. Lookups are
//! case-insensitive and fall back to the English labels, so an unsupported
//! language still produces a readable notebook.

/// `(language, translation label, image description label)`.
const LABELS: &[(&str, &str, &str)] = &[
    ("chinese", "翻译", "图片说明"),
    ("english", "Translation", "Image Description"),
    ("spanish", "Traducción", "Descripción de Imagen"),
    ("french", "Traduction", "Description d'Image"),
    ("german", "Übersetzung", "Bildbeschreibung"),
    ("japanese", "翻訳", "画像説明"),
    ("korean", "번역", "이미지 설명"),
    ("russian", "Перевод", "Описание изображения"),
    ("portuguese", "Tradução", "Descrição da Imagem"),
    ("italian", "Traduzione", "Descrizione dell'Immagine"),
];

const FALLBACK_TRANSLATION: &str = "Translation";
const FALLBACK_DESCRIPTION: &str = "Image Description";

fn lookup(target_language: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    let key = target_language.trim();
    LABELS.iter().find(|(lang, _, _)| lang.eq_ignore_ascii_case(key))
}

/// Label placed above a translated section.
pub fn translation_label(target_language: &str) -> &'static str {
    lookup(target_language).map_or(FALLBACK_TRANSLATION, |&(_, t, _)| t)
}

/// Label placed above a generated image description.
pub fn description_label(target_language: &str) -> &'static str {
    lookup(target_language).map_or(FALLBACK_DESCRIPTION, |&(_, _, d)| d)
}

/// Language names with dedicated labels, capitalised for display.
pub fn supported_languages() -> Vec<String> {
    LABELS
        .iter()
        .map(|(lang, _, _)| {
            let mut chars = lang.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(translation_label("Spanish"), "Traducción");
        assert_eq!(translation_label("SPANISH"), "Traducción");
        assert_eq!(description_label("spanish"), "Descripción de Imagen");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(translation_label("Klingon"), "Translation");
        assert_eq!(description_label("Klingon"), "Image Description");
    }

    #[test]
    fn every_language_has_both_labels() {
        for (lang, t, d) in LABELS {
            assert!(!t.is_empty() && !d.is_empty(), "{lang} incomplete");
        }
        assert_eq!(supported_languages().len(), LABELS.len());
        assert_eq!(supported_languages()[0], "Chinese");
    }
}
