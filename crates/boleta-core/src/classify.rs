//! File-name based provider classification.

use serde::{Serialize, Serializer};
use unicode_normalization::UnicodeNormalization;

/// Utility provider identified from a bill's file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Metrogas (gas).
    Metrogas,
    /// Enel (electricity).
    Enel,
    /// Aguas Andinas (water).
    AguasAndinas,
    /// File name matched no known provider.
    Unknown,
}

impl Provider {
    /// Human-readable provider name, absent for [`Provider::Unknown`].
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Provider::Metrogas => Some("Metrogas"),
            Provider::Enel => Some("Enel"),
            Provider::AguasAndinas => Some("Aguas Andinas"),
            Provider::Unknown => None,
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Provider::Unknown
    }
}

impl Serialize for Provider {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.label() {
            Some(name) => serializer.serialize_some(name),
            None => serializer.serialize_none(),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label().unwrap_or("desconocido"))
    }
}

/// Classify a bill by its file name.
///
/// The base name is lowercased and diacritic-stripped before testing each
/// provider's name tokens. Matching is substring-only; order is Metrogas,
/// Enel, Aguas Andinas. Anything else is [`Provider::Unknown`].
pub fn classify(file_name: &str) -> Provider {
    let stem = std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let n = normalize_name(stem);

    if n.contains("metrogas") || (n.contains("metro") && n.contains("gas")) {
        return Provider::Metrogas;
    }
    if n.contains("enel") {
        return Provider::Enel;
    }
    if n.contains("aguas") && n.contains("andinas") {
        return Provider::AguasAndinas;
    }
    Provider::Unknown
}

/// Lowercase and strip diacritics (NFKD, combining marks dropped).
fn normalize_name(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036f}' | '\u{1ab0}'..='\u{1aff}' | '\u{20d0}'..='\u{20ff}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_brand_token() {
        assert_eq!(classify("ENEL_Marzo_2024.pdf"), Provider::Enel);
        assert_eq!(classify("boleta_aguas_andinas_01.pdf"), Provider::AguasAndinas);
    }

    #[test]
    fn test_classify_split_token() {
        assert_eq!(classify("cuenta_metro_gas_feb.pdf"), Provider::Metrogas);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify("recibo_desconocido.pdf"), Provider::Unknown);
    }

    #[test]
    fn test_classify_strips_diacritics() {
        assert_eq!(classify("Boleta_Aguás_Andinás.pdf"), Provider::AguasAndinas);
    }

    #[test]
    fn test_classify_order_prefers_metrogas() {
        // A pathological name containing several brands resolves in listed order.
        assert_eq!(classify("metrogas_enel.pdf"), Provider::Metrogas);
    }

    #[test]
    fn test_provider_labels() {
        assert_eq!(Provider::AguasAndinas.label(), Some("Aguas Andinas"));
        assert_eq!(Provider::Unknown.label(), None);
    }
}
