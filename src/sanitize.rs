//! Character sanitizer for the single-byte output encoding.
//!
//! Runs in two phases. The first phase rewrites typographic punctuation,
//! arrows, operators, currency signs and Greek letters to ASCII spellings.
//! The second phase keeps ASCII and a fixed set of accented Latin letters
//! and turns everything else into `?`. The second phase is lossy, so it must
//! run after the substitutions.

use unicode_normalization::UnicodeNormalization;

/// Symbol substitutions, applied in order.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{2014}', " - "), // em dash
    ('\u{2013}', "-"),   // en dash
    ('\u{201C}', "\""),  // left double quote
    ('\u{201D}', "\""),  // right double quote
    ('\u{2018}', "'"),   // left single quote
    ('\u{2019}', "'"),   // right single quote
    ('\u{2026}', "..."), // ellipsis
    ('\u{2022}', "-"),   // bullet
    ('\u{2192}', "->"),
    ('\u{2190}', "<-"),
    ('\u{2191}', "^"),
    ('\u{2193}', "v"),
    ('\u{2264}', "<="),
    ('\u{2265}', ">="),
    ('\u{2260}', "!="),
    ('\u{00A9}', "(c)"),
    ('\u{00AE}', "(R)"),
    ('\u{2122}', "(TM)"),
    ('\u{20AC}', "EUR"),
    ('\u{00A3}', "GBP"),
    ('\u{00A5}', "JPY"),
    ('\u{00D7}', "x"),
    ('\u{00F7}', "/"),
    ('\u{00B5}', "u"),
    ('\u{03B1}', "alpha"),
    ('\u{03B2}', "beta"),
    ('\u{03B3}', "gamma"),
    ('\u{03B4}', "delta"),
    ('\u{03C0}', "pi"),
    ('\u{03C3}', "sigma"),
    ('\u{03BB}', "lambda"),
    ('\u{03B8}', "theta"),
    ('\u{03C6}', "phi"),
    ('\u{03A9}', "Omega"),
];

/// Accented letters kept verbatim (Portuguese orthography).
const ACCENTED_WHITELIST: &[char] = &[
    'á', 'à', 'ã', 'â', 'é', 'ê', 'í', 'ó', 'ô', 'õ', 'ú', 'ü', 'ç', //
    'Á', 'À', 'Ã', 'Â', 'É', 'Ê', 'Í', 'Ó', 'Ô', 'Õ', 'Ú', 'Ü', 'Ç',
];

/// Replacement for characters outside the allowed set.
pub const REPLACEMENT_CHAR: char = '?';

/// Options for the sanitizer.
#[derive(Debug, Clone)]
pub struct SanitizeOptions {
    /// Compose decomposed accents (NFC) before filtering
    pub normalize_unicode: bool,

    /// Apply the symbol substitution table
    pub substitute_symbols: bool,

    /// Map non-ASCII whitespace (no-break space, em space) to a plain space
    pub plain_whitespace: bool,
}

impl SanitizeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only run the whitelist filter.
    pub fn filter_only() -> Self {
        Self {
            normalize_unicode: false,
            substitute_symbols: false,
            plain_whitespace: true,
        }
    }

    /// Enable or disable NFC normalization.
    pub fn with_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Enable or disable symbol substitution.
    pub fn with_substitutions(mut self, enabled: bool) -> Self {
        self.substitute_symbols = enabled;
        self
    }
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            substitute_symbols: true,
            plain_whitespace: true,
        }
    }
}

/// Text sanitizer.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    options: SanitizeOptions,
}

impl Sanitizer {
    /// Create a sanitizer with the given options.
    pub fn new(options: SanitizeOptions) -> Self {
        Self { options }
    }

    /// Sanitize text. Total: never fails.
    pub fn process(&self, text: &str) -> String {
        let mut result = if self.options.normalize_unicode {
            text.nfc().collect::<String>()
        } else {
            text.to_string()
        };

        if self.options.substitute_symbols {
            result = substitute_symbols(&result);
        }

        self.filter_chars(&result)
    }

    /// Keep ASCII, whitespace and whitelisted letters; replace the rest.
    ///
    /// Maps each input character to exactly one output character.
    pub fn filter_chars(&self, text: &str) -> String {
        text.chars()
            .map(|c| {
                if c.is_ascii() || is_whitelisted(c) {
                    c
                } else if c.is_whitespace() {
                    if self.options.plain_whitespace {
                        ' '
                    } else {
                        c
                    }
                } else {
                    REPLACEMENT_CHAR
                }
            })
            .collect()
    }
}

/// Sanitize text with default options.
pub fn sanitize(text: &str) -> String {
    Sanitizer::default().process(text)
}

/// Check whether a character survives the filter phase unchanged.
pub fn is_allowed(c: char) -> bool {
    c.is_ascii() || c.is_whitespace() || is_whitelisted(c)
}

fn is_whitelisted(c: char) -> bool {
    ACCENTED_WHITELIST.contains(&c)
}

fn substitute_symbols(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            output.push(c);
            continue;
        }
        match SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => output.push_str(to),
            None => output.push(c),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_and_bullet() {
        assert_eq!(sanitize("A\u{2014}B \u{2022} C"), "A - B - C");
    }

    #[test]
    fn test_quotes_and_ellipsis() {
        assert_eq!(
            sanitize("\u{201C}quoted\u{201D} \u{2018}x\u{2019}\u{2026}"),
            "\"quoted\" 'x'..."
        );
    }

    #[test]
    fn test_greek_and_operators() {
        assert_eq!(sanitize("\u{03C0} \u{2264} 4 \u{2192} \u{03A9}"), "pi <= 4 -> Omega");
    }

    #[test]
    fn test_portuguese_kept() {
        let text = "Relatório de Análise: Ação, Pão, ÚNICO, Güe";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn test_other_scripts_replaced() {
        assert_eq!(sanitize("中文 ñ ß"), "?? ? ?");
    }

    #[test]
    fn test_decomposed_accent_composed() {
        // "a" + combining tilde composes to the whitelisted "ã"
        assert_eq!(sanitize("a\u{0303}o"), "ão");

        let raw = Sanitizer::new(SanitizeOptions::default().with_normalization(false));
        assert_eq!(raw.process("a\u{0303}o"), "a?o");
    }

    #[test]
    fn test_unicode_whitespace() {
        assert_eq!(sanitize("a\u{00A0}b\u{2003}c\td\n"), "a b c\td\n");
    }

    #[test]
    fn test_filter_is_one_to_one() {
        let filter = Sanitizer::new(SanitizeOptions::filter_only());
        let text = "x\u{2014}y 中 ç \u{1F600}";
        let out = filter.filter_chars(text);
        assert_eq!(out.chars().count(), text.chars().count());
        assert!(out.chars().all(is_allowed));
    }

    #[test]
    fn test_substitutions_disabled() {
        let sanitizer = Sanitizer::new(SanitizeOptions::default().with_substitutions(false));
        assert_eq!(sanitizer.process("a\u{2014}b"), "a?b");
    }
}
