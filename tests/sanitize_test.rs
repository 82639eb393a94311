//! Integration tests for the character sanitizer.

use mdreport::sanitize::is_allowed;
use mdreport::{parse_markdown, sanitize, RenderOptions, SanitizeOptions, Sanitizer};
use proptest::prelude::*;

#[test]
fn test_title_glyphs() {
    assert_eq!(sanitize("Status \u{2014} \u{2022} done"), "Status  -  - done");
}

#[test]
fn test_accents_kept() {
    let text = "Relatório de análise: ação, coração, pão";
    assert_eq!(sanitize(text), text);
}

#[test]
fn test_decomposed_accents_are_composed() {
    // "e" followed by a combining acute accent
    assert_eq!(sanitize("caf\u{0065}\u{0301}"), "café");
}

#[test]
fn test_unknown_symbols_replaced() {
    assert_eq!(sanitize("ok \u{2713} \u{1F600}"), "ok ? ?");
}

#[test]
fn test_sanitized_markdown_keeps_structure() {
    let md = "# Resumo \u{2014} Q1\n\n- \u{201C}item\u{201D}\n\n> nota\u{2026}";
    let doc = parse_markdown(md, &RenderOptions::default()).unwrap();
    assert_eq!(doc.title, "Resumo  -  Q1");
    assert_eq!(doc.block_count(), 5);
    assert_eq!(doc.blocks[2].text(), Some("\"item\""));
    assert_eq!(doc.blocks[4].text(), Some("nota..."));
}

proptest! {
    #[test]
    fn prop_filter_never_grows(text in "\\PC{0,64}") {
        let filtered = Sanitizer::new(SanitizeOptions::filter_only()).filter_chars(&text);
        prop_assert!(filtered.chars().count() <= text.chars().count());
        prop_assert!(filtered.chars().all(is_allowed));
    }

    #[test]
    fn prop_output_is_allowed(text in "\\PC{0,64}") {
        let out = sanitize(&text);
        prop_assert!(out.chars().all(is_allowed));
    }

    #[test]
    fn prop_ascii_unchanged(text in "[ -~\n\t]{0,64}") {
        prop_assert_eq!(sanitize(&text), text);
    }
}
