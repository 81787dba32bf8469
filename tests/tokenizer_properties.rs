#[cfg(test)]
mod tests {
    use htmldiff_tokens::analysis::grapheme::Granularity;
    use htmldiff_tokens::analysis::token::{TokenKind, TokenSequence};
    use htmldiff_tokens::analysis::tokenizer::Tokenizer;
    use htmldiff_tokens::analysis::tokenizer::html::HtmlTokenizer;
    use htmldiff_tokens::config::DiffConfig;

    const DOCUMENTS: &[&str] = &[
        "",
        "plain text",
        "<p>Hello world</p>",
        "<div class=\"a b\">\n  <b>Bold</b>, <i>it's</i> (3.14)!\n</div>\n",
        "Mr. Smith's e-mail: smith@example.com.",
        "<ul>\r\n\t<li>one</li>\r\n\t<li>two</li>\r\n</ul>",
        "caf\u{e9} na\u{ef}ve \u{65e5}\u{672c}\u{8a9e} \u{1f600}\u{1f44d}\u{1f3fd}",
        "unterminated <a href=\"x\" title='y",
        "<br/><br />x<!-- comment -->y",
        "  leading and trailing  ",
        "'quoted' ,comma (paren) end.",
    ];

    fn tokenize(config: &DiffConfig, text: &str) -> TokenSequence {
        HtmlTokenizer::from_config(config).tokenize(text).unwrap()
    }

    fn configs() -> Vec<DiffConfig> {
        vec![
            DiffConfig::default(),
            DiffConfig::default().with_keep_new_lines(true),
            DiffConfig::default().with_special_case_chars(['-']),
            DiffConfig::default().with_granularity(Granularity::Grapheme),
            DiffConfig::default()
                .with_keep_new_lines(true)
                .with_granularity(Granularity::Grapheme),
        ]
    }

    #[test]
    fn test_source_spans_are_lossless() {
        for config in configs() {
            for doc in DOCUMENTS {
                let tokens = tokenize(&config, doc);
                assert_eq!(tokens.source_text(doc).as_deref(), Some(*doc), "{doc:?}");

                let mut expected_start = 0;
                for token in &tokens {
                    assert_eq!(token.start_offset, expected_start, "{doc:?}");
                    assert!(token.end_offset > token.start_offset, "{doc:?}");
                    expected_start = token.end_offset;
                }
            }
        }
    }

    #[test]
    fn test_text_concatenation_is_lossless_when_keeping_whitespace() {
        let config = DiffConfig::default().with_keep_new_lines(true);
        for doc in DOCUMENTS {
            assert_eq!(tokenize(&config, doc).joined_text(), *doc);
        }
    }

    #[test]
    fn test_tokenization_is_idempotent() {
        for config in configs() {
            for doc in DOCUMENTS {
                assert_eq!(tokenize(&config, doc), tokenize(&config, doc));
            }
        }
    }

    #[test]
    fn test_tags_hold_one_span() {
        for doc in DOCUMENTS {
            let tokens = tokenize(&DiffConfig::default(), doc);
            let last = tokens.len().saturating_sub(1);
            for (i, token) in tokens.iter().enumerate() {
                if token.kind != TokenKind::Tag {
                    assert!(!token.text.contains('<'), "{doc:?}: {token:?}");
                    continue;
                }
                assert!(token.text.starts_with('<'));
                if token.text.ends_with('>') {
                    assert_eq!(token.text.matches('>').count(), 1, "{doc:?}");
                } else {
                    // Only the unterminated remainder may lack '>'.
                    assert_eq!(i, last, "{doc:?}");
                }
            }
        }
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let tokens = tokenize(&DiffConfig::default(), "a \t\r\n b\u{3000}c");
        assert_eq!(tokens.texts(), vec!["a", " ", "b", " ", "c"]);
        assert!(
            tokens
                .iter()
                .filter(|t| t.is_whitespace())
                .all(|t| t.text == " ")
        );

        let tokens = tokenize(
            &DiffConfig::default().with_keep_new_lines(true),
            "a \t\r\n b",
        );
        assert_eq!(tokens.texts(), vec!["a", " \t\r\n ", "b"]);
    }

    #[test]
    fn test_special_case_joining() {
        let tokens = tokenize(&DiffConfig::default(), "don't stop.");
        assert_eq!(tokens.texts(), vec!["don't", " ", "stop", "."]);
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Word,
                TokenKind::Whitespace,
                TokenKind::Word,
                TokenKind::Punctuation
            ]
        );

        let dots_only = DiffConfig::default().with_special_case_chars(['.']);
        assert!(dots_only.validate().is_ok());
        let tokens = tokenize(&dots_only, "don't 3.14");
        assert_eq!(tokens.texts(), vec!["don", "'", "t", " ", "3.14"]);
    }

    #[test]
    fn test_end_to_end_decomposition() {
        let config = DiffConfig::default();
        let old = tokenize(&config, "<p>Hello world</p>");
        let new = tokenize(&config, "<p>Hello there world</p>");

        assert_eq!(old.texts(), vec!["<p>", "Hello", " ", "world", "</p>"]);
        assert_eq!(
            new.texts(),
            vec!["<p>", "Hello", " ", "there", " ", "world", "</p>"]
        );
        assert_eq!(old[0].tag_name(), Some("p"));
        assert!(old[4].is_closing_tag());
        assert!(config.is_special_case_tag(old[0].tag_name().unwrap()));
    }

    #[test]
    fn test_tag_boundary_vectors() {
        let config = DiffConfig::default();
        assert_eq!(tokenize(&config, "<b> x").texts(), vec!["<b>", " ", "x"]);
        assert_eq!(tokenize(&config, "<b>x").texts(), vec!["<b>", "x"]);
        assert_eq!(tokenize(&config, "<b>\n<i>").texts(), vec!["<b>", " ", "<i>"]);
    }
}
