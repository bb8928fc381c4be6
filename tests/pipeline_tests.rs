//! End-to-end tests for protect → chunk → translate → restore.

use md_paper_translator::{
    chunk_text, missing_placeholders, protect, reassemble, restore, MockCompletionService,
    MockMode, TranslationConfig, TranslationService,
};
use std::sync::Arc;

fn service(mode: MockMode, max_text_length: usize) -> TranslationService {
    let config = TranslationConfig {
        request_interval_ms: 0,
        max_text_length,
        ..TranslationConfig::default()
    };
    TranslationService::with_service(config, Arc::new(MockCompletionService::new(mode)))
}

const PAPER: &str = "# Attention Is All You Need\n\n\
Abstract. The dominant sequence transduction models are based on recurrent networks.\n\n\
The attention function is $\\mathrm{softmax}(QK^T/\\sqrt{d_k})V$ for queries $Q$.\n\n\
$$\n\\mathrm{MultiHead}(Q, K, V) = \\mathrm{Concat}(head_1, \\dots, head_h)W^O\n$$\n\n\
| Model | BLEU |\n|:------|-----:|\n| Base | 27.3 |\n| Big | 28.4 |\n\n\
```python\ndef attention(q, k, v):\n    return softmax(q @ k.T) @ v\n```\n\n\
![Figure 1: The Transformer](images/fig1.png)\n\n\
<html><body><table><tr><td>raw</td></tr></table></body></html>\n\n\
Conclusion paragraph with plain prose.";

#[test]
fn test_example_scenario() {
    let text = "Intro.\n\n$E=mc^2$\n\nMore text.\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
    let protected = protect(text);

    assert_eq!(protected.spans.len(), 2);
    assert_eq!(protected.spans[0].original_text, "$E=mc^2$");
    assert!(protected.spans[1].original_text.starts_with("| a | b |"));
    assert!(protected.sanitized.contains("[PROTECTED_ELEMENT_0]"));
    assert!(protected.sanitized.contains("[PROTECTED_ELEMENT_1]"));

    let chunks = chunk_text(&protected.sanitized, 4000);
    assert_eq!(chunks.len(), 1);

    let joined = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    assert_eq!(restore(&joined, &protected.spans), text);
}

#[test]
fn test_plain_prose_roundtrip_identity() {
    let text = "First paragraph of prose.\n\nSecond one, a bit longer than the first.\n\nThird.";
    for max in [5, 20, 40, 4000] {
        let protected = protect(text);
        let chunks = chunk_text(&protected.sanitized, max);
        let joined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        assert_eq!(restore(&joined, &protected.spans), text, "max_length = {}", max);
    }
}

#[tokio::test]
async fn test_spans_preserved_in_order_with_small_chunks() {
    let translator = service(MockMode::Identity, 80);
    let protected = protect(PAPER);
    let result = translator.translate_document(PAPER).await;

    assert!(result.chunk_count > 1);
    assert!(result.is_complete());
    assert_eq!(result.text, PAPER);

    let mut cursor = 0;
    for span in &protected.spans {
        let found = result.text[cursor..]
            .find(&span.original_text)
            .expect("span missing from output");
        cursor += found + span.original_text.len();
    }
}

#[tokio::test]
async fn test_suffix_translation_keeps_elements_intact() {
    let translator = service(MockMode::Suffix("[zh]".to_string()), 200);
    let protected = protect(PAPER);
    let result = translator.translate_document(PAPER).await;

    assert!(result.missing_placeholders.is_empty());
    for span in &protected.spans {
        assert!(result.text.contains(&span.original_text));
    }
    assert!(result.text.contains("Conclusion paragraph with plain prose. [zh]"));
}

#[tokio::test]
async fn test_failure_fallback_keeps_position() {
    let config = TranslationConfig {
        request_interval_ms: 0,
        max_text_length: 30,
        ..TranslationConfig::default()
    };
    let mock = Arc::new(MockCompletionService::new(MockMode::Suffix("[ok]".to_string())));
    let ok = TranslationService::with_service(config.clone(), mock);
    let text = "aaaa aaaa aaaa aaaa\n\nbbbb bbbb bbbb bbbb\n\ncccc cccc cccc cccc";

    let flaky = TranslationService::with_service(config, Arc::new(MockCompletionService::fail_on([1])));
    let chunks = chunk_text(&protect(text).sanitized, 30);
    assert_eq!(chunks.len(), 3);

    let translated = flaky.run(&chunks, "Chinese").await;
    assert_eq!(reassemble(&translated), text);

    let translated = ok.run(&chunks, "Chinese").await;
    assert_eq!(
        reassemble(&translated),
        "aaaa aaaa aaaa aaaa [ok]\n\nbbbb bbbb bbbb bbbb [ok]\n\ncccc cccc cccc cccc [ok]"
    );
}

#[tokio::test]
async fn test_partial_failure_document_still_complete_coverage() {
    let translator = {
        let config = TranslationConfig {
            request_interval_ms: 0,
            max_text_length: 30,
            ..TranslationConfig::default()
        };
        TranslationService::with_service(config, Arc::new(MockCompletionService::fail_on([0, 2])))
    };
    let text = "Para one has $x$ inside.\n\nPara two is plain.\n\nPara three ![i](i.png).";
    let result = translator.translate_document(text).await;

    assert_eq!(result.failed_chunks, vec![0, 2]);
    assert_eq!(result.text, text);
}

#[test]
fn test_missing_placeholder_is_silent_loss() {
    let protected = protect("Keep $a$, drop $b$.");
    let translated = "Garde [PROTECTED_ELEMENT_0], perdu.";
    assert_eq!(missing_placeholders(translated, &protected.spans), vec![1]);
    assert_eq!(restore(translated, &protected.spans), "Garde $a$, perdu.");
}

#[tokio::test]
async fn test_translate_file_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.md");
    let output = dir.path().join("paper_translated.md");
    std::fs::write(&input, PAPER).unwrap();

    let translator = service(MockMode::Identity, 4000);
    let result = translator.translate_file(&input, &output).await.unwrap();

    assert_eq!(result.chunk_count, 1);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), PAPER);
}

#[tokio::test]
async fn test_translate_file_unwritable_output_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.md");
    std::fs::write(&input, "Hello.").unwrap();
    let output = dir.path().join("missing-dir").join("out.md");

    let translator = service(MockMode::Identity, 4000);
    assert!(translator.translate_file(&input, &output).await.is_err());
    assert!(!output.exists());
}
