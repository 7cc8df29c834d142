use juris::chunking::article::article_markers;
use juris::chunking::sentence::split_sentences;
use juris::{
    ChunkingConfig, DocumentStore, DocumentType, RawDocument, StandardAnalyzer, chunk_document,
};

fn criminal_act() -> String {
    let mut text = String::from("형법\n제2편 각칙\n제38장 절도와 강도의 죄\n");
    for (n, body) in [
        (329, "(절도) 타인의 재물을 절취한 자는 6년 이하의 징역 또는 1천만원 이하의 벌금에 처한다."),
        (330, "(야간주거침입절도) 야간에 사람의 주거에 침입하여 타인의 재물을 절취한 자는 10년 이하의 징역에 처한다."),
        (331, "(특수절도) 야간에 문호 또는 장벽 기타 건조물의 일부를 손괴하고 제330조의 장소에 침입하여 타인의 재물을 절취한 자는 1년 이상 10년 이하의 징역에 처한다."),
    ] {
        text.push_str(&format!("제{n}조{body}\n"));
    }
    text.push_str(&format!("제331조의2(자동차등 불법사용) {}\n", "권리자의 동의없이 타인의 자동차를 일시 사용한 자는 처벌한다. ".repeat(40)));
    text
}

#[test]
fn test_statute_chunks_hold_one_article() {
    let config = ChunkingConfig::default();
    let out = chunk_document(DocumentType::Statute, &criminal_act(), &config);

    assert!(!out.degraded);
    assert_eq!(out.chunks.len(), 5);
    for chunk in &out.chunks[1..] {
        let (count, at_start) = article_markers(chunk);
        assert_eq!(count, 1, "{chunk}");
        assert!(at_start, "{chunk}");
    }
    // The long article stays whole; a cross reference inside an article is
    // not a new marker.
    assert!(out.chunks[4].chars().count() > config.recursive_chunk_chars);
    assert!(out.chunks[3].contains("제330조의 장소"));
}

#[test]
fn test_precedent_chunks_end_on_sentence_boundaries() {
    let sentence = "피고인은 타인의 재물을 절취하였다고 인정할 증거가 부족하다. ";
    let text = format!("{}Theft requires intent.", sentence.repeat(30));
    let config = ChunkingConfig::default();
    let out = chunk_document(DocumentType::Precedent, &text, &config);

    assert!(!out.degraded);
    assert!(out.chunks.len() > 1);
    for chunk in &out.chunks {
        assert!(chunk.ends_with('.'), "{chunk}");
        assert!(chunk.chars().count() <= config.precedent_target_chars);
    }

    // No overlap: the chunks partition the sentences.
    let (sentences, _) = split_sentences(&text);
    let total: usize = out.chunks.iter().map(|c| split_sentences(c).0.len()).sum();
    assert_eq!(total, sentences.len());
}

#[test]
fn test_ruling_chunks_overlap() {
    let text: String = (0..60)
        .map(|i| format!("Permit {i} was validly issued. "))
        .collect();
    let config = ChunkingConfig::default();
    let out = chunk_document(DocumentType::AdministrativeRuling, &text, &config);

    assert!(out.chunks.len() > 1);
    for pair in out.chunks.windows(2) {
        assert!(pair[0].chars().count() <= config.recursive_chunk_chars);
        let last = pair[0].rsplit("Permit ").next().unwrap_or_default();
        assert!(
            pair[1].starts_with(&format!("Permit {last}")),
            "'{last}' did not carry over"
        );
    }
}

#[test]
fn test_store_flags_degraded_statutes() -> juris::Result<()> {
    let store = DocumentStore::from_raw(
        vec![
            RawDocument::new("act", DocumentType::Statute, criminal_act()),
            RawDocument::new(
                "notice",
                DocumentType::Statute,
                "This notice has no numbered provisions at all.",
            ),
        ],
        &StandardAnalyzer::new(),
        &ChunkingConfig::default(),
    )?;

    assert_eq!(store.len(), 6);
    assert_eq!(store.get_by_id("act#1").map(|d| d.chunk_index), Some(1));
    assert!(store.get_by_id("act#1").is_some_and(|d| d.text.starts_with("제329조")));
    assert!(store.get_by_id("notice").is_some_and(|d| d.is_degraded_chunking()));
    assert!(
        store
            .documents()
            .iter()
            .filter(|d| d.source_id == "act")
            .all(|d| !d.is_degraded_chunking())
    );
    Ok(())
}

#[test]
fn test_wrapped_cross_reference_does_not_open_an_article() {
    let text = format!(
        "{}제332조(상습범) 상습으로\n제329조 내지 제331조의2의 죄를 범한 자는 가중한다.\n\
         제333조(강도) 폭행 또는 협박으로 타인의 재물을 강취한 자는 처벌한다.\n",
        criminal_act()
    );
    let out = chunk_document(DocumentType::Statute, &text, &ChunkingConfig::default());

    assert_eq!(out.chunks.len(), 7);
    assert!(out.chunks[5].starts_with("제332조"));
    assert!(out.chunks[5].contains("제329조 내지 제331조의2"));
    for chunk in &out.chunks[1..] {
        assert_eq!(article_markers(chunk), (1, true), "{chunk}");
    }
}
