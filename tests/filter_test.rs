use std::sync::Arc;

use chrono::NaiveDate;
use juris::{
    DECISION_DATE_KEY, DocumentType, EngineConfig, HashingEmbedder, IndexBuilder, RawDocument,
    Retriever, SearchFilter, SearchRequest, StandardAnalyzer,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn corpus() -> Vec<RawDocument> {
    vec![
        RawDocument::new(
            "prec-2009",
            DocumentType::Precedent,
            "Theft of a bicycle left unlocked is still theft of property.",
        )
        .with_metadata(DECISION_DATE_KEY, date(2009, 5, 12))
        .with_metadata("court", "District Court"),
        RawDocument::new(
            "prec-2021",
            DocumentType::Precedent,
            "Theft requires intent to permanently deprive the owner of property.",
        )
        .with_metadata(DECISION_DATE_KEY, date(2021, 11, 3))
        .with_metadata("court", "Supreme Court"),
        RawDocument::new(
            "stat-theft",
            DocumentType::Statute,
            "Article 329 (Theft) A person who commits theft of property shall be punished.",
        ),
        RawDocument::new(
            "ruling-permit",
            DocumentType::AdministrativeRuling,
            "The permit for property development was revoked after review.",
        ),
    ]
}

async fn build() -> juris::Result<Retriever> {
    let builder = IndexBuilder::new(
        Arc::new(StandardAnalyzer::new()),
        Arc::new(HashingEmbedder::new(1024)?),
    );
    Retriever::from_documents(&builder, corpus(), &EngineConfig::default()).await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_type_filter_restricts_both_rankings() -> juris::Result<()> {
    let retriever = build().await?;

    let unfiltered = retriever.search_text("theft of property", 10).await?;
    assert!(unfiltered.results.len() > 1);

    let request = SearchRequest::builder("theft of property")
        .top_k(10)
        .filter(SearchFilter::new().doc_type(DocumentType::Statute))
        .build();
    let response = retriever.search(request).await?;

    assert!(!response.is_degraded());
    assert_eq!(response.ids(), vec!["stat-theft"]);
    let top = &response.results[0];
    assert_eq!(top.rank, 1);
    assert!(top.source.lexical_rank.is_some());
    assert!(top.source.semantic_rank.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_date_filter_is_inclusive_and_drops_undated() -> juris::Result<()> {
    let retriever = build().await?;

    let request = SearchRequest::builder("theft property")
        .filter(SearchFilter::new().decided_after(date(2021, 11, 3)))
        .build();
    let response = retriever.search(request).await?;
    assert_eq!(response.ids(), vec!["prec-2021"]);

    let request = SearchRequest::builder("theft property")
        .filter(
            SearchFilter::new()
                .decided_after(date(2000, 1, 1))
                .decided_before(date(2009, 5, 12)),
        )
        .build();
    let response = retriever.search(request).await?;
    assert_eq!(response.ids(), vec!["prec-2009"]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_metadata_equality_filter() -> juris::Result<()> {
    let retriever = build().await?;

    let request = SearchRequest::builder("theft")
        .filter(SearchFilter::new().equals("court", "Supreme Court"))
        .build();
    let response = retriever.search(request).await?;

    assert_eq!(response.ids(), vec!["prec-2021"]);
    assert_eq!(
        response.results[0].metadata.get("court").map(|v| v.to_string()),
        Some("Supreme Court".to_string())
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_filter_matching_nothing_returns_empty() -> juris::Result<()> {
    let retriever = build().await?;

    let request = SearchRequest::builder("theft")
        .filter(SearchFilter::new().doc_type(DocumentType::Interpretation))
        .build();
    let response = retriever.search(request).await?;

    assert!(response.results.is_empty());
    assert!(!response.is_degraded());
    Ok(())
}
