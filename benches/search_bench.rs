use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use juris::lexical::{LexicalIndex, LexicalSearchRequest};
use juris::vector::VectorIndex;
use juris::{
    DocumentStore, DocumentType, EngineConfig, HashingEmbedder, IndexBuilder, RawDocument,
    Retriever, StandardAnalyzer,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tokio::runtime::Runtime;

const VOCABULARY: &[&str] = &[
    "theft", "property", "intent", "owner", "deprive", "robbery", "force", "threat", "contract",
    "offer", "acceptance", "consideration", "permit", "agency", "revocation", "appeal", "court",
    "judgment", "damages", "negligence", "duty", "breach", "evidence", "witness", "sentence",
    "fraud", "deception", "loss", "tenant", "landlord", "lease", "eviction",
];

const QUERIES: &[&str] = &[
    "What are the elements of theft?",
    "Article 329",
    "damages for breach of contract",
    "when may an agency revoke a permit",
];

fn sentence(rng: &mut StdRng) -> String {
    let len = rng.random_range(6..16);
    let words: Vec<&str> = (0..len)
        .filter_map(|_| VOCABULARY.choose(rng).copied())
        .collect();
    format!("{}.", words.join(" "))
}

fn generate_corpus(count: usize, seed: u64) -> Vec<RawDocument> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let doc_type = DocumentType::ALL[i % DocumentType::ALL.len()];
            let text = match doc_type {
                DocumentType::Statute => (1..=rng.random_range(2..6))
                    .map(|n| format!("Article {} {}", 300 + n, sentence(&mut rng)))
                    .collect::<Vec<_>>()
                    .join("\n"),
                _ => (0..rng.random_range(3..12))
                    .map(|_| sentence(&mut rng))
                    .collect::<Vec<_>>()
                    .join(" "),
            };
            RawDocument::new(format!("doc-{i:05}"), doc_type, text)
        })
        .collect()
}

fn index_builder(dimension: usize) -> IndexBuilder {
    let analyzer = Arc::new(StandardAnalyzer::new());
    let embedder = HashingEmbedder::new(dimension).unwrap();
    IndexBuilder::new(analyzer, Arc::new(embedder))
}

fn bench_build(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let mut group = c.benchmark_group("Index Build");
    group.sample_size(10);

    for count in [500, 2000] {
        let corpus = generate_corpus(count, 7);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &corpus, |b, corpus| {
            let builder = index_builder(256);
            b.to_async(&runtime)
                .iter(|| async { builder.build(corpus.clone()).await.unwrap() });
        });
    }
    group.finish();
}

fn bench_branches(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ranking Branches");
    let analyzer = StandardAnalyzer::new();
    let store = DocumentStore::from_raw(
        generate_corpus(5000, 11),
        &analyzer,
        &Default::default(),
    )
    .unwrap();
    let lexical = LexicalIndex::build(&store, Default::default());
    let terms: Vec<String> = vec!["theft".into(), "property".into(), "intent".into()];

    group.bench_function("bm25_top20", |b| {
        b.iter(|| {
            let request = LexicalSearchRequest::new(&terms, 20);
            black_box(lexical.search(&request, store.id_ranks()))
        })
    });

    let dimension = 256;
    let mut rng = StdRng::seed_from_u64(3);
    let slots: Vec<Option<Vec<f32>>> = (0..store.len())
        .map(|_| Some((0..dimension).map(|_| rng.random::<f32>() - 0.5).collect()))
        .collect();
    let vectors = VectorIndex::from_slots(dimension, slots).unwrap();
    let query: Vec<f32> = (0..dimension).map(|_| rng.random::<f32>() - 0.5).collect();

    group.bench_function("cosine_top20", |b| {
        b.iter(|| black_box(vectors.search(&query, 20, None, store.id_ranks()).unwrap()))
    });
    group.finish();
}

fn bench_hybrid_search(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let mut group = c.benchmark_group("Hybrid Search");

    for count in [1000, 5000] {
        let retriever = runtime
            .block_on(Retriever::from_documents(
                &index_builder(256),
                generate_corpus(count, 42),
                &EngineConfig::default(),
            ))
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(count), &retriever, |b, retriever| {
            b.to_async(&runtime).iter(|| async {
                for query in QUERIES {
                    black_box(retriever.search_text(query, 10).await.unwrap());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_branches, bench_hybrid_search);
criterion_main!(benches);
