use std::sync::Arc;

use ontoscan_annotator::recognizer::DictionaryRecognizer;
use ontoscan_annotator::{Annotator, CacheInstances, CacheStore, MemoryStore, OntologyCorpus, TermCache};
use ontoscan_common::settings::CacheConfig;
use ontoscan_common::OntologyId;
use ontoscan_recommender::Recommender;
use ontoscan_test_utils::pretty_assertions::assert_eq;
use ontoscan_test_utils::{bro_corpus, init_tracing, recommender_corpus, temp_path, BRO, PREFONT, SYNONT};

async fn recommender(corpus_json: &str) -> Recommender {
    init_tracing();
    let corpus = Arc::new(OntologyCorpus::from_json_str(corpus_json).unwrap());
    let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
    let config = CacheConfig::default();
    let term_cache = Arc::new(TermCache::new(
        CacheInstances::new(store, &config),
        corpus.clone(),
        &config,
    ));

    let instance = term_cache.instances().current().await.unwrap();
    term_cache.seed_current_instance().await.unwrap();
    let (_dir, path) = temp_path("dictionary.txt");
    term_cache.generate_dictionary_file(&instance, &path).await.unwrap();
    let recognizer = Arc::new(DictionaryRecognizer::from_file(&path).unwrap());

    let annotator = Annotator::builder(recognizer, term_cache)
        .graph(corpus.clone())
        .build();
    Recommender::new(Arc::new(annotator), corpus)
}

fn ranked_ids(recs: &[ontoscan_recommender::Recommendation]) -> Vec<&str> {
    recs.iter().map(|r| r.ontology.as_str()).collect()
}

#[tokio::test]
async fn test_preferred_outranks_synonym() {
    let rec = recommender(&recommender_corpus()).await;
    let recs = rec.recommend("Heart Heart Lung", &[], false).await.unwrap();

    // ZEROONT matches "Heart" but reports no classes.
    assert_eq!(ranked_ids(&recs), vec![PREFONT, SYNONT]);

    let pref = &recs[0];
    assert_eq!(pref.num_terms_matched, 2);
    assert_eq!(pref.num_terms_total, 2);
    // (10 + 10 + 10) / log2(2 + 2)
    assert!((pref.score - 15.0).abs() < 1e-9);

    let syn = &recs[1];
    assert_eq!(syn.num_terms_matched, 2);
    // Class count falls back to a live count when metrics are missing.
    assert_eq!(syn.num_terms_total, 2);
    assert!((syn.score - 7.5).abs() < 1e-9);
    assert!(pref.annotated_classes.is_empty());
}

#[tokio::test]
async fn test_ontology_filter_and_classes() {
    let rec = recommender(&recommender_corpus()).await;

    let recs = rec.recommend("Heart Lung", &["SYNONT".to_string()], true).await.unwrap();
    assert_eq!(ranked_ids(&recs), vec![SYNONT]);
    let classes: Vec<&str> = recs[0].annotated_classes.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(classes, vec!["http://syn.example.org#Cardiac_Organ", "http://syn.example.org#Lung"]);

    let none = rec.recommend("Heart", &["DOES-NOT-EXIST".to_string()], false).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_hierarchy_adds_points() {
    let rec = recommender(&bro_corpus()).await;
    let flat = rec.recommend("Storage", &[], false).await.unwrap();
    let deep = rec.recommend("Data Storage", &[], false).await.unwrap();

    assert_eq!(ranked_ids(&deep), vec![BRO]);
    // Data and Data Storage each reach Information Resource and Resource.
    let total = deep[0].num_terms_total as f64;
    let expected = (10.0 + 2.0 * 2.0) * 2.0 + 10.0;
    assert!((deep[0].score - expected / (2.0 + total).log2()).abs() < 1e-9);
    assert!(deep[0].score > flat[0].score);
    assert_eq!(deep[0].ontology, OntologyId::new(BRO));
}

#[tokio::test]
async fn test_hierarchy_can_be_disabled() {
    let rec = recommender(&bro_corpus()).await.with_hierarchy_levels(0);
    let recs = rec.recommend("Data Storage", &[], false).await.unwrap();
    let total = recs[0].num_terms_total as f64;
    assert!((recs[0].score - 30.0 / (2.0 + total).log2()).abs() < 1e-9);
}
