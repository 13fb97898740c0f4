//! Shared fixtures for ontoscan tests.
//!
//! Corpora are returned as JSON documents so any crate can load them
//! through `OntologyCorpus::from_json_str` without this crate depending on
//! the annotator.

use std::io::Write;
use std::path::PathBuf;

use serde_json::json;

pub use pretty_assertions;

pub const BRO: &str = "http://data.bioontology.org/ontologies/BRO";
pub const STORE: &str = "http://data.bioontology.org/ontologies/STORE";
pub const LEXI: &str = "http://data.bioontology.org/ontologies/LEXI";

pub const PREFONT: &str = "http://data.bioontology.org/ontologies/PREFONT";
pub const SYNONT: &str = "http://data.bioontology.org/ontologies/SYNONT";
pub const NOSUB: &str = "http://data.bioontology.org/ontologies/NOSUB";
pub const ZEROONT: &str = "http://data.bioontology.org/ontologies/ZEROONT";

pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";

/// Class IRI inside the BRO fixture.
pub fn bro(local: &str) -> String {
    format!("http://bioontology.org/ontologies/BiomedicalResourceOntology.owl#{local}")
}

/// One ontology with a single class, "Data Storage".
pub fn single_class_corpus() -> String {
    json!({
        "ontologies": [{
            "id": BRO,
            "submission_id": 1,
            "classes": [{
                "id": bro("Data_Storage"),
                "pref_label": "Data Storage",
                "semantic_types": ["T170"]
            }]
        }]
    })
    .to_string()
}

/// BRO-like corpus: a subclass chain, overlapping terms, a mapping target
/// ontology and a semantic-type tree.
///
/// Hierarchy: Data_Storage -> Information_Resource -> Resource -> owl:Thing
pub fn bro_corpus() -> String {
    json!({
        "ontologies": [
            {
                "id": BRO,
                "submission_id": 3,
                "classes": [
                    {
                        "id": bro("Data_Storage"),
                        "pref_label": "Data Storage",
                        "synonyms": ["data storage", "Storage Facility", "DS"],
                        "semantic_types": ["T170"],
                        "parents": [bro("Information_Resource")]
                    },
                    {
                        "id": bro("Information_Resource"),
                        "pref_label": "Information Resource",
                        "semantic_types": ["T170"],
                        "parents": [bro("Resource"), "_:b0"]
                    },
                    {
                        "id": bro("Resource"),
                        "pref_label": "Resource",
                        "semantic_types": ["T071"],
                        "parents": [OWL_THING]
                    },
                    {
                        "id": bro("Data"),
                        "pref_label": "Data",
                        "semantic_types": ["T170"],
                        "parents": [bro("Information_Resource")]
                    },
                    {
                        "id": bro("Storage"),
                        "pref_label": "Storage",
                        "semantic_types": ["T169"]
                    },
                    {
                        "id": bro("Deletion"),
                        "pref_label": "Deletion",
                        "synonyms": ["Gene Deletion"],
                        "semantic_types": ["T045"]
                    },
                    {
                        "id": bro("Unlabeled"),
                        "synonyms": ["Orphan Term"]
                    }
                ]
            },
            {
                "id": STORE,
                "submission_id": 1,
                "classes": [{
                    "id": "http://purl.example.org/store#Repository",
                    "pref_label": "Repository"
                }]
            },
            {
                "id": LEXI,
                "submission_id": 1,
                "classes": [{
                    "id": "http://purl.example.org/lexi#DataStorage",
                    "pref_label": "Datastore"
                }]
            }
        ],
        "mappings": [
            {
                "source": "CUI",
                "terms": [
                    { "id": bro("Data_Storage"), "ontology": BRO },
                    { "id": "http://purl.example.org/store#Repository", "ontology": STORE }
                ]
            },
            {
                "source": "LOOM",
                "terms": [
                    { "id": bro("Data_Storage"), "ontology": BRO },
                    { "id": "http://purl.example.org/lexi#DataStorage", "ontology": LEXI }
                ]
            }
        ],
        "semantic_types": [
            { "parent": "T071", "child": "T170" },
            { "parent": "T071", "child": "T169" }
        ]
    })
    .to_string()
}

/// Two ontologies that match the same text, one through a preferred label
/// and one through a synonym. NOSUB has no submission and is never cached;
/// ZEROONT is cached but reports zero classes in its metrics.
pub fn recommender_corpus() -> String {
    json!({
        "ontologies": [
            {
                "id": SYNONT,
                "submission_id": 1,
                "classes": [
                    { "id": "http://syn.example.org#Cardiac_Organ", "pref_label": "Cardiac Organ", "synonyms": ["Heart"] },
                    { "id": "http://syn.example.org#Lung", "pref_label": "Pulmo", "synonyms": ["Lung"] }
                ]
            },
            {
                "id": PREFONT,
                "submission_id": 1,
                "metrics": { "classes": 2 },
                "classes": [
                    { "id": "http://pref.example.org#Heart", "pref_label": "Heart" },
                    { "id": "http://pref.example.org#Lung", "pref_label": "Lung" }
                ]
            },
            {
                "id": ZEROONT,
                "submission_id": 4,
                "metrics": { "classes": 0 },
                "classes": [
                    { "id": "http://zero.example.org#Heart", "pref_label": "Heart" }
                ]
            },
            {
                "id": NOSUB,
                "classes": [
                    { "id": "http://nosub.example.org#Heart", "pref_label": "Heart" }
                ]
            }
        ]
    })
    .to_string()
}

/// Write `content` to a named temp file with the given extension.
pub fn temp_file(content: &str, extension: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

/// Fresh path inside a temp dir; keep the dir alive for the test.
pub fn temp_path(name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    (dir, path)
}

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("ontoscan=debug"))
        .with_test_writer()
        .try_init();
}
