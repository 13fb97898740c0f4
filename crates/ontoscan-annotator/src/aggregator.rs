//! Joins filtered spans with term cache records into annotations.
//!
//! Pure: given the same spans, records and options the output, including
//! its order, is identical. Annotations come out in the order their
//! `(ontology, class)` was first matched; within one span, classes are
//! visited in class-id order.

use std::collections::HashMap;

use ontoscan_common::{ontology_allowed, AnnotationKey, MatchType};

use crate::annotation::Annotation;
use crate::span::RawSpan;
use crate::term_cache::TermRecord;

pub struct AggregateFilter<'a> {
    pub ontologies: &'a [String],
    /// Already widened to descendants when requested.
    pub semantic_types: &'a [String],
    pub with_synonyms: bool,
    pub longest_only: bool,
}

pub fn aggregate(
    spans: &[RawSpan],
    records: &HashMap<u32, TermRecord>,
    filter: &AggregateFilter<'_>,
) -> Vec<Annotation> {
    let mut annotations: Vec<Annotation> = Vec::new();
    let mut index: HashMap<AnnotationKey, usize> = HashMap::new();

    for span in spans {
        let Some(record) = records.get(&span.fingerprint) else {
            continue;
        };

        for (class_id, entry) in record {
            if !entry.has_semantic_type(filter.semantic_types) {
                continue;
            }

            for m in &entry.matches {
                if m.match_type == MatchType::Synonym && !filter.with_synonyms {
                    continue;
                }
                if !ontology_allowed(filter.ontologies, &m.ontology) {
                    continue;
                }

                let key = AnnotationKey::new(m.ontology.clone(), class_id.clone());
                let slot = *index.entry(key).or_insert_with(|| {
                    annotations.push(Annotation::new(class_id.clone(), m.ontology.clone()));
                    annotations.len() - 1
                });
                annotations[slot].add_annotation(span.offset_from, span.offset_to, m.match_type, span.text.clone());
            }
        }
    }

    if filter.longest_only {
        keep_longest(&mut annotations);
    }
    annotations
}

/// At each starting offset keep only occurrences reaching the furthest
/// `to`, across all annotations. Annotations left empty are dropped.
pub fn keep_longest(annotations: &mut Vec<Annotation>) {
    let mut furthest: HashMap<usize, usize> = HashMap::new();
    for occ in annotations.iter().flat_map(|a| a.annotations.iter()) {
        let to = furthest.entry(occ.from).or_insert(occ.to);
        if occ.to > *to {
            *to = occ.to;
        }
    }

    for ann in annotations.iter_mut() {
        ann.annotations.retain(|occ| furthest.get(&occ.from) == Some(&occ.to));
    }
    annotations.retain(|a| !a.annotations.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term_cache::TermEntry;
    use ontoscan_common::OntologyId;

    const BRO: &str = "http://data.bioontology.org/ontologies/BRO";
    const GO: &str = "http://data.bioontology.org/ontologies/GO";

    fn entry(matches: &[(MatchType, &str)], types: &[&str]) -> TermEntry {
        let mut e = TermEntry::default();
        for (mt, ont) in matches {
            e.add_match(*mt, &OntologyId::new(*ont));
        }
        e.add_semantic_types(&types.iter().map(|t| t.to_string()).collect::<Vec<_>>());
        e
    }

    fn span(fp: u32, from: usize, text: &str) -> RawSpan {
        RawSpan {
            offset_from: from,
            offset_to: from + text.chars().count() - 1,
            fingerprint: fp,
            text: text.to_string(),
        }
    }

    fn filter<'a>(ontologies: &'a [String], types: &'a [String]) -> AggregateFilter<'a> {
        AggregateFilter { ontologies, semantic_types: types, with_synonyms: true, longest_only: false }
    }

    /// "Data", "Data Storage" and "Storage" at their natural offsets.
    fn overlapping() -> (Vec<RawSpan>, HashMap<u32, TermRecord>) {
        let spans = vec![span(1, 1, "Data"), span(2, 1, "Data Storage"), span(3, 6, "Storage")];
        let mut records = HashMap::new();
        for (fp, class) in [(1, "http://bro#Data"), (2, "http://bro#Data_Storage"), (3, "http://bro#Storage")] {
            let mut rec = TermRecord::new();
            rec.insert(class.to_string(), entry(&[(MatchType::Preferred, BRO)], &[]));
            records.insert(fp, rec);
        }
        (spans, records)
    }

    #[test]
    fn test_groups_by_ontology_and_class() {
        let mut rec = TermRecord::new();
        rec.insert("http://x#Heart".into(), entry(&[(MatchType::Preferred, BRO), (MatchType::Synonym, GO)], &[]));
        let records = HashMap::from([(9, rec)]);
        let spans = vec![span(9, 1, "Heart"), span(9, 20, "heart")];

        let anns = aggregate(&spans, &records, &filter(&[], &[]));
        assert_eq!(anns.len(), 2);
        assert_eq!(anns[0].ontology().as_str(), BRO);
        assert_eq!(anns[0].annotations.len(), 2);
        assert_eq!(anns[1].annotations[1].from, 20);
    }

    #[test]
    fn test_ontology_allow_list_and_synonyms() {
        let mut rec = TermRecord::new();
        rec.insert("http://x#Heart".into(), entry(&[(MatchType::Preferred, BRO), (MatchType::Synonym, GO)], &[]));
        let records = HashMap::from([(9, rec)]);
        let spans = vec![span(9, 1, "Heart")];

        let only_go = vec!["GO".to_string()];
        assert_eq!(aggregate(&spans, &records, &filter(&only_go, &[])).len(), 1);

        let missing = vec!["DOES-NOT-EXIST".to_string()];
        assert!(aggregate(&spans, &records, &filter(&missing, &[])).is_empty());

        let mut no_syn = filter(&[], &[]);
        no_syn.with_synonyms = false;
        let anns = aggregate(&spans, &records, &no_syn);
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].ontology().as_str(), BRO);
    }

    #[test]
    fn test_semantic_type_gate() {
        let mut rec = TermRecord::new();
        rec.insert("http://x#A".into(), entry(&[(MatchType::Preferred, BRO)], &["T047"]));
        rec.insert("http://x#B".into(), entry(&[(MatchType::Preferred, BRO)], &["T170"]));
        let records = HashMap::from([(5, rec)]);

        let wanted = vec!["T047".to_string()];
        let anns = aggregate(&[span(5, 1, "term")], &records, &filter(&[], &wanted));
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].class_id(), "http://x#A");
    }

    #[test]
    fn test_longest_only_collapses() {
        let (spans, records) = overlapping();
        assert_eq!(aggregate(&spans, &records, &filter(&[], &[])).len(), 3);

        let mut longest = filter(&[], &[]);
        longest.longest_only = true;
        let anns = aggregate(&spans, &records, &longest);
        let classes: Vec<&str> = anns.iter().map(|a| a.class_id()).collect();
        assert_eq!(classes, vec!["http://bro#Data_Storage", "http://bro#Storage"]);
    }

    #[test]
    fn test_unknown_fingerprint_ignored() {
        let (_, records) = overlapping();
        assert!(aggregate(&[span(404, 1, "nothing")], &records, &filter(&[], &[])).is_empty());
    }
}
