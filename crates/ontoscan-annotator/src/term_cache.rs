//! Term cache build, lookup, eviction and dictionary export.
//!
//! Layout per instance prefix:
//! - `{instance}dict`: hash, fingerprint -> normalized term
//! - `{instance}term:{fp}`: hash, class id -> JSON [`TermEntry`]
//! - `{instance}annotator:keys`: list of every term key written
//!
//! Builds only ever write into an instance that readers are not using;
//! [`TermCache::rebuild`] fills the alternate instance, exports the
//! dictionary and then flips the pointer.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use ahash::AHashSet;
use ontoscan_common::settings::CacheConfig;
use ontoscan_common::{MatchType, OntologyId, OntoscanError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{AnnotatorCacheStatus, OntologyCatalog, OntologyClass, Submission};
use crate::fingerprint::{fingerprint_normalized, normalize_term};
use crate::instance::{dict_key, index_key, term_key, CacheInstances};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermMatch {
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub ontology: OntologyId,
}

/// Cached record for one class under one term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermEntry {
    pub matches: Vec<TermMatch>,
    #[serde(default)]
    pub semantic_types: Vec<String>,
}

impl TermEntry {
    /// Returns false when the `(type, ontology)` pair is already present.
    pub fn add_match(&mut self, match_type: MatchType, ontology: &OntologyId) -> bool {
        if self
            .matches
            .iter()
            .any(|m| m.match_type == match_type && &m.ontology == ontology)
        {
            return false;
        }
        self.matches.push(TermMatch { match_type, ontology: ontology.clone() });
        true
    }

    pub fn add_semantic_types(&mut self, codes: &[String]) {
        for code in codes {
            if !self.semantic_types.contains(code) {
                self.semantic_types.push(code.clone());
            }
        }
    }

    /// True when no filter is given or the entry carries one of `wanted`.
    pub fn has_semantic_type(&self, wanted: &[String]) -> bool {
        wanted.is_empty() || self.semantic_types.iter().any(|t| wanted.contains(t))
    }
}

/// Class id -> entry, for one fingerprint.
pub type TermRecord = BTreeMap<String, TermEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    pub classes: usize,
    pub skipped_classes: usize,
    pub terms: usize,
    pub new_keys: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub populated: Vec<OntologyId>,
    pub failed: Vec<(OntologyId, String)>,
    pub skipped: Vec<OntologyId>,
    pub terms: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RebuildReport {
    pub previous: String,
    pub current: String,
    pub build: BuildReport,
    pub dictionary_entries: usize,
}

/// How to evict an instance's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eviction {
    Delete,
    Expire(u64),
}

pub struct TermCache {
    instances: CacheInstances,
    catalog: Arc<dyn OntologyCatalog>,
    page_size: usize,
    key_batch_size: usize,
    min_term_length: usize,
    expire_grace_secs: u64,
}

impl TermCache {
    pub fn new(instances: CacheInstances, catalog: Arc<dyn OntologyCatalog>, config: &CacheConfig) -> Self {
        Self {
            instances,
            catalog,
            page_size: config.page_size.max(1),
            key_batch_size: config.key_batch_size.max(1),
            min_term_length: config.min_term_length,
            expire_grace_secs: config.expire_grace_secs,
        }
    }

    pub fn instances(&self) -> &CacheInstances {
        &self.instances
    }

    // ── Build ───────────────────────────────────────────────────────────────

    /// Populate `instance` from the latest submission of every ontology (or
    /// only `only`). A failing ontology is marked with an error status and
    /// the batch moves on.
    ///
    /// The live instance is never written in place; build the alternate and
    /// switch, or use [`TermCache::seed_current_instance`] on an empty store.
    pub async fn create_term_cache(&self, instance: &str, only: &[OntologyId]) -> Result<BuildReport> {
        let current = self.instances.current().await?;
        if instance == current {
            return Err(OntoscanError::InvalidArgument(format!(
                "{instance} is the live cache instance; build {} and switch instead",
                self.instances.alternate().await?
            )));
        }
        self.build_instance(instance, only).await
    }

    /// Populate the live instance of a store that holds no entries for it
    /// yet, e.g. a fresh in-memory store at startup.
    pub async fn seed_current_instance(&self) -> Result<BuildReport> {
        let current = self.instances.current().await?;
        let store = self.instances.store();
        if store.exists(&dict_key(&current)).await? || store.llen(&index_key(&current)).await? > 0 {
            return Err(OntoscanError::InvalidArgument(format!(
                "live cache instance {current} already holds terms"
            )));
        }
        self.build_instance(&current, &[]).await
    }

    async fn build_instance(&self, instance: &str, only: &[OntologyId]) -> Result<BuildReport> {
        let ontologies = if only.is_empty() {
            self.catalog.ontologies().await?
        } else {
            only.to_vec()
        };

        info!("Building term cache {} for {} ontologies", instance, ontologies.len());
        let mut report = BuildReport::default();

        for ontology in ontologies {
            let submission = match self.catalog.latest_submission(&ontology).await {
                Ok(Some(submission)) => submission,
                Ok(None) => {
                    warn!(ontology = %ontology, "No submission, skipping term cache build");
                    report.skipped.push(ontology);
                    continue;
                }
                Err(e) => {
                    warn!(ontology = %ontology, error = %e, "Submission lookup failed, skipping");
                    report.failed.push((ontology, e.to_string()));
                    continue;
                }
            };

            match self.create_term_cache_for_submission(&submission, instance).await {
                Ok(sub) => {
                    info!(
                        "Term cache for {}: {} classes, {} terms, {} new keys",
                        submission, sub.classes, sub.terms, sub.new_keys
                    );
                    report.terms += sub.terms;
                    self.record_status(&submission, AnnotatorCacheStatus::Populated).await;
                    report.populated.push(ontology);
                }
                Err(e) => {
                    warn!("Term cache build failed for {}: {}", submission, e);
                    self.record_status(&submission, AnnotatorCacheStatus::Error(e.to_string()))
                        .await;
                    report.failed.push((ontology, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    async fn record_status(&self, submission: &Submission, status: AnnotatorCacheStatus) {
        if let Err(e) = self.catalog.set_cache_status(submission, status).await {
            warn!(submission = %submission, error = %e, "Could not record annotator cache status");
        }
    }

    /// Page through the submission's classes and write every accepted term.
    pub async fn create_term_cache_for_submission(
        &self,
        submission: &Submission,
        instance: &str,
    ) -> Result<SubmissionReport> {
        let mut report = SubmissionReport::default();
        let mut page = Some(1);

        while let Some(current) = page {
            let class_page = self.catalog.class_page(submission, current, self.page_size).await?;
            let mut new_keys: Vec<String> = Vec::new();

            for class in &class_page.classes {
                match self.write_class(instance, &submission.ontology, class, &mut new_keys).await {
                    Ok(0) => report.skipped_classes += 1,
                    Ok(terms) => {
                        report.classes += 1;
                        report.terms += terms;
                    }
                    Err(e) => {
                        warn!(class = %class.id, error = %e, "Skipping class in term cache build");
                        report.skipped_classes += 1;
                    }
                }
            }

            report.new_keys += new_keys.len();
            for chunk in new_keys.chunks(self.key_batch_size) {
                self.instances.store().rpush(&index_key(instance), chunk).await?;
            }

            debug!(page = current, classes = class_page.classes.len(), "Term cache page written");
            page = class_page.next_page;
        }

        Ok(report)
    }

    /// Returns the number of terms written for the class.
    async fn write_class(
        &self,
        instance: &str,
        ontology: &OntologyId,
        class: &OntologyClass,
        new_keys: &mut Vec<String>,
    ) -> Result<usize> {
        let store = self.instances.store();
        let mut written = 0;

        for (term, match_type) in self.class_terms(class) {
            let fp = fingerprint_normalized(&term);
            store.hset(&dict_key(instance), &fp.to_string(), &term).await?;

            let key = term_key(instance, fp);
            let mut entry = match store.hget(&key, &class.id).await? {
                Some(raw) => serde_json::from_str::<TermEntry>(&raw)?,
                None => {
                    if !store.exists(&key).await? && !new_keys.contains(&key) {
                        new_keys.push(key.clone());
                    }
                    TermEntry::default()
                }
            };
            entry.add_match(match_type, ontology);
            entry.add_semantic_types(&class.semantic_types);
            store.hset(&key, &class.id, &serde_json::to_string(&entry)?).await?;
            written += 1;
        }

        Ok(written)
    }

    /// Normalized `(term, match type)` pairs accepted for a class.
    ///
    /// Classes without a pref label yield nothing. Synonyms equal to the
    /// pref label (ignoring case) are dropped, as are terms of at most
    /// `min_term_length` characters.
    pub fn class_terms(&self, class: &OntologyClass) -> Vec<(String, MatchType)> {
        let Some(pref) = class.pref_label.as_deref().map(normalize_term) else {
            return Vec::new();
        };

        let mut terms: Vec<(String, MatchType)> = Vec::new();
        if pref.chars().count() > self.min_term_length {
            terms.push((pref.clone(), MatchType::Preferred));
        }
        for synonym in &class.synonyms {
            let synonym = normalize_term(synonym);
            if synonym == pref || synonym.chars().count() <= self.min_term_length {
                continue;
            }
            if !terms.iter().any(|(t, _)| t == &synonym) {
                terms.push((synonym, MatchType::Synonym));
            }
        }
        terms
    }

    // ── Lookup ──────────────────────────────────────────────────────────────

    /// Records for every fingerprint, fetched in one batched call.
    /// Unknown fingerprints map to an empty record.
    pub async fn lookup_many(&self, instance: &str, fingerprints: &[u32]) -> Result<HashMap<u32, TermRecord>> {
        let mut seen: AHashSet<u32> = AHashSet::with_capacity(fingerprints.len());
        let mut distinct: Vec<u32> = Vec::with_capacity(fingerprints.len());
        for fp in fingerprints {
            if seen.insert(*fp) {
                distinct.push(*fp);
            }
        }

        let keys: Vec<String> = distinct.iter().map(|fp| term_key(instance, *fp)).collect();
        let hashes = self.instances.store().hgetall_many(&keys).await?;

        let mut records = HashMap::with_capacity(distinct.len());
        for (fp, hash) in distinct.into_iter().zip(hashes) {
            let mut record = TermRecord::new();
            for (class_id, raw) in hash {
                match serde_json::from_str::<TermEntry>(&raw) {
                    Ok(entry) => {
                        record.insert(class_id, entry);
                    }
                    Err(e) => warn!(fingerprint = fp, class = %class_id, error = %e, "Unreadable term record"),
                }
            }
            records.insert(fp, record);
        }
        Ok(records)
    }

    // ── Eviction ────────────────────────────────────────────────────────────

    /// Remove an instance: hard delete when inactive, short expiry when it
    /// is still the live instance. Returns the number of indexed keys.
    pub async fn delete_instance(&self, instance: &str) -> Result<usize> {
        let current = self.instances.current().await?;
        let eviction = if instance == current {
            Eviction::Expire(self.expire_grace_secs)
        } else {
            Eviction::Delete
        };
        self.evict(instance, eviction).await
    }

    /// Let a retired instance expire after the grace period.
    pub async fn retire_instance(&self, instance: &str) -> Result<usize> {
        self.evict(instance, Eviction::Expire(self.expire_grace_secs)).await
    }

    async fn evict(&self, instance: &str, eviction: Eviction) -> Result<usize> {
        let store = self.instances.store();
        let index = index_key(instance);
        let total = store.llen(&index).await?;
        let batch = self.key_batch_size;

        let mut start = 0;
        while start < total {
            let stop = (start + batch - 1) as isize;
            let keys = store.lrange(&index, start as isize, stop).await?;
            if keys.is_empty() {
                break;
            }
            self.apply(&keys, eviction).await?;
            start += batch;
        }

        self.apply(&[dict_key(instance), index], eviction).await?;
        info!("Evicted cache instance {} ({} keys, {:?})", instance, total, eviction);
        Ok(total)
    }

    async fn apply(&self, keys: &[String], eviction: Eviction) -> Result<()> {
        match eviction {
            Eviction::Delete => self.instances.store().del(keys).await,
            Eviction::Expire(secs) => self.instances.store().expire(keys, secs).await,
        }
    }

    // ── Dictionary export ───────────────────────────────────────────────────

    /// Write `<fingerprint>\t<term>` lines sorted by fingerprint.
    /// Returns the number of entries written.
    pub async fn generate_dictionary_file(&self, instance: &str, path: &Path) -> Result<usize> {
        let dict = self.instances.store().hgetall(&dict_key(instance)).await?;

        let mut entries: Vec<(u32, String)> = Vec::with_capacity(dict.len());
        for (fp, term) in dict {
            match fp.parse::<u32>() {
                Ok(fp) => entries.push((fp, strip_control(&term))),
                Err(_) => warn!(field = %fp, "Non-numeric dictionary field"),
            }
        }
        entries.sort();

        let mut out = String::new();
        for (fp, term) in &entries {
            out.push_str(&fp.to_string());
            out.push('\t');
            out.push_str(term);
            out.push('\n');
        }

        tokio::fs::write(path, out).await.map_err(|e| {
            OntoscanError::Config(format!("cannot write dictionary {}: {e}", path.display()))
        })?;
        info!("Wrote {} dictionary entries to {}", entries.len(), path.display());
        Ok(entries.len())
    }

    // ── Blue/green rebuild ──────────────────────────────────────────────────

    /// Build the inactive instance, export its dictionary, make it live and
    /// let the previous instance expire.
    pub async fn rebuild(&self, dictionary_path: &Path) -> Result<RebuildReport> {
        let previous = self.instances.current().await?;
        let target = self.instances.alternate().await?;

        self.delete_instance(&target).await?;
        let build = self.create_term_cache(&target, &[]).await?;
        let dictionary_entries = self.generate_dictionary_file(&target, dictionary_path).await?;
        let current = self.instances.switch(Some(&target)).await?;
        self.retire_instance(&previous).await?;

        Ok(RebuildReport { previous, current, build, dictionary_entries })
    }
}

fn strip_control(term: &str) -> String {
    term.chars().filter(|c| !c.is_control()).collect()
}
