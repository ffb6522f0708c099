//! The matching task: dataframes, candidate cache, review operations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use colmatch_common::{column_names, column_strings, column_unique_values, frame_content_hash};
use colmatch_map::{
    CandidateQuadrants, EmbeddingClusterer, EmbeddingProvider, HashingEmbedder, MatchInput,
    MatcherRegistry, RegisteredMatcher, WeightUpdater, dtype_column_type, kmeans_clusters, knn_clusters,
};
use colmatch_model::{
    CacheEntry, Candidate, CandidateStatus, ColumnUniqueValues, FrameSide, FrontendPayload,
    MatchError, MatcherWeight, Operation, OperationRecord, Result, SourceCluster, TargetSchema,
    UniqueValuesPayload, UserOperation, ValueBin, ValueMatchEntry, ValueMatchTarget,
    ValueMatchesPayload,
};
use polars::prelude::*;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::cache::CandidateCache;
use crate::config::MatchingConfig;
use crate::explanation::{ExplanationStore, StoredExplanation};
use crate::history::UserOperationHistory;
use crate::values::{match_values, value_bins};

pub const DEFAULT_SESSION: &str = "default";

pub(crate) fn frame_error(error: PolarsError) -> MatchError {
    MatchError::Frame(error.to_string())
}

/// Output of one regeneration pass.
struct Generated {
    candidates: Vec<Candidate>,
    source_clusters: BTreeMap<String, Vec<String>>,
    target_clusters: Vec<Vec<String>>,
    value_matches: BTreeMap<String, ValueMatchEntry>,
    attempted: usize,
    failures: Vec<String>,
}

/// Matching state of one session.
///
/// Mutating entry points take `&mut self`; share a task across threads by
/// wrapping it in a mutex, as [`crate::SessionRegistry`] does.
#[derive(Debug)]
pub struct MatchingTask {
    config: MatchingConfig,
    registry: MatcherRegistry,
    clusterer: Arc<EmbeddingClusterer>,
    source_df: Option<DataFrame>,
    target_df: Option<DataFrame>,
    target_schema: Option<TargetSchema>,
    cached: CacheEntry,
    store: CandidateCache,
    explanations: Option<ExplanationStore>,
    history: UserOperationHistory,
    weight_updater: Option<WeightUpdater>,
    last_failures: Vec<String>,
}

impl MatchingTask {
    /// Task for the default session with the hashing embedder.
    pub fn new(config: MatchingConfig) -> Result<Self> {
        Self::with_provider(config, DEFAULT_SESSION, Arc::new(HashingEmbedder::default()))
    }

    /// Task for a named session with an injected embedding provider.
    pub fn with_provider(
        config: MatchingConfig,
        session: &str,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let clusterer = Arc::new(EmbeddingClusterer::new(provider, config.embedding.clone()));
        let groundtruth = match config.groundtruth_path.as_deref() {
            Some(path) => {
                let pairs = colmatch_ingest::load_groundtruth(path)
                    .map_err(|e| MatchError::InvalidConfig(format!("{e:#}")))?;
                Some(
                    pairs
                        .into_iter()
                        .map(|p| (p.source_column, p.target_column))
                        .collect(),
                )
            }
            None => None,
        };
        let registry = MatcherRegistry::from_names(&config.matchers, clusterer.clone(), groundtruth)?;
        let store = CandidateCache::new(config.cache_dir.as_deref(), session)?;
        let explanations = config
            .cache_dir
            .as_deref()
            .map(ExplanationStore::new)
            .transpose()?;
        info!(
            session,
            matchers = ?registry.names(),
            persisted = store.is_enabled(),
            "matching task created"
        );
        Ok(Self {
            config,
            registry,
            clusterer,
            source_df: None,
            target_df: None,
            target_schema: None,
            cached: CacheEntry::default(),
            store,
            explanations,
            history: UserOperationHistory::new(),
            weight_updater: None,
            last_failures: Vec::new(),
        })
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn registry(&self) -> &MatcherRegistry {
        &self.registry
    }

    pub fn source_df(&self) -> Option<&DataFrame> {
        self.source_df.as_ref()
    }

    pub fn target_df(&self) -> Option<&DataFrame> {
        self.target_df.as_ref()
    }

    pub fn target_schema(&self) -> Option<&TargetSchema> {
        self.target_schema.as_ref()
    }

    /// Declared target types; they take part in the target hash.
    pub fn set_target_schema(&mut self, schema: Option<TargetSchema>) {
        self.target_schema = schema;
    }

    /// Replaces whichever dataframe is given and resets the value-match table.
    pub fn update_dataframe(&mut self, source: Option<DataFrame>, target: Option<DataFrame>) -> Result<()> {
        if let Some(source) = source {
            info!(rows = source.height(), columns = source.width(), "source dataframe updated");
            self.source_df = Some(source);
        }
        if let Some(target) = target {
            info!(rows = target.height(), columns = target.width(), "target dataframe updated");
            self.target_df = Some(target);
        }
        self.initialize_value_matches()
    }

    fn initialize_value_matches(&mut self) -> Result<()> {
        let mut value_matches = BTreeMap::new();
        if let Some(source) = self.source_df.as_ref() {
            for column in source.get_columns() {
                let values = column_unique_values(column, Some(self.config.source_unique_limit))
                    .map_err(frame_error)?;
                value_matches.insert(column.name().to_string(), ValueMatchEntry::new(values));
            }
        }
        self.cached.value_matches = value_matches;
        Ok(())
    }

    fn frames(&self) -> Result<(&DataFrame, &DataFrame)> {
        match (self.source_df.as_ref(), self.target_df.as_ref()) {
            (Some(source), Some(target)) => Ok((source, target)),
            _ => Err(MatchError::MissingDataFrames),
        }
    }

    /// Content hashes of the source and target dataframes.
    pub fn compute_hashes(&self) -> Result<(String, String)> {
        let (source, target) = self.frames()?;
        let schema_types: Vec<String> = self
            .target_schema
            .iter()
            .flat_map(|schema| schema.properties.iter())
            .map(|p| format!("{}:{}", p.name, p.column_type()))
            .collect();
        let source_hash = frame_content_hash(source, &[]).map_err(frame_error)?;
        let target_hash = frame_content_hash(target, &schema_types).map_err(frame_error)?;
        Ok((source_hash, target_hash))
    }

    /// Candidates for the current dataframes.
    ///
    /// A persisted entry with matching hashes wins; otherwise, when
    /// `use_cached` is set, a matching in-memory entry is reused; otherwise
    /// everything is regenerated. When every matcher invocation fails the
    /// easy matches are still kept and returned inside the error.
    pub fn get_candidates(&mut self, use_cached: bool) -> Result<Vec<Candidate>> {
        let (source_hash, target_hash) = self.compute_hashes()?;
        let span = info_span!("get_candidates", use_cached);
        let _guard = span.enter();

        let persisted = self
            .store
            .load()
            .filter(|entry| entry.is_valid_for(&source_hash, &target_hash));
        let mut outcome = Ok(());
        if let Some(entry) = persisted {
            debug!("persisted candidate cache hit");
            self.cached = entry;
        } else if use_cached && self.cached.is_valid_for(&source_hash, &target_hash) {
            debug!("in-memory candidate cache hit");
        } else {
            outcome = self.regenerate(source_hash, target_hash, use_cached);
        }

        if self.config.update_matcher_weights {
            self.weight_updater = Some(WeightUpdater::new(
                &mut self.registry,
                &self.cached.candidates,
                self.config.alpha,
                self.config.beta,
            ));
        }
        outcome?;
        Ok(self.cached.candidates.clone())
    }

    fn regenerate(&mut self, source_hash: String, target_hash: String, persist: bool) -> Result<()> {
        let start = Instant::now();
        let generated = self.generate()?;
        let total_failure = generated.attempted > 0 && generated.failures.len() == generated.attempted;
        info!(
            candidates = generated.candidates.len(),
            attempted = generated.attempted,
            failed = generated.failures.len(),
            duration_ms = start.elapsed().as_millis(),
            "candidates generated"
        );

        let (source_hash, target_hash) = if total_failure {
            // Leave the entry unmatched so the next call retries.
            (None, None)
        } else {
            (Some(source_hash), Some(target_hash))
        };
        self.cached = CacheEntry {
            source_hash,
            target_hash,
            candidates: generated.candidates,
            source_clusters: generated.source_clusters,
            target_clusters: generated.target_clusters,
            value_matches: generated.value_matches,
        };
        self.last_failures = generated.failures;

        if total_failure {
            return Err(MatchError::AllMatchersFailed {
                failures: self.last_failures.clone(),
                partial: self.cached.candidates.clone(),
            });
        }
        if persist {
            self.store.store(&self.cached)?;
        }
        Ok(())
    }

    fn generate(&self) -> Result<Generated> {
        let (source, target) = self.frames()?;
        let (source_clusters, target_clusters) = self.build_clusters(source, target);

        let input = MatchInput::new(source, target).with_schema(self.target_schema.as_ref());
        let quadrants =
            CandidateQuadrants::build(&input, self.config.quadrant_top_k, self.config.thresholds())
                .map_err(|e| MatchError::Frame(format!("{e:#}")))?;

        let mut generated = Generated {
            candidates: Vec::new(),
            source_clusters,
            target_clusters,
            value_matches: self.cached.value_matches.clone(),
            attempted: 0,
            failures: Vec::new(),
        };

        let mut numeric_columns: Vec<&str> = Vec::new();
        for source_column in quadrants.source_columns() {
            generated
                .candidates
                .extend(quadrants.easy_candidates(source_column));

            let is_numeric = quadrants
                .source_facts(source_column)
                .is_some_and(|facts| facts.column_type.is_numeric());
            if is_numeric {
                numeric_columns.push(source_column.as_str());
                continue;
            }
            if quadrants.get_potential_matches(source_column).is_empty() {
                continue;
            }
            let source_part = source.select([source_column.as_str()]).map_err(frame_error)?;
            let target_part = quadrants
                .get_potential_target_df(source_column, target)
                .map_err(frame_error)?;
            self.run_matchers(&source_part, &target_part, source_column, &mut generated);
        }

        if !numeric_columns.is_empty() && !quadrants.potential_numeric_targets().is_empty() {
            let source_part = source.select(numeric_columns.iter().copied()).map_err(frame_error)?;
            let target_part = quadrants
                .get_potential_numeric_target_df(target)
                .map_err(frame_error)?;
            let label = numeric_columns.join(",");
            self.run_matchers(&source_part, &target_part, &label, &mut generated);
        }

        self.run_unconditional(&input, &mut generated);

        let pairs: Vec<(String, String)> = generated
            .candidates
            .iter()
            .map(|c| (c.source_column.clone(), c.target_column.clone()))
            .collect();
        for (source_column, target_column) in pairs {
            self.fill_value_matches(&mut generated.value_matches, &source_column, &target_column)?;
        }
        Ok(generated)
    }

    fn build_clusters(
        &self,
        source: &DataFrame,
        target: &DataFrame,
    ) -> (BTreeMap<String, Vec<String>>, Vec<Vec<String>>) {
        match self.clusterer.get_embeddings(source, target) {
            Ok((source_vectors, target_vectors)) => (
                knn_clusters(&column_names(source), &source_vectors),
                kmeans_clusters(&column_names(target), &target_vectors),
            ),
            Err(error) => {
                warn!(error = %format!("{error:#}"), "column embedding failed, clusters left empty");
                (BTreeMap::new(), Vec::new())
            }
        }
    }

    fn run_matchers(&self, source: &DataFrame, target: &DataFrame, label: &str, generated: &mut Generated) {
        let input = MatchInput::new(source, target).with_schema(self.target_schema.as_ref());
        for entry in self.registry.iter().filter(|entry| !entry.is_unconditional()) {
            self.run_entry(entry, &input, label, generated);
        }
    }

    /// Runs ground truth once over the full frames, whatever the quadrants
    /// kept for each source column.
    fn run_unconditional(&self, input: &MatchInput<'_>, generated: &mut Generated) {
        for entry in self.registry.iter().filter(|entry| entry.is_unconditional()) {
            self.run_entry(entry, input, "*", generated);
        }
    }

    fn run_entry(&self, entry: &RegisteredMatcher, input: &MatchInput<'_>, label: &str, generated: &mut Generated) {
        let span = info_span!("matcher", matcher = %entry.name, source_column = %label);
        let _guard = span.enter();
        generated.attempted += 1;
        match entry.top_matches(input, self.config.top_k) {
            Ok(candidates) => {
                debug!(candidates = candidates.len(), "matcher finished");
                generated.candidates.extend(candidates);
            }
            Err(error) => {
                let message = format!("{} on {label}: {error:#}", entry.name);
                warn!(error = %format!("{error:#}"), "matcher failed");
                generated.failures.push(message);
            }
        }
    }

    fn fill_value_matches(
        &self,
        value_matches: &mut BTreeMap<String, ValueMatchEntry>,
        source_column: &str,
        target_column: &str,
    ) -> Result<()> {
        let (source, target) = self.frames()?;
        let Ok(source_col) = source.column(source_column) else {
            return Ok(());
        };
        if dtype_column_type(source_col.dtype()).is_numeric() || target.column(target_column).is_err() {
            return Ok(());
        }
        if !value_matches.contains_key(source_column) {
            let values = column_unique_values(source_col, Some(self.config.source_unique_limit))
                .map_err(frame_error)?;
            value_matches.insert(source_column.to_string(), ValueMatchEntry::new(values));
        }
        let Some(entry) = value_matches.get_mut(source_column) else {
            return Ok(());
        };
        if entry.has_target(target_column) {
            return Ok(());
        }
        let target_values = self.get_target_unique_values(target_column, self.config.target_unique_limit)?;
        let row = match_values(&entry.source_unique_values, &target_values);
        entry.targets.insert(target_column.to_string(), row);
        Ok(())
    }

    /// Candidates currently held in memory.
    pub fn get_cached_candidates(&self) -> &[Candidate] {
        &self.cached.candidates
    }

    pub fn cache_entry(&self) -> &CacheEntry {
        &self.cached
    }

    /// Failure messages of the last regeneration.
    pub fn last_failures(&self) -> &[String] {
        &self.last_failures
    }

    pub fn get_cached_source_clusters(&self) -> &BTreeMap<String, Vec<String>> {
        &self.cached.source_clusters
    }

    pub fn get_cached_target_clusters(&self) -> &[Vec<String>] {
        &self.cached.target_clusters
    }

    pub fn get_value_matches(&self) -> &BTreeMap<String, ValueMatchEntry> {
        &self.cached.value_matches
    }

    pub fn get_matchers(&self) -> Vec<MatcherWeight> {
        self.registry.matcher_weights()
    }

    /// Cached records an operation on `candidate` touches, as they are now.
    fn snapshot_touched(&self, operation: Operation, candidate: &Candidate) -> Vec<Candidate> {
        self.cached
            .candidates
            .iter()
            .filter(|c| match operation {
                Operation::Accept | Operation::Reject => {
                    c.is_pair(&candidate.source_column, &candidate.target_column)
                }
                Operation::Discard => c.source_column == candidate.source_column,
            })
            .cloned()
            .collect()
    }

    fn update_weights(&mut self, operation: Operation, candidate: &Candidate) -> Option<BTreeMap<String, f64>> {
        if !self.config.update_matcher_weights {
            return None;
        }
        let previous = self.registry.weights();
        if let Some(updater) = self.weight_updater.as_ref() {
            updater.update_weights(
                &mut self.registry,
                operation,
                &candidate.source_column,
                &candidate.target_column,
            );
        }
        Some(previous)
    }

    /// Moves cached records away from idle. Accept and reject touch the
    /// pair's idle records; discard touches the whole source column.
    fn apply_status(&mut self, operation: Operation, candidate: &Candidate) {
        for cached in &mut self.cached.candidates {
            match operation {
                Operation::Accept | Operation::Reject => {
                    if cached.is_pair(&candidate.source_column, &candidate.target_column)
                        && cached.status.is_idle()
                    {
                        cached.status = if operation == Operation::Accept {
                            CandidateStatus::Accepted
                        } else {
                            CandidateStatus::Rejected
                        };
                    }
                }
                Operation::Discard => {
                    if cached.source_column == candidate.source_column {
                        cached.status = CandidateStatus::Discarded;
                    }
                }
            }
        }
    }

    /// Applies a review operation and records it in the history.
    ///
    /// The touched records are snapshotted before they change so the
    /// operation can be undone exactly; `references` are kept alongside and
    /// restored on top of that snapshot.
    pub fn apply_operation(&mut self, operation: Operation, candidate: &Candidate, references: Vec<Candidate>) {
        info!(
            operation = %operation,
            source_column = %candidate.source_column,
            target_column = %candidate.target_column,
            references = references.len(),
            "applying operation"
        );
        let touched = self.snapshot_touched(operation, candidate);
        let mut record = UserOperation::new(operation, candidate.clone(), references).with_touched(touched);
        if let Some(previous) = self.update_weights(operation, candidate) {
            record = record.with_previous_weights(previous);
        }
        self.history.add_operation(record);
        self.apply_status(operation, candidate);
        self.persist_statuses();
    }

    /// Writes reviewed statuses back to the persisted cache so a later
    /// cache hit does not revert them. Entries that failed to generate are
    /// never written.
    fn persist_statuses(&self) {
        if !self.store.is_enabled() || self.cached.source_hash.is_none() {
            return;
        }
        if let Err(error) = self.store.store(&self.cached) {
            warn!(%error, "failed to persist reviewed statuses");
        }
    }

    /// String-named variant of [`Self::apply_operation`].
    pub fn apply_operation_named(&mut self, operation: &str, candidate: &Candidate, references: Vec<Candidate>) -> Result<()> {
        let operation: Operation = operation.parse()?;
        self.apply_operation(operation, candidate, references);
        Ok(())
    }

    /// Reverts the status changes of an operation without touching history.
    ///
    /// Accept and reject restore `candidate.status` on every record of the
    /// pair; discard returns the column's discarded records to idle, or to
    /// accepted for easy matches. `references` are then restored record by
    /// record.
    pub fn undo_operation(&mut self, operation: Operation, candidate: &Candidate, references: &[Candidate]) {
        self.restore(operation, candidate, &[], references);
    }

    fn restore(&mut self, operation: Operation, candidate: &Candidate, touched: &[Candidate], references: &[Candidate]) {
        info!(
            operation = %operation,
            source_column = %candidate.source_column,
            target_column = %candidate.target_column,
            "undoing operation"
        );
        if touched.is_empty() {
            self.restore_defaults(operation, candidate);
        } else {
            self.restore_records(touched);
        }
        self.restore_records(references);
        self.persist_statuses();
    }

    fn restore_records(&mut self, records: &[Candidate]) {
        for record in records {
            if let Some(cached) = self
                .cached
                .candidates
                .iter_mut()
                .find(|c| c.same_record(record))
            {
                cached.status = record.status;
            }
        }
    }

    fn restore_defaults(&mut self, operation: Operation, candidate: &Candidate) {
        for cached in &mut self.cached.candidates {
            match operation {
                Operation::Accept | Operation::Reject => {
                    if cached.is_pair(&candidate.source_column, &candidate.target_column) {
                        cached.status = candidate.status;
                    }
                }
                Operation::Discard => {
                    if cached.source_column == candidate.source_column
                        && cached.status == CandidateStatus::Discarded
                    {
                        cached.status = if cached.is_easy() {
                            CandidateStatus::Accepted
                        } else {
                            CandidateStatus::Idle
                        };
                    }
                }
            }
        }
    }

    /// Reverts the latest operation, restoring statuses and matcher weights.
    /// Returns `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<OperationRecord> {
        let operation = self.history.undo_last_operation()?;
        self.restore(
            operation.operation,
            &operation.candidate,
            &operation.touched,
            &operation.references,
        );
        if let Some(previous) = operation.previous_weights.as_ref() {
            self.registry.set_weights(previous);
        }
        Some(operation.to_record())
    }

    /// Re-applies the latest undone operation. Returns `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Option<OperationRecord> {
        let operation = self.history.redo_last_operation()?;
        info!(operation = %operation.operation, "redoing operation");
        let touched = self.snapshot_touched(operation.operation, &operation.candidate);
        let previous = self.update_weights(operation.operation, &operation.candidate);
        self.apply_status(operation.operation, &operation.candidate);
        let record = operation.to_record();
        let mut operation = operation.with_touched(touched);
        if let Some(previous) = previous {
            operation = operation.with_previous_weights(previous);
        }
        self.history.replace_last(operation);
        self.persist_statuses();
        Some(record)
    }

    pub fn history(&self) -> &UserOperationHistory {
        &self.history
    }

    pub fn export_history(&self) -> Vec<OperationRecord> {
        self.history.export_history()
    }

    fn column<'a>(df: Option<&'a DataFrame>, side: FrameSide, name: &str) -> Result<&'a Column> {
        df.and_then(|df| df.column(name).ok())
            .ok_or_else(|| MatchError::column_not_found(side, name))
    }

    pub fn get_source_unique_values(&self, column: &str, n: usize) -> Result<Vec<String>> {
        let column = Self::column(self.source_df.as_ref(), FrameSide::Source, column)?;
        column_unique_values(column, Some(n)).map_err(frame_error)
    }

    pub fn get_target_unique_values(&self, column: &str, n: usize) -> Result<Vec<String>> {
        let column = Self::column(self.target_df.as_ref(), FrameSide::Target, column)?;
        column_unique_values(column, Some(n)).map_err(frame_error)
    }

    pub fn get_source_value_bins(&self, column: &str) -> Result<Vec<ValueBin>> {
        let column = Self::column(self.source_df.as_ref(), FrameSide::Source, column)?;
        value_bins(column).map_err(frame_error)
    }

    pub fn get_target_value_bins(&self, column: &str) -> Result<Vec<ValueBin>> {
        let column = Self::column(self.target_df.as_ref(), FrameSide::Target, column)?;
        value_bins(column).map_err(frame_error)
    }

    pub fn to_frontend_json(&self) -> FrontendPayload {
        FrontendPayload {
            candidates: self.cached.candidates.clone(),
            source_clusters: self
                .cached
                .source_clusters
                .iter()
                .map(|(source_column, cluster)| SourceCluster {
                    source_column: source_column.clone(),
                    cluster: cluster.clone(),
                })
                .collect(),
            matchers: self.get_matchers(),
        }
    }

    pub fn unique_values_to_frontend_json(&self) -> Result<UniqueValuesPayload> {
        let (source, target) = self.frames()?;
        let source_unique_values = column_names(source)
            .into_iter()
            .map(|name| {
                let bins = self.get_source_value_bins(&name)?;
                Ok(ColumnUniqueValues::source(name, bins))
            })
            .collect::<Result<Vec<_>>>()?;
        let target_unique_values = column_names(target)
            .into_iter()
            .map(|name| {
                let bins = self.get_target_value_bins(&name)?;
                Ok(ColumnUniqueValues::target(name, bins))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(UniqueValuesPayload {
            source_unique_values,
            target_unique_values,
        })
    }

    pub fn value_matches_to_frontend_json(&self) -> Vec<ValueMatchesPayload> {
        self.cached
            .value_matches
            .iter()
            .map(|(source_column, entry)| ValueMatchesPayload {
                source_column: source_column.clone(),
                source_values: entry.source_unique_values.clone(),
                targets: entry
                    .targets
                    .iter()
                    .map(|(target_column, values)| ValueMatchTarget {
                        target_column: target_column.clone(),
                        target_values: values.clone(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Accepted (source, target) pairs in cache order, each pair once.
    pub fn get_accepted_mappings(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for candidate in self.cached.accepted() {
            let pair = (candidate.source_column.clone(), candidate.target_column.clone());
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        pairs
    }

    /// Source data laid out under the accepted target column names.
    ///
    /// When two sources map to one target, the later mapping wins.
    pub fn get_accepted_candidates(&self) -> Result<DataFrame> {
        let source = self.source_df.as_ref().ok_or(MatchError::MissingDataFrames)?;
        let mut columns: Vec<Column> = Vec::new();
        for (source_column, target_column) in self.get_accepted_mappings() {
            let data = source
                .column(&source_column)
                .map_err(frame_error)?
                .clone()
                .with_name(target_column.as_str().into());
            match columns.iter().position(|c| c.name().as_str() == target_column) {
                Some(idx) => columns[idx] = data,
                None => columns.push(data),
            }
        }
        DataFrame::new(columns).map_err(frame_error)
    }

    /// Replaces `from` with `to` in a string source column and in its
    /// value-match source values.
    pub fn set_source_value(&mut self, column: &str, from: &str, to: &str) -> Result<()> {
        info!(column, "rewriting source value");
        let source = self.source_df.as_mut().ok_or(MatchError::MissingDataFrames)?;
        let existing = source
            .column(column)
            .map_err(|_| MatchError::column_not_found(FrameSide::Source, column))?;
        if existing.dtype() != &DataType::String {
            return Err(MatchError::Frame(format!(
                "column {column} is not a string column"
            )));
        }
        let rewritten: Vec<Option<String>> = column_strings(existing)
            .map_err(frame_error)?
            .into_iter()
            .map(|value| value.map(|v| if v == from { to.to_string() } else { v }))
            .collect();
        source
            .with_column(Series::new(column.into(), rewritten).into_column())
            .map_err(frame_error)?;

        if let Some(entry) = self.cached.value_matches.get_mut(column) {
            for value in &mut entry.source_unique_values {
                if value == from {
                    *value = to.to_string();
                }
            }
        }
        Ok(())
    }

    fn explanation_store(&self) -> Result<&ExplanationStore> {
        self.explanations
            .as_ref()
            .ok_or_else(|| MatchError::InvalidConfig("explanations require cache_dir".to_string()))
    }

    pub fn save_explanation(&self, candidate: &Candidate, explanation: Value) -> Result<StoredExplanation> {
        self.explanation_store()?
            .save(&candidate.source_column, &candidate.target_column, explanation)
    }

    pub fn get_explanation(&self, candidate: &Candidate) -> Result<Option<StoredExplanation>> {
        Ok(self
            .explanation_store()?
            .load(&candidate.source_column, &candidate.target_column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_frames() -> MatchingTask {
        let mut task = MatchingTask::new(MatchingConfig::default()).unwrap();
        let source = DataFrame::new(vec![
            Series::new("Gender".into(), ["Female", "Male", "Female"]).into_column(),
            Series::new("Age".into(), [34i64, 51, 67]).into_column(),
        ])
        .unwrap();
        let target = DataFrame::new(vec![
            Series::new("gender".into(), ["female", "male", "male"]).into_column(),
            Series::new("age_at_diagnosis".into(), [30.0f64, 50.0, 70.0]).into_column(),
        ])
        .unwrap();
        task.update_dataframe(Some(source), Some(target)).unwrap();
        task
    }

    #[test]
    fn missing_frames_fail_fast() {
        let mut task = MatchingTask::new(MatchingConfig::default()).unwrap();
        assert!(matches!(
            task.get_candidates(true),
            Err(MatchError::MissingDataFrames)
        ));
    }

    #[test]
    fn value_matches_initialized_per_source_column() {
        let task = task_with_frames();
        let matches = task.get_value_matches();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches["Gender"].source_unique_values, ["Female", "Male"]);
        assert!(matches["Gender"].targets.is_empty());
    }

    #[test]
    fn unknown_columns_are_errors() {
        let task = task_with_frames();
        assert!(matches!(
            task.get_source_unique_values("nope", 20),
            Err(MatchError::ColumnNotFound { side: FrameSide::Source, .. })
        ));
        assert!(matches!(
            task.get_target_value_bins("nope"),
            Err(MatchError::ColumnNotFound { side: FrameSide::Target, .. })
        ));
    }

    #[test]
    fn schema_types_change_target_hash() {
        let mut task = task_with_frames();
        let (_, before) = task.compute_hashes().unwrap();
        task.set_target_schema(Some(
            colmatch_model::TargetSchema::new(vec![colmatch_model::TargetProperty {
                name: "gender".to_string(),
                property_type: "string".to_string(),
                enum_values: Vec::new(),
                description: None,
            }]),
        ));
        let (_, after) = task.compute_hashes().unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn set_source_value_rewrites_frame_and_value_matches() {
        let mut task = task_with_frames();
        task.set_source_value("Gender", "Female", "F").unwrap();
        assert_eq!(task.get_source_unique_values("Gender", 20).unwrap(), ["F", "Male"]);
        assert_eq!(task.get_value_matches()["Gender"].source_unique_values, ["F", "Male"]);
        assert!(task.set_source_value("Age", "34", "35").is_err());
    }

    #[test]
    fn explanations_need_a_cache_dir() {
        let task = task_with_frames();
        let candidate = Candidate::new("Gender", "gender", 1.0, "fuzzy_name");
        assert!(matches!(
            task.get_explanation(&candidate),
            Err(MatchError::InvalidConfig(_))
        ));
    }
}
