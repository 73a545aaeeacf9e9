//! Loads every rule tier and keeps the current [`RuleEngineState`].
//!
//! Each configured source is fetched in its own task. A source that fails
//! for any reason (I/O, HTTP, timeout, bad JSON, panic) is logged and
//! replaced by its tier's built-in defaults; the other sources are
//! unaffected. Reloads build a fresh state and swap it in whole.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use fairplay_core::compliance::rules::GOVERNING_BODY_NAME;
use fairplay_core::compliance::{defaults, normalize_document, RuleEngineState, RuleSet, RuleTier};
use tokio::task::JoinHandle;

use crate::config::{NamedSource, RulesConfig, SourceSpec};
use crate::error::SourceLoadError;
use crate::source::RuleSource;

/// Built-in rules for `tier`.
pub fn tier_defaults(tier: RuleTier) -> RuleSet {
    match tier {
        RuleTier::GoverningBody => defaults::governing_body_rules(),
        RuleTier::Conference => defaults::conference_rules(),
        RuleTier::Institution => defaults::institution_rules(),
    }
}

pub struct RuleRepository {
    source: Arc<dyn RuleSource>,
    state: ArcSwap<RuleEngineState>,
}

impl RuleRepository {
    /// A repository serving built-in governing-body rules until the first load.
    pub fn new(source: Arc<dyn RuleSource>) -> Self {
        Self {
            source,
            state: ArcSwap::from_pointee(RuleEngineState::with_defaults()),
        }
    }

    /// The state current at the time of the call. Later reloads do not
    /// affect a snapshot already handed out.
    pub fn snapshot(&self) -> Arc<RuleEngineState> {
        self.state.load_full()
    }

    /// Load one tier entry. Never fails: an absent or failing source
    /// yields the tier's defaults.
    pub async fn load(
        &self,
        tier: RuleTier,
        name: &str,
        spec: Option<&SourceSpec>,
        timeout: Duration,
    ) -> RuleSet {
        load_source(
            self.source.clone(),
            tier,
            name.to_string(),
            spec.cloned(),
            timeout,
        )
        .await
    }

    /// Build a complete state from `config` without installing it.
    pub async fn load_all(&self, config: &RulesConfig) -> RuleEngineState {
        let timeout = config.fetch_timeout();

        let mut jobs: Vec<(RuleTier, String, Option<SourceSpec>)> = vec![(
            RuleTier::GoverningBody,
            GOVERNING_BODY_NAME.to_string(),
            config.governing_body.clone(),
        )];
        jobs.extend(
            config
                .conferences
                .iter()
                .map(|c| (RuleTier::Conference, c.name.clone(), Some(c.source.clone()))),
        );
        jobs.extend(
            institution_sources(config)
                .await
                .into_iter()
                .map(|i| (RuleTier::Institution, i.name, Some(i.source))),
        );

        let handles: Vec<(RuleTier, String, JoinHandle<RuleSet>)> = jobs
            .into_iter()
            .map(|(tier, name, spec)| {
                let task = tokio::spawn(load_source(
                    self.source.clone(),
                    tier,
                    name.clone(),
                    spec,
                    timeout,
                ));
                (tier, name, task)
            })
            .collect();

        let mut governing_body = None;
        let mut conferences = BTreeMap::new();
        let mut institutions = BTreeMap::new();

        for (tier, name, handle) in handles {
            let set = match handle.await {
                Ok(set) => set,
                Err(e) => {
                    tracing::warn!(
                        tier = %tier,
                        source = %name,
                        error = %e,
                        "Rule loading task failed; using built-in defaults",
                    );
                    tier_defaults(tier)
                }
            };
            match tier {
                RuleTier::GoverningBody => governing_body = Some(set),
                RuleTier::Conference => {
                    conferences.insert(name, set);
                }
                RuleTier::Institution => {
                    institutions.insert(name, set);
                }
            }
        }

        let state = RuleEngineState::new(
            governing_body.unwrap_or_else(defaults::governing_body_rules),
            conferences,
            institutions,
        );
        tracing::info!(
            governing_body_rules = state.governing_body.len(),
            conferences = state.conferences.len(),
            institutions = state.institutions.len(),
            total_rules = state.rule_count(),
            "Rule state loaded",
        );
        state
    }

    /// Load a fresh state and install it. Returns the new snapshot.
    pub async fn reload(&self, config: &RulesConfig) -> Arc<RuleEngineState> {
        let state = Arc::new(self.load_all(config).await);
        self.state.store(state.clone());
        state
    }
}

async fn load_source(
    source: Arc<dyn RuleSource>,
    tier: RuleTier,
    name: String,
    spec: Option<SourceSpec>,
    timeout: Duration,
) -> RuleSet {
    let Some(spec) = spec else {
        tracing::info!(
            tier = %tier,
            source = %name,
            "No rule source configured; using built-in defaults",
        );
        return tier_defaults(tier);
    };

    match fetch_rules(source.as_ref(), &spec, timeout).await {
        Ok(set) => {
            tracing::info!(
                tier = %tier,
                source = %name,
                location = %spec.describe(),
                rules = set.len(),
                "Loaded rule source",
            );
            set
        }
        Err(e) => {
            tracing::warn!(
                tier = %tier,
                source = %name,
                location = %spec.describe(),
                error = %e,
                "Failed to load rule source; using built-in defaults",
            );
            tier_defaults(tier)
        }
    }
}

async fn fetch_rules(
    source: &dyn RuleSource,
    spec: &SourceSpec,
    timeout: Duration,
) -> Result<RuleSet, SourceLoadError> {
    let document = tokio::time::timeout(timeout, source.fetch(spec))
        .await
        .map_err(|_| SourceLoadError::Timeout(timeout))??;
    let rules = normalize_document(&document)?;
    Ok(rules.into_iter().collect())
}

/// Directory entries first, then explicit entries (which replace
/// directory entries of the same name).
async fn institution_sources(config: &RulesConfig) -> Vec<NamedSource> {
    let mut by_name: BTreeMap<String, SourceSpec> = BTreeMap::new();

    if let Some(dir) = &config.institution_dir {
        for entry in scan_institution_dir(dir).await {
            by_name.insert(entry.name, entry.source);
        }
    }
    for entry in &config.institutions {
        by_name.insert(entry.name.clone(), entry.source.clone());
    }

    by_name
        .into_iter()
        .map(|(name, source)| NamedSource { name, source })
        .collect()
}

/// `<institution>.json` files in `dir`. A missing or unreadable
/// directory yields nothing.
async fn scan_institution_dir(dir: &Path) -> Vec<NamedSource> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(dir = %dir.display(), "Institution rules directory not found");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "Failed to read institution rules directory",
            );
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(
                    dir = %dir.display(),
                    error = %e,
                    "Failed to list institution rules directory",
                );
                break;
            }
        };
        let path = entry.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let stem = path.file_stem().and_then(|s| s.to_str()).map(str::to_string);
        match (is_json, stem) {
            (true, Some(name)) if path.is_file() => found.push(NamedSource {
                name,
                source: SourceSpec::File { path },
            }),
            _ => tracing::debug!(path = %path.display(), "Skipping non-JSON institution entry"),
        }
    }
    found
}
