//! TOML-backed `KnowledgeLoader`.
//!
//! `TomlKnowledgeLoader` holds the text of the four knowledge documents and
//! turns them into a `KnowledgeStore` on `load`:
//!
//! 1. Parse each document (`ConfigError` naming the file on failure).
//! 2. Resolve offline-rule evidence ids against the pack's sources.
//! 3. Check cross-document invariants: unique rule ids, confidences in
//!    `[0, 1]`, urgent rules at or above `URGENT_CONFIDENCE_FLOOR`, a
//!    non-empty precedence list.
//!
//! The bundled documents are compiled into the binary with `include_str!`,
//! so `TomlKnowledgeLoader::bundled()` cannot fail to find its files.

use std::{
    collections::{BTreeMap, HashSet},
    path::Path,
};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use mht_contracts::{
    error::{MhtError, MhtResult},
    knowledge::{KnowledgeStore, OfflinePack},
    plan::{ActionCategory, URGENT_CONFIDENCE_FLOOR},
    recommendation::KnowledgeCollection,
    rule::{ClinicalRule, GuidelineSource, RuleAction},
};
use mht_core::traits::KnowledgeLoader;

use crate::document::{
    ContraindicationsDocument, InteractionsDocument, OfflinePackDocument, RuleEntry,
    ThresholdsDocument,
};

/// File name of the offline rule pack document.
pub const OFFLINE_PACK_FILE: &str = "offline_pack.toml";

/// Threshold action ids the risk stages look up.
pub const THRESHOLD_ACTION_IDS: [&str; 5] = [
    "ASCVD_high",
    "ASCVD_intermediate",
    "FRAX_high",
    "GAIL_elevated",
    "WELLS_high",
];

const BUNDLED_CONTRAINDICATIONS: &str = include_str!("../knowledge/contraindications.toml");
const BUNDLED_INTERACTIONS: &str = include_str!("../knowledge/interactions.toml");
const BUNDLED_THRESHOLDS: &str = include_str!("../knowledge/thresholds.toml");
const BUNDLED_OFFLINE_PACK: &str = include_str!("../knowledge/offline_pack.toml");

/// The raw text of the four knowledge documents.
#[derive(Debug, Clone)]
pub struct KnowledgeDocuments {
    pub contraindications: String,
    pub interactions: String,
    pub thresholds: String,
    pub offline_pack: String,
}

/// A `KnowledgeLoader` over TOML documents.
#[derive(Debug, Clone)]
pub struct TomlKnowledgeLoader {
    documents: KnowledgeDocuments,
}

impl TomlKnowledgeLoader {
    pub fn new(documents: KnowledgeDocuments) -> Self {
        Self { documents }
    }

    /// The documents shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(KnowledgeDocuments {
            contraindications: BUNDLED_CONTRAINDICATIONS.to_string(),
            interactions: BUNDLED_INTERACTIONS.to_string(),
            thresholds: BUNDLED_THRESHOLDS.to_string(),
            offline_pack: BUNDLED_OFFLINE_PACK.to_string(),
        })
    }

    /// Read the four documents from `dir`.
    ///
    /// Returns `MhtError::ConfigError` if any file cannot be read.
    pub fn from_dir(dir: &Path) -> MhtResult<Self> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|e| MhtError::ConfigError {
                reason: format!("failed to read knowledge file '{}': {}", path.display(), e),
            })
        };

        Ok(Self::new(KnowledgeDocuments {
            contraindications: read(KnowledgeCollection::Contraindications.file_name())?,
            interactions: read(KnowledgeCollection::Interactions.file_name())?,
            thresholds: read(KnowledgeCollection::Thresholds.file_name())?,
            offline_pack: read(OFFLINE_PACK_FILE)?,
        }))
    }

    pub fn documents(&self) -> &KnowledgeDocuments {
        &self.documents
    }
}

impl KnowledgeLoader for TomlKnowledgeLoader {
    fn load(&self) -> MhtResult<KnowledgeStore> {
        let docs = &self.documents;
        let contraindications: ContraindicationsDocument = parse(
            KnowledgeCollection::Contraindications.file_name(),
            &docs.contraindications,
        )?;
        let interactions: InteractionsDocument =
            parse(KnowledgeCollection::Interactions.file_name(), &docs.interactions)?;
        let thresholds: ThresholdsDocument =
            parse(KnowledgeCollection::Thresholds.file_name(), &docs.thresholds)?;
        let pack: OfflinePackDocument = parse(OFFLINE_PACK_FILE, &docs.offline_pack)?;

        if thresholds.precedence.is_empty() {
            return Err(config_error(
                KnowledgeCollection::Thresholds.file_name(),
                "precedence must name at least one stage",
            ));
        }

        let store = KnowledgeStore {
            version: thresholds.version,
            precedence: thresholds.precedence,
            defaults: thresholds.defaults,
            contraindications: contraindications.contraindications,
            interactions: interactions.interactions,
            risk_thresholds: thresholds.risk_thresholds,
            threshold_actions: thresholds.actions,
            pack: build_pack(pack)?,
        };

        check_unique_ids(&store)?;
        for id in THRESHOLD_ACTION_IDS {
            if !store.threshold_actions.contains_key(id) {
                warn!(action_id = id, "threshold action not defined; crossings will carry no message");
            }
        }

        info!(
            version = %store.version,
            pack_version = %store.pack.version,
            contraindications = store.contraindications.len(),
            interactions = store.interactions.len(),
            threshold_actions = store.threshold_actions.len(),
            offline_rules = store.pack.rules.len(),
            "knowledge loaded"
        );
        Ok(store)
    }
}

fn parse<T: DeserializeOwned>(file: &str, text: &str) -> MhtResult<T> {
    toml::from_str(text).map_err(|e| MhtError::ConfigError {
        reason: format!("failed to parse knowledge file '{}': {}", file, e),
    })
}

fn config_error(file: &str, message: impl std::fmt::Display) -> MhtError {
    MhtError::ConfigError {
        reason: format!("{file}: {message}"),
    }
}

fn build_pack(doc: OfflinePackDocument) -> MhtResult<OfflinePack> {
    let mut by_id: BTreeMap<String, GuidelineSource> = BTreeMap::new();
    for entry in &doc.sources {
        if by_id.insert(entry.id.clone(), entry.source.clone()).is_some() {
            return Err(config_error(
                OFFLINE_PACK_FILE,
                format!("duplicate source id '{}'", entry.id),
            ));
        }
    }

    let rules = doc
        .rules
        .into_iter()
        .map(|entry| resolve_rule(entry, &by_id))
        .collect::<MhtResult<Vec<_>>>()?;

    debug!(sources = by_id.len(), rules = rules.len(), "offline pack resolved");

    Ok(OfflinePack {
        version: doc.version,
        sources: doc.sources.into_iter().map(|s| s.source).collect(),
        rules,
        interactions: doc.interactions,
    })
}

fn resolve_rule(
    entry: RuleEntry,
    sources: &BTreeMap<String, GuidelineSource>,
) -> MhtResult<ClinicalRule> {
    let action = entry.action;
    if !(0.0..=1.0).contains(&action.confidence) {
        return Err(config_error(
            OFFLINE_PACK_FILE,
            format!(
                "rule '{}' has confidence {} outside [0, 1]",
                entry.id, action.confidence
            ),
        ));
    }

    if action.category == ActionCategory::Urgent && action.confidence < URGENT_CONFIDENCE_FLOOR {
        return Err(config_error(
            OFFLINE_PACK_FILE,
            format!(
                "urgent rule '{}' has confidence {} below {}",
                entry.id, action.confidence, URGENT_CONFIDENCE_FLOOR
            ),
        ));
    }

    let evidence = action
        .evidence
        .iter()
        .map(|id| {
            sources.get(id).cloned().ok_or_else(|| {
                config_error(
                    OFFLINE_PACK_FILE,
                    format!("rule '{}' cites unknown source '{}'", entry.id, id),
                )
            })
        })
        .collect::<MhtResult<Vec<_>>>()?;

    Ok(ClinicalRule {
        id: entry.id,
        condition: entry.condition,
        action: RuleAction {
            category: action.category,
            text: action.text,
            rationale: action.rationale,
            evidence,
            priority: action.priority,
            confidence: action.confidence,
            contraindications: action.contraindications,
            interactions: action.interactions,
        },
    })
}

/// Fired-rule ids must identify one rule across every collection.
fn check_unique_ids(store: &KnowledgeStore) -> MhtResult<()> {
    let ids = store
        .contraindications
        .iter()
        .map(|c| c.id.as_str())
        .chain(store.interactions.iter().map(|i| i.id.as_str()))
        .chain(store.threshold_actions.keys().map(String::as_str))
        .chain(store.pack.rules.iter().map(|r| r.id.as_str()));

    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(MhtError::ConfigError {
                reason: format!("rule id '{id}' is defined more than once"),
            });
        }
    }
    Ok(())
}
