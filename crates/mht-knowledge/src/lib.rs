//! # mht-knowledge
//!
//! TOML knowledge documents and the loader that turns them into a
//! `KnowledgeStore`.
//!
//! ## Overview
//!
//! This crate provides [`TomlKnowledgeLoader`], which implements the
//! [`KnowledgeLoader`](mht_core::traits::KnowledgeLoader) trait. The
//! knowledge set is split over four documents:
//!
//! - `contraindications.toml`: condition → absolute / relative contraindication
//! - `interactions.toml`: undirected drug pairs with a severity and action
//! - `thresholds.toml`: risk cutoffs, their actions, precedence and defaults
//! - `offline_pack.toml`: condition/action rules and the flat interaction table
//!
//! Bundled copies are compiled in; a directory with the same four files can
//! replace them at runtime.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mht_core::{traits::KnowledgeLoader, DecisionEngine};
//! use mht_knowledge::TomlKnowledgeLoader;
//!
//! let store = TomlKnowledgeLoader::bundled().load()?;
//! let engine = DecisionEngine::new(Arc::new(store));
//! ```

pub mod config;
pub mod document;
pub mod loader;

pub use config::{engine_config_from_file, engine_config_from_toml_str};
pub use loader::{KnowledgeDocuments, TomlKnowledgeLoader, OFFLINE_PACK_FILE};

// ── Tests ─────────────────────────────────────────────────────────────────────
