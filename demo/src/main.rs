//! MHT decision engine demo CLI
//!
//! Loads the bundled knowledge (or a directory of knowledge TOML files) and
//! runs the decision engine, the offline plan generator, or the risk
//! resolver on JSON input.
//!
//! Usage:
//!   cargo run -p demo -- cases
//!   cargo run -p demo -- evaluate --input request.json
//!   cargo run -p demo -- plan --input assessment.json
//!   cargo run -p demo -- risk --input request.json

mod cases;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Args, Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mht_audit::{fingerprint_plan, InMemoryPlanStore};
use mht_contracts::{
    assessment::PatientAssessment,
    config::EngineConfig,
    error::{MhtError, MhtResult},
    inputs::TreatmentInputs,
};
use mht_core::{
    traits::KnowledgeLoader, DecisionEngine, OfflineRuleEngine, PersistenceOutcome,
    PlanRepository,
};
use mht_knowledge::{engine_config_from_file, TomlKnowledgeLoader};
use mht_risk::RiskResolver;
use mht_verify::SchemaPlanVerifier;

use crate::cases::CASES;

// ── CLI definition ────────────────────────────────────────────────────────────

/// MHT clinical decision support demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "MHT decision engine demo",
    long_about = "Evaluates menopausal hormone therapy requests against versioned clinical\n\
                  knowledge: contraindications, drug interactions, risk thresholds and offline plans."
)]
struct Cli {
    /// Directory holding the four knowledge TOML files. Defaults to the bundled set.
    #[arg(long, global = true)]
    knowledge: Option<PathBuf>,

    /// Engine configuration TOML file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the decision engine on a treatment request.
    Evaluate(InputArgs),
    /// Generate, verify and store an offline treatment plan.
    Plan(InputArgs),
    /// Resolve every risk score for a treatment request.
    Risk(InputArgs),
    /// Run the built-in clinical cases through both engines.
    Cases,
}

#[derive(Args)]
struct InputArgs {
    /// JSON input file.
    #[arg(long, short)]
    input: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for stage-by-stage output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = Runtime::load(cli.knowledge.as_deref(), cli.config.as_deref()).and_then(|rt| {
        match &cli.command {
            Command::Evaluate(args) => rt.evaluate(&args.input),
            Command::Plan(args) => rt.plan(&args.input),
            Command::Risk(args) => rt.risk(&args.input),
            Command::Cases => rt.cases(),
        }
    });

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Runtime wiring ────────────────────────────────────────────────────────────

struct Runtime {
    decision: DecisionEngine,
    offline: OfflineRuleEngine,
    resolver: RiskResolver,
    store: InMemoryPlanStore,
    plans: PlanRepository,
}

impl Runtime {
    fn load(knowledge_dir: Option<&Path>, config_path: Option<&Path>) -> MhtResult<Self> {
        let config = match config_path {
            Some(path) => engine_config_from_file(path)?,
            None => EngineConfig::default(),
        };
        let loader = match knowledge_dir {
            Some(dir) => TomlKnowledgeLoader::from_dir(dir)?,
            None => TomlKnowledgeLoader::bundled(),
        };

        let knowledge = Arc::new(loader.load()?);
        info!(version = %knowledge.version, "knowledge ready");

        let offline = OfflineRuleEngine::with_knowledge(Arc::clone(&knowledge), config.clone())
            .with_verifier(Box::new(
                SchemaPlanVerifier::new().with_max_specific_options(config.specific_options_limit),
            ));

        let store = InMemoryPlanStore::new("demo");
        let plans = PlanRepository::new(Arc::new(store.clone()), config.max_saved_plans);

        Ok(Self {
            decision: DecisionEngine::with_config(knowledge, config.clone()),
            offline,
            resolver: RiskResolver::new(config.conflict_threshold_pct),
            store,
            plans,
        })
    }

    fn evaluate(&self, input: &Path) -> MhtResult<()> {
        let inputs: TreatmentInputs = read_json(input)?;
        print_json(&self.decision.evaluate(&inputs))
    }

    fn plan(&self, input: &Path) -> MhtResult<()> {
        let assessment: PatientAssessment = read_json(input)?;
        let plan = self.offline.generate_plan(&assessment)?;
        let fingerprint = fingerprint_plan(&plan)?;
        let persistence = match self.plans.save_plan(&plan) {
            PersistenceOutcome::Saved { retained } => format!("saved ({retained} retained)"),
            PersistenceOutcome::Skipped { reason } => format!("skipped: {reason}"),
        };

        print_json(&serde_json::json!({
            "plan": plan,
            "fingerprint": fingerprint,
            "persistence": persistence,
            "ledger_intact": self.store.verify_integrity(),
        }))
    }

    fn risk(&self, input: &Path) -> MhtResult<()> {
        let inputs: TreatmentInputs = read_json(input)?;
        let panel = self
            .resolver
            .resolve_panel(&inputs.risk_inputs(), &inputs.risk_scores);
        print_json(&panel)
    }

    fn cases(&self) -> MhtResult<()> {
        print_banner();

        for case in &CASES {
            println!("── {} ──", case.name);
            println!("   {}", case.description);

            let inputs: TreatmentInputs = parse_json(case.name, case.inputs)?;
            let rec = self.decision.evaluate(&inputs);
            let fired: Vec<&str> = rec.fired_rules.iter().map(|r| r.id.as_str()).collect();
            println!(
                "   decision : {} ({})",
                rec.primary_recommendation.strength, rec.primary_recommendation.text
            );
            let fired = if fired.is_empty() { "-".to_string() } else { fired.join(", ") };
            println!("   fired    : {fired}");
            println!("   review   : {}", rec.clinician_review_required);
            for conflict in &rec.risk_score_conflicts {
                println!(
                    "   conflict : {} external {} vs computed {} ({}%)",
                    conflict.score, conflict.external, conflict.computed, conflict.difference
                );
            }

            let assessment: PatientAssessment = parse_json(case.name, case.assessment)?;
            let plan = self.offline.generate_plan(&assessment)?;
            self.plans.save_plan(&plan);
            println!(
                "   plan     : {} recommendation(s), urgent = {}",
                plan.recommendations.len(),
                plan.flags.urgent
            );
            for (idx, line) in plan.general_plan.iter().enumerate() {
                println!("     {}. {}", idx + 1, line);
            }
            println!("   digest   : {}", fingerprint_plan(&plan)?);
            println!();
        }

        let log = self.store.export_log()?;
        println!(
            "Plan store: {} write(s), terminal hash {}, ledger intact = {}",
            log.events.len(),
            log.terminal_hash,
            self.store.verify_integrity()
        );
        println!("Saved plans retained: {}", self.plans.saved_plans().len());
        Ok(())
    }
}

// ── JSON helpers ──────────────────────────────────────────────────────────────

fn read_json<T: DeserializeOwned>(path: &Path) -> MhtResult<T> {
    let text = std::fs::read_to_string(path).map_err(|e| MhtError::ConfigError {
        reason: format!("failed to read input file '{}': {}", path.display(), e),
    })?;
    parse_json(&path.display().to_string(), &text)
}

fn parse_json<T: DeserializeOwned>(origin: &str, text: &str) -> MhtResult<T> {
    serde_json::from_str(text).map_err(|e| MhtError::Serialization {
        reason: format!("failed to parse JSON from '{}': {}", origin, e),
    })
}

fn print_json<T: Serialize>(value: &T) -> MhtResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| MhtError::Serialization {
        reason: format!("failed to render JSON output: {}", e),
    })?;
    println!("{text}");
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("MHT Clinical Decision Support");
    println!("=============================");
    println!();
    println!("Decision pipeline per request:");
    println!("  [1] Contraindications: absolute blocks, relative continues with review");
    println!("  [2] Drug interactions: high blocks, moderate adds monitoring");
    println!("  [3] Risk thresholds: resolved scores against versioned cutoffs");
    println!("  [4] Preference and default");
    println!("Offline plans are verified, fingerprinted and written to a hash-chained store.");
    println!();
}
