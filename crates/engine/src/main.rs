//! SheetForge - recompute a character document and print its derived values.
//!
//! Usage: `sheetforge <document.json> [--save] [--bonuses]`
//!
//! `--save` writes the document back, normalized to the current layout and
//! with any `SHEETFORGE_*` settings overrides baked in. `--bonuses` also
//! prints the bonuses aimed at each skill and spell.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetforge_engine::document_file::{load_document, save_document};
use sheetforge_engine::infrastructure::clock::SystemClock;
use sheetforge_engine::infrastructure::ports::ClockPort;
use sheetforge_engine::settings::apply_env_overrides;
use sheetforge_engine::SheetEngine;

fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetforge_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .context("usage: sheetforge <document.json> [--save] [--bonuses]")?;
    let flags: Vec<String> = args.collect();
    let save = flags.iter().any(|arg| arg == "--save");
    let show_bonuses = flags.iter().any(|arg| arg == "--bonuses");

    let mut document = load_document(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let overrides = apply_env_overrides(&mut document.settings);
    tracing::info!(path = %path.display(), overrides, "Loaded character document");

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    let engine = SheetEngine::new(document, clock);
    println!("{}", serde_json::to_string_pretty(engine.cache())?);
    if show_bonuses {
        println!("{}", serde_json::to_string_pretty(&bonus_report(&engine)?)?);
    }

    if save {
        save_document(&path, engine.document())
            .with_context(|| format!("failed to save {}", path.display()))?;
        tracing::info!(path = %path.display(), "Saved character document");
    }

    Ok(())
}

fn bonus_report(engine: &SheetEngine) -> anyhow::Result<serde_json::Value> {
    let document = engine.document();
    let mut skills = Vec::new();
    for row in document.skills.iter().filter(|row| !row.data.container) {
        let bonuses = engine.skill_bonuses(row.id)?;
        let weapon: i32 = engine
            .weapon_bonuses_for_skill(&row.data.name, &row.data.specialization, &row.categories)
            .iter()
            .map(|bonus| bonus.integer_amount())
            .sum();
        skills.push(json!({
            "id": row.id,
            "name": row.data.name,
            "specialization": row.data.specialization,
            "level": bonuses.level,
            "points": bonuses.points,
            "weaponDamage": weapon,
        }));
    }

    let mut spells = Vec::new();
    for row in document.spells.iter().filter(|row| !row.data.container) {
        let bonuses = engine.spell_bonuses(row.id)?;
        spells.push(json!({
            "id": row.id,
            "name": row.data.name,
            "college": row.data.college,
            "level": bonuses.level,
            "points": bonuses.points,
        }));
    }

    Ok(json!({ "skills": skills, "spells": spells }))
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Local overrides win
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
