use anyhow::{Context, Result};
use sf_kernel::config::ConfigLoader;
use sf_kernel::domain::config::{AppConfig, FlagsConfig};
use sf_kernel::flags::bucket::{rollout_bucket, rollout_hash};
use sf_kernel::flags::{EvaluationContext, FlagStore};
use std::path::Path;

fn load_store(config: Option<&Path>) -> Result<FlagStore> {
    let flags = match config {
        Some(path) => {
            let cfg: AppConfig = ConfigLoader::new(path)
                .load()
                .with_context(|| format!("Failed to load {}", path.display()))?;
            cfg.flags.clone()
        },
        None => FlagsConfig::default(),
    };
    FlagStore::from_config(&flags).context("Invalid flag registry")
}

pub(crate) fn eval(
    flag: &str,
    user: Option<&str>,
    role: Option<&str>,
    config: Option<&Path>,
) -> Result<()> {
    let store = load_store(config)?;
    let evaluator = store.evaluator();

    if evaluator.registry().get(flag).is_none() {
        println!("{flag}: disabled (unknown flag)");
        return Ok(());
    }

    let ctx = EvaluationContext { user_id: user, role };
    let state = if evaluator.is_enabled(flag, &ctx) { "enabled" } else { "disabled" };
    match user.filter(|id| !id.is_empty()) {
        Some(id) => println!("{flag}: {state} (user {id}, bucket {})", rollout_bucket(id)),
        None => println!("{flag}: {state} (anonymous)"),
    }
    Ok(())
}

pub(crate) fn bucket(users: &[String]) {
    for user in users {
        println!("{user}\thash={}\tbucket={}", rollout_hash(user), rollout_bucket(user));
    }
}

pub(crate) fn list(config: Option<&Path>, json: bool) -> Result<()> {
    let store = load_store(config)?;
    let registry = store.snapshot();

    if json {
        let features: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&features)?);
        return Ok(());
    }

    for feature in registry.iter() {
        let state = if feature.enabled { "on" } else { "off" };
        println!(
            "{:<28} {:<4} {:>3}%  {}",
            feature.key.as_str(),
            state,
            feature.rollout_percentage,
            feature.display_name
        );
    }
    Ok(())
}

pub(crate) fn validate(path: &Path) -> Result<()> {
    let store = load_store(Some(path))?;
    let registry = store.snapshot();
    println!(
        "{}: {} flags, version {}",
        path.display(),
        registry.len(),
        registry.metadata().version
    );
    Ok(())
}
