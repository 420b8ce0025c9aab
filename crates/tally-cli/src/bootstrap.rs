use anyhow::Context;
use tally_config::TallyConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, layered config, then apply CLI overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<TallyConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(error) if error.not_found() => {}
        Err(error) => tracing::warn!(%error, "failed to read .env; continuing"),
    }
    let mut config = TallyConfig::load().context("failed to load tally config")?;
    apply_overrides(&mut config, flags);
    Ok(config)
}

fn apply_overrides(config: &mut TallyConfig, flags: &GlobalFlags) {
    if let Some(db) = &flags.db {
        tracing::debug!(path = %db.display(), "database path overridden from --db");
        config.database.path.clone_from(db);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cli::OutputFormat;

    fn flags(db: Option<&str>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            quiet: false,
            verbose: false,
            user: None,
            correlation_id: None,
            db: db.map(PathBuf::from),
        }
    }

    #[test]
    fn db_flag_overrides_configured_path() {
        let mut config = TallyConfig::default();
        apply_overrides(&mut config, &flags(Some("/tmp/other.db")));
        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn no_db_flag_keeps_configured_path() {
        let mut config = TallyConfig::default();
        let before = config.database.path.clone();
        apply_overrides(&mut config, &flags(None));
        assert_eq!(config.database.path, before);
    }
}
