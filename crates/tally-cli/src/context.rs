use anyhow::Context;
use tally_capture::AuditScope;
use tally_config::TallyConfig;
use tally_core::entities::Book;
use tally_core::identity::IdentityContext;
use tally_db::service::TallyService;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: TallyService,
    pub identity: IdentityContext,
}

impl AppContext {
    pub async fn init(config: &TallyConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let service = TallyService::open(config, audit_scope())
            .await
            .with_context(|| {
                format!(
                    "failed to open database at {}",
                    config.database.path.display()
                )
            })?;
        let identity = resolve_identity(flags)?;
        tracing::debug!(
            user_id = %identity.user_id,
            correlation_id = %identity.correlation_id,
            "resolved identity"
        );
        Ok(Self { service, identity })
    }
}

/// Entity types audited by this binary.
fn audit_scope() -> AuditScope {
    AuditScope::new().include::<Book>()
}

/// `--user`, else `$USER`, else empty (left to the missing-identity policy).
/// `--correlation-id`, else a fresh random one.
fn resolve_identity(flags: &GlobalFlags) -> anyhow::Result<IdentityContext> {
    let user = flags
        .user
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_default();
    let correlation_id = match &flags.correlation_id {
        Some(id) => id.clone(),
        None => generate_correlation_id()?,
    };
    Ok(IdentityContext::new(user, correlation_id))
}

fn generate_correlation_id() -> anyhow::Result<String> {
    let mut bytes = [0u8; 8];
    getrandom::fill(&mut bytes)
        .map_err(|e| anyhow::anyhow!("failed to generate correlation id: {e}"))?;
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("cor-{hex}"))
}
