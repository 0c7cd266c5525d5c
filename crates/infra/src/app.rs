//! Process bootstrap: logging, ledger, session.

use anyhow::{Context, Result};

use hsepartner_auth::{CredentialVerifier, DemoCredentials, Session};
use hsepartner_inventory::{Ledger, seed};

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::service::LedgerService;
use crate::session_store::FileSessionStore;

/// Everything a running application holds.
#[derive(Debug)]
pub struct App<V = DemoCredentials, C = SystemClock> {
    pub config: AppConfig,
    pub session: Session<V, FileSessionStore>,
    pub ledger: LedgerService<C>,
}

impl App {
    /// Start with the demo accounts and the host clock.
    pub fn bootstrap(config: AppConfig) -> Result<Self> {
        Self::bootstrap_with(config, DemoCredentials, SystemClock)
    }
}

impl<V, C> App<V, C>
where
    V: CredentialVerifier,
    C: Clock,
{
    pub fn bootstrap_with(config: AppConfig, verifier: V, clock: C) -> Result<Self> {
        hsepartner_observability::init(&config.log);

        let ledger = if config.seed_demo_data {
            seed::demo_ledger()
        } else {
            Ledger::new()
        };
        tracing::info!(
            items = ledger.items().len(),
            transactions = ledger.transactions().len(),
            seeded = config.seed_demo_data,
            "ledger ready"
        );

        let store = FileSessionStore::new(&config.session_path);
        let mut session = Session::new(verifier, store);
        let restored = session
            .restore()
            .with_context(|| format!("Failed to restore session from {}", config.session_path.display()))?;
        match restored {
            Some(user) => tracing::info!(email = %user.email, role = %user.role, "session restored"),
            None => tracing::debug!("no persisted session"),
        }

        Ok(Self {
            config,
            session,
            ledger: LedgerService::with_clock(ledger, clock),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hsepartner_auth::SessionStore;

    use crate::clock::FixedClock;

    fn config(dir: &tempfile::TempDir, seed: bool) -> AppConfig {
        AppConfig {
            session_path: dir.path().join("storage.json"),
            seed_demo_data: seed,
            ..AppConfig::default()
        }
    }

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())
    }

    #[test]
    fn seeded_bootstrap_starts_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::bootstrap_with(config(&dir, true), DemoCredentials, clock()).unwrap();
        assert_eq!(app.ledger.ledger().items().len(), 7);
        assert!(!app.session.is_authenticated());
    }

    #[test]
    fn unseeded_bootstrap_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::bootstrap_with(config(&dir, false), DemoCredentials, clock()).unwrap();
        assert!(app.ledger.ledger().items().is_empty());
        assert!(app.ledger.category_aggregates().is_empty());
    }

    #[test]
    fn login_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = App::bootstrap_with(config(&dir, true), DemoCredentials, clock()).unwrap();
        first.session.login("hse@hsepartner.com", "hse123").unwrap();

        let second = App::bootstrap_with(config(&dir, true), DemoCredentials, clock()).unwrap();
        assert_eq!(second.session.current().unwrap().name, "Sarah Johnson");

        let mut second = second;
        second.session.logout().unwrap();
        assert_eq!(second.session.store().load().unwrap(), None);

        let third = App::bootstrap_with(config(&dir, true), DemoCredentials, clock()).unwrap();
        assert!(!third.session.is_authenticated());
    }

    #[test]
    fn corrupt_session_file_starts_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, false);
        std::fs::write(&config.session_path, r#"{"hsepartner_user":"{broken"}"#).unwrap();

        let app = App::bootstrap_with(config, DemoCredentials, clock()).unwrap();
        assert!(!app.session.is_authenticated());
        assert_eq!(app.session.store().load().unwrap(), None);
    }
}
