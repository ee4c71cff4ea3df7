//! Ordered provider fallback.
//!
//! Providers are tried one after another; the first that yields rules wins
//! outright and later providers are never consulted. There is no backoff and
//! no merging across providers.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::ProviderFailure;
use crate::providers::RulesProvider;
use crate::{Calendar, CalendarError};

impl Calendar {
    /// Build a calendar from the first provider that succeeds.
    ///
    /// `primary` is tried first, then each of `fallback` in order. The
    /// calendar is marked offline-derived when the winning provider reports
    /// [`RulesProvider::is_offline`].
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::AllProvidersFailed`] carrying every attempt,
    /// in attempt order, when no provider succeeds.
    pub async fn from_providers(
        primary: &dyn RulesProvider,
        fallback: &[&dyn RulesProvider],
    ) -> Result<Self, CalendarError> {
        let started = Instant::now();
        let chain = std::iter::once(primary).chain(fallback.iter().copied());
        let mut failures = Vec::new();

        for provider in chain {
            debug!(provider = provider.name(), "loading rules");
            match provider.load_rules().await {
                Ok(rules) => {
                    info!(
                        provider = provider.name(),
                        offline = provider.is_offline(),
                        explicit_days = rules.len(),
                        failed_attempts = failures.len(),
                        latency_ms = started.elapsed().as_millis() as u64,
                        "calendar rules loaded"
                    );
                    return Ok(Calendar::from_provider_rules(
                        rules,
                        provider.name(),
                        provider.is_offline(),
                    ));
                }
                Err(error) => {
                    warn!(provider = provider.name(), error = %error, "rules provider failed");
                    failures.push(ProviderFailure {
                        provider: provider.name().to_owned(),
                        error,
                    });
                }
            }
        }

        Err(CalendarError::AllProvidersFailed { failures })
    }
}
