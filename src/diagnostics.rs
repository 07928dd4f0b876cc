//! Generation diagnostics and telemetry.
//!
//! [`GenerationDiagnostics`] records what happened while producing an
//! output — which extraction strategy succeeded, whether the result was
//! degraded to a default, and how many retries of each kind were spent.

/// Records what happened during one generation operation.
///
/// Attached to every output produced by [`Forge`](crate::forge::Forge).
/// Callers that degrade gracefully can inspect this to decide whether the
/// value is trustworthy or a substituted default.
#[derive(Debug, Clone, Default)]
pub struct GenerationDiagnostics {
    /// Which extraction strategy produced the value
    /// (`"fenced"`, `"direct"`, `"newline_escaped"`, `"truncation_repaired"`).
    /// `None` when extraction failed outright.
    pub strategy: Option<&'static str>,

    /// If extraction failed and a default was substituted, the failure
    /// message. `None` means the value came from the model.
    pub extract_error: Option<String>,

    /// Number of semantic retry attempts (0 = initial call was accepted or
    /// retry was not configured).
    pub retry_attempts: u32,

    /// Number of transport retries (429, 5xx) before the request succeeded.
    pub transport_retries: u32,

    /// Total time spent in backoff delays (milliseconds).
    pub backoff_total_ms: u64,

    /// Whether the raw response was served from the TTL cache.
    pub cache_hit: bool,

    /// Whether the output is a substituted safe default rather than a
    /// parsed model response.
    pub defaulted: bool,
}

impl GenerationDiagnostics {
    /// Quick check: did the value come from a successful extraction?
    pub fn ok(&self) -> bool {
        self.extract_error.is_none() && !self.defaulted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ok() {
        let d = GenerationDiagnostics::default();
        assert!(d.ok());
        assert!(d.strategy.is_none());
        assert_eq!(d.retry_attempts, 0);
        assert_eq!(d.transport_retries, 0);
        assert!(!d.cache_hit);
        assert!(!d.defaulted);
    }

    #[test]
    fn defaulted_output_is_not_ok() {
        let d = GenerationDiagnostics {
            extract_error: Some("no JSON candidate found".into()),
            defaulted: true,
            ..Default::default()
        };
        assert!(!d.ok());
    }
}
