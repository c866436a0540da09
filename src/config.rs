/// Settings for a [`Reasoner`](crate::reasoner::Reasoner)
///
/// ```json
/// { "verbose": true, "warn_unrestricted": false }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ReasonerConfig {
    /// Report every attempted rule and derived fact through the `log` facade
    pub verbose: bool,
    /// Log a warning, once per `reason` call, for every active rule whose
    /// head has variables that do not occur in its body
    pub warn_unrestricted: bool,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            warn_unrestricted: true,
        }
    }
}

impl ReasonerConfig {
    /// Same configuration with tracing switched on or off
    #[must_use]
    pub fn with_verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON or unknown fields.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = ReasonerConfig::from_json(r#"{ "verbose": true }"#).unwrap();
        assert!(config.verbose);
        assert!(config.warn_unrestricted);

        let config = ReasonerConfig::from_json("{}").unwrap();
        assert_eq!(config, ReasonerConfig::default());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(ReasonerConfig::from_json(r#"{ "max_passes": 3 }"#).is_err());
    }

    #[test]
    fn test_with_verbose() {
        let config = ReasonerConfig::default().with_verbose(true);
        assert!(config.verbose);
        assert!(config.warn_unrestricted);
    }
}
