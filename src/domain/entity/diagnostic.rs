use serde::Deserialize;

/// A single message produced by the bundler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Diagnostic {
    pub message: String,
}

impl Diagnostic {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Statistics of a finished build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildStats {
    pub warnings: Vec<Diagnostic>,
    pub errors: Vec<Diagnostic>,
}

impl BuildStats {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_stats_deserialize_partial() {
        let stats: BuildStats =
            serde_json::from_str(r#"{"warnings": [{"message": "unused"}]}"#).unwrap();
        assert!(stats.has_warnings());
        assert!(!stats.has_errors());
        assert_eq!(stats.warnings, [Diagnostic::new("unused")]);
    }
}
