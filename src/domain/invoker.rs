use std::sync::Arc;

use snafu::prelude::*;

use crate::domain::config;
use crate::domain::entity::BuildRequest;
use crate::domain::outbound::{
    BundleError, Bundler, ConfigurationSource, DiagnosticReporter, LoadBaseError,
};

/// Runs the bundler against a named configuration layered with the local
/// override and the requested environment.
pub struct BundlerInvoker {
    source: Arc<dyn ConfigurationSource>,
    bundler: Arc<dyn Bundler>,
    reporter: Arc<dyn DiagnosticReporter>,
}

impl BundlerInvoker {
    /// Creates a new [`BundlerInvoker`].
    pub fn new(
        source: Arc<dyn ConfigurationSource>,
        bundler: Arc<dyn Bundler>,
        reporter: Arc<dyn DiagnosticReporter>,
    ) -> Self {
        Self {
            source,
            bundler,
            reporter,
        }
    }

    /// Load, merge and build. Warnings and errors in the build statistics are
    /// reported but never fail the call.
    ///
    /// # Errors
    ///
    /// This function will return an error if the base configuration can't be
    /// loaded or the bundler fails to run.
    pub async fn invoke(&self, request: &BuildRequest) -> Result<(), InvokeBundlerError> {
        let name = request.name();
        tracing::info!(config = name, "Running bundler");

        let base = self
            .source
            .load_base(name)
            .await
            .context(LoadBaseSnafu { name })?;

        let overlay = self.source.load_override().await;
        if overlay.is_none() {
            tracing::debug!("No local override configuration");
        }

        let configuration = config::compose(base, overlay, request.environment());
        let stats = self.bundler.build(configuration).await.context(BundleSnafu)?;

        if let Some(stats) = stats {
            if stats.has_warnings() {
                for warning in &stats.warnings {
                    self.reporter.warning(&warning.message);
                }
            }
            if stats.has_errors() {
                for error in &stats.errors {
                    self.reporter.error(&error.message);
                }
            }
            tracing::info!(
                warnings = stats.warnings.len(),
                errors = stats.errors.len(),
                "Bundler finished"
            );
        }

        Ok(())
    }
}

/// An error for running a build.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InvokeBundlerError {
    #[snafu(display("Could not load base configuration {name}"))]
    LoadBase {
        name: String,
        source: LoadBaseError,
    },
    #[snafu(display("Could not run the bundler"))]
    Bundle { source: BundleError },
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use mockall::predicate::eq;
    use mockall::Sequence;
    use serde_json::{json, Value};

    use crate::domain::entity::{BuildStats, Diagnostic, EnvironmentMap};
    use crate::domain::outbound::{
        MockBundler, MockConfigurationSource, MockDiagnosticReporter, NotFoundSnafu,
    };

    fn invoker(
        source: MockConfigurationSource,
        bundler: MockBundler,
        reporter: MockDiagnosticReporter,
    ) -> BundlerInvoker {
        BundlerInvoker::new(Arc::new(source), Arc::new(bundler), Arc::new(reporter))
    }

    fn source_with(base: Value, overlay: Option<Value>) -> MockConfigurationSource {
        let mut source = MockConfigurationSource::new();
        source
            .expect_load_base()
            .with(eq("production"))
            .return_once(move |_| Ok(base));
        source.expect_load_override().return_once(move || overlay);
        source
    }

    #[tokio::test]
    async fn invoke_merges_layers_in_order() {
        let source = source_with(json!({"plugins": ["A"]}), Some(json!({"plugins": ["B"]})));

        let mut bundler = MockBundler::new();
        bundler
            .expect_build()
            .withf(|configuration| {
                configuration["plugins"]
                    == json!(["A", "B", {"name": "environment", "options": {"FOO": "bar"}}])
            })
            .times(1)
            .returning(|_| Ok(None));

        let env = EnvironmentMap::from([("FOO".to_owned(), "bar".to_owned())]);
        let request = BuildRequest::new("production").env(env);
        let invoker = invoker(source, bundler, MockDiagnosticReporter::new());
        assert!(invoker.invoke(&request).await.is_ok());
    }

    #[tokio::test]
    async fn invoke_without_override() {
        let source = source_with(json!({"mode": "production"}), None);

        let mut bundler = MockBundler::new();
        bundler
            .expect_build()
            .withf(|configuration| {
                *configuration
                    == json!({
                        "mode": "production",
                        "plugins": [{"name": "environment", "options": {}}]
                    })
            })
            .times(1)
            .returning(|_| Ok(None));

        let invoker = invoker(source, bundler, MockDiagnosticReporter::new());
        assert!(invoker.invoke(&BuildRequest::new("production")).await.is_ok());
    }

    #[tokio::test]
    async fn invoke_reports_warnings_and_resolves() {
        let source = source_with(json!({}), None);

        let mut bundler = MockBundler::new();
        bundler.expect_build().returning(|_| {
            Ok(Some(BuildStats {
                warnings: vec![Diagnostic::new("first"), Diagnostic::new("second")],
                errors: Vec::new(),
            }))
        });

        let mut reporter = MockDiagnosticReporter::new();
        let mut seq = Sequence::new();
        reporter
            .expect_warning()
            .with(eq("first"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        reporter
            .expect_warning()
            .with(eq("second"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        reporter.expect_error().never();

        let invoker = invoker(source, bundler, reporter);
        assert!(invoker.invoke(&BuildRequest::new("production")).await.is_ok());
    }

    #[tokio::test]
    async fn invoke_reports_errors_and_resolves() {
        let source = source_with(json!({}), None);

        let mut bundler = MockBundler::new();
        bundler.expect_build().returning(|_| {
            Ok(Some(BuildStats {
                warnings: vec![Diagnostic::new("deprecated")],
                errors: vec![Diagnostic::new("module not found")],
            }))
        });

        let mut reporter = MockDiagnosticReporter::new();
        reporter
            .expect_warning()
            .with(eq("deprecated"))
            .times(1)
            .return_const(());
        reporter
            .expect_error()
            .with(eq("module not found"))
            .times(1)
            .return_const(());

        let invoker = invoker(source, bundler, reporter);
        assert!(invoker.invoke(&BuildRequest::new("production")).await.is_ok());
    }

    #[tokio::test]
    async fn invoke_error_fatal_bundler() {
        let source = source_with(json!({}), None);

        let mut bundler = MockBundler::new();
        bundler
            .expect_build()
            .returning(|_| whatever!("compiler crashed"));

        let mut reporter = MockDiagnosticReporter::new();
        reporter.expect_warning().never();
        reporter.expect_error().never();

        let invoker = invoker(source, bundler, reporter);
        let res = invoker.invoke(&BuildRequest::new("production")).await;
        assert!(matches!(
            res,
            Err(InvokeBundlerError::Bundle {
                source: BundleError::Unknown { ref message, .. }
            }) if message == "compiler crashed"
        ));
    }

    #[tokio::test]
    async fn invoke_error_missing_base() {
        let mut source = MockConfigurationSource::new();
        source.expect_load_base().returning(|name| {
            NotFoundSnafu {
                name,
                path: PathBuf::from("build/missing.config.toml"),
            }
            .fail()
        });
        source.expect_load_override().never();

        let mut bundler = MockBundler::new();
        bundler.expect_build().never();

        let invoker = invoker(source, bundler, MockDiagnosticReporter::new());
        let res = invoker.invoke(&BuildRequest::new("missing")).await;
        assert!(matches!(
            res,
            Err(InvokeBundlerError::LoadBase {
                source: LoadBaseError::NotFound { .. },
                ..
            })
        ));
    }
}
