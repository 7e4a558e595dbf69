use std::sync::Arc;

use qcos_core::{DiffStats, EditScript, QcosError};

use crate::codebase::Codebase;
use crate::llm::{CompletionOptions, TextCompletionService};
use crate::prompt;
use crate::store::KeyValueTextStore;

/// Asks a completion service to rewrite codebase files and turns the answer
/// into a reviewable [`PatchProposal`].
pub struct Metaprogrammer {
    llm: Arc<dyn TextCompletionService>,
    options: CompletionOptions,
}

impl Metaprogrammer {
    pub fn new(llm: Arc<dyn TextCompletionService>) -> Self {
        Self {
            llm,
            options: CompletionOptions::default(),
        }
    }

    /// Override the sampling options used for rewrites.
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Request a rewrite of `path` according to `request`.
    ///
    /// # Errors
    ///
    /// - [`QcosError::InvalidRequest`] if `request` is blank.
    /// - [`QcosError::UnknownFile`] if the codebase has no such file.
    /// - [`QcosError::Llm`] / [`QcosError::RateLimited`] from the service,
    ///   or `Llm` when the cleaned response is empty.
    pub async fn propose<S: KeyValueTextStore>(
        &self,
        codebase: &Codebase<S>,
        path: &str,
        request: &str,
    ) -> Result<PatchProposal, QcosError> {
        let request = request.trim();
        if request.is_empty() {
            return Err(QcosError::InvalidRequest(
                "modification request is empty".into(),
            ));
        }
        let original = codebase
            .get(path)
            .ok_or_else(|| QcosError::UnknownFile(path.to_string()))?
            .to_string();

        tracing::info!(path, model = self.llm.model(), "requesting file rewrite");
        let response = self
            .llm
            .complete(
                &prompt::build_patch_prompt(path, request, &original),
                &prompt::build_metaprogramming_system_prompt(),
                &self.options,
            )
            .await?;

        let proposed = prompt::clean_patch_response(&response);
        if proposed.is_empty() {
            return Err(QcosError::Llm(
                "model returned no file content".into(),
            ));
        }

        let script = qcos_difflens::compute_diff(&original, &proposed);
        tracing::debug!(path, stats = %script.stats(), "patch proposed");
        Ok(PatchProposal {
            file_path: path.to_string(),
            original,
            proposed,
            script,
        })
    }
}

/// A proposed rewrite awaiting review.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchProposal {
    pub file_path: String,
    pub original: String,
    pub proposed: String,
    /// Line diff from `original` to `proposed`.
    pub script: EditScript,
}

impl PatchProposal {
    pub fn has_changes(&self) -> bool {
        self.script.has_changes()
    }

    /// Write the proposed content into `codebase`.
    pub fn apply<S: KeyValueTextStore>(
        self,
        codebase: &mut Codebase<S>,
    ) -> Result<AppliedPatch, QcosError> {
        codebase.write_file(&self.file_path, &self.proposed)?;
        let stats = self.script.stats();
        tracing::info!(path = %self.file_path, %stats, "patch applied");
        Ok(AppliedPatch {
            file_path: self.file_path,
            stats,
        })
    }

    pub fn reject(self) {
        tracing::info!(path = %self.file_path, "patch rejected");
    }
}

/// Outcome of [`PatchProposal::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPatch {
    pub file_path: String,
    pub stats: DiffStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcos_core::DiffLine;

    fn proposal(original: &str, proposed: &str) -> PatchProposal {
        PatchProposal {
            file_path: "App.tsx".into(),
            original: original.into(),
            proposed: proposed.into(),
            script: qcos_difflens::compute_diff(original, proposed),
        }
    }

    #[test]
    fn identical_rewrite_has_no_changes() {
        assert!(!proposal("a\nb", "a\nb").has_changes());
    }

    #[test]
    fn script_runs_from_original_to_proposed() {
        let p = proposal("line1\nline2\nline3", "line1\nlineX\nline3");
        assert!(p.has_changes());
        assert_eq!(
            p.script.lines(),
            &[
                DiffLine::context("line1"),
                DiffLine::removed("line2"),
                DiffLine::added("lineX"),
                DiffLine::context("line3"),
            ]
        );
    }
}
