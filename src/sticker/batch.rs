//! Batch generation.
//!
//! Each plate is an independent invocation: one plate's failure is recorded
//! on its own item and never aborts siblings. The report carries
//! completed/total counters for progress display.

use tracing::warn;

use crate::validate;

use super::{StickerArtifact, StickerError, StickerPipeline, StickerRequest};

#[derive(Debug, thiserror::Error)]
pub enum BatchItemError {
    #[error("license plate invalid after sanitization ({0:?})")]
    InvalidPlate(String),
    #[error(transparent)]
    Generation(#[from] StickerError),
}

/// One plate's outcome. `plate` is the sanitized form, echoed even when
/// invalid so the caller can show what was actually checked.
#[derive(Debug)]
pub struct BatchItem {
    pub input: String,
    pub plate: String,
    pub outcome: Result<StickerArtifact, BatchItemError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    pub total: usize,
    pub completed: usize,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// `(filename, png)` pairs of the successful items, ready for archiving.
    pub fn artifacts(&self) -> Vec<(&str, &[u8])> {
        self.items
            .iter()
            .filter_map(|i| i.outcome.as_ref().ok())
            .map(|a| (a.filename.as_str(), a.png.as_slice()))
            .collect()
    }
}

impl StickerPipeline {
    /// Generate stickers for every plate in `inputs`.
    ///
    /// The template is resolved once, up front — an unknown name fails the
    /// whole call before any per-plate work. After that, failures are
    /// per-item only.
    pub async fn generate_batch(
        &self,
        inputs: &[String],
        template: &str,
    ) -> Result<BatchReport, StickerError> {
        super::template::get(template)?;

        let mut report = BatchReport {
            total: inputs.len(),
            ..Default::default()
        };

        for input in inputs {
            let checked = validate::check_plate(input);
            let outcome = if !checked.is_valid {
                warn!(input = %input, sanitized = %checked.value, "skipping invalid plate");
                Err(BatchItemError::InvalidPlate(checked.value.clone()))
            } else {
                let req = StickerRequest {
                    plate: checked.value.clone(),
                    template: template.to_string(),
                    ..Default::default()
                };
                self.generate(&req).await.map_err(BatchItemError::from)
            };
            report.items.push(BatchItem {
                input: input.clone(),
                plate: checked.value,
                outcome,
            });
            report.completed += 1;
        }
        Ok(report)
    }
}
