use crate::{error::TransformError, transform::Transform};
use model::records::row::Record;
use std::sync::Arc;

/// Chains transforms left to right; the first rejection aborts the chain.
#[derive(Clone, Default)]
pub struct TransformPipeline {
    transforms: Vec<Arc<dyn Transform>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    pub fn add_transform<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

}

impl Transform for TransformPipeline {
    fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        let mut current = record.clone();
        for transform in &self.transforms {
            current = transform.apply(&current)?;
        }
        Ok(current)
    }
}

/// Passes records through unchanged. Used when a step declares no
/// transforms.
pub struct Identity;

impl Transform for Identity {
    fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        Ok(record.clone())
    }
}
