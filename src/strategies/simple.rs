//! Strategies that pick one of the two buffers as-is.

use super::{Strategy, StrategyInput};
use crate::error::Result;

/// Always replaces the target with the template.
pub struct Overwrite<'a> {
    input: StrategyInput<'a>,
}

impl<'a> Overwrite<'a> {
    pub fn new(input: StrategyInput<'a>) -> Self {
        Self { input }
    }
}

impl Strategy for Overwrite<'_> {
    fn apply(&self) -> Result<Vec<u8>> {
        Ok(self.input.template_contents.to_vec())
    }
}

/// Writes the template only when the target file does not exist yet.
pub struct IfMissing<'a> {
    input: StrategyInput<'a>,
}

impl<'a> IfMissing<'a> {
    pub fn new(input: StrategyInput<'a>) -> Self {
        Self { input }
    }
}

impl Strategy for IfMissing<'_> {
    fn apply(&self) -> Result<Vec<u8>> {
        Ok(self
            .input
            .target_contents
            .unwrap_or(self.input.template_contents)
            .to_vec())
    }
}
