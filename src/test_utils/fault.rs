//! Module that contains utility functions for fault injection in test code

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    Always,
    Never,
    /// fail the next call only, then behave as [`When::Never`]
    Once,
}

/// A fault is an error that is returned based on the [`When`]
#[derive(Clone, Debug)]
pub struct Fault {
    pub when: When,
}

impl Default for Fault {
    fn default() -> Self {
        Self { when: When::Never }
    }
}

impl Fault {
    /// Returns whether the current call must fail, consuming a [`When::Once`] fault
    pub fn trigger(&mut self) -> bool {
        match self.when {
            When::Always => true,
            When::Never => false,
            When::Once => {
                self.when = When::Never;
                true
            }
        }
    }
}
