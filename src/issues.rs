//! Issue collector shared by graph construction and validation.
//!
//! Expected-but-invalid metadata is collected here instead of raised, so
//! one build reports every problem it found across unrelated chains.
//! Unrecoverable invariant violations in our own data structures are
//! ordinary `anyhow` errors, not issues.

#[derive(Debug, Clone, Default)]
pub struct Issues {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Human-readable report of everything collected so far.
    pub fn report(&self) -> String {
        let mut out = String::new();
        if !self.errors.is_empty() {
            out.push_str(&format!("Found {} error(s):\n", self.errors.len()));
            for e in &self.errors {
                out.push_str(&format!("  - {}\n", e));
            }
        }
        if !self.warnings.is_empty() {
            out.push_str(&format!("Found {} warning(s):\n", self.warnings.len()));
            for w in &self.warnings {
                out.push_str(&format!("  - {}\n", w));
            }
        }
        out
    }
}
