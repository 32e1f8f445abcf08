// src/mode.rs

//! Production / development mode decisions.

/// Resolves tri-state watch/compress settings against the production flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeResolver {
    production: bool,
}

impl ModeResolver {
    pub fn new(production: bool) -> Self {
        Self { production }
    }

    /// Production mode is on when `--production` was passed or any positional
    /// argument equals `production`.
    pub fn from_invocation<S: AsRef<str>>(flag: bool, positional: &[S]) -> Self {
        let production = flag || positional.iter().any(|arg| arg.as_ref() == "production");
        Self { production }
    }

    pub fn is_production(&self) -> bool {
        self.production
    }

    /// Explicit setting wins; otherwise watch in development only.
    pub fn effective_watch(&self, explicit: Option<bool>) -> bool {
        explicit.unwrap_or(!self.production)
    }

    /// Explicit setting wins; otherwise compress in production only.
    pub fn effective_compress(&self, explicit: Option<bool>) -> bool {
        explicit.unwrap_or(self.production)
    }
}
