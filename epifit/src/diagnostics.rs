use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// A non-fatal observation made during a computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub context: String,
    pub message: String,
}

/// Accumulated diagnostics, returned alongside results.
///
/// Every pushed entry is mirrored to the `log` facade; control flow never
/// depends on what is recorded here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, context: &str, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}: {}", context, message);
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            context: context.to_string(),
            message,
        });
    }

    pub fn info(&mut self, context: &str, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{}: {}", context, message);
        self.entries.push(Diagnostic {
            severity: Severity::Info,
            context: context.to_string(),
            message,
        });
    }

    /// Warn when `value` is negative or not finite. Returns true if a warning was recorded.
    pub fn check_value(&mut self, context: &str, name: &str, day: usize, value: f64) -> bool {
        if !value.is_finite() {
            self.warn(context, format!("{} is not finite ({}) at day {}", name, value, day));
            true
        } else if value < 0.0 {
            self.warn(context, format!("{} is negative ({:.6e}) at day {}", name, value, day));
            true
        } else {
            false
        }
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value_flags_negative_and_non_finite() {
        let mut d = Diagnostics::new();
        assert!(!d.check_value("idp", "S", 2, 0.0));
        assert!(d.check_value("idp", "S", 2, -1.0));
        assert!(d.check_value("idp", "beta", 3, f64::NAN));
        assert!(d.check_value("idp", "sigma", 3, f64::INFINITY));
        assert_eq!(d.warnings().count(), 3);
        assert!(d.entries()[1].message.contains("beta"));
    }
}
