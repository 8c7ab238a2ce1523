//! Stock attribute validators

use crate::schema::Validator;
use crate::types::{AttributePath, Diagnostics, Dynamic};
use regex::Regex;

/// Accepts only strings from a fixed set
pub struct StringOneOf {
    allowed: Vec<String>,
}

impl StringOneOf {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for StringOneOf {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.allowed.join(", "))
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Diagnostics) {
        let Some(s) = value.as_str() else {
            return;
        };
        if !self.allowed.iter().any(|a| a == s) {
            diagnostics.add_error(
                format!("{} has an invalid value", path),
                format!("Got '{}', {}", s, self.description()),
            );
        }
    }
}

/// Accepts strings matching a regular expression
pub struct StringPattern {
    pattern: Result<Regex, regex::Error>,
    description: String,
}

impl StringPattern {
    /// An invalid expression is reported as a diagnostic whenever the validator runs
    pub fn new(pattern: &str, description: &str) -> Self {
        Self {
            pattern: Regex::new(pattern),
            description: description.to_string(),
        }
    }

    pub fn digits() -> Self {
        Self::new(r"^[0-9]+$", "a string of digits")
    }
}

impl Validator for StringPattern {
    fn description(&self) -> String {
        format!("value must be {}", self.description)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Diagnostics) {
        let Some(s) = value.as_str() else {
            return;
        };
        match &self.pattern {
            Ok(re) if re.is_match(s) => {}
            Ok(_) => diagnostics.add_error(
                format!("{} must be {}", path, self.description),
                format!("Value '{}' does not match pattern", s),
            ),
            Err(e) => diagnostics.add_error(
                format!("{} has an unusable validator", path),
                e.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> AttributePath {
        AttributePath::new("identifier").attribute("col_id")
    }

    #[test]
    fn one_of_accepts_listed_value() {
        let validator = StringOneOf::new(["NDU", "Module"]);
        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::String("NDU".to_string()), &path(), &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn one_of_rejects_other_value() {
        let validator = StringOneOf::new(["NDU", "Module"]);
        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::String("Router".to_string()), &path(), &mut diags);

        assert!(diags.has_errors());
        assert!(diags[0].detail.contains("NDU, Module"));
    }

    #[test]
    fn digits_pattern() {
        let validator = StringPattern::digits();
        let mut diags = Diagnostics::new();

        validator.validate(&Dynamic::String("12".to_string()), &path(), &mut diags);
        assert!(diags.is_empty());

        validator.validate(&Dynamic::String("1a".to_string()), &path(), &mut diags);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("identifier.col_id"));
    }

    #[test]
    fn non_string_values_are_ignored() {
        let mut diags = Diagnostics::new();
        StringPattern::digits().validate(&Dynamic::Number(3.0), &path(), &mut diags);
        StringOneOf::new(["a"]).validate(&Dynamic::Bool(true), &path(), &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn broken_pattern_reports_itself() {
        let validator = StringPattern::new("(", "broken");
        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::String("x".to_string()), &path(), &mut diags);
        assert!(diags.has_errors());
    }
}
