//! Plan artifact name templates.
//!
//! A template is literal text with `{placeholder}` substitutions:
//!
//! - `{timestamp}`: UTC time as `%Y%m%d%H%M%S`
//! - `{unix}`: seconds since the Unix epoch
//! - `{uuid}`: a random v4 UUID without hyphens
//!
//! `{{` and `}}` produce literal braces.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{ConfigError, Result};

/// Configuration key the template is read from.
const KEY: &str = "changeset.name-format";

/// A validated plan artifact name template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFormat {
    template: String,
}

impl NameFormat {
    /// Parses and validates a template.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown placeholders, unbalanced braces, or a
    /// template that cannot produce a plain file name.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let format = Self {
            template: template.into(),
        };
        format.render(DateTime::<Utc>::UNIX_EPOCH)?;
        Ok(format)
    }

    /// Renders the artifact basename for the given instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is malformed.
    pub fn render(&self, now: DateTime<Utc>) -> Result<String> {
        let mut name = String::with_capacity(self.template.len() + 16);
        let mut chars = self.template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    name.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    name.push('}');
                }
                '{' => {
                    let mut placeholder = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        placeholder.push(inner);
                    }
                    if !closed {
                        return Err(ConfigError::invalid(KEY, "unterminated placeholder").into());
                    }
                    match placeholder.as_str() {
                        "timestamp" => name.push_str(&now.format("%Y%m%d%H%M%S").to_string()),
                        "unix" => name.push_str(&now.timestamp().to_string()),
                        "uuid" => name.push_str(&Uuid::new_v4().simple().to_string()),
                        other => {
                            return Err(ConfigError::invalid(
                                KEY,
                                format!("unknown placeholder {{{other}}}"),
                            )
                            .into());
                        }
                    }
                }
                '}' => {
                    return Err(ConfigError::invalid(KEY, "unmatched '}'").into());
                }
                other => name.push(other),
            }
        }

        if name.is_empty() || name == "." || name == ".." {
            return Err(ConfigError::invalid(KEY, "template renders an empty name").into());
        }
        if name.contains(['/', '\\']) {
            return Err(ConfigError::invalid(KEY, "name must not contain path separators").into());
        }

        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .single()
            .expect("valid instant")
    }

    #[test]
    fn test_timestamp_placeholder() {
        let format = NameFormat::new("plan-{timestamp}.tfplan").expect("valid template");
        let name = format.render(instant()).expect("renders");
        assert_eq!(name, "plan-20240309140507.tfplan");
    }

    #[test]
    fn test_unix_placeholder_and_escapes() {
        let format = NameFormat::new("{{x}}-{unix}").expect("valid template");
        let name = format.render(instant()).expect("renders");
        assert_eq!(name, format!("{{x}}-{}", instant().timestamp()));
    }

    #[test]
    fn test_uuid_placeholder_is_unique() {
        let format = NameFormat::new("plan-{uuid}").expect("valid template");
        let first = format.render(instant()).expect("renders");
        let second = format.render(instant()).expect("renders");
        assert_ne!(first, second);
        assert_eq!(first.len(), "plan-".len() + 32);
    }

    #[test]
    fn test_rejects_malformed_templates() {
        assert!(NameFormat::new("plan-{date}").is_err());
        assert!(NameFormat::new("plan-{timestamp").is_err());
        assert!(NameFormat::new("plan-}").is_err());
        assert!(NameFormat::new("").is_err());
        assert!(NameFormat::new("../plan").is_err());
    }
}
