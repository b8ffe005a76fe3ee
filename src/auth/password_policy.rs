/*!
 * # Password Policy Module
 *
 * Checks applied to every password chosen at signup, change and reset.
 * All failing checks are reported together so the caller can show one
 * joined message.
 */

use lazy_static::lazy_static;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("This password is too short. It must contain at least {min_length} characters.")]
    TooShort { min_length: usize },

    #[error("This password is too common.")]
    CommonPassword,

    #[error("This password is entirely numeric.")]
    EntirelyNumeric,

    #[error("The password is too similar to the {attribute}.")]
    SimilarToAttribute { attribute: String },
}

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub prevent_common_passwords: bool,
    pub prevent_numeric: bool,
    /// Attribute values shorter than this are ignored by the similarity check
    pub min_attribute_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            prevent_common_passwords: true,
            prevent_numeric: true,
            min_attribute_length: 3,
        }
    }
}

lazy_static! {
    static ref COMMON_PASSWORDS: HashSet<&'static str> = {
        let common = [
            "password", "123456", "123456789", "qwerty", "abc123", "password123",
            "admin", "letmein", "welcome", "monkey", "1234567890", "iloveyou",
            "princess", "rockyou", "1234567", "12345678", "password1", "123123",
            "football", "baseball", "welcome1", "jordan23", "superman", "michael",
            "whatever", "trustno1", "qwerty123", "test1234", "qazwsx", "1qaz2wsx",
            "q1w2e3r4", "asdfghjkl", "zxcvbnm", "asdf1234", "11111111", "00000000",
            "qwertyuiop", "sunshine", "passw0rd", "starwars", "dragon", "master",
            "shadow", "computer", "internet", "p@ssw0rd", "changeme", "iloveyou1",
        ];
        common.into_iter().collect()
    };
}

impl PasswordPolicy {
    /// Validate a password, collecting every failed rule.
    ///
    /// `attributes` pairs a human label ("email address") with the value the
    /// password must not resemble.
    pub fn validate(
        &self,
        password: &str,
        attributes: &[(&str, &str)],
    ) -> Result<(), Vec<PasswordPolicyError>> {
        let mut errors = Vec::new();

        if let Some(attribute) = attributes
            .iter()
            .find(|(_, value)| self.is_similar_to_attribute(password, value))
        {
            errors.push(PasswordPolicyError::SimilarToAttribute {
                attribute: attribute.0.to_string(),
            });
        }

        if password.chars().count() < self.min_length {
            errors.push(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        if self.prevent_common_passwords
            && COMMON_PASSWORDS.contains(password.trim().to_lowercase().as_str())
        {
            errors.push(PasswordPolicyError::CommonPassword);
        }

        if self.prevent_numeric
            && !password.is_empty()
            && password.chars().all(|c| c.is_ascii_digit())
        {
            errors.push(PasswordPolicyError::EntirelyNumeric);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and render failures as one space separated message
    pub fn check(&self, password: &str, attributes: &[(&str, &str)]) -> Result<(), String> {
        self.validate(password, attributes).map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    fn is_similar_to_attribute(&self, password: &str, value: &str) -> bool {
        let password_lower = password.to_lowercase();
        let value_lower = value.trim().to_lowercase();
        if value_lower.len() < self.min_attribute_length || password_lower.is_empty() {
            return false;
        }

        // Emails are compared whole and by their local part
        let mut parts: Vec<&str> = vec![value_lower.as_str()];
        parts.extend(
            value_lower
                .split(|c: char| !c.is_alphanumeric())
                .filter(|p| p.len() >= self.min_attribute_length),
        );

        parts.into_iter().any(|part| {
            password_lower == part
                || (password_lower.contains(part) && part.len() * 10 >= password_lower.len() * 7)
                || (part.contains(&password_lower) && password_lower.len() >= self.min_attribute_length)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_password() {
        let policy = PasswordPolicy::default();
        assert!(policy
            .validate("Harbor-Crane-42", &[("email address", "dispatch@example.com")])
            .is_ok());
    }

    #[test]
    fn reports_every_failed_rule() {
        let policy = PasswordPolicy::default();
        let errors = policy.validate("1234567", &[]).unwrap_err();
        assert!(errors.contains(&PasswordPolicyError::TooShort { min_length: 8 }));
        assert!(errors.contains(&PasswordPolicyError::CommonPassword));
        assert!(errors.contains(&PasswordPolicyError::EntirelyNumeric));
    }

    #[test]
    fn rejects_password_resembling_email() {
        let policy = PasswordPolicy::default();
        let message = policy
            .check("dispatcher", &[("email address", "dispatcher@example.com")])
            .unwrap_err();
        assert_eq!(message, "The password is too similar to the email address.");
    }

    #[test]
    fn short_attributes_are_ignored() {
        let policy = PasswordPolicy::default();
        assert!(policy
            .validate("Lorry-Route-99", &[("first name", "Lo")])
            .is_ok());
    }
}
