//! Field-level validation applied by every entity constructor. These checks
//! never touch the database; uniqueness is the persistence layer's job.

use crate::error::{Error, Field, Result};

/// Institutional suffix every student and instructor email must contain.
pub const DEFAULT_EMAIL_DOMAIN: &str = "@mail.aub.edu";

/// Tunable parts of validation. The defaults reproduce the historical rules,
/// including rejecting an age of zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    pub email_domain: String,
    pub allow_zero_age: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            allow_zero_age: false,
        }
    }
}

impl ValidationRules {
    pub fn validate_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::invalid(Field::Name, "must not be empty"));
        }
        Ok(())
    }

    pub fn validate_age(&self, age: i64) -> Result<()> {
        if age < 0 {
            return Err(Error::invalid(Field::Age, "must not be negative"));
        }
        if age == 0 && !self.allow_zero_age {
            return Err(Error::invalid(Field::Age, "must be greater than zero"));
        }
        Ok(())
    }

    pub fn validate_email(&self, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(Error::invalid(Field::Email, "must not be empty"));
        }
        if !email.contains(self.email_domain.as_str()) {
            return Err(Error::invalid(
                Field::Email,
                format!("must contain {}", self.email_domain),
            ));
        }
        Ok(())
    }
}

/// Email check for link columns (registrations, course instructors), which are
/// written without going through an entity constructor. Returns the trimmed
/// address.
pub(crate) fn link_email(email: &str) -> Result<&str> {
    let email = email.trim();
    ValidationRules::default().validate_email(email)?;
    Ok(email)
}

/// ID fields share one rule regardless of rules configuration.
pub fn validate_id(field: Field, id: i64) -> Result<()> {
    if id <= 0 {
        return Err(Error::invalid(field, "must be a positive integer"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<()>) -> Option<Field> {
        match result {
            Err(Error::InvalidField { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn names_must_have_content() {
        let rules = ValidationRules::default();
        assert!(rules.validate_name("Alice").is_ok());
        assert_eq!(field_of(rules.validate_name("")), Some(Field::Name));
        assert_eq!(field_of(rules.validate_name("   ")), Some(Field::Name));
    }

    #[test]
    fn zero_and_negative_ages_are_rejected_by_default() {
        let rules = ValidationRules::default();
        assert!(rules.validate_age(20).is_ok());
        assert_eq!(field_of(rules.validate_age(0)), Some(Field::Age));
        assert_eq!(field_of(rules.validate_age(-3)), Some(Field::Age));
    }

    #[test]
    fn zero_age_can_be_allowed() {
        let rules = ValidationRules {
            allow_zero_age: true,
            ..ValidationRules::default()
        };
        assert!(rules.validate_age(0).is_ok());
        assert!(rules.validate_age(-1).is_err());
    }

    #[test]
    fn emails_need_the_institutional_domain() {
        let rules = ValidationRules::default();
        assert!(rules.validate_email("s@mail.aub.edu").is_ok());
        assert_eq!(field_of(rules.validate_email("")), Some(Field::Email));
        assert_eq!(
            field_of(rules.validate_email("s@gmail.com")),
            Some(Field::Email)
        );

        let custom = ValidationRules {
            email_domain: "@example.edu".to_string(),
            ..ValidationRules::default()
        };
        assert!(custom.validate_email("s@example.edu").is_ok());
        assert!(custom.validate_email("s@mail.aub.edu").is_err());
    }

    #[test]
    fn ids_must_be_positive() {
        assert!(validate_id(Field::CourseId, 101).is_ok());
        assert_eq!(
            field_of(validate_id(Field::CourseId, 0)),
            Some(Field::CourseId)
        );
        assert_eq!(
            field_of(validate_id(Field::StudentId, -5)),
            Some(Field::StudentId)
        );
    }
}
