//! Contact-form payload types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Raw form payload as posted by the site. Fields default to empty so a
/// missing field becomes a validation error, not a parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub empresa: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub mensaje: String,
}

/// A validated submission. Transient: handed to the mailer, then dropped.
#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub nombre: String,
    pub empresa: String,
    pub email: String,
    pub telefono: Option<String>,
    pub mensaje: String,
    pub timestamp: DateTime<Utc>,
}

impl ContactForm {
    /// Trim and stamp the form into a submission.
    pub fn into_submission(self, timestamp: DateTime<Utc>) -> ContactSubmission {
        ContactSubmission {
            nombre: self.nombre.trim().to_string(),
            empresa: self.empresa.trim().to_string(),
            email: self.email.trim().to_string(),
            telefono: self
                .telefono
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            mensaje: self.mensaje.trim().to_string(),
            timestamp,
        }
    }
}
