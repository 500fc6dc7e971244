//! Contact-form validation and delivery.

use crate::contact::types::ContactForm;
use crate::contact::types::ContactSubmission;
use crate::email::templates;
use crate::email::Mailer;
use crate::error::ApiError;
use crate::observability::metrics;

/// Conservative email shape check: one `@`, non-empty local part, dotted
/// domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// Required fields must be present and non-empty; the email must look like
/// an email.
pub fn validate(form: &ContactForm) -> Result<(), ApiError> {
    let required = [&form.nombre, &form.empresa, &form.email, &form.mensaje];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(ApiError::Validation(
            "Todos los campos requeridos deben estar completos".to_string(),
        ));
    }
    if !is_valid_email(form.email.trim()) {
        return Err(ApiError::Validation(
            "El formato del email no es válido".to_string(),
        ));
    }
    Ok(())
}

/// Deliver the admin notification and the user acknowledgment. Either
/// failure fails the whole submission; there is no partial success.
pub async fn process(
    mailer: &dyn Mailer,
    admin_to: &str,
    submission: &ContactSubmission,
) -> Result<(), ApiError> {
    for message in [
        templates::admin_notification(submission, admin_to),
        templates::user_acknowledgment(submission),
    ] {
        if let Err(e) = mailer.send(&message).await {
            metrics::record_email("failed");
            return Err(ApiError::Delivery(format!(
                "contact email to {} failed: {}",
                message.to, e
            )));
        }
        metrics::record_email("sent");
    }

    tracing::info!(
        nombre = %submission.nombre,
        email = %submission.email,
        "Contact submission delivered"
    );
    Ok(())
}
