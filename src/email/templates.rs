//! HTML bodies for the two contact-form emails.

use crate::contact::types::ContactSubmission;
use crate::email::service::OutboundEmail;

/// Escape user-supplied text for interpolation into HTML.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Notification sent to the site administrator.
pub fn admin_notification(submission: &ContactSubmission, to: &str) -> OutboundEmail {
    let telefono = submission
        .telefono
        .as_deref()
        .map(|t| {
            format!(
                "<p><strong>Teléfono:</strong> {}</p>",
                escape_html(t)
            )
        })
        .unwrap_or_default();

    let html = format!(
        "<h2>Nuevo Mensaje de Contacto</h2>\
         <p><strong>Nombre:</strong> {nombre}</p>\
         <p><strong>Empresa:</strong> {empresa}</p>\
         <p><strong>Email:</strong> {email}</p>\
         {telefono}\
         <p><strong>Fecha:</strong> {fecha}</p>\
         <h3>Mensaje:</h3>\
         <p>{mensaje}</p>\
         <hr>\
         <p>Este mensaje fue enviado desde el formulario de contacto de \
         <strong>Comercio y Negocios Latam SAC</strong></p>",
        nombre = escape_html(&submission.nombre),
        empresa = escape_html(&submission.empresa),
        email = escape_html(&submission.email),
        telefono = telefono,
        fecha = submission.timestamp.format("%d/%m/%Y %H:%M UTC"),
        mensaje = escape_html(&submission.mensaje).replace('\n', "<br>"),
    );

    OutboundEmail {
        to: to.to_string(),
        subject: format!(
            "Nuevo contacto desde el sitio web - {}",
            submission.empresa
        ),
        html,
    }
}

/// Acknowledgment sent back to the person who submitted the form.
pub fn user_acknowledgment(submission: &ContactSubmission) -> OutboundEmail {
    let html = format!(
        "<h1>¡Gracias por contactarnos!</h1>\
         <p>Hola <strong>{nombre}</strong>,</p>\
         <p>Hemos recibido tu mensaje y nos pondremos en contacto contigo \
         lo antes posible.</p>\
         <p>En <strong>Comercio y Negocios Latam SAC</strong> estamos \
         comprometidos con impulsar el crecimiento de tu empresa en mercados \
         nacionales e internacionales.</p>\
         <p>Saludos cordiales,<br>\
         <strong>El equipo de Comercio y Negocios Latam SAC</strong><br>\
         <em>Una empresa del Grupo CASNU</em></p>",
        nombre = escape_html(&submission.nombre),
    );

    OutboundEmail {
        to: submission.email.clone(),
        subject: "Hemos recibido tu mensaje - Comercio y Negocios Latam SAC".to_string(),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            nombre: "Ana <script>alert(1)</script>".into(),
            empresa: "ACME".into(),
            email: "ana@example.com".into(),
            telefono: Some("+51 999 999 999".into()),
            mensaje: "Hola\nMundo".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_admin_email_escapes_user_input() {
        let mail = admin_notification(&submission(), "admin@example.com");
        assert_eq!(mail.to, "admin@example.com");
        assert!(!mail.html.contains("<script>"));
        assert!(mail.html.contains("&lt;script&gt;"));
        assert!(mail.html.contains("Hola<br>Mundo"));
    }

    #[test]
    fn test_user_ack_addresses_submitter() {
        let mail = user_acknowledgment(&submission());
        assert_eq!(mail.to, "ana@example.com");
        assert!(mail.subject.contains("Hemos recibido tu mensaje"));
    }

    #[test]
    fn test_phone_section_optional() {
        let mut sub = submission();
        sub.telefono = None;
        let mail = admin_notification(&sub, "admin@example.com");
        assert!(!mail.html.contains("Teléfono"));
    }
}
