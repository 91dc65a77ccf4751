//! WhatsApp contact links built from the site's contact form.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone};
use pawcache_core::Error;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

const NOT_SPECIFIED: &str = "No especificado";

/// Characters a page's `encodeURIComponent` leaves as they are.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Tracking code for a service plan.
pub fn service_code(service_type: &str) -> &'static str {
    match service_type {
        "basico" => "CV-B1",
        "estandar" => "CV-E1",
        "premium" => "CV-P1",
        _ => "CV-X",
    }
}

/// Contact form fields, named as the page's form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub pet_type: Option<String>,
    #[serde(default)]
    pub pet_count: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Empty strings count as absent, as they do for the form.
fn filled(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in [("name", &self.name), ("phone", &self.phone)] {
            if value.trim().is_empty() {
                return Err(Error::InvalidInput(format!("{field} is required")));
            }
        }

        if let Some(email) = filled(&self.email).filter(|e| !EMAIL_RE.is_match(e)) {
            return Err(Error::InvalidInput(format!("invalid email: {email}")));
        }

        if filled(&self.service_type).is_none() {
            return Err(Error::InvalidInput("a service type must be selected".into()));
        }

        Ok(())
    }

    /// Reference: service code plus the last six digits of `now` in milliseconds.
    pub fn reference<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String {
        let code = service_code(filled(&self.service_type).unwrap_or_default());
        let millis = now.timestamp_millis().to_string();
        let tail = &millis[millis.len().saturating_sub(6)..];
        format!("{code}-{tail}")
    }

    /// Render the WhatsApp message text.
    pub fn format_message<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let or_default = |v: &str| if v.is_empty() { NOT_SPECIFIED.to_string() } else { v.to_string() };
        let service = filled(&self.service_type).unwrap_or(NOT_SPECIFIED);

        let mut message = String::from("🐾 *Nueva solicitud de CuidadoresVIP* 🐾\n");
        message.push_str(&format!("Ref: {}\n\n", self.reference(now)));

        message.push_str("👤 *Datos del cliente*\n");
        message.push_str(&format!("Nombre: {}\n", or_default(&self.name)));
        message.push_str(&format!("Teléfono: {}\n", or_default(&self.phone)));
        if let Some(email) = filled(&self.email) {
            message.push_str(&format!("Email: {email}\n"));
        }

        message.push_str("\n🐶 *Datos de la mascota*\n");
        message.push_str(&format!("Tipo: {}\n", filled(&self.pet_type).unwrap_or(NOT_SPECIFIED)));
        message.push_str(&format!("Cantidad: {}\n", filled(&self.pet_count).unwrap_or("1")));

        message.push_str("\n📋 *Servicio solicitado*\n");
        message.push_str(&format!("Plan: {}\n", capitalize(service)));

        if let Some(text) = filled(&self.message) {
            message.push_str(&format!("\n💬 *Mensaje*\n{text}\n"));
        }

        message.push_str("\n🔍 *Datos adicionales*\n");
        message.push_str(&format!("Fecha de solicitud: {}\n", now.format("%d/%m/%Y")));
        message.push_str("Origen: Sitio Web CuidadoresVIP\n");
        message
    }

    /// Validate the form and build the `wa.me` link for `number`.
    ///
    /// Non-digit characters (`+`, spaces) are dropped from the number. The
    /// message is percent-encoded as a URI component, so spaces become `%20`.
    pub fn whatsapp_link<Tz: TimeZone>(&self, number: &str, now: &DateTime<Tz>) -> Result<String, Error>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.validate()?;

        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(Error::InvalidInput(format!("invalid WhatsApp number: {number:?}")));
        }

        let text = self.format_message(now);
        Ok(format!("https://wa.me/{digits}?text={}", utf8_percent_encode(&text, URI_COMPONENT)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn form() -> ContactForm {
        ContactForm {
            name: "Ana Pérez".into(),
            phone: "+56 9 8765 4321".into(),
            service_type: Some("premium".into()),
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 7, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_service_codes() {
        assert_eq!(service_code("basico"), "CV-B1");
        assert_eq!(service_code("estandar"), "CV-E1");
        assert_eq!(service_code("premium"), "CV-P1");
        assert_eq!(service_code("platino"), "CV-X");
    }

    #[test]
    fn test_reference_uses_last_six_millis_digits() {
        let now = now();
        let millis = now.timestamp_millis().to_string();
        assert_eq!(form().reference(&now), format!("CV-P1-{}", &millis[millis.len() - 6..]));
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(form().validate().is_ok());

        let missing_name = ContactForm { name: "  ".into(), ..form() };
        assert!(matches!(missing_name.validate(), Err(Error::InvalidInput(m)) if m.contains("name")));

        let missing_phone = ContactForm { phone: String::new(), ..form() };
        assert!(matches!(missing_phone.validate(), Err(Error::InvalidInput(m)) if m.contains("phone")));

        let no_service = ContactForm { service_type: None, ..form() };
        assert!(no_service.validate().is_err());
    }

    #[test]
    fn test_validate_email() {
        let ok = ContactForm { email: Some("ana@correo.cl".into()), ..form() };
        assert!(ok.validate().is_ok());

        let empty = ContactForm { email: Some(String::new()), ..form() };
        assert!(empty.validate().is_ok());

        for bad in ["ana@correo", "ana correo@x.cl", "@x.cl"] {
            let form = ContactForm { email: Some(bad.into()), ..form() };
            assert!(form.validate().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_format_message_defaults() {
        let text = form().format_message(&now());
        assert!(text.starts_with("🐾 *Nueva solicitud de CuidadoresVIP* 🐾\nRef: CV-P1-"));
        assert!(text.contains("Nombre: Ana Pérez\n"));
        assert!(text.contains("Tipo: No especificado\n"));
        assert!(text.contains("Cantidad: 1\n"));
        assert!(text.contains("Plan: Premium\n"));
        assert!(text.contains("Fecha de solicitud: 07/03/2026\n"));
        assert!(text.ends_with("Origen: Sitio Web CuidadoresVIP\n"));
        assert!(!text.contains("Email:"));
        assert!(!text.contains("*Mensaje*"));
    }

    #[test]
    fn test_format_message_optional_sections() {
        let form = ContactForm {
            email: Some("ana@correo.cl".into()),
            pet_type: Some("gato".into()),
            pet_count: Some("2".into()),
            message: Some("Viajo en febrero".into()),
            ..form()
        };
        let text = form.format_message(&now());
        assert!(text.contains("Teléfono: +56 9 8765 4321\nEmail: ana@correo.cl\n"));
        assert!(text.contains("Tipo: gato\nCantidad: 2\n"));
        assert!(text.contains("\n💬 *Mensaje*\nViajo en febrero\n"));
    }

    #[test]
    fn test_whatsapp_link() {
        let link = url::Url::parse(&form().whatsapp_link("+56 9 1234 5678", &now()).unwrap()).unwrap();
        assert_eq!(link.host_str(), Some("wa.me"));
        assert_eq!(link.path(), "/56912345678");

        let (key, text) = link.query_pairs().next().unwrap();
        assert_eq!(key, "text");
        assert_eq!(text, form().format_message(&now()));
    }

    #[test]
    fn test_whatsapp_link_encodes_like_uri_component() {
        let link = form().whatsapp_link("56912345678", &now()).unwrap();
        let query = link.split_once("?text=").unwrap().1;

        assert!(query.starts_with("%F0%9F%90%BE%20*Nueva%20solicitud%20de%20CuidadoresVIP*%20%F0%9F%90%BE%0ARef%3A%20CV-P1-"));
        assert!(query.contains("Nombre%3A%20Ana%20P%C3%A9rez%0A"));
        assert!(!query.contains('+'));
        assert!(!query.contains(' '));
    }

    #[test]
    fn test_whatsapp_link_rejects_invalid_form() {
        let unselected = ContactForm { service_type: None, ..form() };
        assert!(unselected.whatsapp_link("+56912345678", &now()).is_err());
        assert!(form().whatsapp_link("n/a", &now()).is_err());
    }

    #[test]
    fn test_deserialize_form_field_names() {
        let form: ContactForm = serde_json::from_str(
            r#"{"name":"Luis","phone":"123","pet-type":"perro","pet-count":"3","service-type":"basico"}"#,
        )
        .unwrap();
        assert_eq!(form.pet_type.as_deref(), Some("perro"));
        assert_eq!(form.pet_count.as_deref(), Some("3"));
        assert_eq!(form.service_type.as_deref(), Some("basico"));
        assert_eq!(form.email, None);
    }
}
