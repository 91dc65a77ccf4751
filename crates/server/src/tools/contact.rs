//! contact_link tool implementation.
//!
//! Builds the WhatsApp link the contact form redirects to.

use chrono::Local;
use pawcache_client::ContactForm;
use pawcache_core::{AppConfig, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the contact_link tool; field names follow the contact form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct ContactLinkParams {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub pet_type: Option<String>,
    #[serde(default)]
    pub pet_count: Option<String>,
    /// "basico", "estandar" or "premium".
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<ContactLinkParams> for ContactForm {
    fn from(p: ContactLinkParams) -> Self {
        ContactForm {
            name: p.name,
            phone: p.phone,
            email: p.email,
            pet_type: p.pet_type,
            pet_count: p.pet_count,
            service_type: p.service_type,
            message: p.message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContactLinkOutput {
    pub reference: String,
    pub message: String,
    pub link: String,
}

pub async fn contact_link_impl(config: &AppConfig, params: ContactLinkParams) -> Result<CallToolResult, McpError> {
    let number = config
        .require_whatsapp_number()
        .map_err(|e| Error::InvalidInput(e.to_string()))?;
    let form = ContactForm::from(params);
    let now = Local::now();

    let link = form.whatsapp_link(number, &now)?;
    json_result(&ContactLinkOutput {
        reference: form.reference(&now),
        message: form.format_message(&now),
        link: link.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{app_config, output_json};

    fn params() -> ContactLinkParams {
        ContactLinkParams {
            name: "Luis".into(),
            phone: "+56 9 1111 2222".into(),
            service_type: Some("estandar".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_contact_link() {
        let output = output_json(&contact_link_impl(&app_config(), params()).await.unwrap());
        assert!(output["reference"].as_str().unwrap().starts_with("CV-E1-"));
        assert!(output["link"].as_str().unwrap().starts_with("https://wa.me/56912345678?text="));
        assert!(output["message"].as_str().unwrap().contains("Plan: Estandar\n"));
    }

    #[tokio::test]
    async fn test_contact_link_invalid_form() {
        let p = ContactLinkParams { email: Some("luis@".into()), ..params() };
        let err = contact_link_impl(&app_config(), p).await.unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode(-32602));
    }

    #[tokio::test]
    async fn test_contact_link_requires_number() {
        let config = AppConfig { whatsapp_number: String::new(), ..app_config() };
        assert!(contact_link_impl(&config, params()).await.is_err());
    }
}
