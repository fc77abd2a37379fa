//! The consultation request form and the relay that forwards it by email.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use url::Url;

use crate::client::{error_from_response, transport_error};
use crate::error::{Error, Result};
use crate::observability::{CONTACT_FAILURES, CONTACT_SUBMISSIONS};

/// Where submissions are relayed unless configured otherwise.
pub const DEFAULT_RELAY_URL: &str = "https://formsubmit.co/kizazitechhnologies@gmail.com";

/// Subject line of the relayed email.
pub const SUBJECT: &str = "New Consultation Request";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The service a visitor is asking about.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ServiceInterest {
    /// Anything not covered below.
    #[default]
    GeneralInquiry,
    /// AI and process automation.
    AiAutomation,
    /// Software and app development.
    SoftwareDevelopment,
    /// Digital transformation consulting.
    DigitalTransformation,
    /// Innovation programmes and training.
    InnovationTraining,
}

impl ServiceInterest {
    /// Every option, in form order.
    pub const ALL: [ServiceInterest; 5] = [
        ServiceInterest::GeneralInquiry,
        ServiceInterest::AiAutomation,
        ServiceInterest::SoftwareDevelopment,
        ServiceInterest::DigitalTransformation,
        ServiceInterest::InnovationTraining,
    ];

    /// The value submitted in the `service` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceInterest::GeneralInquiry => "General Inquiry",
            ServiceInterest::AiAutomation => "AI & Automation",
            ServiceInterest::SoftwareDevelopment => "Software Development",
            ServiceInterest::DigitalTransformation => "Digital Transformation",
            ServiceInterest::InnovationTraining => "Innovation/Training",
        }
    }
}

impl fmt::Display for ServiceInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceInterest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::validation(
                    format!("unknown service '{s}'"),
                    Some("service".to_string()),
                )
            })
    }
}

/// One filled-in consultation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRequest {
    /// Submitted as `firstName`.
    pub first_name: String,
    /// Submitted as `lastName`.
    pub last_name: String,
    /// Reply-to address.
    pub email: String,
    /// The service the visitor is interested in.
    pub service: ServiceInterest,
    /// Free-form message body.
    pub message: String,
}

impl ContactRequest {
    /// Check required fields and the email shape.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation(
                    format!("{field} is required"),
                    Some(field.to_string()),
                ));
            }
        }
        match self.email.trim().split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(Error::validation(
                format!("'{}' is not an email address", self.email.trim()),
                Some("email".to_string()),
            )),
        }
    }

    /// The urlencoded form body, in submission order.
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("_subject", SUBJECT),
            ("_captcha", "false"),
            ("firstName", self.first_name.trim()),
            ("lastName", self.last_name.trim()),
            ("email", self.email.trim()),
            ("service", self.service.as_str()),
            ("message", self.message.trim()),
        ]
    }
}

/// Posts [`ContactRequest`]s to an email relay.
#[derive(Debug, Clone)]
pub struct ContactRelay {
    client: ReqwestClient,
    endpoint: Url,
    timeout: Duration,
}

impl ContactRelay {
    /// A relay posting to [`DEFAULT_RELAY_URL`].
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    /// A relay with a custom endpoint and request timeout.
    pub fn with_options(endpoint: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = Url::parse(endpoint.unwrap_or(DEFAULT_RELAY_URL))?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// The URL submissions are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Validate and relay one request.
    ///
    /// Any success status counts as delivered; the body is not read.
    pub async fn submit(&self, request: &ContactRequest) -> Result<()> {
        let result = self.submit_once(request).await;
        match &result {
            Ok(()) => CONTACT_SUBMISSIONS.click(),
            Err(err) => {
                CONTACT_FAILURES.click();
                log::warn!("contact submission failed: {err}");
            }
        }
        result
    }

    async fn submit_once(&self, request: &ContactRequest) -> Result<()> {
        request.validate()?;
        log::debug!("POST contact form to {}", self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&request.form_fields())
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }
}
