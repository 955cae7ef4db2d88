use actix_web::http::header::{self, HeaderMap};

use anyhow::Context;

use secrecy::Secret;

const BASIC_AUTH_PREFIX: &str = "Basic ";

/// Login credentials presented by a staff member
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
}

impl Credentials {
    /// Extract credentials from the headers of a request
    pub fn from_headers(headers: &HeaderMap) -> anyhow::Result<Self> {
        // Get the authorization header value from the map
        let header_value = headers
            .get(header::AUTHORIZATION)
            .context("Missing authorization in header")?
            .to_str()?;
        // Match based on the prefix
        if header_value.starts_with(BASIC_AUTH_PREFIX) {
            Self::from_basic(header_value)
        } else {
            anyhow::bail!("Missing or unknown Authorization scheme")
        }
    }

    /// Extract credentials from a string formatted as 'Basic <base64 credentials>'
    pub fn from_basic(header_value: &str) -> anyhow::Result<Self> {
        use base64::Engine;
        // Strip the 'basic' prefix from the header
        let header_value = header_value
            .strip_prefix(BASIC_AUTH_PREFIX)
            .context("Authorization scheme not basic")?;
        // Base64 decode the credential string
        let decoded_value = base64::engine::general_purpose::STANDARD
            .decode(header_value)
            .context("Failed to decode authorization header")?;
        let decoded_value =
            String::from_utf8(decoded_value).context("Failed to decode authorization header")?;
        // Split the string by the colon, extract the credentials
        let mut matches = decoded_value.splitn(2, ':');
        let email = matches.next().context("Missing email in authorization")?;
        let password = matches
            .next()
            .context("Missing password in authorization")?;

        Ok(Self {
            email: email.into(),
            password: Secret::new(password.into()),
        })
    }
}
