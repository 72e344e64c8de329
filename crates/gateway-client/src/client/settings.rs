//! Client settings

use std::fmt;
use std::time::Duration;

use gateway_common::AppConfig;

use crate::connection::GatewayUrl;
use crate::protocol::IdentifyProperties;
use crate::reconnect::BackoffPolicy;

/// Default upper bound of a member list window
pub const DEFAULT_MEMBER_LIST_RANGE: u32 = 99;
/// Default typing indicator lifetime
pub const DEFAULT_TYPING_EXPIRY: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ClientSettings {
    /// Resolved once; every reconnect reuses it verbatim
    pub url: GatewayUrl,
    pub token: Option<String>,
    pub properties: IdentifyProperties,
    pub member_list_range: u32,
    pub backoff: BackoffPolicy,
    pub typing_expiry: Duration,
}

impl ClientSettings {
    #[must_use]
    pub fn new(url: GatewayUrl) -> Self {
        Self {
            url,
            token: None,
            properties: IdentifyProperties::current(),
            member_list_range: DEFAULT_MEMBER_LIST_RANGE,
            backoff: BackoffPolicy::default(),
            typing_expiry: DEFAULT_TYPING_EXPIRY,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let gateway = &config.gateway;
        Self {
            url: GatewayUrl::resolve(&gateway.url, gateway.version, &gateway.encoding),
            token: gateway.token.clone(),
            properties: IdentifyProperties::current(),
            member_list_range: gateway.member_list_range,
            backoff: BackoffPolicy::from(&config.reconnect),
            typing_expiry: Duration::from_millis(config.typing.expiry_ms),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub fn with_typing_expiry(mut self, expiry: Duration) -> Self {
        self.typing_expiry = expiry;
        self
    }

    #[must_use]
    pub fn with_member_list_range(mut self, range_end: u32) -> Self {
        self.member_list_range = range_end;
        self
    }
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("member_list_range", &self.member_list_range)
            .field("backoff", &self.backoff)
            .field("typing_expiry", &self.typing_expiry)
            .finish_non_exhaustive()
    }
}
