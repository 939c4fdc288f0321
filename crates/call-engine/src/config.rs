use crate::collab::ConfigSource;

/// Builder-style configuration for the UA-server, the concrete shape of
/// the §6 "flat value bag" on the server side, mirroring
/// `siplink-client-core::ClientConfig`'s builder pattern.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub local_ip: String,
    pub local_port: u16,
    pub domain: String,
    pub realm: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            local_ip: "0.0.0.0".to_string(),
            local_port: 5060,
            domain: "localhost".to_string(),
            realm: None,
        }
    }
}

impl ServerConfig {
    pub fn new() -> ServerConfig {
        ServerConfig::default()
    }

    pub fn with_local_addr(mut self, ip: impl Into<String>, port: u16) -> Self {
        self.local_ip = ip.into();
        self.local_port = port;
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }
}

impl ConfigSource for ServerConfig {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            "local_ip" => Some(self.local_ip.clone()),
            "local_port" => Some(self.local_port.to_string()),
            "domain" => Some(self.domain.clone()),
            "realm" => self.realm.clone().or_else(|| Some(self.domain.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realm_falls_back_to_domain_when_unset() {
        let config = ServerConfig::new().with_domain("pbx.example.com");
        assert_eq!(config.realm(), "pbx.example.com");
    }

    #[test]
    fn explicit_realm_overrides_domain_fallback() {
        let config = ServerConfig::new().with_domain("pbx.example.com").with_realm("example.com");
        assert_eq!(config.realm(), "example.com");
    }
}
