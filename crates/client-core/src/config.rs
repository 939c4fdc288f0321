/// Builder-style configuration for the UA-client, the concrete shape of
/// the "flat value bag" external configuration collaborator: each
/// recognized key (`server_host`, `server_port`, `username`, `password`,
/// `domain`, `local_ip`, `local_port`) maps to one setter here, with the
/// same defaults the bag documents.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_host: String,
    pub server_port: u16,
    pub username: String,
    pub password: String,
    pub domain: String,
    pub local_ip: String,
    pub local_port: u16,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 5060,
            username: String::new(),
            password: String::new(),
            domain: "127.0.0.1".to_string(),
            local_ip: "0.0.0.0".to_string(),
            local_port: 0,
            user_agent: "siplink-client-core".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> ClientConfig {
        ClientConfig::default()
    }

    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.server_host = host.into();
        self.server_port = port;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_local_addr(mut self, ip: impl Into<String>, port: u16) -> Self {
        self.local_ip = ip.into();
        self.local_port = port;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
