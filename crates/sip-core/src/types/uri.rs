use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Sip,
    Sips,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Sip => 5060,
            Scheme::Sips => 5061,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Sip => "sip",
            Scheme::Sips => "sips",
        }
    }
}

/// A SIP or SIPS URI: `sip:user@host:port;param=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SipUri {
    pub scheme: Scheme,
    pub user: Option<String>,
    pub host: String,
    /// `None` means "use the scheme default" (5060/5061) and is kept
    /// distinct from an explicit port so round-tripping omits it, matching
    /// S2's `build_sip_uri(host="h") => "sip:h"`.
    pub port: Option<u16>,
    pub params: BTreeMap<String, String>,
}

impl SipUri {
    pub fn new(host: impl Into<String>) -> SipUri {
        SipUri {
            scheme: Scheme::Sip,
            user: None,
            host: host.into(),
            port: None,
            params: BTreeMap::new(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> SipUri {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> SipUri {
        self.port = Some(port);
        self
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    pub fn parse(s: &str) -> Result<SipUri, Error> {
        let s = s.trim();
        let (scheme, rest) = if let Some(rest) = s.strip_prefix("sips:") {
            (Scheme::Sips, rest)
        } else if let Some(rest) = s.strip_prefix("sip:") {
            (Scheme::Sip, rest)
        } else {
            return Err(Error::MalformedUri(s.to_string()));
        };

        let mut params = BTreeMap::new();
        let (userhost_port, param_str) = match rest.split_once(';') {
            Some((a, b)) => (a, Some(b)),
            None => (rest, None),
        };
        if let Some(param_str) = param_str {
            for part in param_str.split(';') {
                if part.is_empty() {
                    continue;
                }
                match part.split_once('=') {
                    Some((k, v)) => {
                        params.insert(k.to_string(), v.to_string());
                    }
                    None => {
                        params.insert(part.to_string(), String::new());
                    }
                }
            }
        }

        let (user, hostport) = match userhost_port.split_once('@') {
            Some((u, h)) => (Some(u.to_string()), h),
            None => (None, userhost_port),
        };

        if hostport.is_empty() {
            return Err(Error::MalformedUri(s.to_string()));
        }

        let (host, port) = match hostport.split_once(':') {
            Some((h, p)) => {
                let port: u16 = p
                    .parse()
                    .map_err(|_| Error::MalformedUri(s.to_string()))?;
                (h.to_string(), Some(port))
            }
            None => (hostport.to_string(), None),
        };

        Ok(SipUri {
            scheme,
            user,
            host,
            port,
            params,
        })
    }
}

impl fmt::Display for SipUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme.as_str())?;
        if let Some(user) = &self.user {
            write!(f, "{}@", user)?;
        }
        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        for (k, v) in &self.params {
            if v.is_empty() {
                write!(f, ";{}", k)?;
            } else {
                write!(f, ";{}={}", k, v)?;
            }
        }
        Ok(())
    }
}
