use crate::error::Error;

/// The slice of SDP this stack actually interprets: enough to emit an
/// audio-only offer and to recover the remote RTP endpoint from an answer.
/// Anything else in the body is preserved verbatim but never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sdp {
    pub raw: String,
}

impl Sdp {
    /// Builds the fixed PCMU/PCMA offer described in the SDP mini-codec.
    pub fn offer(local_ip: &str, rtp_port: u16) -> Sdp {
        let raw = format!(
            "v=0\r\n\
             o=- 0 0 IN IP4 {ip}\r\n\
             s=SIP Call\r\n\
             c=IN IP4 {ip}\r\n\
             t=0 0\r\n\
             m=audio {port} RTP/AVP 0 8\r\n\
             a=rtpmap:0 PCMU/8000\r\n\
             a=rtpmap:8 PCMA/8000\r\n\
             a=sendrecv\r\n",
            ip = local_ip,
            port = rtp_port,
        );
        Sdp { raw }
    }

    pub fn from_raw(raw: impl Into<String>) -> Sdp {
        Sdp { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Extracts the IP from the first `c=IN IP4 <ip>` line.
    pub fn connection_ip(&self) -> Result<String, Error> {
        for line in self.raw.lines() {
            if let Some(rest) = line.strip_prefix("c=IN IP4 ") {
                return Ok(rest.trim().to_string());
            }
        }
        Err(Error::MalformedSdp("no c= line".to_string()))
    }

    /// Extracts the port from the first `m=audio <port> ...` line.
    pub fn audio_port(&self) -> Result<u16, Error> {
        for line in self.raw.lines() {
            if let Some(rest) = line.strip_prefix("m=audio ") {
                let port_str = rest.split_whitespace().next().unwrap_or("");
                return port_str
                    .parse()
                    .map_err(|_| Error::MalformedSdp(format!("bad m= port: {rest}")));
            }
        }
        Err(Error::MalformedSdp("no m=audio line".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_carries_fixed_codec_pair() {
        let sdp = Sdp::offer("10.0.0.5", 20000);
        assert!(sdp.raw.contains("m=audio 20000 RTP/AVP 0 8"));
        assert!(sdp.raw.contains("a=rtpmap:0 PCMU/8000"));
        assert!(sdp.raw.contains("a=rtpmap:8 PCMA/8000"));
        assert_eq!(sdp.connection_ip().unwrap(), "10.0.0.5");
        assert_eq!(sdp.audio_port().unwrap(), 20000);
    }

    #[test]
    fn parses_answer_endpoint() {
        let sdp = Sdp::from_raw("v=0\r\no=- 1 1 IN IP4 1.2.3.4\r\nc=IN IP4 1.2.3.4\r\nm=audio 30000 RTP/AVP 0\r\n");
        assert_eq!(sdp.connection_ip().unwrap(), "1.2.3.4");
        assert_eq!(sdp.audio_port().unwrap(), 30000);
    }
}
