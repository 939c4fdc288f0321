use crate::types::header::HeaderList;
use crate::types::method::Method;
use crate::types::status::StatusCode;

/// An in-memory SIP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SipRequest {
    pub method: Method,
    pub request_uri: String,
    pub version: String,
    pub headers: HeaderList,
    pub body: Vec<u8>,
}

impl SipRequest {
    pub fn new(method: Method, request_uri: impl Into<String>) -> SipRequest {
        SipRequest {
            method,
            request_uri: request_uri.into(),
            version: "SIP/2.0".to_string(),
            headers: HeaderList::new(),
            body: Vec::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// An in-memory SIP response. `original_method` is recovered from the CSeq
/// header's trailing word during parsing and lets the dialog engine route
/// the response without separate transaction correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SipResponse {
    pub status: StatusCode,
    pub version: String,
    pub headers: HeaderList,
    pub body: Vec<u8>,
    pub original_method: Option<Method>,
}

impl SipResponse {
    pub fn new(status: StatusCode) -> SipResponse {
        SipResponse {
            status,
            version: "SIP/2.0".to_string(),
            headers: HeaderList::new(),
            body: Vec::new(),
            original_method: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// A parsed SIP message: either a request or a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SipMessage {
    Request(SipRequest),
    Response(SipResponse),
}

impl SipMessage {
    pub fn headers(&self) -> &HeaderList {
        match self {
            SipMessage::Request(r) => &r.headers,
            SipMessage::Response(r) => &r.headers,
        }
    }

    pub fn headers_mut(&mut self) -> &mut HeaderList {
        match self {
            SipMessage::Request(r) => &mut r.headers,
            SipMessage::Response(r) => &mut r.headers,
        }
    }

    pub fn body(&self) -> &[u8] {
        match self {
            SipMessage::Request(r) => &r.body,
            SipMessage::Response(r) => &r.body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)
    }

    pub fn call_id(&self) -> Option<&str> {
        self.header("Call-ID")
    }

    pub fn cseq(&self) -> Option<&str> {
        self.header("CSeq")
    }

    pub fn as_request(&self) -> Option<&SipRequest> {
        match self {
            SipMessage::Request(r) => Some(r),
            SipMessage::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&SipResponse> {
        match self {
            SipMessage::Response(r) => Some(r),
            SipMessage::Request(_) => None,
        }
    }
}
