use nom::bytes::complete::{tag, take_till1};
use nom::character::complete::{digit1, space1};
use nom::combinator::{all_consuming, map_res, rest};
use nom::sequence::tuple;
use nom::IResult;

use crate::types::method::Method;

pub(crate) enum StartLine {
    Request { method: Method, request_uri: String },
    Response { code: u16, reason: String },
}

pub(crate) enum StartLineError {
    /// Shape matched a request line but the method token isn't recognized.
    UnknownMethod(String),
    /// Neither a request line nor a status line.
    Malformed,
}

fn is_not_space(c: char) -> bool {
    !c.is_whitespace()
}

fn request_line(input: &str) -> IResult<&str, (String, String)> {
    let (input, (method, _, uri, _, _version)) = tuple((
        take_till1(is_not_space),
        space1,
        take_till1(is_not_space),
        space1,
        tag("SIP/2.0"),
    ))(input)?;
    Ok((input, (method.to_string(), uri.to_string())))
}

fn response_line(input: &str) -> IResult<&str, (u16, String)> {
    let (input, (_version, _, code, _, reason)) = tuple((
        tag("SIP/2.0"),
        space1,
        map_res(digit1, |s: &str| s.parse::<u16>()),
        space1,
        rest,
    ))(input)?;
    Ok((input, (code, reason.to_string())))
}

/// Parses a well-formed request or status line.
pub(crate) fn parse_start_line(line: &str) -> Result<StartLine, StartLineError> {
    if let Ok((_, (code, reason))) = all_consuming(response_line)(line) {
        return Ok(StartLine::Response { code, reason });
    }
    if let Ok((_, (method_str, request_uri))) = all_consuming(request_line)(line) {
        return match method_str.parse::<Method>() {
            Ok(method) => Ok(StartLine::Request { method, request_uri }),
            Err(_) => Err(StartLineError::UnknownMethod(method_str)),
        };
    }
    Err(StartLineError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line() {
        match parse_start_line("INVITE sip:a@b SIP/2.0") {
            Ok(StartLine::Request { method, request_uri }) => {
                assert_eq!(method, Method::Invite);
                assert_eq!(request_uri, "sip:a@b");
            }
            _ => panic!("expected request"),
        }
    }

    #[test]
    fn parses_response_line() {
        match parse_start_line("SIP/2.0 180 Ringing") {
            Ok(StartLine::Response { code, reason }) => {
                assert_eq!(code, 180);
                assert_eq!(reason, "Ringing");
            }
            _ => panic!("expected response"),
        }
    }

    #[test]
    fn unknown_method_distinguished_from_malformed() {
        match parse_start_line("FOO sip:x@y SIP/2.0") {
            Err(StartLineError::UnknownMethod(m)) => assert_eq!(m, "FOO"),
            _ => panic!("expected unknown method"),
        }
        match parse_start_line("garbage") {
            Err(StartLineError::Malformed) => {}
            _ => panic!("expected malformed"),
        }
    }
}
