//! The artifact a stream publishes once it reaches a terminal state.

use crate::frame::{HeaderList, StreamId};

use bytes::Bytes;

/// A completed response (or push promise preview), assembled from stream
/// state at the terminal transition (spec §4.3).
#[derive(Debug, Clone)]
pub struct Response {
    pub id: StreamId,
    pub headers: HeaderList,
    pub body: Bytes,
    pub status: Option<u16>,
    pub peername: Option<String>,
}

impl Response {
    pub(crate) fn new(id: StreamId, headers: HeaderList, body: Bytes) -> Self {
        let status = get_header(&headers, ":status").and_then(|v| v.parse().ok());

        Response {
            id,
            headers,
            body,
            status,
            peername: None,
        }
    }
}

/// Linear scan for the first header pair matching `name`.
///
/// spec §4.3: "case-sensitive comparison (HTTP/2 mandates lowercase header
/// names on the wire)".
pub fn get_header<'a>(headers: &'a HeaderList, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_header_is_case_sensitive() {
        let headers: HeaderList = vec![(":status".to_string(), "200".to_string())];

        assert_eq!(get_header(&headers, ":status"), Some("200"));
        assert_eq!(get_header(&headers, ":Status"), None);
    }

    #[test]
    fn response_parses_status_from_pseudo_header() {
        let headers: HeaderList = vec![
            (":status".to_string(), "200".to_string()),
            ("content-type".to_string(), "text/plain".to_string()),
        ];

        let response = Response::new(StreamId::new(1), headers, Bytes::from_static(b"hello"));
        assert_eq!(response.status, Some(200));
    }

    #[test]
    fn response_status_is_none_when_pseudo_header_absent() {
        let headers: HeaderList = vec![("x-trace".to_string(), "abc".to_string())];

        let response = Response::new(StreamId::new(1), headers, Bytes::new());
        assert_eq!(response.status, None);
    }
}
