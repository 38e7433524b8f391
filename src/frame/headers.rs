use super::head::{Head, Kind, StreamId, HEADER_LEN};

use bytes::{BufMut, Bytes, BytesMut};

const END_STREAM: u8 = 0x1;
const END_HEADERS: u8 = 0x4;

/// A single `(name, value)` header pair, in receive/send order.
///
/// HTTP/2 mandates lowercase header names on the wire; this crate does not
/// itself enforce casing (spec §4.3: `get_header` comparison is
/// case-sensitive, by design, not case-normalizing).
pub type HeaderPair = (String, String);

/// An ordered sequence of header pairs.
///
/// spec §3: "ordered sequence of (name, value) pairs, appended in receive
/// order". Kept as a plain `Vec` (teacher's design note §9 calls append-only
/// accumulation onto an immutable sequence O(n^2) and recommends a mutable
/// buffer frozen at the terminal transition; a `Vec` that is only ever
/// pushed to and never re-sorted mid-stream satisfies that).
pub type HeaderList = Vec<HeaderPair>;

/// A HEADERS frame ready to be written to the wire.
///
/// `block` is the already HPACK-encoded payload; this crate's `frame`
/// module never touches HPACK directly (spec §2: HPACK endpoints are an
/// external collaborator).
#[derive(Debug, Clone)]
pub struct Headers {
    stream_id: StreamId,
    block: Bytes,
    end_stream: bool,
}

impl Headers {
    pub fn new(stream_id: StreamId, block: Bytes, end_stream: bool) -> Self {
        Headers {
            stream_id,
            block,
            end_stream,
        }
    }

    pub fn encode(&self) -> BytesMut {
        let mut flags = END_HEADERS;
        if self.end_stream {
            flags |= END_STREAM;
        }

        let head = Head::new(Kind::Headers, flags, self.stream_id);

        let mut dst = BytesMut::with_capacity(HEADER_LEN + self.block.len());
        head.encode(self.block.len(), &mut dst);
        dst.put_slice(&self.block);
        dst
    }
}

/// Augments `headers` with the `:scheme` and `:authority` pseudo-headers
/// and stable-sorts the result so every pseudo-header (name starting with
/// `:`) precedes every regular header.
///
/// spec §4.2 step 1. ASCII `:` (0x3A) sorts before any letter, so a plain
/// ascending sort on the name achieves the required ordering without a
/// dedicated "is pseudo" predicate.
pub fn augment_and_sort(mut headers: HeaderList, scheme: &str, authority: &str) -> HeaderList {
    headers.push((":authority".to_string(), authority.to_string()));
    headers.push((":scheme".to_string(), scheme.to_string()));
    headers.sort_by(|a, b| a.0.cmp(&b.0));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    quickcheck! {
        fn pseudo_headers_always_sort_first(names: Vec<String>) -> bool {
            let headers: HeaderList = names
                .into_iter()
                .filter(|n| !n.is_empty() && !n.starts_with(':'))
                .map(|n| (n, "v".to_string()))
                .collect();

            let sorted = augment_and_sort(headers, "https", "example.com");
            let pseudo_count = sorted.iter().filter(|(n, _)| n.starts_with(':')).count();

            sorted
                .iter()
                .take(pseudo_count)
                .all(|(n, _)| n.starts_with(':'))
                && sorted
                    .iter()
                    .skip(pseudo_count)
                    .all(|(n, _)| !n.starts_with(':'))
        }
    }

    #[test]
    fn pseudo_headers_sort_before_regular_headers() {
        let headers = vec![
            ("x-a".to_string(), "1".to_string()),
            ("x-b".to_string(), "2".to_string()),
        ];

        let sorted = augment_and_sort(headers, "https", "example.com");

        assert_eq!(
            sorted,
            vec![
                (":authority".to_string(), "example.com".to_string()),
                (":scheme".to_string(), "https".to_string()),
                ("x-a".to_string(), "1".to_string()),
                ("x-b".to_string(), "2".to_string()),
            ]
        );
    }
}
