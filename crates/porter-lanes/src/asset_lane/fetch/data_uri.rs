// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Decoding of inline `data:` URIs.

use base64::Engine;
use porter_core::fetch::FetchError;

/// Decodes the body of a `data:[<mediatype>][;base64],<data>` URI.
///
/// Bodies without the `;base64` marker are percent-decoded.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, FetchError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FetchError::InvalidDataUri(truncate(uri)))?;
    let (header, body) = rest
        .split_once(',')
        .ok_or_else(|| FetchError::InvalidDataUri(truncate(uri)))?;

    if header.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(body)
            .map_err(|e| FetchError::InvalidDataUri(format!("{}: {}", truncate(uri), e)))
    } else {
        percent_decode(body).ok_or_else(|| FetchError::InvalidDataUri(truncate(uri)))
    }
}

fn percent_decode(body: &str) -> Option<Vec<u8>> {
    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = body.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(out)
}

// Data URIs can be megabytes long; keep error messages readable.
fn truncate(uri: &str) -> String {
    match uri.char_indices().nth(48) {
        Some((end, _)) => format!("{}...", &uri[..end]),
        None => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_body() {
        assert_eq!(decode_data_uri("data:text/plain;base64,aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_percent_encoded_body() {
        assert_eq!(decode_data_uri("data:,a%20b%2Cc").unwrap(), b"a b,c");
    }

    #[test]
    fn test_malformed_uris() {
        assert!(matches!(
            decode_data_uri("data:text/plain;base64"),
            Err(FetchError::InvalidDataUri(_))
        ));
        assert!(decode_data_uri("data:;base64,@@@").is_err());
        assert!(decode_data_uri("data:,bad%zz").is_err());
        assert!(decode_data_uri("hello.txt").is_err());
    }
}
