//! HTML compression against the shared dictionary.

use std::io;
use std::string::FromUtf8Error;
use std::time::Instant;

use thiserror::Error;

use crate::compression::dictionary::Dictionary;
use crate::observability::metrics;

/// Errors from the zstd codec.
#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("zstd error: {0}")]
    Zstd(#[from] io::Error),

    #[error("decompressed payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Compress `text` into a single zstd frame using the prepared dictionary.
///
/// Output depends only on the text and the dictionary (including its level).
/// The empty string yields a valid, non-empty frame. Each call records one
/// duration sample; recording never alters the returned bytes.
pub fn compress(text: &str, dictionary: &Dictionary) -> Result<Vec<u8>, CompressionError> {
    let start = Instant::now();

    let mut compressor = zstd::bulk::Compressor::with_prepared_dictionary(dictionary.encoder())?;
    let frame = compressor.compress(text.as_bytes())?;

    metrics::record_compression(text.len(), frame.len(), start);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::dictionary::tests::sample_dictionary;

    #[test]
    fn test_round_trip() {
        let dict = sample_dictionary();
        let html = "<!DOCTYPE html><html><body><div class=\"post\"><p>안녕하세요, world</p></div></body></html>";

        let frame = compress(html, &dict).unwrap();
        assert_eq!(dict.decompress(&frame).unwrap(), html);
    }

    #[test]
    fn test_empty_string_round_trip() {
        let dict = sample_dictionary();

        let frame = compress("", &dict).unwrap();
        assert!(!frame.is_empty());
        assert_eq!(dict.decompress(&frame).unwrap(), "");
    }

    #[test]
    fn test_deterministic() {
        let dict = sample_dictionary();
        let html = "<html><body><p>same input</p></body></html>";

        assert_eq!(compress(html, &dict).unwrap(), compress(html, &dict).unwrap());
    }

    #[test]
    fn test_dictionary_shrinks_similar_markup() {
        let dict = sample_dictionary();
        let html = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title></title></head>\
                    <body><div class=\"post\"><p></p></div></body></html>";

        let with_dict = compress(html, &dict).unwrap();
        let without_dict = zstd::bulk::compress(html.as_bytes(), dict.level()).unwrap();
        assert!(with_dict.len() < without_dict.len());
    }

    #[test]
    fn test_decompress_with_other_dictionary_fails_or_differs() {
        let dict = sample_dictionary();
        let other = Dictionary::load(b"completely unrelated dictionary content 0123456789", 9).unwrap();
        let html = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title></title></head></html>";

        let frame = compress(html, &dict).unwrap();
        match other.decompress(&frame) {
            Ok(text) => assert_ne!(text, html),
            Err(_) => {}
        }
    }

    #[test]
    fn test_concurrent_compression_shares_dictionary() {
        let dict = std::sync::Arc::new(sample_dictionary());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let dict = dict.clone();
                std::thread::spawn(move || {
                    let html = format!("<html><body><p>thread {i}</p></body></html>");
                    let frame = compress(&html, &dict).unwrap();
                    assert_eq!(dict.decompress(&frame).unwrap(), html);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
