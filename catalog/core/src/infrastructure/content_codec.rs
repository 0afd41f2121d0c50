// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Transport codec for file content.
//!
//! The contents API carries file bodies as base64 of the raw UTF-8 bytes.
//! Responses wrap the base64 text at 60 columns, so whitespace is stripped
//! before decoding.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::domain::store::StoreError;

pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

pub fn decode_content(encoded: &str) -> Result<String, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| StoreError::Encoding(format!("invalid base64 content: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|e| StoreError::Encoding(format!("content is not valid UTF-8: {}", e)))
}
