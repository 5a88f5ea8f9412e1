//! Email address parsing and normalization (RFC 5322 §3.4).
//!
//! Sender and recipient fields arrive as free-form header text
//! (`"Display Name" <user@example.com>`); providers want a validated
//! address plus a canonically rendered form. Parsing here is strict:
//! anything that is not exactly one address is rejected rather than
//! passed through to a provider API.

use base64::Engine;

use crate::error::{BridgeError, Result};

/// Charset hint used when rendering a non-ASCII display name.
///
/// Wraps an [`encoding_rs`] encoding; the label becomes the charset token
/// of the generated MIME encoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset(&'static encoding_rs::Encoding);

impl Charset {
    /// UTF-8, the default transfer encoding for display names.
    pub const UTF8: Charset = Charset(encoding_rs::UTF_8);

    /// Resolve a charset label (e.g. "utf-8", "iso-8859-1").
    pub fn from_label(label: &str) -> Result<Self> {
        encoding_rs::Encoding::for_label(label.as_bytes())
            .map(Charset)
            .ok_or_else(|| BridgeError::UnknownCharset(label.to_string()))
    }

    /// The charset token used inside encoded words.
    fn mime_label(self) -> String {
        self.0.name().to_lowercase()
    }

    /// Encode `text` to bytes in this charset.
    fn encode(self, text: &str) -> Vec<u8> {
        let (bytes, _, _) = self.0.encode(text);
        bytes.into_owned()
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::UTF8
    }
}

/// A parsed email address.
///
/// # Examples
/// - `"Juan García <juan@ejemplo.com>"` → `name = "Juan García"`, `email = "juan@ejemplo.com"`
/// - `"user@example.com"` → `name = ""`, `email = "user@example.com"`
#[derive(Debug, Clone, PartialEq)]
pub struct EmailAddress {
    /// Human-readable display name (empty when the input had none).
    pub name: String,
    /// The bare email address (`user@domain`), never empty.
    pub email: String,
    charset: Charset,
}

impl EmailAddress {
    /// Parse exactly one email address from a header value.
    ///
    /// Supported formats:
    /// - `"user@domain.com"`
    /// - `"<user@domain.com>"`
    /// - `"Display Name <user@domain.com>"`
    /// - `"\"Display, Name\" <user@domain.com>"`
    ///
    /// Fails with [`BridgeError::InvalidAddress`] for empty or
    /// whitespace-only input, for input that parses as more than one
    /// address (an unquoted comma splits the field), and for segments
    /// without a usable email part.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::parse_with_charset(raw, Charset::default())
    }

    /// Like [`EmailAddress::parse`], with an explicit charset hint for
    /// rendering a non-ASCII display name.
    pub fn parse_with_charset(raw: &str, charset: Charset) -> Result<Self> {
        let mut list = Self::parse_list_with_charset(raw, charset)?;
        if list.len() != 1 {
            return Err(BridgeError::invalid_address(raw));
        }
        Ok(list.remove(0))
    }

    /// Parse an optional header value.
    ///
    /// `None` means "no address given, use the provider default" and maps
    /// to `Ok(None)`; anything else goes through [`EmailAddress::parse`].
    pub fn parse_opt(raw: Option<&str>) -> Result<Option<Self>> {
        raw.map(Self::parse).transpose()
    }

    /// Parse a comma-separated list of addresses.
    ///
    /// Handles quoted commas (`"Last, First" <a@b.com>, other@c.com`) and
    /// backslash escapes inside quoted names. Every segment must be a
    /// valid single address; an empty list is an error.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>> {
        Self::parse_list_with_charset(raw, Charset::default())
    }

    fn parse_list_with_charset(raw: &str, charset: Charset) -> Result<Vec<Self>> {
        let mut results = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut in_angle = false;
        let mut escaped = false;

        for ch in raw.chars() {
            if escaped {
                current.push(ch);
                escaped = false;
                continue;
            }
            match ch {
                '\\' if in_quotes => {
                    escaped = true;
                    current.push(ch);
                }
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                '<' if !in_quotes => {
                    in_angle = true;
                    current.push(ch);
                }
                '>' if !in_quotes => {
                    in_angle = false;
                    current.push(ch);
                }
                ',' if !in_quotes && !in_angle => {
                    results.push(Self::parse_single(&current, charset)?);
                    current.clear();
                }
                _ => current.push(ch),
            }
        }
        results.push(Self::parse_single(&current, charset)?);

        Ok(results)
    }

    /// Parse one list segment: either `name <addr-spec>` or a bare addr-spec.
    fn parse_single(segment: &str, charset: Charset) -> Result<Self> {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            return Err(BridgeError::invalid_address(segment));
        }

        // "Display Name <address>" or "<address>"
        if let Some(angle_start) = trimmed.rfind('<') {
            let Some(angle_end) = trimmed.rfind('>') else {
                return Err(BridgeError::invalid_address(segment));
            };
            if angle_end < angle_start || !trimmed[angle_end + 1..].trim().is_empty() {
                return Err(BridgeError::invalid_address(segment));
            }
            let email = trimmed[angle_start + 1..angle_end].trim();
            if email.is_empty() || !email.contains('@') {
                return Err(BridgeError::invalid_address(segment));
            }
            let name = strip_quotes(trimmed[..angle_start].trim());
            return Ok(Self {
                name,
                email: email.to_string(),
                charset,
            });
        }

        // Bare address: "user@domain.com"
        if trimmed.contains('@') && !trimmed.contains(char::is_whitespace) {
            return Ok(Self {
                name: String::new(),
                email: trimmed.to_string(),
                charset,
            });
        }

        Err(BridgeError::invalid_address(segment))
    }

    /// Canonical rendering: `"Display Name <address>"` or just `"address"`.
    ///
    /// The display name is quoted and escaped per RFC 2822 when it contains
    /// specials, and rendered as an RFC 2047 encoded word when it contains
    /// non-ASCII characters.
    pub fn address(&self) -> String {
        if self.name.is_empty() {
            return self.email.clone();
        }
        if !self.name.is_ascii() {
            return format!("{} <{}>", encode_word(&self.name, self.charset), self.email);
        }
        if needs_quoting(&self.name) {
            let escaped = self.name.replace('\\', "\\\\").replace('"', "\\\"");
            return format!("\"{}\" <{}>", escaped, self.email);
        }
        format!("{} <{}>", self.name, self.email)
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.address())
    }
}

/// RFC 2822 specials that force a display name into a quoted string.
const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

fn needs_quoting(name: &str) -> bool {
    name.contains(SPECIALS)
}

/// Strip surrounding double-quotes, undoing backslash escapes.
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        let inner = &trimmed[1..trimmed.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut escaped = false;
        for ch in inner.chars() {
            if escaped {
                out.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else {
                out.push(ch);
            }
        }
        out.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Render `text` as an RFC 2047 encoded word, base64 variant.
///
/// Example: `"Hola món"` with UTF-8 → `"=?utf-8?b?SG9sYSBtw7Nu?="`
fn encode_word(text: &str, charset: Charset) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(charset.encode(text));
    format!("=?{}?b?{}?=", charset.mime_label(), encoded)
}
