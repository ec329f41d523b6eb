//! PIX "BR Code" payload construction.
//!
//! A payload is a run of TLV fields (2-digit tag, 2-digit byte length, value) in a
//! fixed order, closed by tag `63` carrying a CRC16/CCITT-FALSE over everything
//! before it, the `6304` header included.

use crate::crc::{crc16_ccitt_false, crc16_hex};
use bigdecimal::{BigDecimal, Zero};
use common_money::format_two_decimals;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

pub const PIX_GUI: &str = "br.gov.bcb.pix";
pub const MERCHANT_CATEGORY_CODE: &str = "0000";
pub const CURRENCY_BRL: &str = "986";
pub const COUNTRY_CODE: &str = "BR";
pub const MAX_MERCHANT_NAME: usize = 25;
pub const MAX_MERCHANT_CITY: usize = 15;
pub const MAX_TXID: usize = 25;
pub const MAX_AMOUNT_LEN: usize = 13;
pub const MAX_FIELD_LEN: usize = 99;
pub const CRC_HEADER: &str = "6304";
const TXID_ANY: &str = "***";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// Amount is fixed by the merchant.
    #[default]
    Fixed,
    /// No amount; the payer types it in.
    Open,
    /// Amount is encoded and read by the payer app as the minimum due.
    MinimumImplied,
}

impl PayloadKind {
    pub fn carries_amount(self) -> bool {
        !matches!(self, PayloadKind::Open)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixPaymentRequest {
    pub merchant_name: String,
    #[serde(default)]
    pub amount: Option<BigDecimal>,
    pub key: String,
    /// Kept for the payment record; BR Code has no payer field.
    #[serde(default)]
    pub payer_document: Option<String>,
    pub city: String,
    #[serde(default)]
    pub kind: PayloadKind,
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("recipient key is required")]
    MissingKey,
    #[error("recipient key must be printable ASCII without spaces")]
    InvalidKey,
    #[error("merchant name is required")]
    MissingMerchantName,
    #[error("merchant city is required")]
    MissingCity,
    #[error("amount is required for {0:?} payloads")]
    MissingAmount(PayloadKind),
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("amount is out of range")]
    AmountOutOfRange,
    #[error("field {tag} is {len} bytes, above the {max} byte limit")]
    FieldTooLong { tag: &'static str, len: usize, max: usize },
}

/// A finished, checksum-terminated payload string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PixPayload(String);

impl PixPayload {
    pub fn as_str(&self) -> &str { &self.0 }

    pub fn into_string(self) -> String { self.0 }

    /// The trailing 4 hex digits.
    pub fn checksum(&self) -> &str {
        &self.0[self.0.len() - 4..]
    }

    /// True when `payload` ends in `6304XXXX` and XXXX is the CRC of everything before it.
    pub fn verify(payload: &str) -> bool {
        if !payload.is_ascii() || payload.len() < CRC_HEADER.len() + 4 {
            return false;
        }
        let (body, trailer) = payload.split_at(payload.len() - 4);
        if !body.ends_with(CRC_HEADER) {
            return false;
        }
        match u16::from_str_radix(trailer, 16) {
            Ok(expected) => {
                trailer.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
                    && crc16_ccitt_false(body.as_bytes()) == expected
            }
            Err(_) => false,
        }
    }
}

impl fmt::Display for PixPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PixPayload {
    fn as_ref(&self) -> &str { &self.0 }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PixPayloadBuilder;

impl PixPayloadBuilder {
    pub fn build(request: &PixPaymentRequest) -> Result<PixPayload, ValidationError> {
        let key = request.key.trim();
        if key.is_empty() {
            return Err(ValidationError::MissingKey);
        }
        if !key.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ValidationError::InvalidKey);
        }
        let merchant_name = sanitize_text(&request.merchant_name, MAX_MERCHANT_NAME);
        if merchant_name.is_empty() {
            return Err(ValidationError::MissingMerchantName);
        }
        let city = sanitize_text(&request.city, MAX_MERCHANT_CITY);
        if city.is_empty() {
            return Err(ValidationError::MissingCity);
        }
        let amount = encoded_amount(request)?;

        let mut account = String::new();
        push_field(&mut account, "00", PIX_GUI)?;
        push_field(&mut account, "01", key)?;
        if let Some(description) = request.description.as_deref() {
            let description = sanitize_text(description, MAX_FIELD_LEN);
            if !description.is_empty() {
                push_field(&mut account, "02", &description)?;
            }
        }

        let mut additional = String::new();
        push_field(&mut additional, "05", &sanitize_txid(request.txid.as_deref()))?;

        let mut out = String::with_capacity(160);
        push_field(&mut out, "00", "01")?;
        push_field(&mut out, "26", &account)?;
        push_field(&mut out, "52", MERCHANT_CATEGORY_CODE)?;
        push_field(&mut out, "53", CURRENCY_BRL)?;
        if let Some(amount) = amount.as_deref() {
            push_field(&mut out, "54", amount)?;
        }
        push_field(&mut out, "58", COUNTRY_CODE)?;
        push_field(&mut out, "59", &merchant_name)?;
        push_field(&mut out, "60", &city)?;
        push_field(&mut out, "62", &additional)?;
        out.push_str(CRC_HEADER);
        let crc = crc16_hex(out.as_bytes());
        out.push_str(&crc);

        debug!(kind = ?request.kind, %crc, len = out.len(), "built pix payload");
        Ok(PixPayload(out))
    }
}

fn encoded_amount(request: &PixPaymentRequest) -> Result<Option<String>, ValidationError> {
    if !request.kind.carries_amount() {
        if request.amount.is_some() {
            debug!("ignoring amount on open pix payload");
        }
        return Ok(None);
    }
    let amount = request
        .amount
        .as_ref()
        .ok_or(ValidationError::MissingAmount(request.kind))?;
    if *amount < BigDecimal::zero() {
        return Err(ValidationError::NegativeAmount);
    }
    let rendered = format_two_decimals(amount).map_err(|_| ValidationError::AmountOutOfRange)?;
    if rendered.len() > MAX_AMOUNT_LEN {
        return Err(ValidationError::FieldTooLong {
            tag: "54",
            len: rendered.len(),
            max: MAX_AMOUNT_LEN,
        });
    }
    Ok(Some(rendered))
}

fn push_field(out: &mut String, tag: &'static str, value: &str) -> Result<(), ValidationError> {
    let len = value.len();
    if len > MAX_FIELD_LEN {
        return Err(ValidationError::FieldTooLong { tag, len, max: MAX_FIELD_LEN });
    }
    out.push_str(tag);
    out.push_str(&format!("{len:02}"));
    out.push_str(value);
    Ok(())
}

fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        c if c.is_whitespace() => ' ',
        c if c.is_ascii_graphic() => c,
        _ => return None,
    };
    Some(folded)
}

/// ASCII-fold, collapse whitespace and cut to `max` bytes.
pub fn sanitize_text(input: &str, max: usize) -> String {
    let folded: String = input.chars().filter_map(fold_char).collect();
    let mut collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    // Folded text is pure ASCII, so byte truncation stays on a char boundary.
    collapsed.truncate(max);
    collapsed.trim_end().to_string()
}

fn sanitize_txid(txid: Option<&str>) -> String {
    let cleaned: String = txid
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_TXID)
        .collect();
    if cleaned.is_empty() { TXID_ANY.to_string() } else { cleaned }
}

/// One decoded top-level TLV field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvField<'a> {
    pub tag: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TlvError {
    #[error("payload truncated at byte {0}")]
    Truncated(usize),
    #[error("invalid length digits at byte {0}")]
    BadLength(usize),
}

/// Split a payload (or a nested template value) into its TLV fields.
pub fn parse_tlv(input: &str) -> Result<Vec<TlvField<'_>>, TlvError> {
    let mut fields = Vec::new();
    let mut pos = 0;
    while pos < input.len() {
        let tag = input.get(pos..pos + 2).ok_or(TlvError::Truncated(pos))?;
        let len_digits = input.get(pos + 2..pos + 4).ok_or(TlvError::Truncated(pos + 2))?;
        if !len_digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TlvError::BadLength(pos + 2));
        }
        let len: usize = len_digits.parse().map_err(|_| TlvError::BadLength(pos + 2))?;
        let start = pos + 4;
        let value = input.get(start..start + len).ok_or(TlvError::Truncated(start))?;
        fields.push(TlvField { tag, value });
        pos = start + len;
    }
    Ok(fields)
}
