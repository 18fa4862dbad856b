use anyhow::bail;
use bytes::{BufMut, Bytes, BytesMut};
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use std::any::type_name;

/// Allows a result carrying raw JSON bytes to be turned into a typed value.
///
/// Errors already present in the result are passed through untouched,
/// parse errors are converted into the result's error type.
///
/// ```
/// use result_extensions::DecodeJson;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct User {
///     name: String,
/// }
///
/// let raw: anyhow::Result<&[u8]> = Ok(br#"{"name": "kamil"}"#);
/// let user = raw.decode_json::<User>().unwrap();
///
/// assert_eq!(user, User { name: "kamil".into() });
/// ```
pub trait DecodeJson<E> {
    /// Parses success payload as a single JSON value of type `T`.
    fn decode_json<T>(self) -> Result<T, E>
    where
        T: DeserializeOwned;
}

impl<B, E> DecodeJson<E> for Result<B, E>
where
    B: AsRef<[u8]>,
    E: From<serde_json::Error>,
{
    fn decode_json<T>(self) -> Result<T, E>
    where
        T: DeserializeOwned,
    {
        let bytes = self?;
        let deserializer = &mut serde_json::Deserializer::from_slice(bytes.as_ref());

        // `end` rejects anything but whitespace after the value.
        let value = T::deserialize(&mut *deserializer).and_then(|value| {
            deserializer.end()?;
            Ok(value)
        });

        value.map_err(|e| {
            debug!("decode_json - failed to decode {}: {}", type_name::<T>(), e);
            E::from(e)
        })
    }
}

/// Allows a result carrying serializable value to be turned into JSON bytes.
///
/// ```
/// use result_extensions::EncodeJson;
///
/// let value: anyhow::Result<Vec<u32>> = Ok(vec![1, 2, 3]);
///
/// assert_eq!(&value.encode_json().unwrap()[..], b"[1,2,3]");
/// ```
pub trait EncodeJson<E>: Sized {
    /// Serializes success payload with default, compact encoder.
    fn encode_json(self) -> Result<Bytes, E> {
        self.encode_json_with(&JsonEncoder::default())
    }

    /// Serializes success payload using given encoder configuration.
    fn encode_json_with(self, encoder: &JsonEncoder) -> Result<Bytes, E>;
}

impl<S, E> EncodeJson<E> for Result<S, E>
where
    S: Serialize,
    E: From<serde_json::Error>,
{
    fn encode_json_with(self, encoder: &JsonEncoder) -> Result<Bytes, E> {
        let value = self?;

        encoder.encode(&value).map_err(|e| {
            debug!("encode_json - failed to encode {}: {}", type_name::<S>(), e);
            E::from(e)
        })
    }
}

/// Configuration of JSON output produced by [`EncodeJson`].
///
/// By default output is compact. Pretty output uses two spaces as indent
/// unless told otherwise.
///
/// ```
/// use result_extensions::JsonEncoder;
///
/// let encoder = JsonEncoder::default().pretty(true).indent("\t")?;
/// assert_eq!(&encoder.encode(&[1])?[..], b"[\n\t1\n]");
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonEncoder {
    pretty: bool,

    /// Used only with pretty output, always JSON whitespace.
    indent: String,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: String::from("  "),
        }
    }
}

impl JsonEncoder {
    /// Sets pretty field.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Sets indent used for pretty output.
    ///
    /// Anything but JSON whitespace would produce invalid documents,
    /// so such indents are rejected.
    pub fn indent(mut self, indent: impl Into<String>) -> anyhow::Result<Self> {
        let indent = indent.into();
        if let Some(c) = indent
            .chars()
            .find(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        {
            bail!("invalid json indent character: {:?}", c);
        }

        self.indent = indent;
        Ok(self)
    }

    /// Serializes value into JSON bytes according to configuration.
    pub fn encode<S>(&self, value: &S) -> serde_json::Result<Bytes>
    where
        S: Serialize + ?Sized,
    {
        if self.pretty {
            write_with(value, PrettyFormatter::with_indent(self.indent.as_bytes()))
        } else {
            write_with(value, CompactFormatter)
        }
    }
}

fn write_with<S, F>(value: &S, formatter: F) -> serde_json::Result<Bytes>
where
    S: Serialize + ?Sized,
    F: Formatter,
{
    let mut writer = BytesMut::new().writer();
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);

    value.serialize(&mut serializer)?;
    Ok(writer.into_inner().freeze())
}

#[cfg(test)]
mod tests {
    use super::JsonEncoder;

    #[test]
    fn test_indent_validation() {
        assert!(JsonEncoder::default().indent("    ").is_ok());
        assert!(JsonEncoder::default().indent("\t").is_ok());
        assert!(JsonEncoder::default().indent("").is_ok());

        let err = JsonEncoder::default()
            .indent("--")
            .expect_err("dash is not json whitespace");
        assert_eq!(err.to_string(), "invalid json indent character: '-'");
    }

    #[test]
    fn test_default_is_compact() {
        let encoder = JsonEncoder::default();

        assert_eq!(&encoder.encode(&vec![1, 2]).expect("encodable")[..], b"[1,2]");

        let encoder = encoder.pretty(true).pretty(false);
        assert_eq!(&encoder.encode(&vec![1, 2]).expect("encodable")[..], b"[1,2]");
    }

    #[test]
    fn test_pretty_default_indent() {
        let encoder = JsonEncoder::default().pretty(true);

        assert_eq!(
            &encoder.encode(&vec![1, 2]).expect("encodable")[..],
            b"[\n  1,\n  2\n]"
        );
    }
}
