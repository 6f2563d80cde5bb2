//! JSON decoding of inputs and rendering of written records.
//!
//! Output follows the historical dump format: indented objects, `": "`
//! between key and value, no trailing newline, and (by default) every
//! character outside printable ASCII written as a lowercase `\uXXXX` escape.
//! Numbers are written with the exact text they were read with.

use std::io;

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};

/// Formatting options for record files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputOptions {
    /// Spaces per indentation level
    pub indent: usize,
    /// Escape every non-ASCII character as `\uXXXX`
    pub ensure_ascii: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            ensure_ascii: true,
        }
    }
}

const DEL: char = '\u{7f}';

/// Formatter that escapes non-ASCII text and DEL; layout is delegated to `F`.
pub struct AsciiFormatter<F> {
    inner: F,
}

impl<F> AsciiFormatter<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F: Formatter> Formatter for AsciiFormatter<F> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != DEL {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Decode `content` with no nesting limit.
///
/// Deeply nested documents grow the stack on the heap instead of overflowing it.
pub fn from_json_str<T: DeserializeOwned>(content: &str) -> serde_json::Result<T> {
    let mut de = serde_json::Deserializer::from_str(content);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Serialize `value` according to `options`.
pub fn to_json_string<T>(value: &T, options: &OutputOptions) -> serde_json::Result<String>
where
    T: Serialize + ?Sized,
{
    let indent = vec![b' '; options.indent];
    let pretty = PrettyFormatter::with_indent(&indent);
    let mut out = Vec::with_capacity(512);

    if options.ensure_ascii {
        let mut serializer = Serializer::with_formatter(&mut out, AsciiFormatter::new(pretty));
        value.serialize(&mut serializer)?;
    } else {
        let mut serializer = Serializer::with_formatter(&mut out, pretty);
        value.serialize(&mut serializer)?;
    }

    String::from_utf8(out).map_err(serde_json::Error::custom)
}
