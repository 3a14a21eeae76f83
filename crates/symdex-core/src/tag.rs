//! Field metadata micro-format.
//!
//! A field's raw metadata string is a space-separated list of `key:"value"`
//! pairs:
//!
//! ```text
//! json:"name,omitempty" db:"user_name" validate:"required"
//! ```
//!
//! Keys are non-empty runs of printable characters other than space, `:` and
//! `"`. Values are double-quoted strings with backslash escapes
//! (`\n`, `\xNN`, `\uNNNN`, three-digit octal and the rest of the usual
//! set). Scanning stops at the first malformed pair; pairs before it stay
//! readable. Only the value of a requested key is unquoted, so a bad escape
//! hides that value alone.

/// Borrowed view over a raw field metadata string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag<'a> {
    raw: &'a str,
}

impl<'a> FieldTag<'a> {
    pub fn new(raw: &'a str) -> Self {
        FieldTag { raw }
    }

    /// The raw string.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Value of `key`, or `None` when the key is absent.
    ///
    /// An empty value (`key:""`) is found and returns `Some("")`. A value
    /// with an invalid escape is treated as absent.
    pub fn lookup(&self, key: &str) -> Option<String> {
        RawPairs { rest: self.raw }
            .find(|(name, _)| *name == key)
            .and_then(|(_, quoted)| unquote(quoted))
    }

    /// Value of `key` with an explicit found flag.
    pub fn get(&self, key: &str) -> (String, bool) {
        match self.lookup(key) {
            Some(value) => (value, true),
            None => (String::new(), false),
        }
    }

    /// All well-formed pairs, in order. Pairs whose value does not unquote
    /// are skipped.
    pub fn entries(&self) -> TagEntries<'a> {
        TagEntries {
            pairs: RawPairs { rest: self.raw },
        }
    }
}

/// Iterator over the pairs of a [`FieldTag`].
#[derive(Debug, Clone)]
pub struct TagEntries<'a> {
    pairs: RawPairs<'a>,
}

impl<'a> Iterator for TagEntries<'a> {
    type Item = (&'a str, String);

    fn next(&mut self) -> Option<Self::Item> {
        self.pairs
            .by_ref()
            .find_map(|(name, quoted)| unquote(quoted).map(|value| (name, value)))
    }
}

/// Syntactic scan yielding each key with its still-quoted value.
#[derive(Debug, Clone)]
struct RawPairs<'a> {
    rest: &'a str,
}

impl<'a> Iterator for RawPairs<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.rest.trim_start_matches(' ');
        let bytes = tag.as_bytes();

        let mut i = 0;
        while i < bytes.len()
            && bytes[i] > b' '
            && bytes[i] != b':'
            && bytes[i] != b'"'
            && bytes[i] != 0x7f
        {
            i += 1;
        }
        if i == 0 || i + 1 >= bytes.len() || bytes[i] != b':' || bytes[i + 1] != b'"' {
            self.rest = "";
            return None;
        }
        let name = &tag[..i];
        let tag = &tag[i + 1..];
        let bytes = tag.as_bytes();

        // Closing quote, skipping escaped characters.
        let mut j = 1;
        while j < bytes.len() && bytes[j] != b'"' {
            if bytes[j] == b'\\' {
                j += 1;
            }
            j += 1;
        }
        if j >= bytes.len() {
            self.rest = "";
            return None;
        }
        self.rest = &tag[j + 1..];
        Some((name, &tag[..=j]))
    }
}

/// Strip the quotes of a double-quoted string and resolve escapes.
fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    if !inner.contains('\\') {
        return Some(inner.to_string());
    }
    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let escape = *bytes.get(i + 1)?;
        i += 2;
        match escape {
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'\\' => out.push(b'\\'),
            b'"' => out.push(b'"'),
            b'x' => {
                out.push(u8::try_from(digits(bytes, i, 2, 16)?).ok()?);
                i += 2;
            }
            b'0'..=b'7' => {
                out.push(u8::try_from(digits(bytes, i - 1, 3, 8)?).ok()?);
                i += 2;
            }
            b'u' | b'U' => {
                let width = if escape == b'u' { 4 } else { 8 };
                let c = char::from_u32(digits(bytes, i, width, 16)?)?;
                out.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes());
                i += width;
            }
            _ => return None,
        }
    }
    Some(String::from_utf8_lossy(&out).into_owned())
}

/// Value of exactly `width` digits in `radix` starting at `start`.
fn digits(bytes: &[u8], start: usize, width: usize, radix: u32) -> Option<u32> {
    let text = bytes.get(start..start + width)?;
    let text = std::str::from_utf8(text).ok()?;
    if !text.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(text, radix).ok()
}

// ============================================================================
// Tests
// ============================================================================
