//! Value types with builtin conversions that have no std counterpart.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A link-layer hardware address: EUI-48, EUI-64 or a 20-octet InfiniBand
/// address.
///
/// Parsed from two-digit hex groups separated by `:` or `-`
/// (`00:00:5e:00:53:01`), or from four-digit groups separated by `.`
/// (`0000.5e00.5301`).
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct HardwareAddr(Vec<u8>);

impl HardwareAddr {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid MAC address {0:?}")]
pub struct ParseHardwareAddrError(String);

impl FromStr for HardwareAddr {
    type Err = ParseHardwareAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseHardwareAddrError(s.to_string());

        let (separator, group_len) = if s.contains('.') {
            ('.', 4)
        } else if s.contains('-') {
            ('-', 2)
        } else {
            (':', 2)
        };

        let mut bytes = Vec::with_capacity(20);
        for group in s.split(separator) {
            if group.len() != group_len || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            for offset in (0..group_len).step_by(2) {
                let byte = u8::from_str_radix(&group[offset..offset + 2], 16)
                    .map_err(|_| invalid())?;
                bytes.push(byte);
            }
        }

        match bytes.len() {
            6 | 8 | 20 => Ok(Self(bytes)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, byte) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A single mail address with an optional display name.
///
/// Accepts `alice@example.com`, `Alice <alice@example.com>` and
/// `"Smith, Alice" <alice@example.com>`. Comments and group syntax are not
/// supported.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct MailAddress {
    /// Display name, empty when absent.
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid mail address {input:?}: {reason}")]
pub struct ParseMailAddressError {
    input: String,
    reason: &'static str,
}

impl FromStr for MailAddress {
    type Err = ParseMailAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ParseMailAddressError {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(fail("no address"));
        }

        let (name, address) = match trimmed.strip_suffix('>') {
            Some(head) => {
                let open = head.rfind('<').ok_or_else(|| fail("unmatched '>'"))?;
                let name = unquote_display_name(head[..open].trim()).map_err(fail)?;
                (name, &head[open + 1..])
            }
            None => (String::new(), trimmed),
        };

        validate_addr_spec(address).map_err(fail)?;
        Ok(Self {
            name,
            address: address.to_string(),
        })
    }
}

impl fmt::Display for MailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            return write!(f, "<{}>", self.address);
        }
        if self.name.contains(|c: char| SPECIALS.contains(c)) {
            f.write_str("\"")?;
            for c in self.name.chars() {
                if c == '"' || c == '\\' {
                    f.write_str("\\")?;
                }
                write!(f, "{c}")?;
            }
            write!(f, "\" <{}>", self.address)
        } else {
            write!(f, "{} <{}>", self.name, self.address)
        }
    }
}

const SPECIALS: &str = "()<>[]:;@\\,.\"";

fn unquote_display_name(raw: &str) -> Result<String, &'static str> {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        if raw.contains(['"', '<', '>']) {
            return Err("malformed display name");
        }
        return Ok(raw.to_string());
    };

    let mut name = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => name.push(chars.next().ok_or("dangling escape in display name")?),
            '"' => return Err("unescaped quote in display name"),
            _ => name.push(c),
        }
    }
    Ok(name)
}

fn validate_addr_spec(address: &str) -> Result<(), &'static str> {
    let (local, domain) = address.rsplit_once('@').ok_or("missing @ in address")?;
    if local.is_empty() {
        return Err("empty local part");
    }
    if domain.is_empty() {
        return Err("empty domain");
    }
    let forbidden = |c: char| c.is_whitespace() || "<>,;\"@".contains(c);
    if local.contains(forbidden) || domain.contains(forbidden) {
        return Err("invalid character in address");
    }
    Ok(())
}

/// A comma-separated list of mail addresses.
///
/// Commas inside a quoted display name or angle brackets do not split.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct MailAddressList(pub Vec<MailAddress>);

impl FromStr for MailAddressList {
    type Err = ParseMailAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseMailAddressError {
                input: s.to_string(),
                reason: "empty address list",
            });
        }
        split_address_list(s)
            .into_iter()
            .map(str::parse::<MailAddress>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

fn split_address_list(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    let mut bracketed = false;

    for (index, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '<' if !quoted => bracketed = true,
            '>' if !quoted => bracketed = false,
            ',' if !quoted && !bracketed => {
                parts.push(&s[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// A compiled [handlebars](https://docs.rs/handlebars) template.
///
/// Syntax errors surface when the value is converted, not when it is
/// rendered.
#[cfg(feature = "templates")]
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    engine: handlebars::Handlebars<'static>,
}

#[cfg(feature = "templates")]
impl Template {
    const NAME: &'static str = "template";

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render<T: serde::Serialize>(&self, data: &T) -> Result<String, handlebars::RenderError> {
        self.engine.render(Self::NAME, data)
    }
}

#[cfg(feature = "templates")]
impl FromStr for Template {
    type Err = handlebars::TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut engine = handlebars::Handlebars::new();
        engine.register_template_string(Self::NAME, s)?;
        Ok(Self {
            source: s.to_string(),
            engine,
        })
    }
}

#[cfg(feature = "templates")]
impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
