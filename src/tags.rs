use crate::error::{ProbeError, ProbeResult};

/// A tiny hand-rolled bitflags macro: the flag set here is seven constants,
/// not worth a dependency for.
macro_rules! bitflags_like {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $ty:ty {
            $(const $flag:ident = $val:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name($ty);

        impl $name {
            $(pub const $flag: Self = Self($val);)*

            pub const ALL: Self = Self(0 $(| $val)*);
            pub const NONE: Self = Self(0);

            pub fn contains(&self, other: Self) -> bool
            {
                self.0 & other.0 == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) { self.0 |= rhs.0; }
        }
    };
}

/// Maximum number of tag entries a single probe result may carry.
pub const MAX_TAGS: usize = 16;

/// Maximum payload length of a single tag value, NUL terminator included.
pub const MAX_VALUE_BYTES: usize = 256;

/// Which encoding a `set_utf8_label` input is in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Encoding {
    Utf16Le,
    Utf16Be,
}

bitflags_like! {
    /// Which tag families a caller wants materialized. Emitters silently
    /// skip when their flag is off.
    pub struct RequestMask: u32 {
        const TYPE       = 0b0000001;
        const USAGE      = 0b0000010;
        const LABEL      = 0b0000100;
        const LABEL_RAW  = 0b0001000;
        const UUID       = 0b0010000;
        const UUID_RAW   = 0b0100000;
        const VERSION    = 0b1000000;
    }
}

/// One (name, bytes) entry. The name is always `'static` — it either points
/// into a prober descriptor or into the fixed tag-name vocabulary, never
/// heap-allocated.
#[derive(Debug, Clone)]
pub struct TagEntry {
    pub name: &'static str,
    data: [u8; MAX_VALUE_BYTES],
    len: usize,
}

impl TagEntry {
    pub fn value(&self) -> &[u8]
    {
        &self.data[..self.len]
    }

    /// The value as text, lossily, for display purposes. Tag values are
    /// conventionally NUL-terminated C strings; trailing NULs are trimmed.
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str>
    {
        let bytes = self.value();
        let bytes = match bytes.iter().position(|&b| b == 0) {
            Some(i) => &bytes[..i],
            None => bytes,
        };
        String::from_utf8_lossy(bytes)
    }
}

/// Fixed-capacity, insertion-ordered list of tags produced by one probe.
#[derive(Debug, Default)]
pub struct TagStore {
    entries: Vec<TagEntry>,
}

impl TagStore {
    pub fn new() -> Self
    {
        Self { entries: Vec::with_capacity(MAX_TAGS) }
    }

    pub fn clear(&mut self)
    {
        self.entries.clear();
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&TagEntry>
    {
        self.entries.get(idx)
    }

    pub fn lookup(&self, name: &str) -> Option<&TagEntry>
    {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn has(&self, name: &str) -> bool
    {
        self.lookup(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagEntry>
    {
        self.entries.iter()
    }

    fn push(&mut self, name: &'static str, bytes: &[u8]) -> ProbeResult<()>
    {
        if self.entries.len() >= MAX_TAGS {
            return Err(ProbeError::CapacityExceeded(MAX_TAGS));
        }
        let len = bytes.len().min(MAX_VALUE_BYTES);
        let mut data = [0u8; MAX_VALUE_BYTES];
        data[..len].copy_from_slice(&bytes[..len]);
        self.entries.push(TagEntry { name, data, len });
        Ok(())
    }

    /// Verbatim store, truncated to `MAX_VALUE_BYTES`.
    pub fn set_value(&mut self, name: &'static str, bytes: &[u8]) -> ProbeResult<()>
    {
        self.push(name, bytes)
    }

    pub fn set_version(&mut self, mask: RequestMask, version: &str) -> ProbeResult<()>
    {
        if !mask.contains(RequestMask::VERSION) {
            return Ok(());
        }
        let mut bytes = version.as_bytes().to_vec();
        bytes.push(0);
        self.set_value("VERSION", &bytes)
    }

    /// Emits `LABEL_RAW` (verbatim) and `LABEL` (NUL-terminated, trailing
    /// ASCII whitespace stripped) per the gating flags in `mask`.
    pub fn set_label(&mut self, mask: RequestMask, raw: &[u8]) -> ProbeResult<()>
    {
        if mask.contains(RequestMask::LABEL_RAW) {
            self.set_value("LABEL_RAW", raw)?;
        }
        if !mask.contains(RequestMask::LABEL) {
            return Ok(());
        }

        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let mut trimmed = end;
        while trimmed > 0 && (raw[trimmed - 1] as char).is_ascii_whitespace() {
            trimmed -= 1;
        }
        let mut bytes = raw[..trimmed].to_vec();
        bytes.push(0);
        self.set_value("LABEL", &bytes)
    }

    /// Emits a UTF-16 (LE/BE) label as UTF-8, stopping at the first NUL code
    /// unit or destination overflow. BMP-only: unpaired surrogates are
    /// emitted as the raw three-byte UTF-8 encoding of their code unit, no
    /// surrogate-pair reassembly is attempted.
    pub fn set_utf8_label(&mut self, mask: RequestMask, raw: &[u8], enc: Encoding) -> ProbeResult<()>
    {
        if mask.contains(RequestMask::LABEL_RAW) {
            self.set_value("LABEL_RAW", raw)?;
        }
        if !mask.contains(RequestMask::LABEL) {
            return Ok(());
        }

        let encoded = encode_to_utf8(enc, raw, MAX_VALUE_BYTES - 1);
        self.set_value("LABEL", &encoded)
    }

    /// Emits `UUID`/`UUID_RAW` for a 16-byte DCE-style UUID, skipped
    /// entirely when the input is all-zero. `name` overrides the default
    /// `UUID` tag name (used by probers with several distinct UUID fields,
    /// e.g. a filesystem UUID and a journal UUID); when a name override is
    /// given, `UUID_RAW` is never emitted (only the default name carries
    /// the raw form).
    pub fn set_uuid(&mut self, mask: RequestMask, uuid: &[u8; 16], name: Option<&'static str>) -> ProbeResult<()>
    {
        if uuid.iter().all(|&b| b == 0) {
            return Ok(());
        }

        if name.is_none() && mask.contains(RequestMask::UUID_RAW) {
            self.set_value("UUID_RAW", uuid)?;
        }
        if !mask.contains(RequestMask::UUID) {
            return Ok(());
        }

        let text = format_uuid(uuid);
        self.set_value(name.unwrap_or("UUID"), text.as_bytes())
    }

    /// Non-variadic re-expression of the reference `sprintf_uuid`: stores an
    /// already-formatted UUID string, lowercased, gated the same way as
    /// `set_uuid`. Skipped if `text` is empty.
    pub fn set_uuid_string(&mut self, mask: RequestMask, name: &'static str, text: &str) -> ProbeResult<()>
    {
        if text.is_empty() {
            return Ok(());
        }
        if !mask.contains(RequestMask::UUID) {
            return Ok(());
        }
        let lowered = text.to_ascii_lowercase();
        self.set_value(name, lowered.as_bytes())
    }

    /// Non-variadic re-expression of `sprintf_uuid` for raw (non-DCE,
    /// arbitrary-length) UUID-like fields, e.g. RAID superblock UUIDs that
    /// are wider or narrower than 16 bytes.
    pub fn set_uuid_bytes(&mut self, mask: RequestMask, name: &'static str, raw: &[u8]) -> ProbeResult<()>
    {
        if raw.iter().all(|&b| b == 0) {
            return Ok(());
        }
        if mask.contains(RequestMask::UUID_RAW) {
            self.set_value("UUID_RAW", raw)?;
        }
        if !mask.contains(RequestMask::UUID) {
            return Ok(());
        }
        let text = format_uuid_bytes(raw);
        self.set_value(name, text.as_bytes())
    }
}

/// Canonical `8-4-4-4-12` lowercase hex rendering of a 16-byte UUID.
pub fn format_uuid(b: &[u8; 16]) -> String
{
    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15],
    )
}

/// Plain lowercase hex rendering for raw UUID-like fields of arbitrary
/// length (no grouping hyphens — those are only well-defined for the
/// 16-byte DCE layout).
fn format_uuid_bytes(raw: &[u8]) -> String
{
    raw.iter().map(|b| format!("{:02x}", b)).collect()
}

fn encode_to_utf8(enc: Encoding, src: &[u8], max_len: usize) -> Vec<u8>
{
    let mut dest = Vec::with_capacity(src.len());
    let mut i = 0;
    while i + 2 <= src.len() {
        let c: u16 = match enc {
            Encoding::Utf16Le => u16::from_le_bytes([src[i], src[i + 1]]),
            Encoding::Utf16Be => u16::from_be_bytes([src[i], src[i + 1]]),
        };
        i += 2;

        if c == 0 {
            break;
        } else if c < 0x80 {
            if dest.len() + 1 > max_len {
                break;
            }
            dest.push(c as u8);
        } else if c < 0x800 {
            if dest.len() + 2 > max_len {
                break;
            }
            dest.push(0xc0 | (c >> 6) as u8);
            dest.push(0x80 | (c & 0x3f) as u8);
        } else {
            if dest.len() + 3 > max_len {
                break;
            }
            dest.push(0xe0 | (c >> 12) as u8);
            dest.push(0x80 | ((c >> 6) & 0x3f) as u8);
            dest.push(0x80 | (c & 0x3f) as u8);
        }
    }
    dest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_strips_trailing_whitespace_but_keeps_raw()
    {
        let mut store = TagStore::new();
        let mask = RequestMask::LABEL | RequestMask::LABEL_RAW;
        store.set_label(mask, b"ROOT   \0").unwrap();

        assert_eq!(store.lookup("LABEL").unwrap().as_str_lossy(), "ROOT");
        assert_eq!(store.lookup("LABEL_RAW").unwrap().value(), b"ROOT   \0");
    }

    #[test]
    fn uuid_formats_canonically()
    {
        let mut store = TagStore::new();
        let uuid = [
            0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef,
            0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54, 0x32, 0x10,
        ];
        store.set_uuid(RequestMask::UUID, &uuid, None).unwrap();

        assert_eq!(
            store.lookup("UUID").unwrap().as_str_lossy(),
            "01234567-89ab-cdef-fedc-ba9876543210",
        );
    }

    #[test]
    fn uuid_skips_when_all_zero()
    {
        let mut store = TagStore::new();
        store.set_uuid(RequestMask::ALL, &[0u8; 16], None).unwrap();

        assert!(!store.has("UUID"));
        assert!(!store.has("UUID_RAW"));
    }

    #[test]
    fn emitter_gating_with_empty_mask_emits_nothing()
    {
        let mut store = TagStore::new();
        store.set_label(RequestMask::NONE, b"x\0").unwrap();
        store.set_version(RequestMask::NONE, "1.0").unwrap();
        store.set_uuid(RequestMask::NONE, &[1u8; 16], None).unwrap();

        assert_eq!(store.len(), 0);
    }

    #[test]
    fn capacity_exhaustion_is_an_error()
    {
        let mut store = TagStore::new();
        for i in 0..MAX_TAGS {
            let name: &'static str = Box::leak(format!("T{}", i).into_boxed_str());
            store.set_value(name, b"x").unwrap();
        }
        let err = store.set_value("OVERFLOW", b"x");
        assert!(err.is_err());
    }

    #[test]
    fn utf16le_label_stops_at_nul()
    {
        let mut store = TagStore::new();
        // "Hi" + NUL + garbage, little-endian UTF-16.
        let raw: &[u8] = &[b'H', 0, b'i', 0, 0, 0, b'X', 0];
        store.set_utf8_label(RequestMask::LABEL, raw, Encoding::Utf16Le).unwrap();

        assert_eq!(store.lookup("LABEL").unwrap().as_str_lossy(), "Hi");
    }
}
