//! LUKS (Linux Unified Key Setup) encrypted-volume header.

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;
use crate::tags::RequestMask;

const LUKS_MAGIC: &[u8] = &[b'L', b'U', b'K', b'S', 0xba, 0xbe];

static MAGICS: &[MagicSpec] = &[MagicSpec::new(LUKS_MAGIC, 0, 0)];

fn probe(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    // version (u16), cipher name (32), cipher mode (32), hash spec (32),
    // payload offset (u32), key bytes (u32), mk digest (20), mk digest salt
    // (32), mk digest iterations (u32), then a 40-byte textual UUID.
    let buf = match session.get_buffer(0, 208) {
        Some(b) => b.to_vec(),
        None => return Ok(false),
    };

    if buf[0..6] != *LUKS_MAGIC {
        return Ok(false);
    }

    let version = u16::from_be_bytes([buf[6], buf[7]]);
    let uuid_off = 168usize;
    let uuid_text = String::from_utf8_lossy(&buf[uuid_off..uuid_off + 36]).into_owned();

    let mask = session.request();
    let tags = session.tags_mut();
    tags.set_version(mask, &version.to_string())?;
    tags.set_uuid_string(mask, "UUID", uuid_text.trim_end_matches('\0'))?;

    Ok(true)
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "crypto_LUKS",
    usage: UsageClass::Crypto,
    magics: MAGICS,
    probe_fn: probe,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_luks_header_and_uuid()
    {
        let mut data = vec![0u8; 1024];
        data[0..6].copy_from_slice(LUKS_MAGIC);
        data[6..8].copy_from_slice(&1u16.to_be_bytes());
        let uuid = b"12345678-1234-1234-1234-123456789012";
        data[168..168 + 36].copy_from_slice(&uuid[..36]);

        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&data).unwrap();

        let mut session = Session::new();
        session.bind(f, 0, 0).unwrap();
        session.set_request(RequestMask::ALL);

        assert!(probe(&mut session, None).unwrap());
        assert_eq!(
            session.lookup_value("UUID").unwrap().as_str_lossy(),
            "12345678-1234-1234-1234-123456789012",
        );
    }
}
