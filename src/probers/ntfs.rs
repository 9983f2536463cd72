//! NTFS boot sector ("OEM ID" field).

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;

const NTFS_MAGIC: &[u8] = b"NTFS    ";

static MAGICS: &[MagicSpec] = &[MagicSpec::new(NTFS_MAGIC, 0, 3)];

fn probe(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    // volume_serial_number: u64 at offset 0x48.
    let serial: [u8; 8] = match session.get_buffer(0x48, 8) {
        Some(b) => b.try_into().unwrap(),
        None => return Ok(false),
    };

    let mask = session.request();
    let tags = session.tags_mut();
    tags.set_uuid_bytes(mask, "UUID", &serial)?;

    Ok(true)
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "ntfs",
    usage: UsageClass::Filesystem,
    magics: MAGICS,
    probe_fn: probe,
};
