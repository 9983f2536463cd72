//! Linux software-RAID (mdraid) superblock, version 1.1 layout, which
//! (unlike version 0.90's end-of-device placement) is written at the very
//! start of the component device — a convenient, simple illustration of the
//! plug-in contract using a static magic instead of end-relative scanning.

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;
use crate::tags::RequestMask;

const MD_MAGIC: [u8; 4] = 0xa92b4efc_u32.to_le_bytes();

static MAGICS: &[MagicSpec] = &[MagicSpec::new(&MD_MAGIC, 0, 0)];

fn probe(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    let buf = match session.get_buffer(0, 128) {
        Some(b) => b.to_vec(),
        None => return Ok(false),
    };

    if buf[0..4] != MD_MAGIC {
        return Ok(false);
    }

    // mdp_superblock_1: major_version, feature_map, pad0, set_uuid (16
    // bytes), set_name (32 bytes) follow the magic.
    let set_uuid: [u8; 16] = buf[12..28].try_into().unwrap();

    let mask = session.request();
    let tags = session.tags_mut();
    tags.set_uuid(mask, &set_uuid, None)?;

    Ok(true)
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "linux_raid_member",
    usage: UsageClass::Raid,
    magics: MAGICS,
    probe_fn: probe,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use std::io::Write;

    #[test]
    fn detects_by_magic_and_reads_uuid()
    {
        let mut data = vec![0u8; 65536];
        data[0..4].copy_from_slice(&MD_MAGIC);
        data[12..28].copy_from_slice(&[7u8; 16]);

        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&data).unwrap();

        let mut session = Session::new();
        session.bind(f, 0, 0).unwrap();
        session.set_request(RequestMask::ALL);

        assert!(probe(&mut session, None).unwrap());
        assert!(session.lookup_value("UUID").is_some());
    }
}
