//! ISO 9660 primary volume descriptor, at the well-known 32 KiB offset —
//! the other canonical example (besides a RAID trailer) of a superblock
//! far enough from the start to exercise the buffer cache's general tier.

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;

const ISO_MAGIC: &[u8] = b"CD001";
const PVD_OFFSET: u64 = 32769; // 32 KiB + 1 (volume descriptor type byte)

static MAGICS: &[MagicSpec] = &[MagicSpec::new(ISO_MAGIC, 32, 1)];

fn probe(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    // Volume descriptor type byte precedes the "CD001" signature; a
    // primary volume descriptor is type 1.
    let type_byte = match session.get_buffer(PVD_OFFSET - 1, 1) {
        Some(b) => b[0],
        None => return Ok(false),
    };
    if type_byte != 1 {
        return Ok(false);
    }

    // Volume label: 32 bytes at offset 40 within the descriptor (0x8028).
    let label = session.get_buffer(PVD_OFFSET + 39, 32).map(|b| b.to_vec());

    let mask = session.request();
    let tags = session.tags_mut();
    if let Some(label) = label {
        tags.set_label(mask, &label)?;
    }

    Ok(true)
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "iso9660",
    usage: UsageClass::Filesystem,
    magics: MAGICS,
    probe_fn: probe,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_primary_volume_descriptor()
    {
        let mut data = vec![0u8; 40000];
        data[(PVD_OFFSET - 1) as usize] = 1;
        data[PVD_OFFSET as usize..PVD_OFFSET as usize + 5].copy_from_slice(ISO_MAGIC);
        let label_off = (PVD_OFFSET + 39) as usize;
        data[label_off..label_off + 6].copy_from_slice(b"CDROM1");

        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&data).unwrap();

        let mut session = Session::new();
        session.bind(f, 0, 0).unwrap();
        session.set_request(crate::tags::RequestMask::ALL);

        assert!(probe(&mut session, None).unwrap());
        assert!(session.lookup_value("LABEL").unwrap().as_str_lossy().starts_with("CDROM1"));
    }
}
