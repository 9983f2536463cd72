//! LVM2 physical volume label: an 8-byte signature followed by a CRC and a
//! sector-offset field, found in one of the first four sectors.

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;

const LABEL_MAGIC: &[u8] = b"LABELONE";
const LVM2_MAGIC: &[u8] = b"LVM2 001";

// The label may be on any of the first 4 sectors; declare one magic spec
// per candidate sector rather than scanning in the probe function.
static MAGICS: &[MagicSpec] = &[
    MagicSpec::new(LABEL_MAGIC, 0, 0),
    MagicSpec::new(LABEL_MAGIC, 0, 512),
    MagicSpec::new(LABEL_MAGIC, 1, 0),
    MagicSpec::new(LABEL_MAGIC, 1, 512),
];

fn probe(session: &mut Session, magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    let sector_off = match magic {
        Some(m) => m.absolute(),
        None => return Ok(false),
    };

    // The LVM2 sub-signature sits 8 bytes past LABELONE's CRC + offset
    // fields (u32 crc, u64 sector, u32 offset = 16 bytes of header).
    let buf = match session.get_buffer(sector_off + 8 + 16, LVM2_MAGIC.len()) {
        Some(b) => b,
        None => return Ok(false),
    };

    Ok(buf == LVM2_MAGIC)
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "LVM2_member",
    usage: UsageClass::Other,
    magics: MAGICS,
    probe_fn: probe,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_label_on_first_sector()
    {
        let mut data = vec![0u8; 4096];
        data[0..8].copy_from_slice(LABEL_MAGIC);
        data[24..32].copy_from_slice(LVM2_MAGIC);

        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&data).unwrap();

        let mut session = Session::new();
        session.bind(f, 0, 0).unwrap();

        let magic = &MAGICS[0];
        assert!(probe(&mut session, Some(magic)).unwrap());
    }
}
