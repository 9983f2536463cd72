//! SNIA DDF (Disk Data Format) RAID metadata: the anchor header lives in
//! the very last sector of the member device, which makes this prober a
//! direct illustration of the buffer cache's general (non-superblock)
//! tier — the window it requests is almost always outside the first 64 KiB.

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;

const DDF_MAGIC: &[u8] = b"DE11";
const DDF_HEADER_LEN: u64 = 512;

fn probe(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    let size = session.size();
    if size < DDF_HEADER_LEN {
        return Ok(false);
    }
    let anchor_off = size - DDF_HEADER_LEN;

    let buf = match session.get_buffer(anchor_off, DDF_HEADER_LEN as usize) {
        Some(b) => b,
        None => return Ok(false),
    };

    Ok(&buf[0..4] == DDF_MAGIC)
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "ddf_raid_member",
    usage: UsageClass::Raid,
    magics: &[],
    probe_fn: probe,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_anchor_at_last_sector()
    {
        let mut data = vec![0u8; 1_048_576];
        let off = data.len() - DDF_HEADER_LEN as usize;
        data[off..off + 4].copy_from_slice(DDF_MAGIC);

        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&data).unwrap();

        let mut session = Session::new();
        session.bind(f, 0, 0).unwrap();

        assert!(probe(&mut session, None).unwrap());
    }

    #[test]
    fn rejects_device_without_anchor()
    {
        let data = vec![0u8; 1_048_576];
        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&data).unwrap();

        let mut session = Session::new();
        session.bind(f, 0, 0).unwrap();

        assert!(!probe(&mut session, None).unwrap());
    }
}
