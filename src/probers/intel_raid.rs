//! Intel Matrix Storage Manager ("ISW") RAID metadata, anchored near the
//! end of the device like DDF; simplified here to a single trailing sector
//! check rather than the full multi-copy layout real firmware writes.

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;

const ISW_MAGIC: &[u8] = b"Intel Raid ISM Cfg Sig. ";
const ISW_HEADER_LEN: u64 = 512;

fn probe(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    let size = session.size();
    if size < ISW_HEADER_LEN {
        return Ok(false);
    }
    let anchor_off = size - ISW_HEADER_LEN;

    let buf = match session.get_buffer(anchor_off, ISW_HEADER_LEN as usize) {
        Some(b) => b,
        None => return Ok(false),
    };

    Ok(buf.len() >= ISW_MAGIC.len() && &buf[..ISW_MAGIC.len()] == ISW_MAGIC)
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "isw_raid_member",
    usage: UsageClass::Raid,
    magics: &[],
    probe_fn: probe,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_anchor_signature()
    {
        let mut data = vec![0u8; 65536];
        let off = data.len() - ISW_HEADER_LEN as usize;
        data[off..off + ISW_MAGIC.len()].copy_from_slice(ISW_MAGIC);

        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&data).unwrap();

        let mut session = Session::new();
        session.bind(f, 0, 0).unwrap();

        assert!(probe(&mut session, None).unwrap());
    }
}
