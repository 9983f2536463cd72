//! XFS primary superblock.

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;

const XFS_MAGIC: &[u8] = b"XFSB";

static MAGICS: &[MagicSpec] = &[MagicSpec::new(XFS_MAGIC, 0, 0)];

fn probe(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    // sb_magicnum(4) sb_blocksize(4) sb_dblocks(8) sb_rblocks(8)
    // sb_rextents(8) sb_uuid(16) ...
    let buf = match session.get_buffer(0, 44) {
        Some(b) => b.to_vec(),
        None => return Ok(false),
    };

    let uuid_off = 4 + 4 + 8 + 8 + 8;
    let uuid: [u8; 16] = buf[uuid_off..uuid_off + 16].try_into().unwrap();

    // sb_fname (label) sits at offset 108, 12 bytes, after fields this
    // prober does not otherwise model.
    let label = session.get_buffer(108, 12).map(|b| b.to_vec());

    let mask = session.request();
    let tags = session.tags_mut();
    tags.set_uuid(mask, &uuid, None)?;
    if let Some(label) = label {
        tags.set_label(mask, &label)?;
    }

    Ok(true)
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "xfs",
    usage: UsageClass::Filesystem,
    magics: MAGICS,
    probe_fn: probe,
};
