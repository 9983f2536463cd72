//! Linux software-suspend (hibernation image) signature, written at
//! `pagesize - 10` like the swap signature it shares a disk area with.

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;

const SIG1: &[u8] = b"S1SUSPEND";
const SIG2: &[u8] = b"S2SUSPEND";

// Candidate page sizes seen across architectures: 4K, 8K, 16K, 64K.
static MAGICS: &[MagicSpec] = &[
    MagicSpec::new(SIG1, 0, 4096 - 10),
    MagicSpec::new(SIG2, 0, 4096 - 10),
    MagicSpec::new(SIG1, 0, 8192 - 10),
    MagicSpec::new(SIG2, 0, 8192 - 10),
    MagicSpec::new(SIG1, 0, 16384 - 10),
    MagicSpec::new(SIG2, 0, 16384 - 10),
    MagicSpec::new(SIG1, 0, 65536 - 10),
    MagicSpec::new(SIG2, 0, 65536 - 10),
];

fn probe(_session: &mut Session, magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    // The magic pre-check already validated the signature; nothing else to
    // cross-check for a hibernation image, and it carries no label/UUID.
    Ok(magic.is_some())
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "swsuspend",
    usage: UsageClass::Other,
    magics: MAGICS,
    probe_fn: probe,
};
