//! Linux swap area signature, `pagesize - 10` like its hibernation-image
//! cousin, plus a UUID/label that (unlike the hibernate signature) the
//! real swap header does carry, a few dozen bytes before the signature.

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;

const SIG_OLD: &[u8] = b"SWAP-SPACE2";
const SIG_NEW: &[u8] = b"SWAPSPACE2";

static MAGICS: &[MagicSpec] = &[
    MagicSpec::new(SIG_NEW, 0, 4096 - 10),
    MagicSpec::new(SIG_OLD, 0, 4096 - 10),
    MagicSpec::new(SIG_NEW, 0, 8192 - 10),
    MagicSpec::new(SIG_OLD, 0, 8192 - 10),
    MagicSpec::new(SIG_NEW, 0, 16384 - 10),
    MagicSpec::new(SIG_OLD, 0, 16384 - 10),
    MagicSpec::new(SIG_NEW, 0, 65536 - 10),
    MagicSpec::new(SIG_OLD, 0, 65536 - 10),
];

// Layout of `union swap_header`'s `info` member: version(4), last_page(4),
// nr_badpages(4), uuid(16), volume_name(16) at offset 1024 — identical
// across page sizes, since it lives in the first page regardless of its
// total size.
const INFO_OFFSET: u64 = 1024;
const UUID_OFFSET: u64 = INFO_OFFSET + 12;
const LABEL_OFFSET: u64 = UUID_OFFSET + 16;

fn probe(session: &mut Session, magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    if magic.is_none() {
        return Ok(false);
    }

    let uuid: [u8; 16] = match session.get_buffer(UUID_OFFSET, 16) {
        Some(b) => b.try_into().unwrap(),
        None => [0u8; 16],
    };
    let label = session.get_buffer(LABEL_OFFSET, 16).map(|b| b.to_vec());

    let mask = session.request();
    let tags = session.tags_mut();
    tags.set_uuid(mask, &uuid, None)?;
    if let Some(label) = label {
        tags.set_label(mask, &label)?;
    }

    Ok(true)
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "swap",
    usage: UsageClass::Other,
    magics: MAGICS,
    probe_fn: probe,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_swap_signature_and_uuid()
    {
        let mut data = vec![0u8; 65536];
        let off = 4096 - 10;
        data[off..off + SIG_NEW.len()].copy_from_slice(SIG_NEW);
        data[UUID_OFFSET as usize..UUID_OFFSET as usize + 16].copy_from_slice(&[9u8; 16]);

        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&data).unwrap();

        let mut session = Session::new();
        session.bind(f, 0, 0).unwrap();
        session.set_request(crate::tags::RequestMask::ALL);

        let magic = &MAGICS[0];
        assert!(probe(&mut session, Some(magic)).unwrap());
        assert!(session.lookup_value("UUID").is_some());
    }
}
