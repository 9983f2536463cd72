//! FAT12/16/32 boot sector. Simplified to the common heuristics: a valid
//! x86 jump instruction at offset 0 and one of the FAT type strings in the
//! BPB, without full cluster/FAT geometry cross-validation.

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;

fn probe(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    let buf = match session.get_buffer(0, 512) {
        Some(b) => b.to_vec(),
        None => return Ok(false),
    };

    let jmp_ok = buf[0] == 0xeb || buf[0] == 0xe9;
    if !jmp_ok {
        return Ok(false);
    }

    // FAT12/16 BPB carries the type string at offset 0x36, FAT32's at
    // offset 0x52 (after the extended BIOS parameter block).
    let fat1x = &buf[0x36..0x3e];
    let fat32 = &buf[0x52..0x5a];

    let is_fat = fat1x.starts_with(b"FAT12") || fat1x.starts_with(b"FAT16") || fat32.starts_with(b"FAT32");
    if !is_fat {
        return Ok(false);
    }

    let mask = session.request();
    let tags = session.tags_mut();
    let label = if fat32.starts_with(b"FAT32") {
        &buf[0x47..0x47 + 11]
    } else {
        &buf[0x2b..0x2b + 11]
    };
    tags.set_label(mask, label)?;

    Ok(true)
}

pub static DESCRIPTOR: ProberDescriptor = ProberDescriptor {
    name: "vfat",
    usage: UsageClass::Filesystem,
    magics: &[],
    probe_fn: probe,
};
