//! ext2/ext3/ext4 superblock prober.
//!
//! The superblock layout below is trimmed to the prefix a content
//! identifier actually needs — just enough to validate the magic, pick
//! ext2 vs. ext3 vs. ext4 apart by feature bits, and read the label/UUID.
#![allow(dead_code)]

use bincode::{DefaultOptions, Options};
use serde::{Deserialize, Serialize};

use crate::error::ProbeResult;
use crate::registry::{MagicSpec, ProberDescriptor, UsageClass};
use crate::session::Session;
use crate::tags::RequestMask;

const EXT_SB_OFFSET: u32 = 1024;
const EXT_MAGIC: u16 = 0xef53;

// Source: https://elixir.bootlin.com/linux/latest/source/fs/ext4/ext4.h
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct SuperBlock {
    s_inodes_count: u32,
    s_blocks_count_lo: u32,
    s_r_blocks_count_lo: u32,
    s_free_blocks_count_lo: u32,
    s_free_inodes_count: u32,
    s_first_data_block: u32,
    s_log_block_size: u32,
    s_log_cluster_size: u32,
    s_blocks_per_group: u32,
    s_clusters_per_group: u32,
    s_inodes_per_group: u32,
    s_mtime: u32,
    s_wtime: u32,
    s_mnt_count: u16,
    s_max_mnt_count: u16,
    s_magic: u16,
    s_state: u16,
    s_errors: u16,
    s_minor_rev_level: u16,
    s_lastcheck: u32,
    s_checkinterval: u32,
    s_creator_os: u32,
    s_rev_level: u32,
    s_def_resuid: u16,
    s_def_resgid: u16,
    s_first_ino: u32,
    s_inode_size: u16,
    s_block_group_nr: u16,
    s_feature_compat: u32,
    s_feature_incompat: u32,
    s_feature_ro_compat: u32,
    s_uuid: [u8; 16],
    s_volume_name: [u8; 16],
    s_last_mounted: [u8; 64],
}

const FEATURE_COMPAT_HAS_JOURNAL: u32 = 0x0004;
const FEATURE_INCOMPAT_RECOVER: u32 = 0x0004;
const FEATURE_INCOMPAT_EXTENTS: u32 = 0x0040;
const FEATURE_INCOMPAT_64BIT: u32 = 0x0080;
const FEATURE_RO_COMPAT_HUGE_FILE: u32 = 0x0008;

fn read_superblock(session: &mut Session) -> Option<SuperBlock>
{
    let buf = session.get_buffer(EXT_SB_OFFSET as u64, 264)?;
    let opts = DefaultOptions::new().with_fixint_encoding().allow_trailing_bytes();
    opts.deserialize(buf).ok()
}

fn is_ext4(sb: &SuperBlock) -> bool
{
    sb.s_feature_incompat & FEATURE_INCOMPAT_EXTENTS != 0
        || sb.s_feature_incompat & FEATURE_INCOMPAT_64BIT != 0
        || sb.s_feature_ro_compat & FEATURE_RO_COMPAT_HUGE_FILE != 0
}

fn is_ext3(sb: &SuperBlock) -> bool
{
    sb.s_feature_compat & FEATURE_COMPAT_HAS_JOURNAL != 0
        || sb.s_feature_incompat & FEATURE_INCOMPAT_RECOVER != 0
}

fn probe_ext(session: &mut Session, want: ExtVariant) -> ProbeResult<bool>
{
    let sb = match read_superblock(session) {
        Some(sb) => sb,
        None => return Ok(false),
    };

    if sb.s_magic != EXT_MAGIC {
        return Ok(false);
    }
    if sb.s_rev_level > 1 {
        return Ok(false);
    }

    let variant = if is_ext4(&sb) {
        ExtVariant::Ext4
    } else if is_ext3(&sb) {
        ExtVariant::Ext3
    } else {
        ExtVariant::Ext2
    };
    if variant != want {
        return Ok(false);
    }

    let mask = session.request();
    let tags = session.tags_mut();
    tags.set_label(mask, &sb.s_volume_name)?;
    tags.set_uuid(mask, &sb.s_uuid, None)?;
    tags.set_version(mask, &format!("{}.{}", sb.s_rev_level, sb.s_minor_rev_level))?;

    Ok(true)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ExtVariant {
    Ext2,
    Ext3,
    Ext4,
}

fn probe_ext2(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    probe_ext(session, ExtVariant::Ext2)
}

fn probe_ext3(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    probe_ext(session, ExtVariant::Ext3)
}

fn probe_ext4(session: &mut Session, _magic: Option<&MagicSpec>) -> ProbeResult<bool>
{
    probe_ext(session, ExtVariant::Ext4)
}

static MAGICS: &[MagicSpec] = &[MagicSpec::new(&[0x53, 0xef], 1, 0x38)];

pub static EXT4: ProberDescriptor = ProberDescriptor {
    name: "ext4",
    usage: UsageClass::Filesystem,
    magics: MAGICS,
    probe_fn: probe_ext4,
};

pub static EXT3: ProberDescriptor = ProberDescriptor {
    name: "ext3",
    usage: UsageClass::Filesystem,
    magics: MAGICS,
    probe_fn: probe_ext3,
};

pub static EXT2: ProberDescriptor = ProberDescriptor {
    name: "ext2",
    usage: UsageClass::Filesystem,
    magics: MAGICS,
    probe_fn: probe_ext2,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use std::io::Write;
    use std::io::Seek;

    fn build_image(feature_incompat: u32, label: &[u8; 16], uuid: [u8; 16]) -> std::fs::File
    {
        let mut sb = SuperBlock {
            s_magic: EXT_MAGIC,
            s_state: 1,
            s_errors: 1,
            s_rev_level: 1,
            s_minor_rev_level: 0,
            s_feature_incompat: feature_incompat,
            s_uuid: uuid,
            s_volume_name: *label,
            ..Default::default()
        };
        sb.s_last_mounted = [0u8; 64];

        let opts = DefaultOptions::new().with_fixint_encoding().allow_trailing_bytes();
        let bytes = opts.serialize(&sb).unwrap();

        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&vec![0u8; 1024]).unwrap();
        f.write_all(&bytes).unwrap();
        f.write_all(&vec![0u8; 65536]).unwrap();
        f.seek(std::io::SeekFrom::Start(0)).unwrap();
        f
    }

    #[test]
    fn detects_ext4_by_extents_flag()
    {
        let f = build_image(FEATURE_INCOMPAT_EXTENTS, b"my  root  \0\0\0\0\0\0", [1u8; 16]);
        let mut session = Session::new();
        session.bind(f, 0, 0).unwrap();
        session.set_request(RequestMask::ALL);

        let outcome = session.probe_next().unwrap();
        assert_eq!(outcome, crate::session::ProbeOutcome::Matched);
        assert_eq!(session.lookup_value("TYPE").unwrap().as_str_lossy(), "ext4");
        assert_eq!(session.lookup_value("LABEL").unwrap().as_str_lossy(), "my  root");
    }

    #[test]
    fn falls_back_to_ext2_without_journal_or_extents()
    {
        let f = build_image(0, b"plain2\0\0\0\0\0\0\0\0\0\0", [0u8; 16]);
        let mut session = Session::new();
        session.bind(f, 0, 0).unwrap();
        session.set_request(RequestMask::ALL);

        session.probe_next().unwrap();
        assert_eq!(session.lookup_value("TYPE").unwrap().as_str_lossy(), "ext2");
        assert!(!session.has_value("UUID"));
    }
}
