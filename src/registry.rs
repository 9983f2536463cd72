use crate::error::ProbeResult;
use crate::session::Session;

/// Coarse categorization of what a format is for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UsageClass {
    Filesystem,
    Raid,
    Crypto,
    Other,
}

impl UsageClass {
    /// Lowercased class name, per the tag-value vocabulary. `"unknown"` is
    /// reserved for a descriptor whose class is unset — every descriptor in
    /// this registry has a class, so that case cannot occur here, but the
    /// core must still be able to render it.
    pub fn as_str(&self) -> &'static str
    {
        match self {
            UsageClass::Filesystem => "filesystem",
            UsageClass::Raid => "raid",
            UsageClass::Crypto => "crypto",
            UsageClass::Other => "other",
        }
    }
}

/// A magic pattern expected at a precise `(kilobyte, sub-kilobyte)` offset.
#[derive(Copy, Clone, Debug)]
pub struct MagicSpec {
    pub pattern: &'static [u8],
    pub kb_offset: u32,
    pub sub_offset: u32,
}

impl MagicSpec {
    pub const fn new(pattern: &'static [u8], kb_offset: u32, sub_offset: u32) -> Self
    {
        Self { pattern, kb_offset, sub_offset }
    }

    pub fn absolute(&self) -> u64
    {
        self.kb_offset as u64 * 1024 + self.sub_offset as u64
    }
}

/// `probe_fn` receives the matched magic, if the descriptor declared any —
/// `None` when the descriptor has no magics (probe function is called
/// unconditionally) or matching was skipped because the list was empty.
pub type ProbeFn = fn(&mut Session, Option<&MagicSpec>) -> ProbeResult<bool>;

/// A single prober's immutable, statically defined identity: name, usage
/// class, magic signatures, and its validating function. This is the stable
/// plug-in boundary between the dispatch loop and per-format code.
pub struct ProberDescriptor {
    pub name: &'static str,
    pub usage: UsageClass,
    pub magics: &'static [MagicSpec],
    pub probe_fn: ProbeFn,
}

/// Registry order is part of the observable data model: probers are tried
/// in declaration order, first match wins. RAID and container formats
/// precede filesystems so a wrapped volume (e.g. an LVM2 physical volume
/// holding an xfs filesystem) reports the outer container by default.
pub static REGISTRY: &[ProberDescriptor] = &[
    crate::probers::linux_raid::DESCRIPTOR,
    crate::probers::ddf_raid::DESCRIPTOR,
    crate::probers::intel_raid::DESCRIPTOR,
    crate::probers::lvm2::DESCRIPTOR,
    crate::probers::luks::DESCRIPTOR,
    crate::probers::vfat::DESCRIPTOR,
    crate::probers::swsuspend::DESCRIPTOR,
    crate::probers::swap::DESCRIPTOR,
    crate::probers::xfs::DESCRIPTOR,
    crate::probers::ext::EXT4,
    crate::probers::ext::EXT3,
    crate::probers::ext::EXT2,
    crate::probers::iso9660::DESCRIPTOR,
    crate::probers::ntfs::DESCRIPTOR,
];

pub fn names() -> Vec<&'static str>
{
    REGISTRY.iter().map(|d| d.name).collect()
}

pub fn usages() -> Vec<UsageClass>
{
    REGISTRY.iter().map(|d| d.usage).collect()
}

pub fn index_of(name: &str) -> Option<usize>
{
    REGISTRY.iter().position(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raid_and_crypto_precede_filesystems()
    {
        let lvm2_idx = index_of("LVM2_member").unwrap();
        let ext4_idx = index_of("ext4").unwrap();
        assert!(lvm2_idx < ext4_idx);
    }

    #[test]
    fn registry_names_are_unique()
    {
        let names = names();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names.len(), sorted.len());
    }
}
