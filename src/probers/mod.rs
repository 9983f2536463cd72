//! Concrete prober plug-ins.
//!
//! Each submodule exports one or more `ProberDescriptor` constants matching
//! the plug-in contract described in the design: a static name, a usage
//! class, an ordered list of magic specs (possibly empty), and a probe
//! function that validates the candidate and emits tags via the session's
//! value emitters. None of these modules may emit `TYPE` or `USAGE`
//! themselves — the dispatch loop does that on a successful match.
//!
//! This is a representative slice of real-world formats, not an exhaustive
//! catalogue; the registry order (RAID/crypto containers before
//! filesystems) is what matters to the core, not the size of the list.

pub mod ddf_raid;
pub mod ext;
pub mod intel_raid;
pub mod iso9660;
pub mod linux_raid;
pub mod luks;
pub mod lvm2;
pub mod ntfs;
pub mod swap;
pub mod swsuspend;
pub mod vfat;
pub mod xfs;
