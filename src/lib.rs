//! A block-device content identifier: given a readable byte range
//! representing a whole disk, partition, or image file, decides what
//! resides at offset zero and extracts descriptive tags (`TYPE`, `USAGE`,
//! `LABEL`, `UUID`, `VERSION`) from the structure it found.

pub mod buffer;
pub mod device;
pub mod error;
pub mod filter;
pub mod logger;
pub mod probers;
pub mod registry;
pub mod session;
pub mod tags;

pub use error::{ProbeError, ProbeResult};
pub use filter::{Filter, FilterMode};
pub use registry::UsageClass;
pub use session::{ProbeOutcome, Session};
pub use tags::{Encoding, RequestMask};
