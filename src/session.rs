use std::fs::File;

use crate::buffer::BufferCache;
use crate::device;
use crate::error::{ProbeError, ProbeResult};
use crate::filter::Filter;
use crate::logger::Logger;
use crate::registry::{MagicSpec, REGISTRY};
use crate::tags::{RequestMask, TagEntry, TagStore};

/// Outcome of one `probe_next` call, the Rust re-expression of the design's
/// `MATCHED`/`EXHAUSTED`/`ERROR` triple (`ERROR` becomes `Err`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Matched,
    Exhausted,
}

/// Owns the device descriptor, the origin/size of the window being probed,
/// the two-tier buffer cache, the probe-request mask, an optional filter,
/// the dispatch cursor, and the accumulated tag store.
///
/// A session is exclusively owned by one thread for its lifetime; nothing
/// about it is safe to share across threads without external
/// synchronization (see the design's concurrency model).
pub struct Session {
    file: Option<File>,
    origin: u64,
    size: u64,
    buffers: BufferCache,
    request: RequestMask,
    filter: Option<Filter>,
    cursor: usize,
    tags: TagStore,
    logger: Option<Logger>,
}

impl Session {
    pub fn new() -> Self
    {
        Self {
            file: None,
            origin: 0,
            size: 0,
            buffers: BufferCache::new(),
            request: RequestMask::NONE,
            filter: None,
            cursor: 0,
            tags: TagStore::new(),
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self
    {
        self.logger = Some(logger);
        self
    }

    /// Assigns the device to probe, resets internal buffers and tags, and
    /// performs a precautionary one-byte read to surface an unreadable or
    /// zero-length device early. `size == 0` means "query it from the
    /// device".
    pub fn bind(&mut self, file: File, origin: u64, size: u64) -> ProbeResult<()>
    {
        self.buffers.clear();
        self.tags.clear();
        self.cursor = 0;

        self.file = Some(file);
        self.origin = origin;
        self.size = if size != 0 {
            size
        } else {
            device::device_size(self.file.as_ref().unwrap())?
        };

        let origin = self.origin;
        let file = self.file.as_mut().unwrap();
        let probe_len = self.buffers.get(file, origin, 0, 1).map(|b| b.len()).unwrap_or(0);
        if probe_len == 0 {
            self.file = None;
            return Err(ProbeError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "device is empty or unreadable",
            )));
        }

        Ok(())
    }

    /// Reclaims ownership of the bound file, e.g. so a caller can keep using
    /// the descriptor after discarding the session. Leaves the session
    /// unbound (a subsequent `probe_next` returns `InvalidArgument`).
    pub fn take_file(&mut self) -> Option<File>
    {
        self.file.take()
    }

    pub fn is_bound(&self) -> bool
    {
        self.file.is_some()
    }

    pub fn size(&self) -> u64
    {
        self.size
    }

    pub fn origin(&self) -> u64
    {
        self.origin
    }

    /// Sets the probe-request mask; does not reset the cursor.
    pub fn set_request(&mut self, mask: RequestMask)
    {
        self.request = mask;
    }

    pub fn request(&self) -> RequestMask
    {
        self.request
    }

    /// Clears buffers, tags, and cursor; fd/origin/size are preserved.
    pub fn reset(&mut self)
    {
        self.buffers.clear();
        self.tags.clear();
        self.cursor = 0;
    }

    /// Releases buffers, filter, and tag storage. The fd is NOT closed —
    /// the session stays bound to the same file until rebound or dropped;
    /// use `take_file` first if the caller needs to keep the descriptor
    /// alive independently of this session.
    pub fn free(&mut self)
    {
        self.buffers.clear();
        self.filter = None;
        self.tags.clear();
        self.cursor = 0;
    }

    pub fn install_filter(&mut self, filter: Filter)
    {
        self.filter = Some(filter);
        self.cursor = 0;
    }

    /// Requests an `(off, len)` window relative to `origin`. Returns `None`
    /// on a short read, seek failure, or end-of-device — all three collapse
    /// to the same "this prober does not match" outcome for callers.
    pub fn get_buffer(&mut self, off: u64, len: usize) -> Option<&[u8]>
    {
        let origin = self.origin;
        let file = self.file.as_mut()?;
        self.buffers.get(file, origin, off, len)
    }

    pub fn num_values(&self) -> usize
    {
        self.tags.len()
    }

    pub fn get_value(&self, idx: usize) -> Option<&TagEntry>
    {
        self.tags.get(idx)
    }

    pub fn lookup_value(&self, name: &str) -> Option<&TagEntry>
    {
        self.tags.lookup(name)
    }

    pub fn has_value(&self, name: &str) -> bool
    {
        self.tags.has(name)
    }

    pub fn values(&self) -> impl Iterator<Item = &TagEntry>
    {
        self.tags.iter()
    }

    pub fn tags_mut(&mut self) -> &mut TagStore
    {
        &mut self.tags
    }

    /// Drives the dispatch loop: advances the cursor through the registry,
    /// performs magic pre-screening for each unfiltered prober, invokes its
    /// probe function, and returns on the first match. Resumable: a caller
    /// may call this repeatedly to enumerate every co-resident signature,
    /// as long as the filter is not mutated and the device is not rebound
    /// between calls (either of those resets the cursor to 0).
    pub fn probe_next(&mut self) -> ProbeResult<ProbeOutcome>
    {
        if self.file.is_none() {
            return Err(ProbeError::InvalidArgument("no device bound"));
        }

        self.tags.clear();

        let mut i = self.cursor;
        while i < REGISTRY.len() {
            if let Some(filter) = &self.filter {
                if filter.skip(i) {
                    i += 1;
                    continue;
                }
            }
            self.cursor = i;

            let descriptor = &REGISTRY[i];
            if let Some(logger) = &mut self.logger {
                logger.trace(&format!("trying prober {}", descriptor.name));
            }

            let matched_magic = match self.match_magics(descriptor.magics) {
                MagicOutcome::NoMagics => None,
                MagicOutcome::Matched(m) => Some(m),
                MagicOutcome::NoMatch => {
                    i += 1;
                    continue;
                }
            };

            if let Some(m) = &matched_magic {
                if let Some(logger) = &mut self.logger {
                    logger.trace(&format!("magic matched at offset {}", m.absolute()));
                }
            }

            match (descriptor.probe_fn)(self, matched_magic.as_ref()) {
                Ok(true) => {
                    if self.request.contains(RequestMask::TYPE) {
                        let mut name = descriptor.name.as_bytes().to_vec();
                        name.push(0);
                        let _ = self.tags.set_value("TYPE", &name);
                    }
                    if self.request.contains(RequestMask::USAGE) {
                        let mut usage = descriptor.usage.as_str().as_bytes().to_vec();
                        usage.push(0);
                        let _ = self.tags.set_value("USAGE", &usage);
                    }
                    if let Some(logger) = &mut self.logger {
                        logger.debug(&format!("prober {} matched", descriptor.name));
                    }
                    self.cursor = i + 1;
                    return Ok(ProbeOutcome::Matched);
                }
                Ok(false) => {
                    self.tags.clear();
                    i += 1;
                }
                Err(_) => {
                    self.tags.clear();
                    i += 1;
                }
            }
        }

        self.cursor = REGISTRY.len();
        Ok(ProbeOutcome::Exhausted)
    }

    fn match_magics(&mut self, magics: &'static [MagicSpec]) -> MagicOutcome
    {
        if magics.is_empty() {
            return MagicOutcome::NoMagics;
        }

        for mag in magics {
            let absolute = mag.absolute();
            let window_start = (absolute / 1024) * 1024;
            let rel = (absolute - window_start) as usize;

            let matched = match self.get_buffer(window_start, 1024) {
                Some(buf) => {
                    rel + mag.pattern.len() <= buf.len() && &buf[rel..rel + mag.pattern.len()] == mag.pattern
                }
                None => false,
            };

            if matched {
                return MagicOutcome::Matched(*mag);
            }
        }

        MagicOutcome::NoMatch
    }
}

impl Default for Session {
    fn default() -> Self
    {
        Self::new()
    }
}

enum MagicOutcome {
    NoMagics,
    Matched(MagicSpec),
    NoMatch,
}
