use crate::registry::UsageClass;

/// Whether `by_name`/`by_usage` keep only the named set or exclude it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterMode {
    /// Probe only the probers in the given set.
    OnlyIn,
    /// Probe every prober except those in the given set.
    NotIn,
}

/// Bitmap over the prober registry. Bit `i` set means "skip prober `i`".
///
/// A session with no filter behaves as though this bitmap were all zeros —
/// callers model that case as `None`, this type itself is always "some
/// filter with n bits", backed by a plain byte-vector bitmap.
#[derive(Clone, Debug)]
pub struct Filter {
    bits: Vec<u8>,
    len: usize,
}

impl Filter {
    pub fn new(len: usize) -> Self
    {
        Self { bits: vec![0u8; (len + 7) / 8], len }
    }

    pub fn skip(&self, idx: usize) -> bool
    {
        if idx >= self.len {
            return true;
        }
        (self.bits[idx / 8] >> (idx % 8)) & 1 == 1
    }

    fn set(&mut self, idx: usize)
    {
        self.bits[idx / 8] |= 1 << (idx % 8);
    }

    pub fn reset(&mut self)
    {
        self.bits.iter_mut().for_each(|b| *b = 0);
    }

    pub fn by_name(&mut self, mode: FilterMode, names: &[&str], registry_names: &[&str])
    {
        self.reset();
        for (i, id) in registry_names.iter().enumerate() {
            let has = names.contains(id);
            match mode {
                FilterMode::OnlyIn => if !has { self.set(i); },
                FilterMode::NotIn => if has { self.set(i); },
            }
        }
    }

    pub fn by_usage(&mut self, mode: FilterMode, usages: &[UsageClass], registry_usages: &[UsageClass])
    {
        self.reset();
        for (i, u) in registry_usages.iter().enumerate() {
            let has = usages.contains(u);
            match mode {
                FilterMode::OnlyIn => if !has { self.set(i); },
                FilterMode::NotIn => if has { self.set(i); },
            }
        }
    }

    pub fn invert(&mut self)
    {
        for (i, b) in self.bits.iter_mut().enumerate() {
            *b = !*b;
            // don't leave stray set bits past `len` in the last byte; they
            // are harmless (skip() bounds-checks idx) but keep the bitmap
            // canonical for Display/Debug and the complement-law test.
            if (i + 1) * 8 > self.len {
                let valid_bits = self.len - i * 8;
                let mask = ((1u16 << valid_bits) - 1) as u8;
                *b &= mask;
            }
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        f.debug_list()
            .entries((0..self.len).map(|i| if self.skip(i) { 1u8 } else { 0u8 }))
            .finish()
    }
}
