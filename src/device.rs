use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;

/// Queries the logical size of a block device or regular file.
///
/// This is the external collaborator named in the design: the probing core
/// never needs to know *how* a size was obtained, only that it can ask for
/// one when a caller binds a device with `size == 0`. On Linux this issues
/// `ioctl(BLKGETSIZE64)`; anything that isn't a block device (a plain image
/// file, for instance) falls back to `File::metadata().len()`.
pub fn device_size(file: &File) -> io::Result<u64>
{
    #[cfg(target_os = "linux")]
    {
        if let Some(size) = blkgetsize64(file) {
            return Ok(size);
        }
    }
    file.metadata().map(|m| m.len())
}

#[cfg(target_os = "linux")]
fn blkgetsize64(file: &File) -> Option<u64>
{
    const BLKGETSIZE64: libc::c_ulong = 0x80081272;

    let mut size: u64 = 0;
    let ret = unsafe { libc::ioctl(file.as_raw_fd(), BLKGETSIZE64, &mut size) };
    if ret == 0 {
        Some(size)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn regular_file_falls_back_to_metadata_len()
    {
        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&[0u8; 4096]).unwrap();

        assert_eq!(device_size(&f).unwrap(), 4096);
    }
}
