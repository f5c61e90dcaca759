use crate::{GpioError, GpioResult, RegisterPort};
use log::debug;
use memmap2::{MmapOptions, MmapRaw};
use std::fmt::{Debug, Formatter};
use std::fs::OpenOptions;

/// Base address of the GPIO0 controller. Keypad rows/columns and the battery
/// threshold lines live here.
pub const GPIO0_BASE: u32 = 0xFF70_8000;
/// Base address of the GPIO1 controller.
pub const GPIO1_BASE: u32 = 0xFF70_9000;
/// Base address of the GPIO2 controller.
pub const GPIO2_BASE: u32 = 0xFF70_A000;
/// Length of the register window mapped for a GPIO controller.
pub const GPIO_BLOCK_LEN: usize = 0x100;

/// Base address of the seven-segment display banks.
///
/// The low bank (displays 0-3) sits at `+0x00`, the high bank (displays 4-5) at `+0x10`.
pub const DISPLAY_BASE: u32 = 0xFF20_0020;
/// Length of the display register window, covering both banks.
pub const DISPLAY_BLOCK_LEN: usize = 0x14;

/// Register port backed by a raw memory mapping of a physical address range.
///
/// Requires `/dev/mem` access, so root privileges are needed.
///
/// The base does not have to be page-aligned; the containing pages are mapped and the
/// port offsets are shifted accordingly.
pub struct RawRegisterPort {
    mmap: MmapRaw,
    base: u32,
    /// Distance between the start of the mapping and `base`.
    skew: usize,
    len: usize,
}

impl RawRegisterPort {
    const PAGE_SIZE: u64 = 4096;

    fn create(path: &str, base: u32, len: usize) -> GpioResult<Self> {
        if len == 0 {
            return Err(GpioError::InvalidArgument);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)?;

        let page_base = base as u64 & !(Self::PAGE_SIZE - 1);
        let skew = (base as u64 - page_base) as usize;

        let mmap = MmapOptions::new()
            .offset(page_base)
            .len(skew + len)
            .map_raw(&file)?;

        debug!("Mapped {:#010x}..{:#010x} from {}", base, base as usize + len, path);

        Ok(RawRegisterPort { mmap, base, skew, len })
    }

    /// Maps `len` bytes at physical address `base` through `/dev/mem`.
    pub fn new_mem(base: u32, len: usize) -> GpioResult<Self> {
        Self::create("/dev/mem", base, len)
    }

    /// Maps `len` bytes at physical address `base` through the given memory device.
    pub fn with_device(path: &str, base: u32, len: usize) -> GpioResult<Self> {
        Self::create(path, base, len)
    }

    /// Physical address of offset `0`.
    pub fn base(&self) -> u32 {
        self.base
    }

    fn check(&self, offset: usize, width: usize) -> GpioResult<()> {
        if offset % width != 0 {
            return Err(GpioError::InvalidArgument);
        }
        match offset.checked_add(width) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(GpioError::InvalidArgument),
        }
    }
}

impl Debug for RawRegisterPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawRegisterPort({:#010x}+{:#x})", self.base, self.len)
    }
}

impl RegisterPort for RawRegisterPort {
    fn read_word(&self, offset: usize) -> GpioResult<u32> {
        self.check(offset, 4)?;
        // In bounds and aligned: checked above, and the mapping itself is page-aligned.
        let register_ptr = unsafe { self.mmap.as_ptr().add(self.skew + offset) } as *const u32;
        let value = unsafe { register_ptr.read_volatile() };
        Ok(value)
    }

    fn write_word(&self, offset: usize, value: u32) -> GpioResult<()> {
        self.check(offset, 4)?;
        let register_ptr = unsafe { self.mmap.as_mut_ptr().add(self.skew + offset) } as *mut u32;
        unsafe { register_ptr.write_volatile(value) };
        Ok(())
    }

    fn write_byte(&self, offset: usize, value: u8) -> GpioResult<()> {
        self.check(offset, 1)?;
        let register_ptr = unsafe { self.mmap.as_mut_ptr().add(self.skew + offset) };
        unsafe { register_ptr.write_volatile(value) };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_window_covers_both_banks() {
        // High bank starts 0x10 after the low bank and holds two displays.
        assert!(DISPLAY_BLOCK_LEN >= 0x10 + 2);
        assert_eq!(DISPLAY_BASE % 4, 0);
    }

    #[test]
    fn missing_device_is_an_io_error() {
        let err = RawRegisterPort::with_device("/nonexistent/intellicalc-mem", GPIO0_BASE, GPIO_BLOCK_LEN)
            .unwrap_err();
        assert_eq!(err, GpioError::Io(std::io::ErrorKind::NotFound));
    }

    /// A zeroed stand-in for the memory device, removed on drop.
    struct FakeMem(std::path::PathBuf);

    impl FakeMem {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir()
                .join(format!("intellicalc-{}-{}", std::process::id(), name));
            let mut contents = vec![0u8; 0x2000];
            contents[0x1024..0x1028].copy_from_slice(&0xdead_beefu32.to_le_bytes());
            std::fs::write(&path, contents).unwrap();
            FakeMem(path)
        }

        fn path(&self) -> &str {
            self.0.to_str().unwrap()
        }
    }

    impl Drop for FakeMem {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn unaligned_base_is_shifted_into_the_mapping() {
        let mem = FakeMem::new("shift");
        let port = RawRegisterPort::with_device(mem.path(), 0x1020, DISPLAY_BLOCK_LEN).unwrap();
        assert_eq!(port.base(), 0x1020);

        assert_eq!(port.read_word(0x04).unwrap(), 0xdead_beef);

        port.write_word(0x00, 0x1234_5678).unwrap();
        assert_eq!(port.read_word(0x00).unwrap(), 0x1234_5678);

        port.write_byte(0x10, 0xAB).unwrap();
        port.write_byte(0x13, 0xCD).unwrap();
        drop(port);

        let contents = std::fs::read(&mem.0).unwrap();
        assert_eq!(contents[0x1020..0x1024], 0x1234_5678u32.to_le_bytes());
        assert_eq!(contents[0x1030], 0xAB);
        assert_eq!(contents[0x1033], 0xCD);
        // Nothing before the base was touched.
        assert!(contents[..0x1020].iter().all(|&b| b == 0));
    }

    #[test]
    fn offsets_outside_the_window_are_rejected() {
        let mem = FakeMem::new("window");
        let port = RawRegisterPort::with_device(mem.path(), 0x1020, DISPLAY_BLOCK_LEN).unwrap();

        assert_eq!(port.read_word(0x02), Err(GpioError::InvalidArgument));
        assert_eq!(port.write_word(0x01, 0), Err(GpioError::InvalidArgument));
        assert_eq!(port.read_word(0x14), Err(GpioError::InvalidArgument));
        assert_eq!(port.write_byte(0x14, 0), Err(GpioError::InvalidArgument));
        assert_eq!(port.read_word(usize::MAX - 3), Err(GpioError::InvalidArgument));
        assert_eq!(port.write_byte(0x13, 0), Ok(()));
    }

    #[test]
    fn empty_window_is_rejected() {
        let err = RawRegisterPort::with_device("/dev/null", GPIO0_BASE, 0).unwrap_err();
        assert_eq!(err, GpioError::InvalidArgument);
    }
}
