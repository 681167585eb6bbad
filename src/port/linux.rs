use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::io::{
	FromRawFd,
};
use std::ptr;

use libc::{
	c_void,
	mmap,
	munmap,
	open,
	MAP_SHARED,
	O_CLOEXEC,
	O_RDWR,
	O_SYNC,
	PROT_READ,
	PROT_WRITE,
};

use crate::twi::PortRegisters;

/// Byte offsets of the three port registers inside the mapped file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RegisterLayout {
	pub direction: usize,
	pub output: usize,
	pub input: usize,
}

/// GPIO port registers behind an mmap'ed file (e.g. an exported register
/// block under sysfs). All accesses are volatile single-byte reads/writes.
#[derive(Debug)]
pub struct MappedPort {
	ptr: ptr::NonNull<u8>, // u8 instead of void for easier offset operations
	len: usize,
	layout: RegisterLayout,
}

impl Drop for MappedPort {
	fn drop(&mut self) {
		unsafe {
			let res = munmap(
				self.ptr.as_ptr() as *mut c_void,
				self.len,
			);
			if 0 != res {
				panic!("munmap failed: {}", io::Error::last_os_error());
			}
		}
	}
}

impl MappedPort {
	fn read_reg(&self, offset: usize) -> u8 {
		assert!(offset < self.len);
		unsafe { ptr::read_volatile(self.ptr.as_ptr().add(offset)) }
	}

	fn write_reg(&mut self, offset: usize, data: u8) {
		assert!(offset < self.len);
		unsafe { ptr::write_volatile(self.ptr.as_ptr().add(offset), data) }
	}
}

impl PortRegisters for MappedPort {
	fn direction(&self) -> u8 {
		self.read_reg(self.layout.direction)
	}
	fn set_direction(&mut self, value: u8) {
		self.write_reg(self.layout.direction, value)
	}

	fn output(&self) -> u8 {
		self.read_reg(self.layout.output)
	}
	fn set_output(&mut self, value: u8) {
		self.write_reg(self.layout.output, value)
	}

	fn input(&self) -> u8 {
		self.read_reg(self.layout.input)
	}
}

fn inner_open(path: &str, layout: RegisterLayout) -> io::Result<MappedPort> {
	let path = CString::new(path)?;

	let fd = unsafe { open(path.as_ptr(), O_RDWR | O_CLOEXEC | O_SYNC) };
	if -1 == fd {
		return Err(io::Error::last_os_error());
	}
	// now get fd managed to prevent resource leak
	let f = unsafe { fs::File::from_raw_fd(fd) };

	let size = f.metadata()?.len();
	assert!(size < !0usize as u64);
	let size = size as usize;
	let area = unsafe {
		mmap(
			ptr::null_mut(),
			size,
			PROT_READ | PROT_WRITE,
			MAP_SHARED,
			fd,
			0,
		)
	};

	if area as usize == !0usize {
		return Err(io::Error::last_os_error());
	}
	match ptr::NonNull::new(area as *mut u8) {
		None => panic!("mmap shouldn't return NULL ever"),
		Some(area) => Ok(MappedPort {
			ptr: area,
			len: size,
			layout,
		}),
	}
}

pub fn open_port_readwrite(path: &str, layout: RegisterLayout) -> crate::AResult<MappedPort> {
	with_context!(("map GPIO registers from {}", path), {
		let port = inner_open(path, layout)?;
		ensure!(
			layout.direction < port.len && layout.output < port.len && layout.input < port.len,
			"register offsets outside the mapped area (size: 0x{:x})", port.len
		);
		debug!("mapped {} bytes from {} ({:?})", port.len, path, layout);
		Ok(port)
	})
}
