mod linux;

// OS-specific. for now linux only.
pub use self::linux::{
	open_port_readwrite,
	MappedPort,
	RegisterLayout,
};
