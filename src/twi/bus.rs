use super::PortRegisters;

/// Outcome of a byte transfer: did the receiver pull the data line low in
/// the ninth clock?
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Ack {
	Acked,
	NotAcked,
}

impl Ack {
	pub fn is_acked(self) -> bool {
		self == Ack::Acked
	}
}

impl From<bool> for Ack {
	fn from(acked: bool) -> Self {
		match acked {
			true => Ack::Acked,
			false => Ack::NotAcked,
		}
	}
}

pub type DiagHook = Box<dyn FnMut(&'static str)>;

/// One software bus instance: exclusive owner of its port registers and the
/// two line bit positions.
///
/// The engine exposes raw primitives, not a guarded transaction object; it is
/// the caller's job to sequence start/byte/stop legally. Byte transfers
/// outside a start/stop frame produce an invalid electrical sequence that is
/// not detected here.
pub struct TwiBus<R: PortRegisters> {
	regs: R,
	sda: u8,
	scl: u8,
	diag: Option<DiagHook>,
}

impl<R: PortRegisters> TwiBus<R> {
	pub fn new(regs: R, sda: u8, scl: u8) -> Self {
		assert!(sda < 8);
		assert!(scl < 8);
		assert!(sda != scl);
		TwiBus {
			regs,
			sda,
			scl,
			diag: None,
		}
	}

	pub fn with_diagnostics(regs: R, sda: u8, scl: u8, hook: DiagHook) -> Self {
		let mut bus = TwiBus::new(regs, sda, scl);
		bus.diag = Some(hook);
		bus
	}

	pub(crate) fn note(&mut self, msg: &'static str) {
		if let Some(hook) = &mut self.diag {
			hook(msg);
		}
	}

	pub(crate) fn pause(&mut self) {
		self.regs.delay();
	}

	// release the pin to input; the pull-up takes the line high
	fn release(&mut self, pin: u8) {
		let d = self.regs.direction();
		self.regs.set_direction(d & !(1 << pin));
	}

	// make the pin an output; the cleared latch drives the line low
	fn drive_low(&mut self, pin: u8) {
		let d = self.regs.direction();
		self.regs.set_direction(d | (1 << pin));
	}

	fn line_is_high(&mut self, pin: u8) -> bool {
		0 != self.regs.input() & (1 << pin)
	}

	/// Release both lines and clear their output latch bits. The latch bits
	/// are never touched again: all later line changes are direction-only.
	///
	/// Idempotent; must run before any other bus operation.
	pub fn init(&mut self) {
		let mask = 1 << self.sda | 1 << self.scl;
		let d = self.regs.direction();
		self.regs.set_direction(d & !mask);
		let o = self.regs.output();
		self.regs.set_output(o & !mask);
	}

	/// START: data falls while the clock is released high.
	///
	/// Caller contract: the bus is idle (both lines released) or a stop
	/// condition was just issued.
	pub fn start(&mut self) {
		self.drive_low(self.sda);
		self.regs.delay();
	}

	/// STOP: data rises while the clock is high. Data is first forced low
	/// under a low clock so the rise is the only data change the device sees
	/// with the clock high.
	pub fn stop(&mut self) {
		self.drive_low(self.scl);
		self.drive_low(self.sda);
		self.regs.delay();

		self.release(self.scl);
		self.regs.delay();

		self.release(self.sda);
		self.regs.delay();
	}

	/// Transmit 8 bits, most-significant first, then clock once more with
	/// data released to sample the device's acknowledgment.
	pub fn send_byte(&mut self, byte: u8) -> Ack {
		for bit in (0..8).rev() {
			self.drive_low(self.scl);
			if 0 != byte & (1 << bit) {
				self.release(self.sda);
			} else {
				self.drive_low(self.sda);
			}
			self.regs.delay();

			self.release(self.scl);
			self.regs.delay();
		}

		// ninth clock: let the device answer on the data line
		self.drive_low(self.scl);
		self.release(self.sda);
		self.regs.delay();

		self.release(self.scl);
		self.regs.delay();

		let ack = Ack::from(!self.line_is_high(self.sda));
		self.regs.delay();

		ack
	}

	/// Receive 8 bits, most-significant first, sampling right after the
	/// clock is released on each bit. Drives the data line low for the ninth
	/// clock iff `ack`; leaving it released signals end of a burst read.
	pub fn receive_byte(&mut self, ack: bool) -> u8 {
		let mut byte = 0u8;

		for bit in (0..8).rev() {
			self.drive_low(self.scl);
			self.release(self.sda);
			self.regs.delay();

			self.release(self.scl);
			if self.line_is_high(self.sda) {
				byte |= 1 << bit;
			}
			self.regs.delay();
		}

		self.drive_low(self.scl);
		if ack {
			self.drive_low(self.sda);
		}
		self.regs.delay();

		self.release(self.scl);
		self.regs.delay();

		byte
	}
}
