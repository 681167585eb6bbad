#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate twi_eeprom_flash;
use twi_eeprom_flash::*;

use std::fs;
use std::process::exit;

fn parse_num(value: &str) -> AResult<u64> {
	let value = value.trim();
	let parsed = if value.starts_with("0x") {
		u64::from_str_radix(&value[2..], 16)
	} else {
		value.parse::<u64>()
	};
	match parsed {
		Ok(v) => Ok(v),
		Err(e) => bail!("invalid number {:?}: {}", value, e),
	}
}

fn parse_address(value: &str) -> AResult<u16> {
	let addr = parse_num(value)?;
	ensure!(addr < 0x1_0000, "address 0x{:x} outside the 16-bit address space", addr);
	Ok(addr as u16)
}

fn parse_pin(value: &str) -> AResult<u8> {
	let pin = parse_num(value)?;
	ensure!(pin < 8, "pin index {} outside the 8-bit port", pin);
	Ok(pin as u8)
}

fn dump_hex(base: u16, data: &[u8]) {
	for (i, chunk) in data.chunks(16).enumerate() {
		print!("{:04x}:", base as usize + i * 16);
		for b in chunk {
			print!(" {:02x}", b);
		}
		println!();
	}
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(setting: clap::AppSettings::SubcommandRequiredElseHelp)
		(@arg mem: --mem +required +takes_value "Path to the file exposing the GPIO port registers")
		(@arg direction: --("direction-offset") +required +takes_value "Byte offset of the pin direction register in the mapped file")
		(@arg output: --("output-offset") +required +takes_value "Byte offset of the output latch register")
		(@arg input: --("input-offset") +required +takes_value "Byte offset of the input sense register")
		(@arg sda: --sda +required +takes_value "Bit position of the data line in the port registers")
		(@arg scl: --scl +required +takes_value "Bit position of the clock line in the port registers")
		(@arg chip_select: --("chip-select") +takes_value default_value("0") "Chip-select strapping (A2..A0) of the EEPROM")
		(@arg page_size: --("page-size") +takes_value default_value("64") "Device page size in bytes, bounds a single write burst")
		(@subcommand read =>
			(about: "Read bytes from the EEPROM")
			(@arg ADDRESS: +required "Start address (decimal or 0x-prefixed hex)")
			(@arg LENGTH: +required "Number of bytes to read")
			(@arg out: -o --out +takes_value "Write the bytes to a file instead of dumping hex")
		)
		(@subcommand write =>
			(about: "Write a file to the EEPROM, page by page")
			(@arg ADDRESS: +required "Start address (decimal or 0x-prefixed hex)")
			(@arg FILE: +required "File with the data to write")
		)
	).get_matches();

	let layout = port::RegisterLayout {
		direction: parse_num(matches.value_of("direction").unwrap())? as usize,
		output: parse_num(matches.value_of("output").unwrap())? as usize,
		input: parse_num(matches.value_of("input").unwrap())? as usize,
	};
	let sda = parse_pin(matches.value_of("sda").unwrap())?;
	let scl = parse_pin(matches.value_of("scl").unwrap())?;
	ensure!(sda != scl, "data and clock line must be different pins");

	let chip_select = parse_num(matches.value_of("chip_select").unwrap())?;
	ensure!(chip_select < 8, "chip select is a 3-bit value");
	let page_size = parse_num(matches.value_of("page_size").unwrap())? as usize;
	ensure!(page_size.is_power_of_two(), "page size must be a power of two");

	let regs = port::open_port_readwrite(matches.value_of("mem").unwrap(), layout)?;
	let bus = twi::TwiBus::with_diagnostics(
		regs,
		sda,
		scl,
		Box::new(|msg| debug!("bus: {}", msg)),
	);
	let mut config = twi::DeviceConfig::for_chip_select(chip_select as u8);
	config.page_size = page_size;
	let mut eeprom = twi::Eeprom::new(bus, config);

	match matches.subcommand() {
		("read", Some(sub)) => {
			let address = parse_address(sub.value_of("ADDRESS").unwrap())?;
			let length = parse_num(sub.value_of("LENGTH").unwrap())? as usize;
			ensure!(
				address as usize + length <= 0x1_0000,
				"read range exceeds the 16-bit address space"
			);

			let mut data = vec![0u8; length];
			eeprom.read(address, &mut data)?;

			match sub.value_of("out") {
				Some(path) => fs::write(path, &data)?,
				None => dump_hex(address, &data),
			}
		},
		("write", Some(sub)) => {
			let address = parse_address(sub.value_of("ADDRESS").unwrap())?;
			let data = fs::read(sub.value_of("FILE").unwrap())?;
			ensure!(
				address as usize + data.len() <= 0x1_0000,
				"write range exceeds the 16-bit address space"
			);

			let mut addr = address as usize;
			let mut rest = &data[..];
			while !rest.is_empty() {
				// bursts must not cross a page boundary
				let page_end = (addr | (page_size - 1)) + 1;
				let n = rest.len().min(page_end - addr);
				eeprom.write(addr as u16, &rest[..n])?;
				debug!("wrote {} bytes at 0x{:04x}", n, addr);
				addr += n;
				rest = &rest[n..];
			}
			info!("wrote {} bytes at 0x{:04x}", data.len(), address);
		},
		_ => unreachable!(),
	}

	Ok(())
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
