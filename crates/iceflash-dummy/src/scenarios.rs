//! Controller scenarios against the emulated chip

use std::time::Duration;

use iceflash_core::chip::{Chip, KnownChip, TimingProfile};
use iceflash_core::flash::{FlashController, SECTOR_SIZE, SUBSECTOR_SIZE};
use iceflash_core::programmer::FpgaControl;
use iceflash_core::spi::opcodes;
use iceflash_core::Error;

use crate::{DummyConfig, DummyFlash};

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i ^ (i >> 8) ^ 0x5A) as u8).collect()
}

fn controller(config: DummyConfig, contents: &[u8]) -> FlashController<DummyFlash> {
    FlashController::new(DummyFlash::with_data(config, contents))
}

fn small(max_tx: usize) -> DummyConfig {
    DummyConfig {
        size: 256 * 1024,
        max_transaction_len: max_tx,
        ..Default::default()
    }
}

#[test]
fn test_identify_micron() {
    let mut flash = controller(DummyConfig::default(), &[]);
    let (id, name) = flash.identify().unwrap();
    assert_eq!(id.0, [0x20, 0xBA, 0x16]);
    assert_eq!(name, "Micron N25Q 32Mb");
    assert_eq!(flash.chip(), Some(Chip::Known(KnownChip::MicronN25Q32)));
    assert_eq!(flash.timing().page_program, Duration::from_millis(5));
    assert_eq!(flash.timing(), KnownChip::MicronN25Q32.timing());
    assert_ne!(flash.timing(), TimingProfile::conservative());
}

#[test]
fn test_identify_unknown_uses_conservative_timing() {
    let config = DummyConfig {
        id: [0xC2, 0x20, 0x16],
        ..Default::default()
    };
    let mut flash = controller(config, &[]);
    let (_, name) = flash.identify().unwrap();
    assert_eq!(name, "");
    let timing = flash.timing();
    for chip in KnownChip::ALL {
        let t = chip.timing();
        assert!(timing.power_up >= t.power_up);
        assert!(timing.power_down >= t.power_down);
        assert!(timing.page_program >= t.page_program);
        assert!(timing.erase_4k >= t.erase_4k);
        assert!(timing.erase_64k >= t.erase_64k);
        assert!(timing.erase_chip >= t.erase_chip);
    }
    assert_eq!(timing, TimingProfile::conservative());
}

#[test]
fn test_read_300_with_8_byte_transactions() {
    let image = pattern(4096);
    let mut flash = controller(small(8), &image);
    let data = flash.read(0, 300).unwrap();
    assert_eq!(data, image[..300]);

    let bus = flash.into_inner();
    assert_eq!(bus.transactions().len(), 75);
    assert!(bus.transactions().iter().all(|f| f.len() <= 8));
}

#[test]
fn test_large_read_uses_full_transactions() {
    let image = pattern(2 * 65536);
    let mut flash = controller(DummyConfig::default(), &image);
    let data = flash.read(0, 2 * 65536).unwrap();
    assert_eq!(data, image);

    let lens: Vec<usize> = flash
        .transport()
        .transactions()
        .iter()
        .map(|f| f.len() - 4)
        .collect();
    assert_eq!(lens, [65532, 65532, 8]);
}

#[test]
fn test_chunked_read_equals_single_read() {
    let image = pattern(8192);
    for n in [1usize, 7, 64, 255, 1000] {
        let reference = controller(small(n + 4), &image).read(0x123, n).unwrap();
        for m in [1usize, 2, 3, 5, 16, 63] {
            if m >= n {
                continue;
            }
            let chunked = controller(small(m + 4), &image).read(0x123, n).unwrap();
            assert_eq!(chunked, reference, "n={} m={}", n, m);
        }
    }
}

#[test]
fn test_read_zero_bytes() {
    let mut flash = controller(small(64), &[]);
    assert!(flash.read(0x1000, 0).unwrap().is_empty());
    assert!(flash.transport().transactions().is_empty());
}

#[test]
fn test_read_out_of_range() {
    let mut flash = controller(small(64), &[]);
    assert!(flash.read(0xFFFFFF, 2).unwrap_err().is_range());
    assert!(flash.read(0xFFFFFF, 1).is_ok());
}

#[test]
fn test_program_command_sequence() {
    let data = pattern(1000);
    let mut flash = controller(small(65536), &[]);
    assert_eq!(flash.program(&data[..]).unwrap(), 1000);

    let bus = flash.into_inner();
    let ops = bus.opcodes();
    let programs = ops.iter().filter(|&&op| op == opcodes::PP).count();
    assert_eq!(programs, 1000usize.div_ceil(256));
    for (i, &op) in ops.iter().enumerate() {
        if op == opcodes::PP {
            assert_eq!(ops[i - 1], opcodes::WREN);
            assert_eq!(ops[i + 1], opcodes::RDSR);
        }
    }
    assert_eq!(bus.data()[..1000], data[..]);
}

#[test]
fn test_program_waits_while_busy() {
    let config = DummyConfig {
        busy_polls: 3,
        ..small(65536)
    };
    let mut flash = controller(config, &[]);
    flash.identify().unwrap();
    flash.program(&pattern(512)[..]).unwrap();

    let bus = flash.into_inner();
    let polls = bus.opcodes().iter().filter(|&&op| op == opcodes::RDSR).count();
    // per page: fast-path read plus three polls
    assert_eq!(polls, 2 * 4);
    assert_eq!(bus.elapsed(), Duration::from_micros(100) * 6);
    assert_eq!(bus.data()[..512], pattern(512)[..]);
}

#[test]
fn test_erase_70k_at_4k_offset() {
    let mut flash = controller(small(65536), &vec![0u8; 256 * 1024]);
    flash.erase(0x1000, 70 * 1024).unwrap();

    let bus = flash.into_inner();
    let erases: Vec<(u8, u32)> = bus
        .transactions()
        .iter()
        .filter(|f| f[0] == opcodes::SE_20 || f[0] == opcodes::BE_D8)
        .map(|f| (f[0], u32::from_be_bytes([0, f[1], f[2], f[3]])))
        .collect();
    assert_eq!(
        erases,
        [
            (opcodes::BE_D8, 0x1000),
            (opcodes::SE_20, 0x11000),
            (opcodes::SE_20, 0x12000)
        ]
    );
    // the misaligned sector erase clears the whole block containing 0x1000
    assert!(bus.data()[..0x10000].iter().all(|&b| b == 0xFF));
    assert!(bus.data()[0x11000..0x13000].iter().all(|&b| b == 0xFF));
    assert!(bus.data()[0x10000..0x11000].iter().all(|&b| b == 0x00));
    assert_eq!(bus.data()[0x13000], 0x00);
}

#[test]
fn test_erase_each_step_write_enabled() {
    let mut flash = controller(small(65536), &[]);
    flash.erase(0, SECTOR_SIZE + 2 * SUBSECTOR_SIZE).unwrap();
    let ops = flash.into_inner().opcodes();
    assert_eq!(
        ops,
        [
            opcodes::WREN,
            opcodes::BE_D8,
            opcodes::RDSR,
            opcodes::WREN,
            opcodes::SE_20,
            opcodes::RDSR,
            opcodes::WREN,
            opcodes::SE_20,
            opcodes::RDSR
        ]
    );
}

#[test]
fn test_erase_chip_timeout() {
    let config = DummyConfig {
        busy_polls: 10_000,
        ..small(65536)
    };
    let mut flash = controller(config, &[]);
    flash.identify().unwrap();
    let err = flash.erase_chip().unwrap_err();
    // 60 s worst case, doubled, polled once a second
    assert!(matches!(err, Error::Timeout { waited } if waited == Duration::from_secs(120)));
}

#[test]
fn test_erase_chip_then_program_and_verify() {
    let image = pattern(3000);
    let mut flash = controller(small(512), &vec![0u8; 256 * 1024]);
    flash.power_up().unwrap();
    flash.identify().unwrap();
    flash.erase_chip().unwrap();
    flash.program(&image[..]).unwrap();
    assert_eq!(flash.verify(0, &image).unwrap(), None);
    flash.power_down().unwrap();
    assert!(flash.transport().is_powered_down());
}

#[test]
fn test_verify_detects_unerased_flash() {
    // programming over unerased data can only clear bits
    let mut flash = controller(small(512), &vec![0x0Fu8; 1024]);
    flash.program(&[0xF1u8; 16][..]).unwrap();
    assert_eq!(flash.verify(0, &[0xF1u8; 16]).unwrap(), Some(0));
}

#[test]
fn test_status_register_decode() {
    let mut flash = controller(small(64), &[]);
    let sr = flash.read_status_register().unwrap();
    assert!(!sr.is_busy() && !sr.write_enabled());

    iceflash_core::protocol::spi25::write_enable(flash.transport_mut()).unwrap();
    let sr = flash.read_status_register().unwrap();
    assert!(sr.write_enabled());
    assert!(!sr.is_busy());
    assert_eq!(sr.to_string(), "00000010 WEL");
}

#[test]
fn test_transport_failure_releases_chip_select() {
    let mut flash = controller(small(64), &[]);
    flash.transport_mut().fail_on(opcodes::PP);
    let err = flash.program(&[1u8, 2, 3][..]).unwrap_err();
    assert!(err.is_transport());
    assert!(!flash.transport().is_selected());
    // nothing was retried
    assert_eq!(
        flash.transport().opcodes(),
        [opcodes::WREN, opcodes::PP]
    );
}

#[test]
fn test_deassert_failure_reported() {
    let mut flash = controller(small(64), &[]);
    flash.transport_mut().fail_next_deassert();
    assert!(matches!(flash.identify(), Err(Error::ChipSelect(_))));
}

#[test]
fn test_status_read_failure_during_wait() {
    let mut flash = controller(small(64), &[]);
    flash.transport_mut().fail_on(opcodes::RDSR);
    let err = flash.erase(0, SUBSECTOR_SIZE).unwrap_err();
    assert!(matches!(err, Error::Transfer(_)));
}

#[test]
fn test_fpga_reset_control() {
    let mut flash = controller(small(64), &[]);
    flash.transport_mut().hold_reset(true).unwrap();
    assert!(flash.transport().fpga_held());
    assert_eq!(flash.transport_mut().config_done().unwrap(), Some(false));
    flash.transport_mut().hold_reset(false).unwrap();
    assert!(!flash.transport().fpga_held());
    assert_eq!(flash.transport_mut().config_done().unwrap(), Some(true));
}
