//! Hardware-dependent integration tests
//!
//! These tests require a PC/SC contactless reader, most of them with a
//! MIFARE Classic card in its field. They are ignored by default:
//!
//!     cargo test --package rfidrust --test hardware_integration -- --ignored
//!
//! Tests pick the first attached reader. `test_write_read_block`
//! authenticates with the factory key A and overwrites block 4.

use rfidrust::{CardSession, PcscProvider, TransportProvider};

fn first_reader() -> String {
    let provider = PcscProvider::new().expect("Failed to establish PC/SC context");
    let readers = provider.list_readers().expect("Failed to list readers");
    readers.into_iter().next().expect("No reader attached")
}

fn open_first() -> CardSession {
    let mut session = CardSession::pcsc(first_reader()).expect("Failed to create session");
    assert!(session.open().expect("Failed to open session"), "No card on reader");
    session
}

/// **Requires**: Reader attached (card not required)
#[test]
#[ignore = "requires hardware: card reader"]
fn test_list_readers() {
    let reader = first_reader();
    println!("Reader: {}", reader);
    assert!(!reader.is_empty());
}

/// **Requires**: MIFARE Classic card on the reader
#[test]
#[ignore = "requires hardware: MIFARE Classic card"]
fn test_open_detects_capacity() {
    let session = open_first();

    println!("Capacity: {}", session.capacity());
    assert!(session.capacity().is_supported());
}

/// **Requires**: MIFARE Classic card on the reader
#[test]
#[ignore = "requires hardware: MIFARE Classic card"]
fn test_identify() {
    let mut session = open_first();

    let card_id = session.identify().expect("Transport failure");
    let card_id = card_id.expect("Card did not report a serial");
    println!("Card ID: {}", card_id);

    session.close().expect("Failed to close session");
}

/// **Requires**: MIFARE Classic card with factory key A on sector 1
#[test]
#[ignore = "requires hardware: MIFARE Classic card with factory keys"]
fn test_write_read_block() {
    let mut session = open_first();
    let data: Vec<u8> = (0x10u8..0x20).collect();

    assert!(session.authenticate(4).expect("Transport failure"));
    assert!(session.write(4, &data).expect("Transport failure"));

    let read = session.read(4).expect("Transport failure").expect("Read refused");
    assert_eq!(read.as_ref(), data.as_slice());

    session.close().expect("Failed to close session");
}
