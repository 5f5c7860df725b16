//! Read a MIFARE Classic card example
//!
//! Usage: cargo run --example read_card -- [reader name] [block]

use rfidrust::{CardSession, PcscProvider, TransportProvider, format_card_id};
use tracing_subscriber::EnvFilter;

fn main() -> rfidrust::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);

    let reader = match args.next() {
        Some(reader) => reader,
        None => {
            let readers = PcscProvider::new()?.list_readers()?;
            println!("Readers: {:?}", readers);

            let Some(first) = readers.into_iter().next() else {
                println!("No reader attached");
                return Ok(());
            };
            first
        }
    };
    let block: u8 = args.next().and_then(|b| b.parse().ok()).unwrap_or(4);

    let mut session = CardSession::pcsc(reader)?;

    if !session.open()? {
        println!("No card on {}", session.reader_name());
        return Ok(());
    }

    println!("Capacity: {}", session.capacity());

    let card_id = session.identify()?;
    println!(
        "Card ID: {}",
        format_card_id(card_id.as_ref().map(|id| id.as_bytes().as_slice()))
    );

    if session.authenticate(block)? {
        match session.read(block)? {
            Some(data) => println!("Block {}: {:02X?}", block, &data[..]),
            None => println!("Block {}: read refused", block),
        }
    } else {
        println!("Block {}: authentication failed", block);
    }

    session.close()?;

    Ok(())
}
