use std::net::IpAddr;
use std::str::FromStr;

use clap::{AppSettings, Arg, Command};
use tokio::signal;
use turn_relay_range::relay::relay_range::RelayAddressGeneratorRange;
use turn_relay_range::relay::RelayAddressGenerator;
use turn_relay_range::Error;

// RUST_LOG=trace cargo run --color=always --example turn_relay_range_udp -- --relay-ip 1.2.3.4 --min-port 49152 --max-port 49160

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let mut app = Command::new("TURN Relay Range UDP")
        .version("0.1.0")
        .author("Rain Liu <yliu@webrtc.rs>")
        .about("An example of allocating UDP relays inside a port range")
        .setting(AppSettings::DeriveDisplayOrder)
        .arg(
            Arg::new("FULLHELP")
                .help("Prints more detailed help information")
                .long("fullhelp"),
        )
        .arg(
            Arg::new("relay-ip")
                .required_unless_present("FULLHELP")
                .takes_value(true)
                .long("relay-ip")
                .help("IP Address advertised to TURN clients."),
        )
        .arg(
            Arg::new("address")
                .takes_value(true)
                .default_value("0.0.0.0")
                .long("address")
                .help("Address relay sockets are bound to."),
        )
        .arg(
            Arg::new("min-port")
                .takes_value(true)
                .default_value("49152")
                .long("min-port")
                .help("Lowest relay port."),
        )
        .arg(
            Arg::new("max-port")
                .takes_value(true)
                .default_value("65535")
                .long("max-port")
                .help("Highest relay port (inclusive)."),
        )
        .arg(
            Arg::new("count")
                .takes_value(true)
                .default_value("3")
                .long("count")
                .help("Number of relays to allocate."),
        )
        .arg(
            Arg::new("seed")
                .takes_value(true)
                .long("seed")
                .help("Seed for the port scan, for reproducible runs."),
        );

    let matches = app.clone().get_matches();

    if matches.is_present("FULLHELP") {
        app.print_long_help()?;
        std::process::exit(0);
    }

    let relay_ip = matches.value_of("relay-ip").unwrap();
    let address = matches.value_of("address").unwrap();
    let min_port = matches.value_of("min-port").unwrap().parse::<u16>()?;
    let max_port = matches.value_of("max-port").unwrap().parse::<u16>()?;
    let count = matches.value_of("count").unwrap().parse::<usize>()?;

    let mut generator = RelayAddressGeneratorRange::new(
        IpAddr::from_str(relay_ip)?,
        address.to_owned(),
        min_port,
        max_port,
    );
    if let Some(seed) = matches.value_of("seed") {
        generator = generator.with_seed(seed.parse::<u64>()?);
    }
    generator.validate()?;

    let mut conns = vec![];
    for i in 0..count {
        match generator.allocate_packet_conn("udp", 0).await {
            Ok((conn, relay_addr)) => {
                println!(
                    "relay {}: bound {} advertised {}",
                    i,
                    conn.local_addr().await?,
                    relay_addr
                );
                conns.push(conn);
            }
            Err(err) => println!("relay {}: allocation failed: {}", i, err),
        }
    }

    println!("Waiting for Ctrl-C...");
    signal::ctrl_c().await?;
    println!("\nClosing relays now...");
    for conn in conns {
        conn.close().await?;
    }

    Ok(())
}
