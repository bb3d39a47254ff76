use std::error::Error;
use std::io;
use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use igdctl::{
    active_device, find_candidates, list, select_device, Candidate, GatewayDevice,
    MappingRequest, PortMappingEntry, PortMappingProtocol, RupnpClient, SelectionStore,
    UpnpClient, WanConnection, DEFAULT_TIMEOUT, WANIP_CONN_SERVICE_ID,
};

#[derive(Parser)]
#[command(name = "igdctl", version, about = "Manage NAT port mappings on UPnP gateways")]
struct Cli {
    /// Device description URL, overriding the persisted selection
    #[arg(long, global = true, value_name = "URL")]
    device: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all port mappings on the selected device
    List,
    /// Search the network for compatible devices and select one
    Discover {
        /// Search window in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
        timeout: u64,
    },
    /// Create a new port mapping
    Add {
        /// External port
        #[arg(long = "eport")]
        external_port: u16,
        /// Protocol, either TCP or UDP
        #[arg(long = "proto")]
        protocol: String,
        /// Internal port
        #[arg(long = "iport")]
        internal_port: u16,
        /// Internal host (IP) the traffic is forwarded to
        #[arg(long = "ihost")]
        internal_host: Ipv4Addr,
        /// Description attached to the mapping
        #[arg(long, default_value = "")]
        description: String,
        /// Lease duration in seconds, 0 meaning infinite
        #[arg(long, default_value_t = 0)]
        lifetime: u32,
    },
    /// Delete a port mapping
    Delete {
        /// External port
        #[arg(long = "eport")]
        external_port: u16,
        /// Protocol, either TCP or UDP
        #[arg(long = "proto")]
        protocol: String,
    },
    /// Print the external IP address of the selected device
    ExternalIp,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let client = RupnpClient::new()?;
    let store = SelectionStore::open()?;

    match &cli.command {
        Command::Discover { timeout } => {
            discover(&client, &store, Duration::from_secs(*timeout))
        }
        Command::List => {
            let device = active_device(&client, &store, cli.device.as_deref())?;
            let conn = wan_connection(device.as_ref())?;
            println!("{}", mapping_table(&list(conn.as_ref())));
            Ok(())
        }
        Command::Add {
            external_port,
            protocol,
            internal_port,
            internal_host,
            description,
            lifetime,
        } => {
            // Validate before anything touches the network.
            let protocol: PortMappingProtocol = protocol.parse()?;
            let device = active_device(&client, &store, cli.device.as_deref())?;
            let conn = wan_connection(device.as_ref())?;
            conn.add_mapping(&MappingRequest {
                protocol,
                external_port: *external_port,
                internal_port: *internal_port,
                internal_client: *internal_host,
                description: description.clone(),
                lease_duration: *lifetime,
            })?;
            println!(
                "Mapped {} {} -> {}:{}",
                protocol, external_port, internal_host, internal_port
            );
            Ok(())
        }
        Command::Delete {
            external_port,
            protocol,
        } => {
            let protocol: PortMappingProtocol = protocol.parse()?;
            let device = active_device(&client, &store, cli.device.as_deref())?;
            let conn = wan_connection(device.as_ref())?;
            conn.delete_mapping(protocol, *external_port)?;
            println!("Deleted mapping {} {}", protocol, external_port);
            Ok(())
        }
        Command::ExternalIp => {
            let device = active_device(&client, &store, cli.device.as_deref())?;
            let conn = wan_connection(device.as_ref())?;
            println!("{}", conn.external_ip()?);
            Ok(())
        }
    }
}

fn discover(
    client: &dyn UpnpClient,
    store: &SelectionStore,
    timeout: Duration,
) -> Result<(), Box<dyn Error>> {
    println!("Searching for devices; unrelated SSDP speakers on the network are normal.");
    let candidates = find_candidates(client, timeout);
    println!("{}", candidate_table(&candidates));
    if candidates.is_empty() {
        return Err("could not find a compatible device".into());
    }

    let stdin = io::stdin();
    let selected = select_device(store, &candidates, &mut stdin.lock(), &mut io::stdout())?;
    if let Some(index) = selected {
        println!("Selected device \"{}\"", candidates[index].location);
    }
    Ok(())
}

fn wan_connection(device: &dyn GatewayDevice) -> Result<Box<dyn WanConnection + '_>, Box<dyn Error>> {
    device.wan_connection().ok_or_else(|| {
        format!(
            "device {} does not expose {}",
            device.location(),
            WANIP_CONN_SERVICE_ID
        )
        .into()
    })
}

fn mapping_table(entries: &[PortMappingEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "#",
        "Proto",
        "ExPort",
        "InPort",
        "InHost",
        "Description",
        "Duration",
    ]);
    for (index, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index).fg(Color::Cyan),
            Cell::new(entry.protocol),
            Cell::new(entry.external_port).fg(Color::Green),
            Cell::new(entry.internal_port).fg(Color::Red),
            Cell::new(&entry.internal_client).fg(Color::Yellow),
            Cell::new(&entry.description),
            Cell::new(entry.lease_duration),
        ]);
    }
    table
}

fn candidate_table(candidates: &[Candidate]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "URL", "Name", "Forwards"]);
    for (index, candidate) in candidates.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index).fg(Color::Cyan),
            Cell::new(&candidate.location).fg(Color::Green),
            Cell::new(&candidate.friendly_name),
            Cell::new(candidate.mapping_count).fg(Color::Blue),
        ]);
    }
    table
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);
}
