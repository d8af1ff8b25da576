use anyhow::{anyhow, bail, Result};
use clap::Parser as _;
use tracing::debug;

use mifare_classic_core::{
    BlockOffset, KeyId, KeyType, MifareKey, Sector, SectorIndex, Session, PUBLIC_KEYS,
};
use mifare_classic_pcsc::{PcscCard, PcscContext};

#[derive(clap::Parser, Debug)]
#[command(about = "Read and inspect MIFARE Classic cards over PC/SC")]
struct Args {
    /// Increase log level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease log level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,

    /// Use a specific reader (substring of a name from list-readers).
    #[arg(short, long)]
    reader: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// List connected readers.
    ListReaders,

    /// Read the UID of the card in the reader.
    Uid,

    /// Dump one sector with decoded access conditions.
    Dump {
        /// Sector number, 0..=39.
        #[arg(short, long)]
        sector: u8,

        /// 6-byte key as 12 hex digits; well-known keys are probed when
        /// omitted.
        #[arg(short, long)]
        key: Option<String>,

        /// Authenticate with Key A or Key B.
        #[arg(long, value_enum, default_value = "a")]
        key_type: KeyArg,
    },
}

#[derive(clap::ValueEnum, Debug, Copy, Clone)]
enum KeyArg {
    A,
    B,
}

impl From<KeyArg> for KeyType {
    fn from(value: KeyArg) -> Self {
        match value {
            KeyArg::A => KeyType::KeyA,
            KeyArg::B => KeyType::KeyB,
        }
    }
}

impl Command {
    fn run(&self, args: &Args) -> Result<()> {
        match self {
            Self::ListReaders => list_readers(),
            Self::Uid => uid(args),
            Self::Dump {
                sector,
                key,
                key_type,
            } => dump(args, *sector, key.as_deref(), (*key_type).into()),
        }
    }
}

fn list_readers() -> Result<()> {
    let context = PcscContext::establish()?;
    for reader in context.readers()? {
        println!("{}", reader.name());
    }
    Ok(())
}

fn uid(args: &Args) -> Result<()> {
    let context = PcscContext::establish()?;
    let mut session = connect(&context, &args.reader)?;
    let uid = session.get_uid()?;
    println!("{}", hex::encode_upper(uid));
    Ok(())
}

fn dump(args: &Args, sector: u8, key: Option<&str>, key_type: KeyType) -> Result<()> {
    let context = PcscContext::establish()?;
    let mut session = connect(&context, &args.reader)?;
    let mut sector = Sector::new(SectorIndex::try_from(sector)?);

    match key {
        Some(key) => {
            let key = parse_key(key)?;
            // Load the explicit key into a standard volatile location and
            // point the sector's slot at it.
            let key_id = KeyId(0x00);
            session.load_key(key_id, &key)?;
            sector.set_key_id(key_type, key_id);
        }
        None => {
            match sector.authenticate_public(&mut session, BlockOffset::B0, key_type)? {
                Some(index) => {
                    debug!(
                        key = %hex::encode_upper(PUBLIC_KEYS[index]),
                        "authenticated with public key"
                    );
                }
                None => bail!("no well-known key authenticates {}", sector.index()),
            }
        }
    }

    let data = sector.read_all(&mut session, key_type)?;
    println!("{}:", sector.index());
    for offset in BlockOffset::ALL {
        let block = &data[offset as usize * 16..][..16];
        let condition = sector.access_condition(offset)?;
        let rule = if offset == BlockOffset::TRAILER {
            condition.trailer_rule()
        } else {
            condition.data_rule()
        };
        println!(
            "  {:<9}  {}  [C{:03b}] {}",
            format!("{}", sector.index().block(offset)),
            hex::encode_upper(block),
            condition.value(),
            rule
        );
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<MifareKey> {
    let bytes = hex::decode(key)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("expected a 6-byte key, got {} bytes", bytes.len()))
}

fn connect(context: &PcscContext, name: &Option<String>) -> Result<Session<PcscCard>> {
    let readers = context.readers()?;
    let reader = match name {
        Some(name) => readers
            .iter()
            .find(|reader| reader.name().contains(name.as_str()))
            .ok_or_else(|| anyhow!("no reader matching {:?}", name))?,
        None => readers
            .first()
            .ok_or_else(|| anyhow!("no smart card reader connected"))?,
    };
    debug!(reader = %reader.name(), "using reader");
    Ok(Session::new(reader.connect()?))
}

fn init_logging(args: &Args) {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_max_level(match (2 + args.verbose).saturating_sub(args.quiet) {
            0 => tracing::Level::ERROR,
            1 => tracing::Level::WARN,
            2 => tracing::Level::INFO,
            3 => tracing::Level::DEBUG,
            4.. => tracing::Level::TRACE,
        })
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);
    args.command.run(&args)
}
