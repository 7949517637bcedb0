use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use schnorr_modp::{
    generate_key_pair, sign, verify, Group, GroupGenerator, SearchConfig, SearchStrategy,
    WellKnownGroup,
};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "schnorr")]
#[command(about = "Schnorr group generation and signatures", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for a fresh group and print p, q and g
    Group {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Generate keys, sign a message and verify the signature
    Sign {
        /// Message to sign
        #[arg(short, long, default_value = "Hello, World!")]
        message: String,

        /// Use a standardized group instead of searching for one
        #[arg(long, value_enum)]
        well_known: Option<WellKnownArg>,

        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Bit length of the modulus p
    #[arg(short, long, env = "SCHNORR_BITS", default_value = "1024")]
    bits: u64,

    /// Parallel search workers (1 searches on the calling thread)
    #[arg(short, long, env = "SCHNORR_WORKERS", default_value = "1")]
    workers: usize,

    /// Miller-Rabin rounds per primality test
    #[arg(long, env = "SCHNORR_PRIMALITY_ROUNDS", default_value = "50")]
    rounds: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WellKnownArg {
    Oakley1024,
    Modp2048,
}

impl From<WellKnownArg> for WellKnownGroup {
    fn from(arg: WellKnownArg) -> Self {
        match arg {
            WellKnownArg::Oakley1024 => WellKnownGroup::Oakley1024,
            WellKnownArg::Modp2048 => WellKnownGroup::Modp2048,
        }
    }
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        let strategy = if self.workers > 1 {
            SearchStrategy::Parallel {
                workers: self.workers,
            }
        } else {
            SearchStrategy::Sequential
        };

        SearchConfig {
            strategy,
            primality_rounds: self.rounds,
            ..SearchConfig::default()
        }
    }

    fn search(&self) -> schnorr_modp::Result<Group> {
        let started = Instant::now();
        let group = GroupGenerator::new(self.config()).generate(self.bits)?;
        info!(
            bits = self.bits,
            workers = self.workers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "group ready"
        );
        Ok(group)
    }
}

fn print_group(group: &Group) {
    println!("p = {:x}", group.p());
    println!("q = {:x}", group.q());
    println!("g = {:x}", group.g());
}

fn run(cli: Cli) -> schnorr_modp::Result<bool> {
    match cli.command {
        Command::Group { search } => {
            let group = search.search()?;
            print_group(&group);
            Ok(true)
        }
        Command::Sign {
            message,
            well_known,
            search,
        } => {
            let group = match well_known {
                Some(choice) => {
                    let choice = WellKnownGroup::from(choice);
                    info!(group = choice.name(), "using standardized group");
                    choice.group()
                }
                None => search.search()?,
            };
            print_group(&group);

            let keys = generate_key_pair(&group)?;
            println!("y = {:x}", keys.public_key().y());

            let bytes = message.as_bytes();
            let signature = sign(&group, keys.private_key(), bytes)?;
            println!("message = {}", hex::encode(bytes));
            println!("signature = {signature}");

            let valid = verify(&group, keys.public_key(), bytes, &signature)?;
            println!("valid = {valid}");
            Ok(valid)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("signature did not verify");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
