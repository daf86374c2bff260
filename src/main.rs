//! chaingen CLI application.
//!
//! This binary generates certificate-chain fixtures from a JSON plan or from
//! a handful of flags, and inspects the PEM files it wrote. Any failure is
//! fatal: the error is reported and the process exits with status 1, so a
//! test setup step never continues with a partial chain.

use chaingen::cert::algorithm::SignatureAlgorithm;
use chaingen::cert::loader::CertificateSummary;
use chaingen::error::Result;
use chaingen::plan::ChainPlan;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "chaingen")]
#[command(about = "Generate X.509 certificate chains for test fixtures", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every certificate described by a JSON chain plan
    Generate {
        /// Chain plan file
        #[arg(long)]
        plan: PathBuf,

        /// Output directory (default: current directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Generate a root -> (intermediate ->) leaf chain
    Chain {
        /// Output directory
        #[arg(long)]
        out_dir: PathBuf,

        /// Root CA common name
        #[arg(long, default_value = "root")]
        root: String,

        /// Optional intermediate CA common name
        #[arg(long)]
        intermediate: Option<String>,

        /// Leaf common name
        #[arg(long, default_value = "leaf")]
        leaf: String,

        /// Signature algorithm for the leaf certificate
        #[arg(long)]
        algorithm: Option<SignatureAlgorithm>,
    },

    /// Print the fields of a PEM certificate
    Inspect {
        /// Certificate file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if cli.verbose { "debug" } else { "info" },
    ))
    .format_timestamp(None)
    .init();

    if let Err(e) = run(cli.command) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Generate { plan, out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
            let plan = ChainPlan::from_file(&plan)?;
            generate(&plan, &out_dir)
        }

        Commands::Chain {
            out_dir,
            root,
            intermediate,
            leaf,
            algorithm,
        } => {
            let plan = ChainPlan::standard_chain(&root, intermediate.as_deref(), &leaf, algorithm)?;
            generate(&plan, &out_dir)
        }

        Commands::Inspect { file } => inspect(&file),
    }
}

fn generate(plan: &ChainPlan, out_dir: &Path) -> Result<()> {
    let written = plan.execute(out_dir)?;

    println!(
        "✓ Generated {} certificate(s) in {}",
        written.len(),
        out_dir.display()
    );
    for (path, cert) in written.iter().zip(&plan.certificates) {
        println!("  {} ({} -> {})", path.display(), cert.issuer, cert.subject);
    }

    Ok(())
}

fn inspect(file: &Path) -> Result<()> {
    let pem = fs::read_to_string(file)?;
    let summary = CertificateSummary::from_pem(&pem)?;

    let algorithm = summary
        .signature_algorithm
        .map(|alg| alg.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("Certificate: {}", file.display());
    println!("  Serial:     {} (0x{:x})", summary.serial, summary.serial);
    println!("  Issuer:     CN={}", summary.issuer.as_deref().unwrap_or("?"));
    println!("  Subject:    CN={}", summary.subject.as_deref().unwrap_or("?"));
    println!("  Algorithm:  {}", algorithm);
    println!("  Not before: {}", summary.not_before);
    println!("  Not after:  {}", summary.not_after);
    println!("  CA:         {}", summary.is_ca);
    println!("  Public key: {}", hex::encode(&summary.public_key));

    Ok(())
}
