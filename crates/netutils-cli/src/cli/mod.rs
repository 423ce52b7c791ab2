//! CLI for netutils uploads and digests.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use netutils_core::config;
use netutils_core::http::MIME_OCTET_STREAM;
use netutils_core::providers::Provider;
use netutils_core::resume::ResumeMethod;

use commands::{run_hash, run_offset, run_upload};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "netutils")]
#[command(about = "Resumable chunked uploads and content digests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Upload a local file or an http(s) download to an upload session.
    Upload(UploadArgs),

    /// Ask an upload session how many bytes it already holds.
    Offset {
        /// Upload session URL.
        url: String,
        /// Size of the complete upload in bytes.
        #[arg(long, value_name = "N")]
        total_length: u64,
        /// range-probe (308 + Range) or expected-ranges (JSON status).
        #[arg(long, default_value = "range-probe", value_name = "STRATEGY")]
        resume: ResumeMethod,
    },

    /// Print the digest of a local file or an http(s) download.
    Hash {
        /// Local path or http(s) URL.
        src: String,
        #[arg(
            short = 'a',
            long,
            value_enum,
            ignore_case = true,
            default_value_t = HashAlgorithm::Quickxor
        )]
        algorithm: HashAlgorithm,
        /// Read block size in bytes (default from config).
        #[arg(long, value_name = "BYTES")]
        block_size: Option<usize>,
        /// Worker threads for the XOR reduction (default from config; at most four per core).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Print the XOR digest as hex instead of base64.
        #[arg(long)]
        hex: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashAlgorithm {
    /// 160-bit rotating XOR digest, base64 (OneDrive quickXorHash).
    Quickxor,
    /// MD5, lowercase hex.
    Md5,
    /// SHA-1, lowercase hex.
    #[value(alias = "sha-1")]
    Sha1,
    /// SHA-256, lowercase hex.
    #[value(alias = "sha-256")]
    Sha256,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Local path or http(s) URL to upload.
    pub src: String,
    /// Existing upload session URL; the upload resumes where the session stopped.
    #[arg(long)]
    pub url: Option<String>,
    /// Open a new session with this provider (google-drive, onedrive or youtube).
    #[arg(long)]
    pub provider: Option<Provider>,
    /// Access token (bare or token JSON) for opening a session.
    #[arg(long)]
    pub token: Option<String>,
    /// Remote file name (default: the source name).
    #[arg(long)]
    pub name: Option<String>,
    /// Remote directory (onedrive).
    #[arg(long)]
    pub dir: Option<String>,
    /// Video title (youtube).
    #[arg(long)]
    pub title: Option<String>,
    /// Video privacy: public, private or unlisted (youtube; unknown values mean public).
    #[arg(long)]
    pub privacy: Option<String>,
    /// How to ask an existing session for its received bytes (default: provider's, else range-probe).
    #[arg(long, value_name = "STRATEGY")]
    pub resume: Option<ResumeMethod>,
    /// Start at this byte offset instead of asking the session.
    #[arg(long, value_name = "N", conflicts_with = "resume")]
    pub offset: Option<u64>,
    /// HTTP method for chunk requests.
    #[arg(long, default_value = "PUT")]
    pub method: String,
    /// Content-Type of chunk requests.
    #[arg(long, default_value = MIME_OCTET_STREAM)]
    pub content_type: String,
    /// Bytes per chunk (default from config).
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<u64>,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Upload(args) => run_upload(&cfg, args).await?,
            CliCommand::Offset {
                url,
                total_length,
                resume,
            } => run_offset(&cfg, url, total_length, resume).await?,
            CliCommand::Hash {
                src,
                algorithm,
                block_size,
                workers,
                hex,
            } => run_hash(&cfg, src, algorithm, block_size, workers, hex).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
