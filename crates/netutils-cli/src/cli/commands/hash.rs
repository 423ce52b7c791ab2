//! `netutils hash <src>` - XOR digest or MD5/SHA checksum of a file or download.

use anyhow::{Context, Result};
use netutils_core::config::NetutilsConfig;
use netutils_core::{checksum, digest, source};

use crate::cli::HashAlgorithm;

pub async fn run_hash(
    cfg: &NetutilsConfig,
    src: String,
    algorithm: HashAlgorithm,
    block_size: Option<usize>,
    workers: Option<usize>,
    hex: bool,
) -> Result<()> {
    let http = cfg.http_or_default();
    let tuning = cfg.digest_or_default();
    let block_size = block_size.unwrap_or(tuning.block_size);
    let workers = workers.unwrap_or(tuning.workers);

    let (rendered, name) = tokio::task::spawn_blocking(move || -> Result<(String, String)> {
        let mut source = source::open(&src, &http)?;
        let name = source.name().to_string();
        let rendered = match algorithm {
            HashAlgorithm::Quickxor => {
                let raw = digest::digest_parallel(&mut source, workers, block_size)
                    .with_context(|| format!("read {}", src))?;
                if hex {
                    digest::encode_hex(&raw)
                } else {
                    digest::encode_base64(&raw)
                }
            }
            HashAlgorithm::Md5 => {
                checksum::md5_source(&mut source).with_context(|| format!("read {}", src))?
            }
            HashAlgorithm::Sha1 => {
                checksum::sha1_source(&mut source).with_context(|| format!("read {}", src))?
            }
            HashAlgorithm::Sha256 => {
                checksum::sha256_source(&mut source).with_context(|| format!("read {}", src))?
            }
        };
        Ok((rendered, name))
    })
    .await
    .context("hash task panicked")??;

    println!("{}  {}", rendered, name);
    Ok(())
}
