//! `netutils upload <src>` – chunked upload to a new or existing session.

use anyhow::{bail, Context, Result};
use netutils_core::auth::{StaticToken, TokenSource};
use netutils_core::config::NetutilsConfig;
use netutils_core::http::CurlTransport;
use netutils_core::providers::{google, normalize_dir, onedrive, Provider};
use netutils_core::resume::ResumeMethod;
use netutils_core::source;
use netutils_core::transfer::{transfer, ChannelProgress, ProgressEvent, TransferPlan};
use tokio::sync::mpsc;

use crate::cli::UploadArgs;

const PROGRESS_QUEUE: usize = 64;

/// Runs the blocking upload on the blocking pool and prints progress from
/// this task as chunks are acknowledged.
pub async fn run_upload(cfg: &NetutilsConfig, args: UploadArgs) -> Result<()> {
    let cfg = cfg.clone();
    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(PROGRESS_QUEUE);

    let printer = tokio::spawn(async move {
        while let Some(e) = rx.recv().await {
            println!(
                "{}% uploaded: {}-{}/{}",
                e.percent, e.range_start, e.range_end, e.total
            );
        }
    });

    let result = tokio::task::spawn_blocking(move || upload_blocking(&cfg, &args, ChannelProgress(tx)))
        .await
        .context("upload task panicked")?;
    // The sender is gone once the blocking task returns; the printer drains and exits.
    let _ = printer.await;

    let body = result?;
    if !body.is_empty() {
        println!("{}", body);
    }
    Ok(())
}

fn upload_blocking(
    cfg: &NetutilsConfig,
    args: &UploadArgs,
    mut progress: ChannelProgress,
) -> Result<String> {
    let http = cfg.http_or_default();
    let transport = CurlTransport::new(http.clone());
    let mut source = source::open(&args.src, &http)?;
    let total = source.total_length();
    let name = args
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| source.name().to_string());
    tracing::info!(src = %args.src, name = %name, total, "starting upload");

    let (session_url, start_offset) = match (&args.url, args.provider) {
        (Some(url), provider) => {
            let offset = match args.offset {
                Some(offset) => offset,
                None => {
                    let method = args
                        .resume
                        .or(provider.map(Provider::resume_method))
                        .unwrap_or(ResumeMethod::RangeProbe);
                    method
                        .strategy()
                        .resume_offset(&transport, url, total)
                        .with_context(|| format!("negotiate resume offset ({})", method))?
                }
            };
            (url.clone(), offset)
        }
        (None, Some(provider)) => {
            let token = args
                .token
                .as_deref()
                .context("--token is required to open a new upload session")?;
            let bearer = StaticToken::parse(token)?.access_token()?;
            match provider {
                Provider::GoogleDrive => {
                    let url = google::open_session(
                        &transport,
                        google::UPLOAD_ENDPOINT,
                        &bearer,
                        &google::DriveFile { name: &name },
                        total,
                    )?;
                    (url, 0)
                }
                Provider::YouTube => {
                    let privacy = google::Privacy::parse_lenient(args.privacy.as_deref());
                    let video = google::Video::new(args.title.as_deref(), privacy);
                    let url = google::open_session(
                        &transport,
                        google::YOUTUBE_UPLOAD_ENDPOINT,
                        &bearer,
                        &video,
                        total,
                    )?;
                    (url, 0)
                }
                Provider::OneDrive => {
                    let dir = normalize_dir(args.dir.as_deref());
                    let limit = cfg.simple_upload_limit.min(onedrive::SIMPLE_UPLOAD_LIMIT);
                    if total <= limit {
                        let body = onedrive::simple_upload(
                            &transport,
                            onedrive::GRAPH_DRIVE_ROOT,
                            &bearer,
                            &dir,
                            &name,
                            &mut source,
                            total,
                        )?;
                        return Ok(String::from_utf8_lossy(&body).into_owned());
                    }
                    let url = onedrive::create_upload_session(
                        &transport,
                        onedrive::GRAPH_DRIVE_ROOT,
                        &bearer,
                        &dir,
                        &name,
                    )?;
                    (url, 0)
                }
            }
        }
        (None, None) => bail!("either --url or --provider is required"),
    };

    // Printed first so an interrupted upload can be resumed with --url.
    println!("session: {}", session_url);
    if start_offset >= total {
        println!("remote already holds all {} bytes", total);
        return Ok(String::new());
    }
    if start_offset > 0 {
        println!("resuming at byte {} of {}", start_offset, total);
    }

    let plan = TransferPlan::new(&session_url, total)
        .method(&args.method)
        .content_type(&args.content_type)
        .start_offset(start_offset)
        .chunk_size(args.chunk_size.unwrap_or(cfg.chunk_size))
        .carry_buffer_bytes(cfg.carry_buffer_bytes);
    let body = transfer(&transport, &plan, &mut source, &mut progress)
        .with_context(|| format!("upload {} to {}", args.src, session_url))?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}
