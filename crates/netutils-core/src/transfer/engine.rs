//! The transfer loop: skip to the resume offset, then one request per chunk.

use super::body::{self, ChunkBody};
use super::carry::ReadCarryBuffer;
use super::chunk::{plan_chunks, ChunkDescriptor, TransferCursor};
use super::error::TransferError;
use super::progress::{ProgressEvent, ProgressSink};
use super::TransferPlan;
use crate::http::{HttpTransport, Request, Response, TransportError};
use std::io::Read;

/// Status codes that acknowledge a chunk. Resumable sessions answer
/// intermediate chunks with `308 Resume Incomplete`.
fn chunk_accepted(status: u32) -> bool {
    (200..300).contains(&status) || status == 308
}

/// Sends `source` to `plan.url` in chunks, starting at `plan.start_offset`.
///
/// The first `start_offset` bytes of `source` are read and dropped. Each
/// chunk is one request carrying `Content-Range: bytes a-b/n`; the next chunk
/// is only started after the previous one was acknowledged. `progress` is
/// called once per acknowledged chunk. Returns the decoded body of the last
/// response.
pub fn transfer<T, R>(
    transport: &T,
    plan: &TransferPlan,
    source: &mut R,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<u8>, TransferError>
where
    T: HttpTransport + ?Sized,
    R: Read + ?Sized,
{
    plan.validate()?;
    let total = plan.total_length;

    let mut carry = ReadCarryBuffer::with_capacity(plan.carry_buffer_bytes);
    if plan.start_offset > 0 {
        tracing::debug!(offset = plan.start_offset, "skipping bytes already on remote");
        let mut scratch = vec![0u8; plan.carry_buffer_bytes];
        body::discard(source, plan.start_offset, &mut scratch)?;
    }

    let mut unread = total - plan.start_offset;
    let mut cursor = TransferCursor::new(plan.start_offset, total);
    let mut last_body = Vec::new();

    for chunk in plan_chunks(plan.start_offset, total, plan.chunk_size) {
        let request = Request::new(&plan.method, &plan.url)
            .header("Content-Range", chunk.content_range(total))
            .header("Content-Type", plan.content_type.as_str())
            .headers(&plan.headers)
            .body_length(chunk.len());
        tracing::debug!(range = %chunk, len = chunk.len(), "sending chunk");

        let response = send_chunk(transport, &request, source, &mut carry, &mut unread, &chunk)?;
        carry.rewind();

        if !chunk_accepted(response.status) {
            tracing::warn!(
                status = response.status,
                range = %chunk,
                body = %String::from_utf8_lossy(&response.body),
                "chunk rejected"
            );
            return Err(TransferError::ChunkRejected {
                status: response.status,
                range: chunk,
            });
        }
        last_body = response.decoded_body()?;

        cursor.advance(&chunk);
        progress.chunk_done(&ProgressEvent::for_chunk(&chunk, total));
    }

    tracing::info!(
        url = %plan.url,
        total,
        resumed_from = plan.start_offset,
        "transfer complete"
    );
    debug_assert!(cursor.is_complete());
    Ok(last_body)
}

/// One request whose body is exactly `chunk.len()` bytes of the source.
fn send_chunk<T, R>(
    transport: &T,
    request: &Request,
    source: &mut R,
    carry: &mut ReadCarryBuffer,
    unread: &mut u64,
    chunk: &ChunkDescriptor,
) -> Result<Response, TransferError>
where
    T: HttpTransport + ?Sized,
    R: Read + ?Sized,
{
    let mut body = ChunkBody::new(source, carry, unread, chunk.len());
    let sent = transport.send(request, Some(&mut body));

    if body.exhausted() {
        return Err(TransferError::ShortRead {
            range: *chunk,
            missing: body.remaining(),
        });
    }
    if let Some(e) = body.take_source_error() {
        return Err(TransferError::Io(e));
    }
    let response = sent?;
    if body.remaining() > 0 {
        return Err(TransportError::BodyAborted {
            sent: chunk.len() - body.remaining(),
            expected: chunk.len(),
        }
        .into());
    }
    Ok(response)
}

/// Sends the whole source as one request without `Content-Range`.
///
/// For small files on endpoints that accept a plain upload. An empty source
/// goes out as a `Content-Length: 0` request. `chunk_size` is ignored and the
/// upload cannot resume, so `start_offset` must be zero.
pub fn upload_single<T, R>(
    transport: &T,
    plan: &TransferPlan,
    source: &mut R,
) -> Result<Vec<u8>, TransferError>
where
    T: HttpTransport + ?Sized,
    R: Read + ?Sized,
{
    if plan.method.trim().is_empty() {
        return Err(TransferError::InvalidArgument("empty HTTP method".into()));
    }
    if plan.start_offset != 0 {
        return Err(TransferError::InvalidArgument(
            "single-request upload cannot resume".into(),
        ));
    }
    let total = plan.total_length;
    let request = Request::new(&plan.method, &plan.url)
        .header("Content-Type", plan.content_type.as_str())
        .headers(&plan.headers)
        .body_length(total);
    tracing::debug!(url = %plan.url, total, "single-request upload");

    let response = match total.checked_sub(1) {
        Some(end_inclusive) => {
            let whole = ChunkDescriptor {
                start: 0,
                end_inclusive,
            };
            let mut carry = ReadCarryBuffer::with_capacity(plan.carry_buffer_bytes);
            let mut unread = total;
            send_chunk(transport, &request, source, &mut carry, &mut unread, &whole)?
        }
        None => transport.send(&request, Some(&mut std::io::empty()))?,
    };
    if !response.is_success() {
        tracing::warn!(
            status = response.status,
            body = %String::from_utf8_lossy(&response.body),
            "upload rejected"
        );
        return Err(TransferError::UploadRejected {
            status: response.status,
            total_length: total,
        });
    }
    tracing::info!(url = %plan.url, total, "upload complete");
    Ok(response.decoded_body()?)
}
