//! Multi-threaded digest: workers XOR-reduce blocks into 160 residue classes,
//! one sequential fold at the end.

use super::{digest_with_block_size, QuickXorHasher, DIGEST_LEN, WIDTH};
use crate::transfer::read_retrying;
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Mutex;
use std::thread;

type Block = (u64, Vec<u8>);

/// Worker threads allowed per call: four per available core.
pub fn max_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_mul(4)
}

/// Same result as [`digest`](super::digest). The calling thread reads; up to
/// `workers * 2` blocks are queued at once. `workers` is capped at
/// [`max_workers`]; `workers <= 1` runs sequentially.
pub fn digest_parallel<R: Read + ?Sized>(
    source: &mut R,
    workers: usize,
    block_size: usize,
) -> io::Result<[u8; DIGEST_LEN]> {
    let workers = workers.min(max_workers());
    if workers <= 1 {
        return digest_with_block_size(source, block_size);
    }
    let block_size = block_size.max(1);
    let (work_tx, work_rx) = mpsc::sync_channel::<Block>(workers * 2);
    let work_rx = Mutex::new(work_rx);
    let (spare_tx, spare_rx) = mpsc::channel::<Vec<u8>>();

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let spare_tx = spare_tx.clone();
            let work_rx = &work_rx;
            let spawned = thread::Builder::new()
                .name(format!("netutils-digest-{}", i))
                .spawn_scoped(scope, move || {
                    let mut residues = [0u8; WIDTH];
                    loop {
                        let next = match work_rx.lock() {
                            Ok(rx) => rx.recv(),
                            Err(_) => break,
                        };
                        let Ok((offset, block)) = next else {
                            break;
                        };
                        reduce_into(&mut residues, offset, &block);
                        let _ = spare_tx.send(block);
                    }
                    residues
                });
            // Returning drops `work_tx`, so workers already started exit.
            handles.push(spawned?);
        }

        let fed = feed(source, work_tx, &spare_rx, block_size);

        let mut residues = [0u8; WIDTH];
        for h in handles {
            match h.join() {
                Ok(part) => {
                    for (r, p) in residues.iter_mut().zip(part) {
                        *r ^= p;
                    }
                }
                Err(_) => {
                    return Err(io::Error::new(io::ErrorKind::Other, "digest worker panicked"));
                }
            }
        }
        let total = fed?;
        tracing::debug!(workers, bytes = total, "parallel digest complete");
        Ok(QuickXorHasher::from_residues(&residues, total).finalize())
    })
}

/// Reads `source` to the end, queueing `(absolute offset, block)` pairs.
/// Dropping `work_tx` on return lets the workers drain and stop.
fn feed<R: Read + ?Sized>(
    source: &mut R,
    work_tx: SyncSender<Block>,
    spare_rx: &Receiver<Vec<u8>>,
    block_size: usize,
) -> io::Result<u64> {
    let mut total = 0u64;
    loop {
        let mut buf = spare_rx.try_recv().unwrap_or_default();
        buf.resize(block_size, 0);
        let n = read_retrying(source, &mut buf)?;
        if n == 0 {
            return Ok(total);
        }
        buf.truncate(n);
        if work_tx.send((total, buf)).is_err() {
            return Err(io::Error::new(io::ErrorKind::Other, "digest workers stopped"));
        }
        total += n as u64;
    }
}

fn reduce_into(residues: &mut [u8; WIDTH], offset: u64, block: &[u8]) {
    let mut r = (offset % WIDTH as u64) as usize;
    for &b in block {
        residues[r] ^= b;
        r += 1;
        if r == WIDTH {
            r = 0;
        }
    }
}
