//! Parents-to-lineage resolution pipeline.
//!
//! [`parents_to_lineage`] spawns a single producer task that reads a
//! tab-delimited identifier/parent table, builds an [`IdentIndex`],
//! resolves the full ancestor path of every identifier, and publishes
//! one `id<TAB>lineage` item per identifier on a bounded queue.
//!
//! Publication is atomic across the run: if any identifier fails to
//! resolve (the depth bound caught a cycle), nothing is published and
//! the stream closes empty after a single cycle diagnostic. Item order
//! is implementation-defined.

mod index;
mod resolve;

pub use index::IdentIndex;
pub use resolve::{MAX_DEPTH, Resolver};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use tabxml_shared::{LINE_BUFFER_CAPACITY, QUEUE_DEPTH};

/// Start a lineage resolution run over `input`.
///
/// Returns the consumer end of a bounded queue delivering one
/// `id<TAB>lineage` item per successfully resolved identifier, or no
/// items at all when the data contains a cycle. The producer task owns
/// the input and runs to completion, suspending only when the queue is
/// full.
pub fn parents_to_lineage<R>(input: R) -> mpsc::Receiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
    tokio::spawn(run_resolution(input, tx));
    rx
}

/// The producer task: build the index, resolve every identifier, then
/// publish all lineages or none.
async fn run_resolution<R>(input: R, tx: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::with_capacity(LINE_BUFFER_CAPACITY, input).lines();

    let mut index = IdentIndex::new();
    let mut row: usize = 0;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                row += 1;
                index.add_row(&line, row);
            }
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "stopped reading input");
                break;
            }
        }
    }

    // Resolve every identifier that was assigned a parent. Any failure
    // aborts the whole run: no partial output.
    let ids: Vec<String> = index.ids().cloned().collect();
    let mut resolver = Resolver::new(&index);
    let mut okay = false;

    for id in &ids {
        match resolver.resolve(id) {
            None => {
                error!("data that should be a tree structure appears to have an internal cycle");
                okay = false;
                break;
            }
            Some(lineage) => {
                if !lineage.is_empty() {
                    okay = true;
                }
            }
        }
    }

    if !okay {
        return;
    }

    debug!(identifiers = ids.len(), "publishing resolved lineages");

    for id in &ids {
        let lineage = resolver.lineage_of(id).unwrap_or_default();
        if tx.send(format!("{id}\t{lineage}")).await.is_err() {
            debug!("consumer dropped before all lineages were delivered");
            return;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
