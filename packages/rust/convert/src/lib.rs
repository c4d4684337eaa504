//! Streaming delimited-table to tagged-markup conversion.
//!
//! [`convert_table`] spawns a single producer task that reads a
//! line-oriented text source, renders each accepted row as tagged
//! elements, and publishes the fully rendered document as one chunk on
//! a bounded queue. The chunk is published only if at least one row
//! rendered successfully; empty, all-skipped, or all-malformed input
//! yields a stream that closes without ever producing an item.
//!
//! The document is fully materialized before publishing on purpose:
//! the container tags must bracket the whole set, and publication must
//! be suppressible entirely when zero rows succeed. Buffering defers
//! both decisions to end-of-stream at the cost of true incremental
//! delivery.

mod emitter;
mod lookup;
mod schema;

pub use emitter::{RowFormat, render_row};
pub use lookup::load_lookup;
pub use schema::FieldSchema;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use tabxml_shared::{LINE_BUFFER_CAPACITY, QUEUE_DEPTH, Result, TabXmlError};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for one table-to-markup conversion run.
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Column delimiter.
    pub delimiter: String,
    /// Container tag wrapping the whole output, if any.
    pub set_tag: Option<String>,
    /// Record tag wrapping each row, if any.
    pub rec_tag: Option<String>,
    /// Number of leading lines to skip before any processing.
    pub skip: usize,
    /// Derive field names from the first non-skipped line.
    pub header: bool,
    /// Lowercase values before emission.
    pub lower: bool,
    /// Uppercase values before emission (wins over `lower`).
    pub upper: bool,
    /// Indent record and field elements.
    pub indent: bool,
    /// Drop fields whose trimmed value is the placeholder sentinel.
    pub omit_placeholder: bool,
    /// Explicit field names (ignored when `header` is set). A leading
    /// `*` marks a field literal (no escaping).
    pub fields: Vec<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: "\t".into(),
            set_tag: None,
            rec_tag: None,
            skip: 0,
            header: false,
            lower: false,
            upper: false,
            indent: false,
            omit_placeholder: false,
            fields: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline driver
// ---------------------------------------------------------------------------

/// Start a conversion run over `input`.
///
/// Returns the consumer end of a bounded queue delivering zero or one
/// rendered document chunk. The producer task owns the input and runs
/// to completion; it suspends only when the queue is full, and closes
/// the stream unconditionally when done.
///
/// Fails upfront (before any background work) when no field schema can
/// be established from the configuration alone: an empty field list
/// with header mode off.
pub fn convert_table<R>(input: R, opts: TableOptions) -> Result<mpsc::Receiver<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    if opts.fields.is_empty() && !opts.header {
        return Err(TabXmlError::schema(
            "no field names supplied and header mode is off",
        ));
    }

    let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
    tokio::spawn(run_conversion(input, opts, tx));
    Ok(rx)
}

/// Feed a string through the converter and collect the result.
///
/// Convenience wrapper over [`convert_table`] for callers that do not
/// need the streaming interface. Returns an empty string when no row
/// rendered successfully.
pub async fn table_to_xml(table: &str, opts: TableOptions) -> Result<String> {
    let input = std::io::Cursor::new(table.as_bytes().to_vec());
    let mut rx = convert_table(input, opts)?;

    let mut out = String::new();
    while let Some(chunk) = rx.recv().await {
        out.push_str(&chunk);
    }
    Ok(out)
}

/// The producer task: read lines, establish the schema, render rows
/// into one buffer, publish once at end of input.
async fn run_conversion<R>(input: R, opts: TableOptions, tx: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::with_capacity(LINE_BUFFER_CAPACITY, input).lines();

    let mut buffer = String::new();
    let mut row: usize = 0;
    let mut skip = opts.skip;
    let mut okay = false;

    let (set_open, set_close) = RowFormat::wrap_tag(opts.set_tag.as_deref());
    let (rec_open, rec_close) = RowFormat::wrap_tag(opts.rec_tag.as_deref());

    if let Some(open) = &set_open {
        buffer.push_str(open);
        buffer.push('\n');
    }

    // Resolve the schema once, up front: explicit list or header line.
    let schema = if opts.header {
        let mut derived = None;
        loop {
            match next_line(&mut lines).await {
                Some(line) => {
                    row += 1;
                    if skip > 0 {
                        skip -= 1;
                        continue;
                    }
                    derived = Some(FieldSchema::from_header(&line, &opts.delimiter));
                    break;
                }
                None => break,
            }
        }
        match derived {
            Some(schema) if !schema.is_empty() => schema,
            _ => {
                error!("line with column names not found");
                return;
            }
        }
    } else {
        match FieldSchema::explicit(opts.fields.clone()) {
            Ok(schema) => schema,
            Err(err) => {
                // convert_table rejects this before spawning; kept as a
                // guard for direct callers of the task.
                error!(error = %err, "cannot establish field schema");
                return;
            }
        }
    };

    let fmt = RowFormat {
        rec_open,
        rec_close,
        lower: opts.lower,
        upper: opts.upper,
        indent: opts.indent,
        omit_placeholder: opts.omit_placeholder,
    };

    while let Some(line) = next_line(&mut lines).await {
        row += 1;

        if skip > 0 {
            skip -= 1;
            continue;
        }

        let Some(cols) = schema.split_row(&line, &opts.delimiter, row) else {
            continue;
        };

        render_row(&mut buffer, schema.fields(), &cols, &fmt);
        okay = true;
    }

    // Container close is always buffered; the buffer itself is only
    // published when at least one row rendered.
    if let Some(close) = &set_close {
        buffer.push_str(close);
        buffer.push('\n');
    }

    if okay && !buffer.is_empty() {
        debug!(rows = row, chunk_len = buffer.len(), "publishing rendered document");
        if tx.send(buffer).await.is_err() {
            debug!("consumer dropped before chunk delivery");
        }
    }
}

/// Pull the next line, treating a read error as end of input.
async fn next_line<R>(lines: &mut tokio::io::Lines<BufReader<R>>) -> Option<String>
where
    R: AsyncRead + Unpin,
{
    match lines.next_line().await {
        Ok(line) => line,
        Err(err) => {
            warn!(error = %err, "stopped reading input");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing::Level;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    use super::*;

    fn reader(input: &str) -> std::io::Cursor<Vec<u8>> {
        std::io::Cursor::new(input.as_bytes().to_vec())
    }

    struct WarningCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarningCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Count warning-level diagnostics emitted on the current thread
    /// while the returned guard is alive. The current-thread test
    /// runtime polls the producer task on this thread, so its
    /// diagnostics are counted too.
    fn count_warnings() -> (tracing::subscriber::DefaultGuard, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarningCounter(count.clone()));
        (tracing::subscriber::set_default(subscriber), count)
    }

    fn opts(fields: &[&str]) -> TableOptions {
        TableOptions {
            fields: fields.iter().map(|s| s.to_string()).collect(),
            ..TableOptions::default()
        }
    }

    async fn collect(mut rx: mpsc::Receiver<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        while let Some(chunk) = rx.recv().await {
            chunks.push(chunk);
        }
        chunks
    }

    #[tokio::test]
    async fn golden_two_row_document() {
        let options = TableOptions {
            set_tag: Some("Set".into()),
            rec_tag: Some("Rec".into()),
            ..opts(&["a", "b"])
        };
        let rx = convert_table(reader("1\tfoo\n2\tbar\n"), options).unwrap();
        let chunks = collect(rx).await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0],
            "<Set>\n<Rec>\n<a>1</a>\n<b>foo</b>\n</Rec>\n<Rec>\n<a>2</a>\n<b>bar</b>\n</Rec>\n</Set>\n"
        );
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped_and_the_rest_rendered() {
        let input = "1\tfoo\nonly-one-column\n2\tbar\n3\tbaz\textra\n";
        let rx = convert_table(reader(input), opts(&["a", "b"])).unwrap();
        let chunks = collect(rx).await;

        assert_eq!(chunks.len(), 1);
        let rendered = &chunks[0];
        assert_eq!(rendered.matches("<a>").count(), 2);
        assert!(rendered.contains("<b>foo</b>"));
        assert!(rendered.contains("<b>bar</b>"));
        assert!(!rendered.contains("baz"));
    }

    #[tokio::test]
    async fn each_malformed_row_emits_one_diagnostic() {
        let (_guard, warnings) = count_warnings();

        let input = "1\tfoo\nonly-one-column\n2\tbar\n3\tbaz\textra\n";
        let rx = convert_table(reader(input), opts(&["a", "b"])).unwrap();
        let chunks = collect(rx).await;

        assert_eq!(chunks.len(), 1);
        // Two malformed rows, one diagnostic each; valid rows are silent.
        assert_eq!(warnings.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn empty_input_publishes_nothing() {
        let rx = convert_table(reader(""), opts(&["a"])).unwrap();
        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test]
    async fn all_skipped_input_publishes_nothing() {
        let options = TableOptions {
            skip: 5,
            set_tag: Some("Set".into()),
            ..opts(&["a"])
        };
        let rx = convert_table(reader("x\ny\n"), options).unwrap();
        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test]
    async fn all_malformed_input_publishes_nothing() {
        let rx = convert_table(reader("a\tb\tc\n"), opts(&["a", "b"])).unwrap();
        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test]
    async fn skip_applies_before_data_rows() {
        let options = TableOptions {
            skip: 1,
            ..opts(&["a", "b"])
        };
        let rx = convert_table(reader("junk header\n1\tfoo\n"), options).unwrap();
        let chunks = collect(rx).await;
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].contains("junk"));
        assert!(chunks[0].contains("<b>foo</b>"));
    }

    #[tokio::test]
    async fn header_mode_derives_fields_from_first_line() {
        let options = TableOptions {
            header: true,
            rec_tag: Some("Rec".into()),
            ..TableOptions::default()
        };
        let rx = convert_table(reader("Id\tName\n7\tgyrA\n"), options).unwrap();
        let chunks = collect(rx).await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "<Rec>\n<Id>7</Id>\n<Name>gyrA</Name>\n</Rec>\n");
    }

    #[tokio::test]
    async fn header_mode_with_no_lines_is_fatal_and_silent() {
        let options = TableOptions {
            header: true,
            set_tag: Some("Set".into()),
            ..TableOptions::default()
        };
        let rx = convert_table(reader(""), options).unwrap();
        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test]
    async fn literal_fields_bypass_escaping() {
        let rx = convert_table(
            reader("a < b\tx < y\n"),
            opts(&["esc", "*raw"]),
        )
        .unwrap();
        let chunks = collect(rx).await;
        assert!(chunks[0].contains("<esc>a &lt; b</esc>"));
        assert!(chunks[0].contains("<raw>x < y</raw>"));
    }

    #[tokio::test]
    async fn omit_placeholder_suppresses_single_field() {
        let options = TableOptions {
            omit_placeholder: true,
            ..opts(&["a", "b", "c"])
        };
        let rx = convert_table(reader("1\t-\t3\n"), options).unwrap();
        let chunks = collect(rx).await;
        assert!(!chunks[0].contains("<b>"));
        assert!(chunks[0].contains("<a>1</a>"));
        assert!(chunks[0].contains("<c>3</c>"));
    }

    #[tokio::test]
    async fn case_folding_applies_before_escaping_and_trimming() {
        let options = TableOptions {
            upper: true,
            ..opts(&["seq"])
        };
        let rx = convert_table(reader("  acgt  \n"), options).unwrap();
        let chunks = collect(rx).await;
        assert_eq!(chunks[0], "<seq>ACGT</seq>\n");
    }

    #[tokio::test]
    async fn long_lines_survive_intact() {
        let long_value = "A".repeat(2 * 1024 * 1024);
        let input = format!("1\t{long_value}\n");
        let rx = convert_table(reader(&input), opts(&["id", "seq"])).unwrap();
        let chunks = collect(rx).await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains(&format!("<seq>{long_value}</seq>")));
    }

    #[tokio::test]
    async fn missing_schema_is_rejected_before_spawn() {
        let result = convert_table(reader("1\tfoo\n"), TableOptions::default());
        assert!(matches!(result, Err(TabXmlError::Schema { .. })));
    }

    #[tokio::test]
    async fn string_wrapper_collects_single_chunk() {
        let out = table_to_xml("1\tfoo\n", opts(&["a", "b"])).await.unwrap();
        assert_eq!(out, "<a>1</a>\n<b>foo</b>\n");

        let empty = table_to_xml("", opts(&["a"])).await.unwrap();
        assert!(empty.is_empty());
    }
}
