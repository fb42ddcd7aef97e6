/// Implementation of `bloblog inspect`.
///
/// Streams a log file through the decoder and prints a structured
/// summary to stdout. Optionally shows payload content (`--show-body`),
/// a raw hex dump (`--show-hex`), or checksum verification results
/// (`--verify`). When `--record N` is given, only the record with index
/// N is shown.
///
/// # Output format
///
/// ```text
/// Log: base index 1001, 3 records
/// Record 1001: 14 bytes, crc=0xD87F7E0C
/// Record 1002: 1 byte, crc=0xE8B7BE43
/// Record 1003: 5 bytes, crc=0x3610A686 (crc MISMATCH: computed 0x1C291CA3)
/// ```
use anyhow::{Context, Result, bail};
use bloblog_decoder::{RecordDescriptor, spawn_decode_reader};
use bloblog_wire::base_index::read_base_index;
use bloblog_wire::checksum::crc32;

use crate::InspectArgs;

/// Run the `bloblog inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the log is structurally
/// invalid (zero-length record, truncated record), or `--verify` finds
/// a checksum mismatch.
pub async fn run(args: &InspectArgs) -> Result<()> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    // The decoder surfaces the base index only through record indices,
    // so read it straight off the front for display. An empty file has
    // no base index to show.
    if bytes.is_empty() {
        println!("Log: empty, 0 records");
        return Ok(());
    }
    let base_index = read_base_index(&bytes)
        .with_context(|| format!("{} is too short for a base index", args.file.display()))?;

    let (mut records, driver) = spawn_decode_reader(std::io::Cursor::new(bytes));

    let mut summaries = Vec::new();
    let mut total = 0usize;
    let mut mismatches = 0usize;
    while let Some(record) = records.next().await {
        total += 1;
        if let Some(target) = args.record
            && record.index != target
        {
            // Still release the payload so the decoder is not stalled
            // on a record nobody reads.
            drop(record.payload);
            continue;
        }
        if inspect_record(args, record, &mut summaries).await? {
            mismatches += 1;
        }
    }

    driver
        .await?
        .with_context(|| format!("failed to decode {}", args.file.display()))?;

    println!(
        "Log: base index {base_index}, {total} record{}",
        if total == 1 { "" } else { "s" }
    );
    for line in summaries {
        print!("{line}");
    }

    if mismatches > 0 {
        bail!("{mismatches} record(s) failed CRC-32 verification");
    }
    Ok(())
}

/// Format one record's summary into `out`. Returns true if `--verify`
/// found a checksum mismatch.
async fn inspect_record(
    args: &InspectArgs,
    record: RecordDescriptor,
    out: &mut Vec<String>,
) -> Result<bool> {
    use std::fmt::Write as _;

    let RecordDescriptor {
        index,
        length,
        crc,
        payload,
    } = record;

    let needs_payload = args.show_body || args.show_hex || args.verify;
    let body = if needs_payload {
        payload
            .read_to_vec()
            .await
            .with_context(|| format!("payload of record {index} was cut short"))?
    } else {
        drop(payload);
        Vec::new()
    };

    let mut line = format!(
        "Record {index}: {length} byte{}, crc=0x{crc:08X}",
        if length == 1 { "" } else { "s" }
    );

    let mut mismatch = false;
    if args.verify {
        let computed = crc32(&body);
        if computed == crc {
            line.push_str(" (crc ok)");
        } else {
            mismatch = true;
            let _ = write!(line, " (crc MISMATCH: computed 0x{computed:08X})");
        }
    }
    line.push('\n');

    if args.show_body {
        let text = String::from_utf8_lossy(&body);
        let truncated: String = text.chars().take(80).collect();
        let ellipsis = if text.chars().count() > 80 { "…" } else { "" };
        let _ = writeln!(line, "         Body:    {truncated}{ellipsis}");
    }

    if args.show_hex {
        let _ = writeln!(line, "         Hex dump:");
        for (i, chunk) in body.chunks(16).enumerate() {
            let offset = i * 16;
            let hex: String = chunk
                .iter()
                .fold(String::with_capacity(chunk.len() * 3), |mut s, b| {
                    if !s.is_empty() {
                        s.push(' ');
                    }
                    let _ = write!(s, "{b:02x}");
                    s
                });
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
                .collect();
            let _ = writeln!(line, "           {offset:04x}  {hex:<48}  {ascii}");
        }
    }

    out.push(line);
    Ok(mismatch)
}
