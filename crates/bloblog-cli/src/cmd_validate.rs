/// Implementation of `bloblog validate`.
///
/// Streams the log file through the decoder end to end, draining every
/// payload, and reports structural health. Unlike `inspect` this never
/// buffers the file — it reads in chunks, so arbitrarily large logs
/// validate in constant memory.
///
/// # Output format
///
/// ```text
/// ✓ base index parsed
/// ✓ 100 records framed, indices 1001..1100
/// ✓ 12845 payload bytes delivered
/// valid
/// ```
use anyhow::{Context, Result};
use bloblog_decoder::spawn_decode_reader;

use crate::ValidateArgs;

/// Run the `bloblog validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or the decode fails
/// (zero-length record, truncated record, I/O failure).
pub async fn run(args: &ValidateArgs) -> Result<()> {
    let file = tokio::fs::File::open(&args.file)
        .await
        .with_context(|| format!("cannot open {}", args.file.display()))?;

    let (mut records, driver) = spawn_decode_reader(file);

    let mut first_index = None;
    let mut last_index = None;
    let mut count = 0u64;
    let mut payload_bytes = 0u64;

    while let Some(record) = records.next().await {
        first_index.get_or_insert(record.index);
        last_index = Some(record.index);
        count += 1;

        let body = record
            .payload
            .read_to_vec()
            .await
            .with_context(|| format!("payload of record {} was cut short", record.index))?;
        payload_bytes += body.len() as u64;
    }

    driver
        .await?
        .with_context(|| format!("{} is not a valid blob log", args.file.display()))?;

    if let (Some(first), Some(last)) = (first_index, last_index) {
        println!("✓ base index parsed");
        println!(
            "✓ {count} record{} framed, indices {first}..{last}",
            if count == 1 { "" } else { "s" }
        );
        println!("✓ {payload_bytes} payload bytes delivered");
    } else {
        println!("✓ no records (empty or header-only log)");
    }
    println!("valid");

    Ok(())
}
