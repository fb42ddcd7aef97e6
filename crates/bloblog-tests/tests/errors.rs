//! Error-path tests: corruption (zero length) and truncation
//! (incomplete record), plus the guarantee that completed records stay
//! valid when a later record kills the session.

use bloblog_decoder::{DecodeError, Decoder, DecoderConfig, PayloadError};
use bloblog_tests::{LogBuilder, decode_all};

#[tokio::test]
async fn zero_length_record_fails_with_its_index() {
    let bytes = LogBuilder::new(1)
        .raw(&[0x00, 0x00, 0x00, 0x00]) // zero-filled length
        .raw(&[0x00, 0x00, 0x00, 0x00]) // zero-filled CRC-32
        .raw(&[0xFF, 0xFF, 0xFF, 0xFF])
        .build();

    let err = decode_all(&bytes, bytes.len()).await.unwrap_err();
    assert!(matches!(err, DecodeError::ZeroLength { index: 1 }));
}

#[tokio::test]
async fn zero_length_after_a_good_record() {
    // The good record completes; the corrupt one carries index base+1.
    let bytes = LogBuilder::new(10)
        .record(b"fine")
        .raw(&[0, 0, 0, 0])
        .build();

    let (mut decoder, mut records) = Decoder::new(DecoderConfig::default());
    let err = decoder.feed(&bytes).await.unwrap_err();
    assert!(matches!(err, DecodeError::ZeroLength { index: 11 }));

    // The completed record's stream is intact despite the failure.
    drop(decoder);
    let record = records.next().await.unwrap();
    assert_eq!(record.index, 10);
    assert_eq!(record.payload.read_to_vec().await.unwrap(), b"fine");
    assert!(records.next().await.is_none());
}

#[tokio::test]
async fn truncated_payload_reports_exact_missing_count() {
    // length=4 but only 3 payload bytes before EOF.
    let bytes = LogBuilder::new(1)
        .raw(&[0x00, 0x00, 0x00, 0x04])
        .raw(&[0xD8, 0x7F, 0x7E, 0x0C]) // CRC-32 of "test"
        .raw(b"tes")
        .build();

    let err = decode_all(&bytes, bytes.len()).await.unwrap_err();
    assert!(matches!(
        err,
        DecodeError::IncompleteRecord {
            index: 1,
            missing_bytes: 1
        }
    ));
}

#[tokio::test]
async fn truncated_mid_crc_reports_header_gap() {
    let bytes = LogBuilder::new(2)
        .raw(&[0x00, 0x00, 0x00, 0x04]) // full length field
        .raw(&[0xD8, 0x7F]) // half a CRC field
        .build();

    let err = decode_all(&bytes, bytes.len()).await.unwrap_err();
    assert!(matches!(
        err,
        DecodeError::IncompleteRecord {
            index: 2,
            missing_bytes: 0
        }
    ));
}

#[tokio::test]
async fn truncation_interrupts_the_open_payload_stream() {
    let bytes = LogBuilder::new(0)
        .raw(&[0x00, 0x00, 0x00, 0x08])
        .raw(&[0xAA, 0xBB, 0xCC, 0xDD])
        .raw(b"12345") // 3 bytes short of the declared 8
        .build();

    let (mut decoder, mut records) = Decoder::new(DecoderConfig::default());
    decoder.feed(&bytes).await.unwrap();

    let record = records.next().await.unwrap();
    let err = decoder.finish().unwrap_err();
    assert!(matches!(
        err,
        DecodeError::IncompleteRecord {
            index: 0,
            missing_bytes: 3
        }
    ));

    assert_eq!(
        record.payload.read_to_vec().await,
        Err(PayloadError::Interrupted { missing_bytes: 3 })
    );
}

#[tokio::test]
async fn partial_base_index_is_not_an_error() {
    // Two of the four base index bytes: no record ever existed, so the
    // session closes clean and judging the source is the caller's job.
    let (mut decoder, _records) = Decoder::new(DecoderConfig::default());
    decoder.feed(&[0x12, 0x34]).await.unwrap();
    decoder.finish().unwrap();
}
