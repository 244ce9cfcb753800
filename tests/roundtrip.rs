use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use memzip::zip::CompressionMethod;
use memzip::{NewFile, ZipCodec};

fn stamp(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 2, 28)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

/// Deterministic pseudo-random bytes (xorshift).
fn noise(len: usize, mut seed: u32) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed as u8
        })
        .collect()
}

#[tokio::test]
async fn hello_world_end_to_end() {
    let before = Local::now().naive_local();
    let archive = memzip::create(&[NewFile::new("a.txt", "hello world")])
        .await
        .unwrap();
    let files = memzip::extract(&archive).await.unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "a.txt");
    assert_eq!(files[0].data, b"hello world");
    let ts = files[0].last_modification;
    assert_eq!(ts.second() % 2, 0);
    assert_eq!(ts.nanosecond(), 0);
    assert!(ts >= before.with_nanosecond(0).unwrap() - chrono::Duration::seconds(1));
}

#[tokio::test]
async fn many_shapes_round_trip() {
    let codec: ZipCodec = ZipCodec::default();
    let files: Vec<NewFile> = [0usize, 1, 2, 17, 255, 256, 4096, 70_000]
        .iter()
        .enumerate()
        .flat_map(|(i, &len)| {
            [
                NewFile::new(format!("noise/{i}.bin"), noise(len, 0x9E37_79B9 ^ len as u32))
                    .with_last_modification(stamp(i as u32, 30, 45)),
                NewFile::new(format!("text/{i}.txt"), "lorem ipsum ".repeat(len / 12))
                    .with_last_modification(stamp(23, i as u32, 1)),
            ]
        })
        .collect();

    let archive = codec.create(&files).await.unwrap();
    let extracted = codec.extract(&archive).await.unwrap();

    assert_eq!(extracted.len(), files.len());
    for (input, output) in files.iter().zip(&extracted) {
        assert_eq!(output.name, input.name);
        assert_eq!(output.data, input.data);
        let expected = input.last_modification.unwrap();
        assert_eq!(
            output.last_modification,
            expected.with_second(expected.second() / 2 * 2).unwrap()
        );
    }
}

#[tokio::test]
async fn incompressible_data_is_stored() {
    let codec: ZipCodec = ZipCodec::default();
    let files = [
        NewFile::new("random", noise(2048, 7)),
        NewFile::new("zeros", vec![0u8; 2048]),
    ];
    let archive = codec.create(&files).await.unwrap();
    let entries = codec.list(&archive).unwrap();

    assert_eq!(entries[0].compression(), CompressionMethod::Stored);
    assert_eq!(entries[0].compressed_size, 2048);
    assert_eq!(entries[1].compression(), CompressionMethod::Deflate);
    assert!(entries[1].compressed_size < 2048);
    // recorded over the uncompressed bytes in both cases
    assert_eq!(entries[0].crc32, memzip::crc32(&files[0].data));
    assert_eq!(entries[1].crc32, memzip::crc32(&files[1].data));
}

#[tokio::test]
async fn trailing_comment_is_skipped() {
    let mut archive = memzip::create(&[NewFile::new("c.txt", "commented")])
        .await
        .unwrap();
    let comment = b"a trailing comment that even contains PK\x01\x02";
    let len = archive.len();
    archive[len - 2..].copy_from_slice(&(comment.len() as u16).to_le_bytes());
    archive.extend_from_slice(comment);

    let files = memzip::extract(&archive).await.unwrap();
    assert_eq!(files[0].name, "c.txt");
    assert_eq!(files[0].data, b"commented");
}

#[tokio::test]
async fn prepended_data_breaks_absolute_offsets() {
    let codec: ZipCodec = ZipCodec::default();
    let archive = codec.create(&[NewFile::new("x", "payload")]).await.unwrap();
    assert_eq!(codec.extract(&archive).await.unwrap()[0].data, b"payload");

    let mut prefixed = vec![0xAB; 5];
    prefixed.extend_from_slice(&archive);
    let err = codec.extract(&prefixed).await.unwrap_err();
    assert_eq!(err.kind(), memzip::ErrorKind::Format);
}

#[tokio::test]
async fn duplicate_names_are_kept() {
    let archive = memzip::create(&[
        NewFile::new("same", "first"),
        NewFile::new("same", "second"),
    ])
    .await
    .unwrap();
    let files = memzip::extract(&archive).await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].data, b"first");
    assert_eq!(files[1].data, b"second");
}

#[tokio::test]
async fn unicode_names() {
    let archive = memzip::create(&[NewFile::new("dossier/été ☃.txt", "snow")])
        .await
        .unwrap();
    let files = memzip::extract(&archive).await.unwrap();
    assert_eq!(files[0].name, "dossier/été ☃.txt");
}
