//! Security Tests
//!
//! プレゼンテーション（ZIPアーカイブ）を開く際のセキュリティ対策を検証します。
//! ZIP bomb攻撃、パストラバーサル攻撃への対策。

use std::io::{Cursor, Write};
use versedeck::{Presentation, VerseDeckError};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

const CONTENT_TYPES: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#;
const PRESENTATION: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldSz cx="12192000" cy="6858000"/></p:presentation>"#;

/// 必須パートに加えて`extra`のエントリを含むアーカイブを作成
fn archive_with(extra: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip_data = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_data));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES).unwrap();
        zip.start_file("ppt/presentation.xml", options).unwrap();
        zip.write_all(PRESENTATION).unwrap();

        for (name, data) in extra {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }

        zip.finish().unwrap();
    }
    zip_data
}

/// ZIP bomb攻撃のテスト: 大量のファイルを含むZIPアーカイブ
#[test]
fn test_zip_bomb_too_many_files() {
    // 10,001個のファイルを含むZIPアーカイブを作成（上限: 10,000）
    let names: Vec<String> = (0..10_001).map(|i| format!("ppt/media/file{}.bin", i)).collect();
    let extra: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), &b"test"[..])).collect();

    match Presentation::from_bytes(archive_with(&extra)) {
        Err(VerseDeckError::SecurityViolation(msg)) => {
            assert!(msg.contains("too many files"));
        }
        other => panic!("Expected SecurityViolation error, got {:?}", other.map(|_| ())),
    }
}

/// ZIP bomb攻撃のテスト: 単一エントリのサイズが大きすぎるZIPアーカイブ
#[test]
#[ignore] // 大きなデータを作成するため、通常のテストではスキップ
fn test_zip_bomb_large_entry() {
    // 256MB + 1バイト
    let large_data = vec![0u8; 268_435_457];
    match Presentation::from_bytes(archive_with(&[("ppt/media/video.mp4", large_data.as_slice())])) {
        Err(VerseDeckError::SecurityViolation(msg)) => {
            assert!(msg.contains("exceeds maximum size"));
        }
        other => panic!("Expected SecurityViolation error, got {:?}", other.map(|_| ())),
    }
}

/// パストラバーサル攻撃のテスト: `..`を含むパス
#[test]
fn test_path_traversal_dotdot() {
    let zip_data = archive_with(&[("../../etc/passwd", &b"malicious"[..])]);

    match Presentation::from_bytes(zip_data) {
        Err(VerseDeckError::SecurityViolation(msg)) => {
            assert!(msg.contains("Path traversal") || msg.contains("Invalid ZIP path"));
        }
        other => panic!("Expected SecurityViolation error, got {:?}", other.map(|_| ())),
    }
}

/// パストラバーサル攻撃のテスト: 絶対パス
#[test]
fn test_path_traversal_absolute_path() {
    let zip_data = archive_with(&[("/etc/passwd", &b"malicious"[..])]);

    // zipクレートが先に絶対パスを拒否する場合も許容
    match Presentation::from_bytes(zip_data) {
        Err(VerseDeckError::SecurityViolation(msg)) => {
            assert!(msg.contains("Absolute path") || msg.contains("Invalid ZIP path"));
        }
        Err(VerseDeckError::Zip(_)) => {}
        other => panic!("Unexpected result: {:?}", other.map(|_| ())),
    }
}

/// パストラバーサル攻撃のテスト: Windows形式のパス
#[test]
fn test_path_traversal_windows_path() {
    let zip_data = archive_with(&[("ppt\\..\\..\\evil.xml", &b"malicious"[..])]);

    match Presentation::from_bytes(zip_data) {
        Err(VerseDeckError::SecurityViolation(_)) | Err(VerseDeckError::Zip(_)) => {}
        other => panic!("Unexpected result: {:?}", other.map(|_| ())),
    }
}

/// 正常な構造のパッケージではセキュリティエラーにならないことを確認
#[test]
fn test_valid_package_processing() {
    let zip_data = archive_with(&[("ppt/media/image..png", &b"\x89PNG"[..])]);

    let presentation = Presentation::from_bytes(zip_data).unwrap();
    assert_eq!(presentation.layout_count(), 0);
    assert_eq!(presentation.slide_count().unwrap(), 0);
}
