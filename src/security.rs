//! Security Module
//!
//! PPTXパッケージ（ZIPアーカイブ）を開く際の安全性チェックを提供するモジュール。
//! ZIP bomb攻撃、パストラバーサル攻撃への対策。

use crate::error::VerseDeckError;

/// セキュリティ設定
///
/// パッケージ読み込み時の制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 展開後の合計最大サイズ（バイト）
    /// デフォルト: 1GB
    pub max_decompressed_size: u64,
    /// アーカイブ内の最大エントリ数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一エントリの最大サイズ（バイト）
    /// デフォルト: 256MB（埋め込み動画を含むプレゼンテーションを考慮）
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824,
            max_file_count: 10_000,
            max_file_size: 268_435_456,
            max_input_file_size: 2_147_483_648,
        }
    }
}

impl SecurityConfig {
    /// 入力ファイルのサイズを検証
    pub fn check_input_size(&self, size: u64) -> Result<(), VerseDeckError> {
        if size > self.max_input_file_size {
            return Err(VerseDeckError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                size, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// アーカイブのエントリ数を検証
    pub fn check_file_count(&self, count: usize) -> Result<(), VerseDeckError> {
        if count > self.max_file_count {
            return Err(VerseDeckError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                count, self.max_file_count
            )));
        }
        Ok(())
    }

    /// エントリ1つを検証し、展開後サイズの累計を更新する
    pub fn check_entry(
        &self,
        name: &str,
        size: u64,
        total: &mut u64,
    ) -> Result<(), VerseDeckError> {
        validate_zip_path(name)
            .map_err(|e| VerseDeckError::SecurityViolation(format!("Invalid ZIP path: {}", e)))?;

        if size > self.max_file_size {
            return Err(VerseDeckError::SecurityViolation(format!(
                "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                name, size, self.max_file_size
            )));
        }

        *total = total.checked_add(size).ok_or_else(|| {
            VerseDeckError::SecurityViolation(
                "Total decompressed size calculation overflow".to_string(),
            )
        })?;

        if *total > self.max_decompressed_size {
            return Err(VerseDeckError::SecurityViolation(format!(
                "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                total, self.max_decompressed_size
            )));
        }
        Ok(())
    }
}

/// パッケージ内のパス（パート名）の検証
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - 空、絶対パス、`..`、`\`を含む場合
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || has_drive {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}
