#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{Cursor, Seek, SeekFrom, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// (条目名, 版本号)，条目内容为 `名称:版本号`
pub const ENTRIES_OLD: &[(&str, u32)] = &[
    ("fileA", 1),
    ("fileB", 1),
    ("fileC", 1),
    ("dirA/fileAA.txt", 1),
    ("dirA/fileAB.txt", 1),
    ("dirA/dirAA/fileAAA.txt", 1),
    ("dirA/dirAA/fileAAB.txt", 1),
    ("dirA/dirAB/fileABA.txt", 1),
    ("dirA/dirAB/fileABB.txt", 1),
    ("dirB/fileBA.txt", 1),
];

/// 相对 ENTRIES_OLD：删除 4 个，替换 2 个，新增 6 个
pub const ENTRIES_NEW: &[(&str, u32)] = &[
    ("fileA", 1),
    ("fileC", 2),
    ("fileD", 1),
    ("dirA/fileAA.txt", 1),
    ("dirA/fileAC.txt", 1),
    ("dirA/dirAA/fileAAA.txt", 1),
    ("dirA/dirAA/fileAAC.txt", 1),
    ("dirA/dirAB/fileABB.txt", 2),
    ("dirA/dirAC/fileACA.txt", 1),
    ("dirA/dirAC/fileACB.txt", 1),
    ("dirB/fileBA.txt", 1),
    ("dirB/fileBB.txt", 1),
];

pub fn entry_content(name: &str, version: u32) -> Vec<u8> {
    format!("{}:{}", name, version).into_bytes()
}

/// 生成 zip 文件，`header` 写在 zip 数据之前
pub fn create_zip_file(path: &Path, header: Option<&[u8]>, entries: &[(&str, u32)]) {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, version) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&entry_content(name, *version)).unwrap();
    }
    let zip_bytes = zip.finish().unwrap().into_inner();

    let mut data = header.map(<[u8]>::to_vec).unwrap_or_default();
    data.extend_from_slice(&zip_bytes);
    fs::write(path, data).unwrap();
}

/// 在已写入 `header` 的文件上继续写 zip，条目偏移相对文件开头（如 `zip -A` 生成的自解压文件）
pub fn create_file_relative_zip(path: &Path, header: &[u8], entries: &[(&str, u32)]) {
    let mut file = File::create(path).unwrap();
    file.write_all(header).unwrap();
    file.seek(SeekFrom::End(0)).unwrap();

    let mut zip = ZipWriter::new(file);
    for (name, version) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&entry_content(name, *version)).unwrap();
    }
    zip.finish().unwrap();
}

/// 翻转文件中条目 `name` 压缩数据的第一个字节，模拟传输中损坏
pub fn flip_entry_data(path: &Path, name: &str) {
    let mut bytes = fs::read(path).unwrap();
    let field = |bytes: &[u8], at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]) as usize;

    // 本地文件头: 签名 4 字节，文件名长度位于 26，扩展字段长度位于 28，定长部分 30 字节
    let local = (0..bytes.len().saturating_sub(30))
        .find(|&at| {
            bytes[at..].starts_with(b"PK\x03\x04")
                && bytes.get(at + 30..at + 30 + field(&bytes, at + 26)) == Some(name.as_bytes())
        })
        .unwrap();
    let data_start = local + 30 + field(&bytes, local + 26) + field(&bytes, local + 28);

    bytes[data_start] ^= 0xff;
    fs::write(path, bytes).unwrap();
}
