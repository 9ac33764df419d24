//! zip 归档的读取、修改与写出
//!
//! [`ArchiveHandle`] 在打开时只读取中央目录（条目名称与 CRC-32），
//! 条目内容在 [`ArchiveHandle::read_all`] 时才解压。位于第一个本地文件头之前的
//! 任意字节（例如自解压程序头）作为头部数据单独保存。

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{ArchiveError, ArchiveResult};
use crate::utils::{compute_crc32, exhaust};

/// 不含注释的中央目录结束记录长度
const END_RECORD_LEN: u64 = 22;

#[derive(Debug, Clone)]
struct Entry {
    crc32: u32,
    /// `None` 表示内容仍在磁盘上，尚未读取
    content: Option<Vec<u8>>,
}

/// 一个已打开的 zip 归档
#[derive(Debug, Clone)]
pub struct ArchiveHandle {
    path: PathBuf,
    entries: BTreeMap<String, Entry>,
    header_data: Option<Vec<u8>>,
}

impl ArchiveHandle {
    /// 打开归档并索引所有条目
    pub fn open(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref();
        let mut archive = open_zip(path)?;

        let mut entries = BTreeMap::new();
        let mut first_header: Option<u64> = None;
        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(|e| ArchiveError::from_zip(path, e))?;
            // header_start 总是相对文件开头，与 zip 内偏移的基准无关
            let start = file.header_start();
            first_header = Some(first_header.map_or(start, |first| first.min(start)));
            entries.insert(
                file.name().to_string(),
                Entry {
                    crc32: file.crc32(),
                    content: None,
                },
            );
        }

        let header_len = match first_header {
            Some(start) => start,
            None => end_record_start(path, archive.comment().len() as u64)?,
        };
        let header_data = if header_len > 0 {
            Some(read_prefix(path, header_len)?)
        } else {
            None
        };

        debug!(
            "已打开 {}: {} 个条目, 头部数据 {} 字节",
            path.display(),
            entries.len(),
            header_len
        );

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            header_data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// 按名称排序的条目名
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn checksum(&self, name: &str) -> Option<u32> {
        self.entries.get(name).map(|entry| entry.crc32)
    }

    pub fn header_data(&self) -> Option<&[u8]> {
        self.header_data.as_deref()
    }

    /// 设置头部数据；`Some(vec![])` 与 `None` 是不同的状态
    pub fn set_header_data(&mut self, header_data: Option<Vec<u8>>) {
        self.header_data = header_data;
    }

    /// 新增或替换条目内容，同时更新其 CRC-32
    pub fn set_entry(&mut self, name: impl Into<String>, content: Vec<u8>) {
        let entry = Entry {
            crc32: compute_crc32(&content),
            content: Some(content),
        };
        self.entries.insert(name.into(), entry);
    }

    /// 删除条目，返回条目是否存在
    pub fn remove_entry(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// 读取所有条目的完整内容，任一条目损坏即报错
    pub fn read_all(&self) -> ArchiveResult<BTreeMap<String, Vec<u8>>> {
        let (contents, corrupt) = self.read_all_lenient()?;
        match corrupt.into_iter().next() {
            Some((name, reason)) => Err(ArchiveError::invalid(
                &self.path,
                format!("条目 {} 已损坏: {}", name, reason),
            )),
            None => Ok(contents),
        }
    }

    /// 读取所有条目；解压失败或 CRC 不符的条目不中断读取
    ///
    /// 返回 (可读取的条目内容, 损坏的条目名 -> 原因)。
    pub fn read_all_lenient(
        &self,
    ) -> ArchiveResult<(BTreeMap<String, Vec<u8>>, BTreeMap<String, String>)> {
        let mut archive = None;
        let mut contents = BTreeMap::new();
        let mut corrupt = BTreeMap::new();

        for (name, entry) in &self.entries {
            let content = match &entry.content {
                Some(content) => content.clone(),
                None => {
                    let zip = match archive {
                        Some(ref mut zip) => zip,
                        None => archive.insert(open_zip(&self.path)?),
                    };
                    match read_entry(zip, &self.path, name) {
                        Ok(content) => content,
                        Err(EntryError::Corrupt(reason)) => {
                            debug!("{}: 条目 {} 无法读取: {}", self.path.display(), name, reason);
                            corrupt.insert(name.clone(), reason);
                            continue;
                        }
                        Err(EntryError::Fatal(e)) => return Err(e),
                    }
                }
            };
            contents.insert(name.clone(), content);
        }

        Ok((contents, corrupt))
    }

    /// 将头部数据和给定的条目写入 `path`
    pub fn write_to(&self, path: &Path, entries: &BTreeMap<String, Vec<u8>>) -> ArchiveResult<()> {
        write_archive(path, self.header_data(), entries)
    }

    /// 将当前状态（包括修改过的条目）写入 `path`
    pub fn save_to(&self, path: &Path) -> ArchiveResult<()> {
        let entries = self.read_all()?;
        self.write_to(path, &entries)
    }
}

/// 写出归档：先写头部数据，再写包含 `entries` 的 zip
///
/// 内容先写入同目录的临时文件，完成后再重命名为 `path`，
/// 失败时不会留下不完整的文件。
pub fn write_archive(
    path: &Path,
    header_data: Option<&[u8]>,
    entries: &BTreeMap<String, Vec<u8>>,
) -> ArchiveResult<()> {
    let zip_bytes = build_zip(path, entries)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| ArchiveError::io(path, e))?;

    if let Some(header) = header_data {
        temp.write_all(header)
            .map_err(|e| ArchiveError::io(path, e))?;
    }
    temp.write_all(&zip_bytes)
        .map_err(|e| ArchiveError::io(path, e))?;
    temp.flush().map_err(|e| ArchiveError::io(path, e))?;

    temp.persist(path)
        .map_err(|e| ArchiveError::io(path, e.error))?;

    debug!("已写入 {}: {} 个条目", path.display(), entries.len());
    Ok(())
}

/// 就地修改归档：加入（或覆盖）`additions`，删除 `removals`，其余条目与头部数据保持不变
pub fn update_archive(
    path: &Path,
    additions: &BTreeMap<String, Vec<u8>>,
    removals: &[&str],
) -> ArchiveResult<()> {
    let mut handle = ArchiveHandle::open(path)?;

    for name in removals {
        handle.remove_entry(name);
    }
    for (name, content) in additions {
        handle.set_entry(name.clone(), content.clone());
    }

    handle.save_to(path)
}

fn open_zip(path: &Path) -> ArchiveResult<ZipArchive<BufReader<File>>> {
    let file = open_file(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| ArchiveError::from_zip(path, e))
}

fn open_file(path: &Path) -> ArchiveResult<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ArchiveError::NotFound(path.to_path_buf()),
        _ => ArchiveError::io(path, e),
    })
}

fn read_prefix(path: &Path, len: u64) -> ArchiveResult<Vec<u8>> {
    let file = open_file(path)?;
    exhaust(BufReader::new(file).take(len)).map_err(|e| ArchiveError::io(path, e))
}

/// 空归档的中央目录结束记录的位置，之前的字节都是头部数据
fn end_record_start(path: &Path, comment_len: u64) -> ArchiveResult<u64> {
    let len = fs::metadata(path)
        .map_err(|e| ArchiveError::io(path, e))?
        .len();
    Ok(len.saturating_sub(END_RECORD_LEN + comment_len))
}

enum EntryError {
    /// 本地文件头无效、解压失败或 CRC 不符
    Corrupt(String),
    Fatal(ArchiveError),
}

impl EntryError {
    /// 解压和 CRC 错误由 zip 以 io::Error 报告，只有带系统错误码的才是真正的读写失败
    fn from_io(path: &Path, err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(_) => EntryError::Fatal(ArchiveError::io(path, err)),
            None => EntryError::Corrupt(err.to_string()),
        }
    }
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
    name: &str,
) -> Result<Vec<u8>, EntryError> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::Io(e)) => return Err(EntryError::from_io(path, e)),
        Err(e) => return Err(EntryError::Corrupt(e.to_string())),
    };

    exhaust(file).map_err(|e| EntryError::from_io(path, e))
}

fn build_zip(path: &Path, entries: &BTreeMap<String, Vec<u8>>) -> ArchiveResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    // 固定时间戳，相同输入生成相同的文件
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    for (name, content) in entries {
        if name.ends_with('/') && content.is_empty() {
            zip.add_directory(name.as_str(), options)
                .map_err(|e| ArchiveError::from_zip(path, e))?;
        } else {
            zip.start_file(name.as_str(), options)
                .map_err(|e| ArchiveError::from_zip(path, e))?;
            zip.write_all(content)
                .map_err(|e| ArchiveError::io(path, e))?;
        }
    }

    let cursor = zip
        .finish()
        .map_err(|e| ArchiveError::from_zip(path, e))?;
    Ok(cursor.into_inner())
}
