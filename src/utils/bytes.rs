use std::io::{self, Read};

const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// 比较两个可能缺失的字节序列
///
/// 两者都缺失时相等；只有一个缺失时不相等（空序列与缺失不同）。
pub fn is_equal(a: Option<&[u8]>, b: Option<&[u8]>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// 将字节数格式化为易读的大小
///
/// 数值不小于 5 倍单位时才进位，所以 4096 字节显示为 `4096 B` 而不是 `4 KB`。
pub fn size_to_string(bytes: u64) -> String {
    let mut value = bytes;
    let mut unit = 0;

    while unit < SIZE_UNITS.len() - 1 && value >= 5 * 1024 {
        value /= 1024;
        unit += 1;
    }

    format!("{} {}", value, SIZE_UNITS[unit])
}

pub fn to_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// 按 UTF-8 解码，非法字节以替换字符代替
pub fn as_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// 读取流中剩余的全部数据
pub fn exhaust<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}
