use sha2::{Digest, Sha256};

/// 计算数据的 CRC-32 校验值
pub fn compute_crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// 同时累积 CRC-32 和 SHA256 的校验器
///
/// 用于对多段数据（例如补丁包中的多个条目）求整体校验和。
#[derive(Default)]
pub struct DualHasher {
    crc: crc32fast::Hasher,
    sha: Sha256,
}

impl DualHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.crc.update(data);
        self.sha.update(data);
    }

    /// 返回 (crc32, sha256 十六进制)
    pub fn finalize(self) -> (u32, String) {
        (self.crc.finalize(), hex::encode(self.sha.finalize()))
    }
}
