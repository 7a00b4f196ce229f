//! 机器人品牌标签
//!
//! 品牌仅用于标注与分发（日志、事件、报表），不参与行为分支。
//! 品牌相关的行为差异全部封装在各自的 `ProtocolDriver` 实现中。

use std::fmt;
use std::str::FromStr;

/// 机器人品牌
///
/// 一旦赋给连接即不可变。`Unknown` 表示未识别的控制器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, num_enum::FromPrimitive, num_enum::IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Brand {
    /// KUKA 工业机械臂
    Kuka = 0,
    /// ABB 工业机械臂
    Abb = 1,
    /// FANUC 工业机械臂
    Fanuc = 2,
    /// CNC 数控控制器
    Cnc = 3,
    /// RoboDK 仿真控制器
    RoboDk = 4,
    /// Dobot 桌面机械臂
    Dobot = 5,
    /// 未知品牌（默认）
    #[default]
    Unknown = 6,
}

impl Brand {
    /// 厂商标签（用于日志与事件）
    pub fn label(self) -> &'static str {
        match self {
            Brand::Kuka => "KUKA",
            Brand::Abb => "ABB",
            Brand::Fanuc => "FANUC",
            Brand::Cnc => "CNC",
            Brand::RoboDk => "RoboDK",
            Brand::Dobot => "Dobot",
            Brand::Unknown => "Unknown",
        }
    }

    /// 所有已知品牌（不含 `Unknown`）
    pub fn known() -> &'static [Brand] {
        &[
            Brand::Kuka,
            Brand::Abb,
            Brand::Fanuc,
            Brand::Cnc,
            Brand::RoboDk,
            Brand::Dobot,
        ]
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 品牌标签解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBrandError(pub String);

impl fmt::Display for ParseBrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown robot brand: {:?}", self.0)
    }
}

impl std::error::Error for ParseBrandError {}

impl FromStr for Brand {
    type Err = ParseBrandError;

    /// 大小写不敏感地解析厂商标签（配置文件与 CLI 使用）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kuka" => Ok(Brand::Kuka),
            "abb" => Ok(Brand::Abb),
            "fanuc" => Ok(Brand::Fanuc),
            "cnc" => Ok(Brand::Cnc),
            "robodk" => Ok(Brand::RoboDk),
            "dobot" => Ok(Brand::Dobot),
            "unknown" => Ok(Brand::Unknown),
            other => Err(ParseBrandError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for &brand in Brand::known() {
            let parsed: Brand = brand.label().parse().unwrap();
            assert_eq!(parsed, brand);
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("kuka".parse::<Brand>().unwrap(), Brand::Kuka);
        assert_eq!("RoboDK".parse::<Brand>().unwrap(), Brand::RoboDk);
        assert_eq!("FANUC".parse::<Brand>().unwrap(), Brand::Fanuc);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("motoman".parse::<Brand>().is_err());
    }

    #[test]
    fn test_from_primitive_defaults_to_unknown() {
        // 无效的品牌编号回落到 Unknown
        assert_eq!(Brand::from(200u8), Brand::Unknown);
        assert_eq!(Brand::from(3u8), Brand::Cnc);
    }

    #[test]
    fn test_default() {
        assert_eq!(Brand::default(), Brand::Unknown);
    }
}
