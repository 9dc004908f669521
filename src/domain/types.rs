// ==========================================
// 元数据导入器 - 领域类型定义
// ==========================================
// 职责: 属性类型码、运行状态等枚举
// 约束: 类型码从 0 连续编号，最后一个为 BIGDECIMAL
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// FieldType - 属性类型
// ==========================================
// 存储: field_def.field_type（INTEGER 类型码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Char,       // 0 短文本
    Integer,    // 1 整数
    Decimal,    // 2 小数
    Date,       // 3 日期
    DateTime,   // 4 日期时间
    Time,       // 5 时间
    Enum,       // 6 枚举（单选）
    Boolean,    // 7 布尔
    Password,   // 8 密码
    Url,        // 9 URL
    Html,       // 10 HTML 内容
    Email,      // 11 邮箱
    Text,       // 12 长文本
    MultiEnum,  // 13 枚举（多选）
    Regexp,     // 14 正则表达式
    Document,   // 15 文档
    ExtFile,    // 16 外部文件
    Image,      // 17 图片
    Notepad,    // 18 备注
    PhoneNum,   // 19 电话号码
    Color,      // 20 颜色
    Object,     // 21 对象引用
    GeoCoords,  // 22 地理坐标
    BigInt,     // 23 长整数
    BigDecimal, // 24 高精度小数
}

/// 最后一个受支持的类型码
pub const LAST_TYPE_CODE: i32 = 24;

impl FieldType {
    /// 按类型码升序排列的全部类型
    pub const ALL: [FieldType; (LAST_TYPE_CODE + 1) as usize] = [
        FieldType::Char,
        FieldType::Integer,
        FieldType::Decimal,
        FieldType::Date,
        FieldType::DateTime,
        FieldType::Time,
        FieldType::Enum,
        FieldType::Boolean,
        FieldType::Password,
        FieldType::Url,
        FieldType::Html,
        FieldType::Email,
        FieldType::Text,
        FieldType::MultiEnum,
        FieldType::Regexp,
        FieldType::Document,
        FieldType::ExtFile,
        FieldType::Image,
        FieldType::Notepad,
        FieldType::PhoneNum,
        FieldType::Color,
        FieldType::Object,
        FieldType::GeoCoords,
        FieldType::BigInt,
        FieldType::BigDecimal,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        if (0..=LAST_TYPE_CODE).contains(&code) {
            Some(Self::ALL[code as usize])
        } else {
            None
        }
    }

    /// 类型的规范显示标签（可能带括号参数后缀）
    pub fn label(self) -> &'static str {
        match self {
            FieldType::Char => "CHAR(n)",
            FieldType::Integer => "INTEGER",
            FieldType::Decimal => "DECIMAL(p,s)",
            FieldType::Date => "DATE",
            FieldType::DateTime => "DATETIME",
            FieldType::Time => "TIME",
            FieldType::Enum => "ENUM(n)",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Password => "PASSWORD(n)",
            FieldType::Url => "URL(n)",
            FieldType::Html => "HTML(n)",
            FieldType::Email => "EMAIL(n)",
            FieldType::Text => "TEXT(n)",
            FieldType::MultiEnum => "MULTIENUM(n)",
            FieldType::Regexp => "REGEXP(n)",
            FieldType::Document => "DOCUMENT",
            FieldType::ExtFile => "EXTFILE",
            FieldType::Image => "IMAGE",
            FieldType::Notepad => "NOTEPAD(n)",
            FieldType::PhoneNum => "PHONENUM(n)",
            FieldType::Color => "COLOR",
            FieldType::Object => "OBJECT",
            FieldType::GeoCoords => "GEOCOORDS",
            FieldType::BigInt => "BIGINT",
            FieldType::BigDecimal => "BIGDECIMAL(p,s)",
        }
    }

    /// 是否为枚举类（需要引用值列表）
    pub fn is_enum(self) -> bool {
        matches!(self, FieldType::Enum | FieldType::MultiEnum)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// RunStatus - 导入运行状态
// ==========================================
// 规则: 单调写入，最后一次写入生效，运行结束时读取一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Success,
    ImportError,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Running => "RUNNING",
            RunStatus::Success => "SUCCESS",
            RunStatus::ImportError => "IMPORT_ERROR",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_contiguous() {
        for (idx, ft) in FieldType::ALL.iter().enumerate() {
            assert_eq!(ft.code(), idx as i32);
            assert_eq!(FieldType::from_code(idx as i32), Some(*ft));
        }
        assert_eq!(FieldType::BigDecimal.code(), LAST_TYPE_CODE);
        assert_eq!(FieldType::from_code(LAST_TYPE_CODE + 1), None);
        assert_eq!(FieldType::from_code(-1), None);
    }

    #[test]
    fn test_enum_kinds() {
        assert!(FieldType::Enum.is_enum());
        assert!(FieldType::MultiEnum.is_enum());
        assert!(!FieldType::Char.is_enum());
    }
}
