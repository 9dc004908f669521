// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的目录数据库初始化、模块预置、CSV 文件生成
// ==========================================
#![allow(dead_code)]

use catalog_importer::config::ImportConfig;
use catalog_importer::domain::FieldEntity;
use catalog_importer::importer::{run_line_adapter, EntityResolver, ListImporter, ParamImporter};
use catalog_importer::{Catalog, ImportReport};
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// 元数据文件表头（7 列）
pub const PARAM_HEADER: &str = "module,object,prefix,attribute,help,type,length";

/// 值列表文件表头（6 列）
pub const LIST_HEADER: &str = "module,list,code,label,lang,value";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时路径不是 UTF-8")?
        .to_string();

    // 打开即初始化 schema
    Catalog::open(&db_path)?;

    Ok((temp_file, db_path))
}

/// 打开测试目录并预置模块
pub fn open_catalog(db_path: &str, modules: &[(&str, &str)]) -> Arc<Catalog> {
    let catalog = Catalog::open(db_path).expect("Failed to open catalog");
    for (name, prefix) in modules {
        catalog
            .modules
            .insert(name, prefix)
            .expect("Failed to insert module");
    }
    Arc::new(catalog)
}

/// 写入带表头的 CSV 临时文件
pub fn write_csv(header: &str, rows: &[&str]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create csv file");
    writeln!(file, "{}", header).expect("Failed to write header");
    for row in rows {
        writeln!(file, "{}", row).expect("Failed to write row");
    }
    file.flush().expect("Failed to flush csv file");
    file
}

/// 以默认配置运行一次元数据导入
pub fn import_params(resolver: &Arc<EntityResolver>, file: &NamedTempFile) -> ImportReport {
    import_params_with(resolver, ImportConfig::default(), file)
}

pub fn import_params_with(
    resolver: &Arc<EntityResolver>,
    config: ImportConfig,
    file: &NamedTempFile,
) -> ImportReport {
    let mut importer = ParamImporter::new(Arc::clone(resolver), config);
    run_line_adapter(&mut importer, file.path()).expect("param import run failed")
}

/// 运行一次值列表导入
pub fn import_lists(resolver: &Arc<EntityResolver>, file: &NamedTempFile) -> ImportReport {
    let mut importer = ListImporter::new(Arc::clone(resolver));
    run_line_adapter(&mut importer, file.path()).expect("list import run failed")
}

/// 按字段顺序列出对象的属性
pub fn object_fields(catalog: &Catalog, object_name: &str) -> Vec<(i64, FieldEntity)> {
    let object = catalog
        .objects
        .find_by_name(object_name)
        .expect("query object")
        .expect("object exists");
    catalog
        .fields
        .list_object_fields(object.object_id)
        .expect("list object fields")
        .into_iter()
        .map(|link| {
            let field = catalog
                .fields
                .find_by_id(link.field_id)
                .expect("query field")
                .expect("field exists");
            (link.field_order, field)
        })
        .collect()
}
