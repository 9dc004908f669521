// ==========================================
// 元数据导入API
// ==========================================
// 职责: 在阻塞线程池上执行导入运行，返回运行报告
// 并发: 同一 ImportApi 的所有运行共享一个 EntityResolver，
//       同类实体的 "查找 → 创建" 由其内部互斥锁串行化
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfig};
use crate::domain::{ImportReport, ModuleEntity};
use crate::importer::{run_line_adapter, EntityResolver, ImportResult, ListImporter, ParamImporter};
use crate::repository::Catalog;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct ImportApi {
    resolver: Arc<EntityResolver>,
    config_manager: ConfigManager,
}

impl ImportApi {
    /// 打开（必要时初始化）目录数据库
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let catalog = Catalog::open(db_path)?;
        Ok(Self::from_catalog(Arc::new(catalog)))
    }

    pub fn from_catalog(catalog: Arc<Catalog>) -> Self {
        let config_manager = ConfigManager::from_connection(catalog.connection());
        Self {
            resolver: Arc::new(EntityResolver::new(catalog)),
            config_manager,
        }
    }

    pub fn resolver(&self) -> Arc<EntityResolver> {
        Arc::clone(&self.resolver)
    }

    pub fn import_config(&self) -> ApiResult<ImportConfig> {
        Ok(self.config_manager.load_import_config()?)
    }

    pub fn set_config_value(&self, key: &str, value: &str) -> ApiResult<()> {
        Ok(self.config_manager.set_config_value(key, value)?)
    }

    // ==========================================
    // 模块（导入前的管理操作）
    // ==========================================

    pub fn add_module(&self, name: &str, prefix: &str) -> ApiResult<i64> {
        let name = name.trim();
        let prefix = prefix.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("模块名称为空".to_string()));
        }
        if !(2..=4).contains(&prefix.chars().count()) || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ApiError::InvalidInput(format!(
                "模块前缀必须为 2-4 个字母: {}",
                prefix
            )));
        }
        let module_id = self.resolver.catalog().modules.insert(name, prefix)?;
        info!(module = %name, prefix = %prefix, module_id, "创建模块");
        Ok(module_id)
    }

    pub fn find_module(&self, name: &str) -> ApiResult<Option<ModuleEntity>> {
        Ok(self.resolver.catalog().modules.find_by_name(name)?)
    }

    // ==========================================
    // 导入运行
    // ==========================================

    /// 导入对象/属性元数据文件
    pub async fn import_param_file(&self, path: impl AsRef<Path>) -> ApiResult<ImportReport> {
        let path = validate_path(path.as_ref())?;
        let config = self.import_config()?;
        let resolver = self.resolver();
        run_blocking(move || {
            let mut importer = ParamImporter::new(resolver, config);
            run_line_adapter(&mut importer, &path)
        })
        .await
    }

    /// 导入值列表文件
    pub async fn import_list_file(&self, path: impl AsRef<Path>) -> ApiResult<ImportReport> {
        let path = validate_path(path.as_ref())?;
        let resolver = self.resolver();
        run_blocking(move || {
            let mut importer = ListImporter::new(resolver);
            run_line_adapter(&mut importer, &path)
        })
        .await
    }
}

fn validate_path(path: &Path) -> ApiResult<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(ApiError::InvalidInput("文件路径为空".to_string()));
    }
    Ok(path.to_path_buf())
}

async fn run_blocking<F>(task: F) -> ApiResult<ImportReport>
where
    F: FnOnce() -> ImportResult<ImportReport> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::InternalError(format!("任务执行失败: {}", e)))?
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> ImportApi {
        ImportApi::from_catalog(Arc::new(Catalog::open(":memory:").unwrap()))
    }

    #[test]
    fn test_add_module_validates_prefix() {
        let api = api();
        assert!(matches!(api.add_module("Demo", "d"), Err(ApiError::InvalidInput(_))));
        assert!(matches!(api.add_module("Demo", "de1"), Err(ApiError::InvalidInput(_))));
        assert!(matches!(api.add_module("", "dem"), Err(ApiError::InvalidInput(_))));

        let id = api.add_module("Demo", "dem").unwrap();
        assert_eq!(api.find_module("Demo").unwrap().unwrap().module_id, id);
        assert!(matches!(
            api.add_module("Demo", "dem"),
            Err(ApiError::BusinessRuleViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let api = api();
        let result = api.import_param_file("/nonexistent/params.csv").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
