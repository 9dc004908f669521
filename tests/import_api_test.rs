// ==========================================
// ImportApi 集成测试
// ==========================================
// 测试目标: 异步导入接口
// - 阻塞线程池执行导入运行，返回运行报告
// - 共享 EntityResolver 的并发运行不会重复创建同名对象
// ==========================================

mod test_helpers;

use catalog_importer::api::{ApiError, ImportApi};
use catalog_importer::config::config_keys;
use catalog_importer::domain::RunStatus;
use catalog_importer::logging;
use test_helpers::{create_test_db, write_csv, LIST_HEADER, PARAM_HEADER};

fn setup() -> (tempfile::NamedTempFile, ImportApi) {
    logging::init_test();
    let (db_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = ImportApi::new(&db_path).expect("Failed to create ImportApi");
    api.add_module("Mod", "mod").expect("Failed to add module");
    (db_file, api)
}

#[tokio::test]
async fn test_import_param_and_list_files() {
    let (_db, api) = setup();
    let params = write_csv(
        PARAM_HEADER,
        &[
            "Mod,MyObj,myo,Statut,,ENUM,",
            "Mod,MyObj,myo,Label,Libellé,CHAR,50",
        ],
    );
    let lists = write_csv(LIST_HEADER, &["Mod,MOD_MYO_STATUT,D,Draft,ENU,Draft"]);

    let report = api.import_param_file(params.path()).await.unwrap();
    assert!(report.is_success(), "errors: {:?}", report.errors);
    assert_eq!(report.adapter, "params");
    assert!(report.finished_at >= report.started_at);
    assert!(report.log.iter().any(|l| l.contains("End Process with status SUCCESS")));

    let report = api.import_list_file(lists.path()).await.unwrap();
    assert!(report.is_success(), "errors: {:?}", report.errors);
    assert_eq!(report.adapter, "lists");

    // 预置 A/B/C + 列表文件新增的 D
    let resolver = api.resolver();
    let catalog = resolver.catalog();
    let list = catalog.lists.find_list_by_name("MOD_MYO_STATUT").unwrap().unwrap();
    assert_eq!(catalog.lists.list_items(list.list_id).unwrap().len(), 4);
}

#[tokio::test]
async fn test_config_language_is_read_per_run() {
    let (_db, api) = setup();
    api.set_config_value(config_keys::DEFAULT_LANG, "ENU").unwrap();
    let params = write_csv(PARAM_HEADER, &["Mod,MyObj,myo,Count,,INTEGER,0"]);

    let report = api.import_param_file(params.path()).await.unwrap();
    assert!(report.is_success());

    let resolver = api.resolver();
    let object = resolver.catalog().objects.find_by_name("ModMyObj").unwrap().unwrap();
    assert!(resolver
        .catalog()
        .objects
        .find_translation(object.object_id, "ENU")
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_concurrent_runs_share_entities() {
    let (_db, api) = setup();
    let first = write_csv(PARAM_HEADER, &["Mod,Shared,shr,Alpha,,CHAR,10"]);
    let second = write_csv(PARAM_HEADER, &["Mod,Shared,shr,Beta,,CHAR,10"]);

    let (a, b) = tokio::join!(
        api.import_param_file(first.path()),
        api.import_param_file(second.path())
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.status, RunStatus::Success, "errors: {:?}", a.errors);
    assert_eq!(b.status, RunStatus::Success, "errors: {:?}", b.errors);

    let resolver = api.resolver();
    let catalog = resolver.catalog();
    let object = catalog.objects.find_by_name("ModShared").unwrap().unwrap();
    assert_eq!(catalog.fields.list_object_fields(object.object_id).unwrap().len(), 2);
    let template = catalog.templates.find_by_name("ModShared").unwrap().unwrap();
    assert_eq!(object.template_id, Some(template.template_id));
}

#[tokio::test]
async fn test_missing_file_and_empty_path() {
    let (_db, api) = setup();
    assert!(matches!(
        api.import_list_file("/nonexistent/lists.csv").await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        api.import_param_file("").await,
        Err(ApiError::InvalidInput(_))
    ));
}
