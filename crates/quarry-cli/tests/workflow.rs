//! Script files and config files driven through the CLI library.

use std::io::Write;

use quarry_cli::{load_config, read_script, run_script, CliError};
use quarry_memory::Store;

// ===================================================================
// Scripts
// ===================================================================

#[test]
fn script_file_through_configured_connection() {
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        config_file,
        r#"{{"default": "app", "connections": {{"app": {{"driver": "inmemory", "grammar": "mysql"}}}}}}"#
    )
    .unwrap();
    let mut script_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        script_file,
        "CREATE TABLE IF NOT EXISTS `users`;\n\
         INSERT INTO `users` (`name`, `email`) VALUES ('Budi', 'budi@lonate.id'), ('Yasir', 'yasir@lonate.id');\n\
         -- the semicolon in this literal does not split the statement\n\
         UPDATE `users` SET `email` = 'a;b' WHERE `name` = 'Budi';\n\
         SELECT `email` FROM `users` WHERE `email` LIKE '%;%';"
    )
    .unwrap();

    let config = load_config(Some(config_file.path())).unwrap();
    let mut manager = quarry_core::DatabaseManager::new(config);
    quarry_memory::register_with_store(&mut manager, &Store::new());
    let connection = manager.connection(None).unwrap();

    let script = read_script(Some(&script_file.path().to_path_buf())).unwrap();
    let mut out = vec![];
    let summary = run_script(connection, &script, &mut out).unwrap();

    assert_eq!(summary.statements, 4);
    assert_eq!(summary.rows, 1);
    assert_eq!(String::from_utf8(out).unwrap(), "{\"email\":\"a;b\"}\n");
}

#[test]
fn strict_connection_stops_the_script() {
    let mut config = quarry_core::DatabaseConfig::default();
    config
        .connections
        .insert(String::from("checked"), quarry_core::ConnectionConfig::new("inmemory").strict(true));
    let mut manager = quarry_core::DatabaseManager::new(config);
    quarry_memory::register_with_store(&mut manager, &Store::new());
    let connection = manager.connection(Some("checked")).unwrap();

    let mut out = vec![];
    let err = run_script(
        connection,
        "INSERT INTO t (a) VALUES (1); SELECT * FROM t GROUP BY a; SELECT * FROM t",
        &mut out,
    )
    .unwrap_err();
    assert!(matches!(err, CliError::Statement { index: 2, .. }));
    assert!(err.to_string().contains("GROUP BY"));
    assert!(out.is_empty());
}
