//! End-to-end runs against a directory-backed registry

use std::fs;
use std::path::Path;

use rstest::rstest;
use schema_register::{
    ErrorKind, LocalRegistry, RegisterConfig, RegisterTask, RegistryClient, SchemaType, Subject,
};
use tempfile::tempdir;

const ADDRESS_AVSC: &str = r#"{
  "type": "record",
  "name": "Address",
  "namespace": "com.acme",
  "fields": [{"name": "city", "type": "string"}]
}"#;

const USER_AVSC: &str = r#"{
  "type": "record",
  "name": "User",
  "namespace": "com.acme",
  "fields": [
    {"name": "name", "type": "string"},
    {"name": "home", "type": "com.acme.Address"}
  ]
}"#;

const USER_JSON: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "type": "object",
  "properties": {"name": {"type": "string"}},
  "required": ["name"]
}"#;

const USER_PROTO: &str = r#"syntax = "proto3";
package acme;

message User {
  string name = 1;
}
"#;

fn write(root: &Path, file: &str, content: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn user_referencing_address() -> Subject {
    Subject::new("user", "avro/user.avsc", SchemaType::Avro)
        .add_reference("com.acme.Address", "address", -1)
}

#[test]
fn test_reference_to_subject_registered_earlier_in_run() {
    let root = tempdir().unwrap();
    write(root.path(), "avro/address.avsc", ADDRESS_AVSC);
    write(root.path(), "avro/user.avsc", USER_AVSC);
    let mut registry = LocalRegistry::open(root.path().join("registry")).unwrap();

    let subjects = vec![
        Subject::new("address", "avro/address.avsc", SchemaType::Avro),
        user_referencing_address(),
    ];
    let outcome = RegisterTask::new(&mut registry, root.path(), subjects, Some(Path::new("build")))
        .run()
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(
        fs::read_to_string(root.path().join("build/registered.csv")).unwrap(),
        "subject, path, id\naddress, avro/address.avsc, 1\nuser, avro/user.avsc, 2\n"
    );

    let user = registry.schema_by_version("user", 1).unwrap();
    assert_eq!(user.references[0].subject, "address");
    assert_eq!(user.references[0].version, 1);
}

#[test]
fn test_reference_before_its_subject_fails() {
    let root = tempdir().unwrap();
    write(root.path(), "avro/address.avsc", ADDRESS_AVSC);
    write(root.path(), "avro/user.avsc", USER_AVSC);
    let mut registry = LocalRegistry::open(root.path().join("registry")).unwrap();

    let subjects = vec![
        user_referencing_address(),
        Subject::new("address", "avro/address.avsc", SchemaType::Avro),
    ];
    let outcome = RegisterTask::new(&mut registry, root.path(), subjects, Some(Path::new("build")))
        .run()
        .unwrap();

    assert_eq!(outcome.error_count(), 1);
    assert_eq!(outcome.summary().failures[0].error.kind(), ErrorKind::Registration);
    assert_eq!(
        fs::read_to_string(root.path().join("build/registered.csv")).unwrap(),
        "subject, path, id\naddress, avro/address.avsc, 1\n"
    );
}

#[test]
fn test_local_reference_is_bundled() {
    let root = tempdir().unwrap();
    write(root.path(), "avro/address.avsc", ADDRESS_AVSC);
    write(root.path(), "avro/user.avsc", USER_AVSC);
    let mut registry = LocalRegistry::open(root.path().join("registry")).unwrap();

    let subjects = vec![Subject::new("user", "avro/user.avsc", SchemaType::Avro)
        .add_local_reference("com.acme.Address", "avro/address.avsc")];
    let outcome = RegisterTask::new(&mut registry, root.path(), subjects, None)
        .run()
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(registry.subjects(), vec!["user"]);
}

#[rstest]
#[case(SchemaType::Avro, "user.avsc", ADDRESS_AVSC)]
#[case(SchemaType::Json, "user.json", USER_JSON)]
#[case(SchemaType::Protobuf, "user.proto", USER_PROTO)]
fn test_each_format_registers(
    #[case] schema_type: SchemaType,
    #[case] file: &str,
    #[case] content: &str,
) {
    let root = tempdir().unwrap();
    write(root.path(), file, content);
    let mut registry = LocalRegistry::open(root.path().join("registry")).unwrap();

    let outcome = RegisterTask::new(
        &mut registry,
        root.path(),
        vec![Subject::new("user", file, schema_type)],
        Some(Path::new("out")),
    )
    .run()
    .unwrap();

    assert!(outcome.is_success());
    let stored = registry.schema_by_version("user", -1).unwrap();
    assert_eq!(stored.schema_type, schema_type);
    assert_eq!(stored.schema, content);
    assert!(root
        .path()
        .join("registry/schemas")
        .join(format!("1.{}", schema_type.extension()))
        .exists());
}

#[test]
fn test_rerun_reuses_ids() {
    let root = tempdir().unwrap();
    write(root.path(), "avro/address.avsc", ADDRESS_AVSC);
    let registry_dir = root.path().join("registry");
    let subjects =
        vec![Subject::new("address", "avro/address.avsc", SchemaType::Avro).normalized(true)];

    for _ in 0..2 {
        let mut registry = LocalRegistry::open(&registry_dir).unwrap();
        let outcome =
            RegisterTask::new(&mut registry, root.path(), subjects.clone(), Some(Path::new("out")))
                .run()
                .unwrap();
        assert!(outcome.is_success());
    }

    let registry = LocalRegistry::open(&registry_dir).unwrap();
    assert_eq!(registry.versions("address"), vec![1]);
    assert_eq!(
        fs::read_to_string(root.path().join("out/registered.csv")).unwrap(),
        "subject, path, id\naddress, avro/address.avsc, 1\n"
    );
}

#[test]
fn test_run_from_config_file() {
    let root = tempdir().unwrap();
    write(root.path(), "schemas/address.avsc", ADDRESS_AVSC);
    write(root.path(), "schemas/user.json", USER_JSON);
    write(root.path(), "schemas/broken.proto", "message Broken {");

    let config = RegisterConfig::from_toml(
        r#"
        [register]
        output_dir = "out"

        [[subjects]]
        subject = "address"
        file = "schemas/address.avsc"

        [[subjects]]
        subject = "broken"
        file = "schemas/broken.proto"
        type = "PROTOBUF"

        [[subjects]]
        subject = "user"
        file = "schemas/user.json"
        type = "JSON"
        "#,
    )
    .unwrap();

    let mut registry = LocalRegistry::open(root.path().join("registry")).unwrap();
    let outcome = RegisterTask::new(
        &mut registry,
        root.path(),
        config.subjects,
        config.register.output_dir.as_deref(),
    )
    .fail_fast(config.register.fail_fast)
    .run()
    .unwrap();

    assert_eq!(outcome.error_count(), 1);
    assert_eq!(outcome.summary().failures[0].subject, "broken");
    assert_eq!(
        fs::read_to_string(root.path().join("out/registered.csv")).unwrap(),
        "subject, path, id\naddress, schemas/address.avsc, 1\nuser, schemas/user.json, 2\n"
    );
}
