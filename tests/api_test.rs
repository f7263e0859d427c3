use std::sync::Arc;

use idea_core::{finalize, parse, parse_with, EnvLookup, SchemaConfig};
use serde_json::json;

const SCHEMA: &str = r#"
// shared definitions
use "./shared.idea"

plugin "./transform" {
  lang "ts"
  output "./src/types.ts"
}

/* reusable field configs */
prop Text { type "text" }
prop Age { min 0 max 150 }

enum Roles {
  ADMIN "Admin"
  MANAGER "Manager"
  USER "User"
}

type Address @label("Address" "Addresses") {
  street String
  city String
  country String?
}

model User! @label("User" "Users") {
  id String @id @default("nanoid(20)")
  name String @field.input(Text)
  age Integer @field.input(Age)
  role Roles @default("USER")
  addresses Address[]
  active Boolean @default(true)
}
"#;

#[test]
fn parses_a_full_schema() {
    let config = parse(SCHEMA).unwrap();

    assert_eq!(config.r#use, Some(vec!["./shared.idea".to_string()]));

    let plugins = config.plugin.as_ref().unwrap();
    assert_eq!(plugins["./transform"]["lang"], json!("ts"));

    let props = config.prop.as_ref().unwrap();
    assert_eq!(props["Age"], json!({ "min": 0, "max": 150 }));

    let enums = config.r#enum.as_ref().unwrap();
    assert_eq!(enums["Roles"]["MANAGER"], json!("Manager"));

    let types = config.r#type.as_ref().unwrap();
    let address = &types["Address"];
    assert!(address.mutable);
    assert_eq!(address.attributes["label"], json!(["Address", "Addresses"]));
    assert_eq!(address.columns.len(), 3);
    assert!(!address.columns[2].required);

    let models = config.model.as_ref().unwrap();
    let user = &models["User"];
    assert!(!user.mutable);
    assert_eq!(user.columns.len(), 6);
    let id = &user.columns[0];
    assert_eq!(id.r#type, "String");
    assert_eq!(id.attributes["id"], json!(true));
    assert_eq!(id.attributes["default"], json!("nanoid(20)"));
    let addresses = &user.columns[4];
    assert!(addresses.multiple);
    // references stay as placeholders in the raw pass
    assert_eq!(user.columns[1].attributes["field.input"], json!("${Text}"));
}

#[test]
fn finalizes_a_full_schema() {
    let config = finalize(SCHEMA).unwrap();

    assert!(config.r#use.is_none());
    assert!(config.prop.is_none());

    let models = config.model.as_ref().unwrap();
    let user = &models["User"];
    assert_eq!(
        user.columns[1].attributes["field.input"],
        json!({ "type": "text" })
    );
    assert_eq!(
        user.columns[2].attributes["field.input"],
        json!({ "min": 0, "max": 150 })
    );
}

#[test]
fn exports_json_and_yaml() {
    let config = finalize(SCHEMA).unwrap();

    let json = config.to_json().unwrap();
    let reparsed: SchemaConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(reparsed, config);

    let yaml = config.to_yaml().unwrap();
    assert!(yaml.contains("Roles:"));
    assert!(yaml.contains("ADMIN: Admin"));
}

#[test]
fn substitutes_injected_environment_variables() {
    let env: EnvLookup = Arc::new(|name: &str| match name {
        "DATABASE_URL" => Some("postgres://localhost/app".to_string()),
        _ => None,
    });
    let code = r#"
plugin "./db" {
  url env("DATABASE_URL")
  token env("UNSET_TOKEN")
}
"#;
    let config = parse_with(code, env).unwrap();
    let plugins = config.plugin.unwrap();
    assert_eq!(plugins["./db"]["url"], json!("postgres://localhost/app"));
    assert_eq!(plugins["./db"]["token"], json!(""));
}

#[test]
fn empty_input_compiles_to_an_empty_config() {
    let config = parse("\n// nothing to see\n").unwrap();
    assert_eq!(config, SchemaConfig::default());
    assert_eq!(config.to_json().unwrap(), "{}");
}
