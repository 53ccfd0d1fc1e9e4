use anyhow::Result;
use cart_export::core::{DocumentFormat, DocumentRenderer, Storage};
use cart_export::utils::validation::Validate;
use cart_export::{ExportConfig, ExportEngine, LocalStorage, ShoppingCartPipeline, UserIdentity};
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
    "recipes": [
        {"id": 1, "name": "Pancakes", "ingredients": [
            {"name": "flour", "amount": 200, "measurement_unit": "g"},
            {"name": "milk", "amount": 300, "measurement_unit": "ml"},
            {"name": "egg", "amount": 2, "measurement_unit": "pcs"}
        ]},
        {"id": 2, "name": "Omelette", "ingredients": [
            {"name": "egg", "amount": 3, "measurement_unit": "pcs"},
            {"name": "milk", "amount": 1, "measurement_unit": "cup"}
        ]}
    ],
    "carts": {"dave": [1, 2], "erin": []}
}"#;

fn write_config(dir: &TempDir, format: &str, source: &str) -> Result<String> {
    let output = dir.path().join("out");
    let config = format!(
        r#"
[export]
format = "{}"

[document]
title = "Groceries"

[source]
type = "snapshot"
{}

[output]
path = "{}"
"#,
        format,
        source,
        output.to_string_lossy().replace('\\', "/")
    );
    let config_path = dir.path().join("cart-export.toml");
    std::fs::write(&config_path, config)?;
    Ok(config_path.to_string_lossy().to_string())
}

#[tokio::test]
async fn test_json_snapshot_export_from_config() -> Result<()> {
    let dir = TempDir::new()?;
    let snapshot_path = dir.path().join("cart.json");
    std::fs::write(&snapshot_path, SNAPSHOT)?;

    let config_path = write_config(
        &dir,
        "txt",
        &format!(
            "snapshot_path = \"{}\"",
            snapshot_path.to_string_lossy().replace('\\', "/")
        ),
    )?;

    let config = ExportConfig::from_file(&config_path)?;
    config.validate()?;

    let store = config.build_snapshot_store()?;
    let renderer = config.build_renderer()?;
    assert_eq!(renderer.format(), DocumentFormat::Txt);

    let engine = ExportEngine::new(
        ShoppingCartPipeline::new(store, renderer)
            .with_filename_suffix(config.export.filename_suffix.clone()),
    );
    let attachment = engine.run(&UserIdentity::new("dave")).await?;

    let storage = LocalStorage::new(config.output.path.clone());
    let path = storage
        .write_file(&attachment.filename, &attachment.body)
        .await?;
    assert!(path.ends_with("dave's-shopping-cart.txt"));

    let written = tokio::fs::read_to_string(&path).await?;
    assert_eq!(
        written,
        "Groceries\nFlour - 200 (g);\nMilk - 300 (ml);\nEgg - 5 (pcs);\nMilk - 1 (cup);\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_user_with_empty_snapshot_cart() -> Result<()> {
    let dir = TempDir::new()?;
    let snapshot_path = dir.path().join("cart.json");
    std::fs::write(&snapshot_path, SNAPSHOT)?;

    let config_path = write_config(
        &dir,
        "csv",
        &format!(
            "snapshot_path = \"{}\"",
            snapshot_path.to_string_lossy().replace('\\', "/")
        ),
    )?;
    let config = ExportConfig::from_file(&config_path)?;

    let engine = ExportEngine::new(ShoppingCartPipeline::new(
        config.build_snapshot_store()?,
        config.build_renderer()?,
    ));
    let attachment = engine.run(&UserIdentity::new("erin")).await?;

    assert_eq!(attachment.filename, "erin's-shopping-cart.csv");
    assert_eq!(attachment.body, b"name,amount,measurement_unit\n");

    Ok(())
}

#[tokio::test]
async fn test_csv_snapshot_export() -> Result<()> {
    let dir = TempDir::new()?;
    let lines_path = dir.path().join("lines.csv");
    let carts_path = dir.path().join("carts.csv");
    std::fs::write(
        &lines_path,
        "recipe_id,name,amount,measurement_unit\n1,Tomato,4,pcs\n1,Basil,10,g\n2,tomato,2,pcs\n",
    )?;
    std::fs::write(&carts_path, "username,recipe_id\nfrank,1\nfrank,2\n")?;

    let config_path = write_config(
        &dir,
        "txt",
        &format!(
            "snapshot_path = \"{}\"\ncarts_path = \"{}\"",
            lines_path.to_string_lossy().replace('\\', "/"),
            carts_path.to_string_lossy().replace('\\', "/")
        ),
    )?;
    let config = ExportConfig::from_file(&config_path)?;
    config.validate()?;

    let engine = ExportEngine::new(ShoppingCartPipeline::new(
        config.build_snapshot_store()?,
        config.build_renderer()?,
    ));
    let attachment = engine.run(&UserIdentity::new("frank")).await?;

    assert_eq!(
        String::from_utf8(attachment.body)?,
        "Groceries\nTomato - 6 (pcs);\nBasil - 10 (g);\n"
    );

    Ok(())
}
