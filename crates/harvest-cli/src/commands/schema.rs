use harvest_core::MetadataRecord;

/// JSON Schema of the extracted metadata record.
pub fn record_schema() -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(schemars::schema_for!(MetadataRecord))
}

/// Handle `harvest schema`.
pub fn handle() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&record_schema()?)?);
    Ok(())
}
