use crate::manifest::WorkspaceManifest;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let schema = schemars::schema_for!(WorkspaceManifest);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
