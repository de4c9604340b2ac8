use fxpair_shared::DatasetRequest;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn load_request(path: &Path) -> Result<DatasetRequest, anyhow::Error> {
    let content = std::fs::read_to_string(path)?;
    let request: DatasetRequest = serde_json::from_str(&content)?;
    log::debug!("[Config] Loaded request from {}: {:?}", path.display(), request);
    Ok(request)
}

pub fn save_request(request: &DatasetRequest, path: &Path) -> Result<(), anyhow::Error> {
    let json = serde_json::to_string_pretty(request)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
