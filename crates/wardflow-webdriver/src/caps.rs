use serde_json::json;

/// Chrome capabilities suitable for driving an Ant Design single-page app.
pub fn chrome_capabilities(headless: bool) -> serde_json::Map<String, serde_json::Value> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--window-size=1920,1080".to_string(),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }

    let mut chrome_opts = serde_json::Map::new();
    chrome_opts.insert("args".to_string(), json!(args));

    let mut caps = serde_json::Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("acceptInsecureCerts".to_string(), json!(true));
    caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
    caps
}
