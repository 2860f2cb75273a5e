use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub relay_api_url: String,
    pub allowed_origins: Option<Vec<String>>,
    pub openrouter_api_hostname: String,
    pub openrouter_api_key: String,
    pub openrouter_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("CHARLA_STORAGE_PATH").unwrap_or("./".to_string());
        let relay_api_url =
            env::var("CHARLA_RELAY_URL").unwrap_or_else(|_| "http://127.0.0.1:3001".to_string());
        let allowed_origins = env::var("CHARLA_ALLOWED_ORIGINS").ok().map(|origins| {
            origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        });
        let openrouter_api_hostname = env::var("CHARLA_OPENROUTER_HOST")
            .unwrap_or_else(|_| "https://openrouter.ai".to_string());
        // A missing key isn't fatal at startup, every upstream call
        // fails instead and surfaces as a 500
        let openrouter_api_key = env::var("OPENROUTER_API_KEY").unwrap_or_default();
        let openrouter_model =
            env::var("CHARLA_MODEL").unwrap_or_else(|_| "openai/gpt-3.5-turbo".to_string());

        Self {
            storage_path,
            relay_api_url,
            allowed_origins,
            openrouter_api_hostname,
            openrouter_api_key,
            openrouter_model,
        }
    }
}
