use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_url: String,
    pub allowed_origin: String,
    pub word_list_path: String,
    pub room_pool_size: u32,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            store_url: env::var("STORE_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            allowed_origin: env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            word_list_path: env::var("WORD_LIST_PATH")
                .unwrap_or_else(|_| "./words.txt".to_string()),
            room_pool_size: env::var("ROOM_POOL_SIZE")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .expect("Invalid ROOM_POOL_SIZE"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
