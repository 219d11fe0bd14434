use serde_json::{json, Value};

use crate::{Client, Config, RetryConfig};

/// Token used by [`test_client`].
pub const TEST_TOKEN: &str = "bzd_test_token";

/// Client pointed at a mock server, with retries disabled.
pub fn test_client(base_url: &str) -> Client {
    Client::new(test_config(base_url)).expect("client")
}

/// Same as [`test_client`], acting on `company_id`.
pub fn test_client_for_company(base_url: &str, company_id: u64) -> Client {
    Client::new(test_config(base_url).with_company(company_id)).expect("client")
}

fn test_config(base_url: &str) -> Config {
    Config {
        base_url: Some(base_url.to_string()),
        api_token: Some(TEST_TOKEN.to_string()),
        retry: Some(RetryConfig::disabled()),
        ..Default::default()
    }
}

/// List response body in the API's paginated envelope.
pub fn page_body(data: Vec<Value>, current_page: u32, last_page: u32) -> Value {
    let total = data.len();
    json!({
        "data": data,
        "meta": {
            "current_page": current_page,
            "per_page": 25,
            "last_page": last_page,
            "total": total
        }
    })
}
