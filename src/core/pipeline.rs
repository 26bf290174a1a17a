use crate::adapters::yelp::{SearchParams, YelpClient};
use crate::core::transform::{
    dedup_rows, encode_rows, parse_businesses, search_categories, to_output_row, SEARCH_RADIUS,
    SEARCH_TERM, SORT_BY,
};
use crate::core::{Business, ConfigProvider, Pipeline, Storage, TransformResult, WriteMode};
use crate::utils::error::Result;

/// Yelp search -> template rows -> CSV file.
pub struct RestaurantPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: YelpClient,
}

impl<S: Storage, C: ConfigProvider> RestaurantPipeline<S, C> {
    pub fn new(storage: S, config: C, api_key: &str) -> Result<Self> {
        let client = YelpClient::with_endpoint(api_key, config.timeout(), config.api_endpoint())?;
        Ok(Self {
            storage,
            config,
            client,
        })
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            location: Some(self.config.location().to_string()),
            categories: Some(search_categories(self.config.extra_categories())),
            term: Some(SEARCH_TERM.to_string()),
            sort_by: Some(SORT_BY.to_string()),
            limit: Some(self.config.limit()),
            radius: Some(SEARCH_RADIUS),
            ..Default::default()
        }
    }

    /// Releases the HTTP session; dropping the pipeline does the same.
    pub fn close(self) {
        self.client.close();
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for RestaurantPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Business>> {
        let params = self.search_params();
        tracing::debug!("Searching {} with {:?}", self.client.endpoint(), params);

        let response = self.client.search(&params).await?;
        parse_businesses(&response)
    }

    async fn transform(&self, data: Vec<Business>) -> Result<TransformResult> {
        let fetched = data.len();
        let rows = data.into_iter().map(to_output_row).collect();
        let (rows, duplicates_removed) = dedup_rows(rows);

        if duplicates_removed > 0 {
            tracing::debug!("Dropped {} duplicate rows", duplicates_removed);
        }

        Ok(TransformResult {
            rows,
            fetched,
            duplicates_removed,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let path = self.config.output_path();

        let data = match self.config.write_mode() {
            WriteMode::Overwrite => encode_rows(&result.rows, true)?,
            WriteMode::Append => {
                let mut data = self.storage.read_file(path).await?.unwrap_or_default();
                if !data.is_empty() && !data.ends_with(b"\n") {
                    data.push(b'\n');
                }
                tracing::debug!("Appending after {} existing bytes", data.len());
                data.extend(encode_rows(&result.rows, false)?);
                data
            }
        };

        tracing::debug!(
            "Writing {} rows ({} bytes) to {} in mode '{}'",
            result.rows.len(),
            data.len(),
            path,
            self.config.write_mode().as_flag()
        );
        self.storage.write_file(path, &data).await?;

        Ok(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::core::transform::PLACEHOLDER_IMAGE;
    use crate::utils::error::EtlError;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        fail_writes: bool,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
                fail_writes: false,
            }
        }

        /// Shares the same files but rejects every write.
        fn read_only(&self) -> Self {
            Self {
                files: Arc::clone(&self.files),
                fail_writes: true,
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }

        async fn get_text(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8(data.clone()).unwrap())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
            let files = self.files.lock().await;
            Ok(files.get(path).cloned())
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.fail_writes {
                return Err(EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only storage",
                )));
            }
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn config_for(server: &MockServer, mode: WriteMode) -> RunConfig {
        RunConfig {
            api_endpoint: server.url("/v3/businesses/search"),
            output_path: "out.csv".to_string(),
            write_mode: mode,
            extra_categories: vec!["thai".to_string()],
            ..Default::default()
        }
    }

    fn green_leaf() -> serde_json::Value {
        serde_json::json!({
            "id": "gl-1",
            "name": "Green Leaf Cafe",
            "image_url": "",
            "url": "https://www.yelp.com/biz/green-leaf-cafe",
            "categories": [{"alias": "vegan", "title": "Vegan"}],
            "price": "$$",
            "rating": 4.5,
            "location": {
                "address1": "123 Main St",
                "city": "Springfield",
                "state": "IL",
                "zip_code": "62701",
                "display_address": ["123 Main St", "Springfield"]
            }
        })
    }

    #[tokio::test]
    async fn test_search_params_fix_term_sort_and_radius() {
        let server = MockServer::start_async().await;
        let pipeline =
            RestaurantPipeline::new(MockStorage::new(), config_for(&server, WriteMode::Overwrite), "key")
                .unwrap();

        let params = pipeline.search_params();

        assert_eq!(params.location.as_deref(), Some("NYC"));
        assert_eq!(params.categories.as_deref(), Some("vegan,vegetarian,thai"));
        assert_eq!(params.term.as_deref(), Some("restaurants"));
        assert_eq!(params.sort_by.as_deref(), Some("best_match"));
        assert_eq!(params.radius, Some(40_000));
        assert_eq!(params.limit, Some(50));
    }

    #[tokio::test]
    async fn test_extract_sends_fixed_query() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v3/businesses/search")
                    .header("authorization", "Bearer key")
                    .query_param("categories", "vegan,vegetarian,thai")
                    .query_param("term", "restaurants")
                    .query_param("sort_by", "best_match")
                    .query_param("radius", "40000")
                    .query_param("location", "NYC");
                then.status(200)
                    .json_body(serde_json::json!({"businesses": [green_leaf()], "total": 1}));
            })
            .await;

        let pipeline =
            RestaurantPipeline::new(MockStorage::new(), config_for(&server, WriteMode::Overwrite), "key")
                .unwrap();
        let businesses = pipeline.extract().await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(businesses.len(), 1);
        assert_eq!(businesses[0].name, "Green Leaf Cafe");
    }

    #[tokio::test]
    async fn test_extract_fails_fast_on_incomplete_record() {
        let server = MockServer::start_async().await;
        let mut broken = green_leaf();
        broken.as_object_mut().unwrap().remove("url");
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v3/businesses/search");
                then.status(200)
                    .json_body(serde_json::json!({"businesses": [green_leaf(), broken.clone()]}));
            })
            .await;

        let pipeline =
            RestaurantPipeline::new(MockStorage::new(), config_for(&server, WriteMode::Overwrite), "key")
                .unwrap();
        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, EtlError::SchemaError { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_transform_dedups_identical_rows() {
        let server = MockServer::start_async().await;
        let pipeline =
            RestaurantPipeline::new(MockStorage::new(), config_for(&server, WriteMode::Overwrite), "key")
                .unwrap();

        let mut twin = green_leaf();
        // differs only in fields that are dropped
        twin["id"] = serde_json::json!("gl-2");
        twin["rating"] = serde_json::json!(3.0);
        let data: Vec<Business> = vec![
            serde_json::from_value(green_leaf()).unwrap(),
            serde_json::from_value(twin).unwrap(),
        ];

        let result = pipeline.transform(data).await.unwrap();

        assert_eq!(result.fetched, 2);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.duplicates_removed, 1);
        assert_eq!(result.rows[0].image, PLACEHOLDER_IMAGE);
        assert_eq!(result.rows[0].category, "Vegan Options");
    }

    #[tokio::test]
    async fn test_load_overwrite_replaces_file() {
        let server = MockServer::start_async().await;
        let storage = MockStorage::new();
        storage.put_file("out.csv", b"old,content\n").await;
        let pipeline =
            RestaurantPipeline::new(storage.clone(), config_for(&server, WriteMode::Overwrite), "key")
                .unwrap();

        let data = vec![serde_json::from_value(green_leaf()).unwrap()];
        let result = pipeline.transform(data).await.unwrap();
        let path = pipeline.load(result).await.unwrap();

        assert_eq!(path, "out.csv");
        let text = storage.get_text("out.csv").await.unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "restaurant_text,location,category,restaurant_link,menu_link,price_rate,city,state,image"
        );
        assert!(lines[1].starts_with("Green Leaf Cafe,\"123 Main St, Springfield\",Vegan Options,"));
        assert!(!text.contains("old,content"));
    }

    #[tokio::test]
    async fn test_load_append_keeps_existing_and_skips_header() {
        let server = MockServer::start_async().await;
        let storage = MockStorage::new();
        // existing file without trailing newline
        storage.put_file("out.csv", b"restaurant_text,location\nOld Place,Somewhere").await;
        let pipeline =
            RestaurantPipeline::new(storage.clone(), config_for(&server, WriteMode::Append), "key")
                .unwrap();

        let data = vec![serde_json::from_value(green_leaf()).unwrap()];
        let result = pipeline.transform(data).await.unwrap();
        pipeline.load(result).await.unwrap();

        let text = storage.get_text("out.csv").await.unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "restaurant_text,location");
        assert_eq!(lines[1], "Old Place,Somewhere");
        assert!(lines[2].starts_with("Green Leaf Cafe,"));
    }

    #[tokio::test]
    async fn test_load_append_to_missing_file_writes_rows_only() {
        let server = MockServer::start_async().await;
        let storage = MockStorage::new();
        let pipeline =
            RestaurantPipeline::new(storage.clone(), config_for(&server, WriteMode::Append), "key")
                .unwrap();

        let data = vec![serde_json::from_value(green_leaf()).unwrap()];
        let result = pipeline.transform(data).await.unwrap();
        pipeline.load(result).await.unwrap();

        let text = storage.get_text("out.csv").await.unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(!text.contains("restaurant_text"));
    }

    #[tokio::test]
    async fn test_load_append_write_failure_keeps_existing_bytes() {
        let server = MockServer::start_async().await;
        let storage = MockStorage::new();
        let existing = b"restaurant_text,location\nOld Place,Somewhere\n";
        storage.put_file("out.csv", existing).await;
        let pipeline = RestaurantPipeline::new(
            storage.read_only(),
            config_for(&server, WriteMode::Append),
            "key",
        )
        .unwrap();

        let data = vec![serde_json::from_value(green_leaf()).unwrap()];
        let result = pipeline.transform(data).await.unwrap();
        let err = pipeline.load(result).await.unwrap_err();

        assert!(matches!(err, EtlError::IoError(_)));
        let files = storage.files.lock().await;
        assert_eq!(files.len(), 1);
        assert_eq!(files.get("out.csv").unwrap().as_slice(), existing);
    }
}
