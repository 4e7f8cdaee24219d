//! Resource and tag inventory via the Resource Groups Tagging API
//!
//! `GetResources` returns every taggable resource the credentials can see,
//! page by page. The API signals exhaustion with an absent or empty
//! `PaginationToken`.

use super::error::{classify_aws_error, FetchError};
use super::EnvContext;
use aws_sdk_resourcegroupstagging::error::ProvideErrorMetadata;
use std::collections::HashMap;
use tracing::debug;

/// A cloud entity identified by an ARN, carrying a set of key-value tags.
///
/// Immutable once fetched; reports and filters only ever derive views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// ARN-like identifier
    pub arn: String,
    /// Tag key to tag value, keys unique within the resource
    pub tags: HashMap<String, String>,
}

impl Resource {
    /// Service portion of the ARN ("ec2" in `arn:aws:ec2:eu-central-1:...`)
    pub fn resource_type(&self) -> &str {
        self.arn.splitn(4, ':').nth(2).unwrap_or("")
    }
}

/// Client for enumerating one environment's resources and tags
pub struct TaggingClient {
    client: aws_sdk_resourcegroupstagging::Client,
}

impl TaggingClient {
    pub fn new(ctx: &EnvContext) -> Self {
        Self {
            client: ctx.tagging_client(),
        }
    }

    /// Fetch all resources visible to the environment's credentials,
    /// paging through results until exhausted. Order is the API's return
    /// order and is preserved into the reports.
    pub async fn fetch_all(&self) -> Result<Vec<Resource>, FetchError> {
        let mut resources = Vec::new();
        let mut pagination_token: Option<String> = None;

        loop {
            let mut request = self.client.get_resources();
            if let Some(token) = &pagination_token {
                request = request.pagination_token(token);
            }

            let response = request.send().await.map_err(|e| {
                let meta = ProvideErrorMetadata::meta(&e);
                classify_aws_error(meta.code(), meta.message())
            })?;

            for mapping in response.resource_tag_mapping_list() {
                let Some(arn) = mapping.resource_arn() else {
                    continue;
                };
                let tags: HashMap<String, String> = mapping
                    .tags()
                    .iter()
                    .map(|t| (t.key().to_string(), t.value().to_string()))
                    .collect();
                resources.push(Resource {
                    arn: arn.to_string(),
                    tags,
                });
            }

            // An empty token also means the last page
            match response.pagination_token() {
                Some(token) if !token.is_empty() => pagination_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(count = resources.len(), "Fetched resources");
        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_from_arn() {
        let resource = Resource {
            arn: "arn:aws:ec2:eu-central-1:123456789012:instance/i-0abc".to_string(),
            tags: HashMap::new(),
        };
        assert_eq!(resource.resource_type(), "ec2");

        let bucket = Resource {
            arn: "arn:aws:s3:::my-bucket".to_string(),
            tags: HashMap::new(),
        };
        assert_eq!(bucket.resource_type(), "s3");
    }

    #[test]
    fn test_resource_type_malformed_arn() {
        let resource = Resource {
            arn: "not-an-arn".to_string(),
            tags: HashMap::new(),
        };
        assert_eq!(resource.resource_type(), "");
    }
}
