use std::time::Duration;

use reqwest::blocking::{Client, Request};
use reqwest::{Method, StatusCode, header};
use serde_json::json;
use tracing::debug;

use crate::{config::Config, error::FetchError, postlist::GraphQLResponse};

/// One page of a user's timeline.
pub trait FetchPosts {
    fn fetch_page(
        &self,
        username: &str,
        after: Option<&str>,
        first: usize,
    ) -> Result<GraphQLResponse, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
    endpoint: String,
    doc_id: String,
    user_agent: String,
    token: Option<String>,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            doc_id: config.doc_id.clone(),
            user_agent: config.user_agent.clone(),
            token: config.token.clone(),
        })
    }

    pub fn build_request(
        &self,
        username: &str,
        after: Option<&str>,
        first: usize,
    ) -> reqwest::Result<Request> {
        let mut variables = json!({
            "username": username,
            "data": {
                "count": first,
                "include_relationship_info": true,
                "latest_besties_reel_media": true,
                "latest_reel_media": true,
            },
            "__relay_internal__pv__PolarisFeedShareMenurelayprovider": false,
            "first": first,
        });
        if let Some(after) = after {
            variables["after"] = json!(after);
        }
        let variables = variables.to_string();

        let mut builder = self
            .client
            .request(Method::GET, &self.endpoint)
            .query(&[
                ("variables", variables.as_str()),
                ("doc_id", self.doc_id.as_str()),
                ("server_timestamps", "true"),
            ])
            .header(header::USER_AGENT, &self.user_agent);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder.build()
    }
}

impl FetchPosts for HttpFetcher {
    fn fetch_page(
        &self,
        username: &str,
        after: Option<&str>,
        first: usize,
    ) -> Result<GraphQLResponse, FetchError> {
        let request = self.build_request(username, after, first)?;
        debug!(url = %request.url(), "requesting timeline page");
        let response = self.client.execute(request)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status));
        }
        Ok(response.json::<GraphQLResponse>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::runtime::Runtime;
    use wiremock::matchers::{method, path, query_param as query_param_is};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query_param(request: &Request, key: &str) -> Option<String> {
        request
            .url()
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    fn variables(request: &Request) -> Value {
        serde_json::from_str(&query_param(request, "variables").unwrap()).unwrap()
    }

    #[test]
    fn first_page_has_no_cursor() {
        let fetcher = HttpFetcher::new(&Config::default()).unwrap();
        let request = fetcher.build_request("natgeo", None, 50).unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().path(), "/graphql/query/");
        assert_eq!(query_param(&request, "doc_id").unwrap(), "789826179xxxxxxxx");
        assert_eq!(query_param(&request, "server_timestamps").unwrap(), "true");

        let variables = variables(&request);
        assert_eq!(variables["username"], "natgeo");
        assert_eq!(variables["first"], 50);
        assert_eq!(variables["data"]["count"], 50);
        assert_eq!(variables["data"]["include_relationship_info"], true);
        assert_eq!(
            variables["__relay_internal__pv__PolarisFeedShareMenurelayprovider"],
            false
        );
        assert!(variables.get("after").is_none());

        assert_eq!(request.headers()[header::USER_AGENT], "Mozilla/5.0");
        assert!(request.headers().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn cursor_and_token_are_sent() {
        let config = Config {
            endpoint: "http://localhost:8080/graphql/query/".to_string(),
            doc_id: "1234".to_string(),
            token: Some("t0k3n".to_string()),
            user_agent: "ig-posts-test".to_string(),
            ..Config::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        let request = fetcher.build_request("nasa", Some("QVFE_cursor"), 12).unwrap();

        assert_eq!(request.url().host_str(), Some("localhost"));
        assert_eq!(query_param(&request, "doc_id").unwrap(), "1234");
        let variables = variables(&request);
        assert_eq!(variables["after"], "QVFE_cursor");
        assert_eq!(variables["first"], 12);
        assert_eq!(request.headers()[header::AUTHORIZATION], "Bearer t0k3n");
        assert_eq!(request.headers()[header::USER_AGENT], "ig-posts-test");
    }

    /// Serves every GET on the timeline path with `response`. The runtime must
    /// outlive the requests made against the returned server.
    fn serve(response: ResponseTemplate) -> (Runtime, MockServer) {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/graphql/query/"))
                .and(query_param_is("doc_id", "789826179xxxxxxxx"))
                .respond_with(response)
                .mount(&server)
                .await;
            server
        });
        (runtime, server)
    }

    fn fetcher_for(server: &MockServer) -> HttpFetcher {
        HttpFetcher::new(&Config {
            endpoint: format!("{}/graphql/query/", server.uri()),
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn non_ok_status_is_a_failure() {
        for code in [204, 429, 500] {
            let (_runtime, server) = serve(ResponseTemplate::new(code));
            let result = fetcher_for(&server).fetch_page("natgeo", None, 50);
            match result {
                Err(FetchError::Status(status)) => assert_eq!(status.as_u16(), code),
                other => panic!("expected status failure for {code}, got {other:?}"),
            }
        }
    }

    #[test]
    fn ok_response_is_parsed() {
        let body = serde_json::json!({
            "data": {
                "xdt_api__v1__feed__user_timeline_graphql_connection": {
                    "edges": [{"node": {"code": "C1a2B3c4D5e"}}],
                    "page_info": {"has_next_page": true, "end_cursor": "QVFE"}
                }
            },
            "status": "ok"
        });
        let (_runtime, server) = serve(ResponseTemplate::new(200).set_body_json(body));

        let timeline = fetcher_for(&server)
            .fetch_page("natgeo", Some("QVFD"), 50)
            .unwrap()
            .into_timeline();

        assert_eq!(timeline.edges.len(), 1);
        assert_eq!(timeline.edges[0].node["code"], "C1a2B3c4D5e");
        assert!(timeline.page_info.has_next_page);
        assert_eq!(timeline.page_info.end_cursor.as_deref(), Some("QVFE"));
    }

    #[test]
    fn ok_response_that_is_not_json_is_a_failure() {
        let (_runtime, server) = serve(ResponseTemplate::new(200).set_body_string("<html>"));
        let result = fetcher_for(&server).fetch_page("natgeo", None, 50);
        assert!(matches!(result, Err(FetchError::Http(_))));
    }
}
