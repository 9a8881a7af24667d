// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Verify the REST transport, and the operations sub-client over REST,
//! against a local HTTP server.

#[cfg(test)]
mod tests {
    use aiplatform_gax_internal::api_header::{GAPIC, XGoogApiClient};
    use aiplatform_gax_internal::client::RpcClient;
    use aiplatform_gax_internal::operations::OperationsBindings;
    use aiplatform_gax_internal::options::ClientConfig;
    use aiplatform_gax_internal::transport::ServiceInfo;
    use futures::TryStreamExt;
    use gax::error::rpc::Code;
    use gax::options::RequestOptions;
    use gax::retry::Retry;
    use httptest::{Expectation, Server, cycle, matchers::*, responders::*};
    use lro::Operations as _;
    use lro::model::*;
    use serde_json::json;
    use std::time::Duration;

    const NAME: &str = "projects/p/locations/l/operations/o";

    fn service() -> ServiceInfo {
        ServiceInfo {
            default_endpoint: "https://test-only.googleapis.com",
            api_client: XGoogApiClient {
                name: "aiplatform-test",
                library_type: GAPIC,
                version: "1.2.3",
            },
        }
    }

    async fn client(server: &Server) -> anyhow::Result<RpcClient> {
        let config = ClientConfig {
            endpoint: Some(format!("http://{}", server.addr())),
            transport: Some("rest".to_string()),
            ..Default::default()
        };
        let client = RpcClient::new(config, service())
            .await?
            .with_operations(OperationsBindings::generate(
                "v1beta1",
                &["projects/*/locations/*"],
            ));
        Ok(client)
    }

    fn fast_retry() -> RequestOptions {
        let mut options = RequestOptions::default();
        options.set_retry(
            Retry::if_codes([Code::Unavailable])
                .with_initial_delay(Duration::from_millis(1))
                .with_maximum_delay(Duration::from_millis(5))
                .with_total_timeout(Duration::from_secs(10)),
        );
        options
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn get_operation() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/v1beta1/projects/p/locations/l/operations/o"),
                request::headers(contains(("x-goog-request-params", "name=projects/p/locations/l/operations/o"))),
                request::headers(contains(key("x-goog-api-client"))),
                request::query(url_decoded(contains(("$alt", "json;enum-encoding=int")))),
            ])
            .respond_with(json_encoded(json!({"name": NAME, "done": true}))),
        );
        let client = client(&server).await?;
        assert_eq!(client.transport_label(), "rest");

        let operations = client.operations();
        let op = operations
            .get_operation(
                GetOperationRequest::default().set_name(NAME),
                RequestOptions::default(),
            )
            .await?;
        assert_eq!(op.name, NAME);
        assert!(op.done);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancel_and_delete() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path(
                "POST",
                "/v1beta1/projects/p/locations/l/operations/o:cancel",
            ))
            .respond_with(json_encoded(json!({}))),
        );
        server.expect(
            Expectation::matching(request::method_path("DELETE", "/v1beta1/projects/p/locations/l/operations/o"))
                .respond_with(status_code(204)),
        );
        let client = client(&server).await?;
        let operations = client.operations();
        operations
            .cancel_operation(
                CancelOperationRequest::default().set_name(NAME),
                RequestOptions::default(),
            )
            .await?;
        operations
            .delete_operation(
                DeleteOperationRequest::default().set_name(NAME),
                RequestOptions::default(),
            )
            .await?;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn list_operations_pages() -> anyhow::Result<()> {
        let server = Server::run();
        let path = "/v1beta1/projects/p/locations/l/operations";
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", path),
                request::query(url_decoded(not(contains(key("pageToken"))))),
            ])
            .respond_with(json_encoded(json!({
                "operations": [{"name": "a"}, {"name": "b"}, {"name": "c"}],
                "nextPageToken": "t1",
            }))),
        );
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", path),
                request::query(url_decoded(contains(("pageToken", "t1")))),
            ])
            .respond_with(json_encoded(json!({"nextPageToken": "t2"}))),
        );
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", path),
                request::query(url_decoded(contains(("pageToken", "t2")))),
                request::query(url_decoded(contains(("filter", "done=true")))),
            ])
            .respond_with(json_encoded(json!({
                "operations": [{"name": "d"}, {"name": "e"}],
            }))),
        );

        let client = client(&server).await?;
        let request = ListOperationsRequest::default()
            .set_name("projects/p/locations/l")
            .set_filter("done=true");
        let paginator =
            lro::list_operations_paginator(client.operations(), request, RequestOptions::default())
                .await?;
        let names = paginator
            .items()
            .map_ok(|o| o.name)
            .try_collect::<Vec<_>>()
            .await?;
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn service_error() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1beta1/projects/p/locations/l/operations/o"))
                .respond_with(status_code(404).body(
                    json!({"error": {
                        "code": 404,
                        "message": "no such operation",
                        "status": "NOT_FOUND",
                    }})
                    .to_string(),
                )),
        );
        let client = client(&server).await?;
        let got = client
            .operations()
            .get_operation(
                GetOperationRequest::default().set_name(NAME),
                RequestOptions::default(),
            )
            .await;
        let err = got.expect_err("the server returns an error");
        assert_eq!(err.code(), Code::NotFound, "{err:?}");
        assert_eq!(err.http_status_code(), Some(404));
        let status = err.status().expect("the error has a status");
        assert_eq!(status.message, "no such operation");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn retry_unavailable() -> anyhow::Result<()> {
        let server = Server::run();
        let unavailable = || {
            status_code(503).body(
                json!({"error": {"code": 503, "message": "try again", "status": "UNAVAILABLE"}})
                    .to_string(),
            )
        };
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1beta1/projects/p/locations/l/operations/o"))
                .times(3)
                .respond_with(cycle![
                    unavailable(),
                    unavailable(),
                    json_encoded(json!({"name": NAME})),
                ]),
        );
        let client = client(&server).await?;
        let op = client
            .operations()
            .get_operation(GetOperationRequest::default().set_name(NAME), fast_retry())
            .await?;
        assert_eq!(op.name, NAME);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn no_http_binding() -> anyhow::Result<()> {
        let server = Server::run();
        let config = ClientConfig {
            endpoint: Some(format!("http://{}", server.addr())),
            transport: Some("rest".to_string()),
            ..Default::default()
        };
        // Without collections the operations methods have no HTTP rules.
        let client = RpcClient::new(config, service()).await?;
        let got = client
            .operations()
            .get_operation(
                GetOperationRequest::default().set_name(NAME),
                RequestOptions::default(),
            )
            .await;
        assert!(matches!(&got, Err(e) if e.is_binding()), "{got:?}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unknown_transport() {
        let config = ClientConfig {
            transport: Some("carrier-pigeon".to_string()),
            ..Default::default()
        };
        let got = RpcClient::new(config, service()).await;
        assert!(matches!(&got, Err(e) if e.is_configuration()), "{got:?}");
    }
}
